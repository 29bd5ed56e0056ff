use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use abastecimento_lib::core::SessionContext;
use abastecimento_lib::session::{
    ApiConfig, AuthService, MANAGEMENT_CONTROL_HASH, Navigation, RouteGuard, RouteName,
    USER_LOAD_ERROR, UserService,
};
use abastecimento_lib::utils::{SessionError, SessionResult};
use serde_json::{Value, json};

/// Scripted auth service; `None` bodies simulate a transport failure.
#[derive(Default)]
struct FakeAuth {
    token: Option<Value>,
    details: Option<Value>,
    permission: Option<Value>,
    calls: AtomicUsize,
    permission_args: Mutex<Vec<(String, String)>>,
}

impl FakeAuth {
    fn reply(&self, body: &Option<Value>) -> SessionResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        body.clone().ok_or_else(|| SessionError::Http("connection refused".to_string()))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthService for FakeAuth {
    async fn validate_token(&self) -> SessionResult<Value> {
        self.reply(&self.token)
    }

    async fn user_details(&self) -> SessionResult<Value> {
        self.reply(&self.details)
    }

    async fn sub_permission(&self, registration: &str, control_hash: &str) -> SessionResult<Value> {
        self.permission_args
            .lock()
            .unwrap()
            .push((registration.to_string(), control_hash.to_string()));
        self.reply(&self.permission)
    }
}

fn config() -> ApiConfig {
    ApiConfig {
        local_url: "https://app.example".to_string(),
        routine: "9180".to_string(),
        ..ApiConfig::default()
    }
}

fn guard(auth: FakeAuth, config: ApiConfig) -> (RouteGuard<FakeAuth>, Arc<FakeAuth>, Arc<SessionContext>) {
    let auth = Arc::new(auth);
    let session = Arc::new(SessionContext::new());
    (
        RouteGuard::new(Arc::clone(&auth), Arc::clone(&session), config),
        auth,
        session,
    )
}

fn forbidden() -> Navigation {
    Navigation::Redirect {
        url: "https://app.example/forbidden".to_string(),
    }
}

#[tokio::test]
async fn development_mode_skips_every_check() {
    let (guard, auth, _) = guard(
        FakeAuth::default(),
        ApiConfig {
            dev_mode: true,
            ..config()
        },
    );

    assert!(guard.before_each("/cadastrar/7").await.is_allowed());
    assert_eq!(auth.calls(), 0);
}

#[tokio::test]
async fn unknown_paths_proceed_without_checks() {
    let (guard, auth, _) = guard(FakeAuth::default(), config());

    assert_eq!(
        guard.before_each("/sobre").await,
        Navigation::Proceed { route: None }
    );
    assert_eq!(auth.calls(), 0);
}

#[tokio::test]
async fn rejected_token_redirects() {
    let (guard, _, _) = guard(
        FakeAuth {
            token: Some(json!(false)),
            ..Default::default()
        },
        config(),
    );

    assert_eq!(guard.before_each("/").await, forbidden());
}

#[tokio::test]
async fn routine_holder_proceeds_and_is_cached() {
    let (guard, _, session) = guard(
        FakeAuth {
            token: Some(json!(true)),
            details: Some(json!({ "usuarioErp": 321, "rotinas": [100, 9180] })),
            ..Default::default()
        },
        config(),
    );

    let navigation = guard.before_each("/cadastrar/55").await;

    match navigation {
        Navigation::Proceed { route: Some(route) } => {
            assert_eq!(route.name, RouteName::Supply);
            assert_eq!(route.params.get("id").map(String::as_str), Some("55"));
        }
        other => panic!("expected proceed, got {other:?}"),
    }
    assert_eq!(session.current_driver_id().await.as_deref(), Some("321"));
}

#[tokio::test]
async fn missing_or_foreign_routines_redirect() {
    let (without, _, _) = guard(
        FakeAuth {
            token: Some(json!(true)),
            details: Some(json!({ "usuarioErp": 321 })),
            ..Default::default()
        },
        config(),
    );
    let (foreign, _, session) = guard(
        FakeAuth {
            token: Some(json!(true)),
            details: Some(json!({ "usuarioErp": 321, "rotinas": [1, 2] })),
            ..Default::default()
        },
        config(),
    );

    assert_eq!(without.before_each("/").await, forbidden());
    assert_eq!(foreign.before_each("/").await, forbidden());
    assert!(!session.is_user_loaded().await);
}

#[tokio::test]
async fn service_failure_redirects() {
    let (guard, _, _) = guard(
        FakeAuth {
            token: Some(json!(true)),
            details: None,
            ..Default::default()
        },
        config(),
    );

    assert_eq!(guard.before_each("/").await, forbidden());
}

fn users(auth: FakeAuth, config: ApiConfig) -> (UserService<FakeAuth>, Arc<FakeAuth>) {
    let auth = Arc::new(auth);
    let session = Arc::new(SessionContext::new());
    (UserService::new(Arc::clone(&auth), session, config), auth)
}

#[tokio::test]
async fn development_user_is_a_fixture() {
    let (service, auth) = users(
        FakeAuth::default(),
        ApiConfig {
            dev_mode: true,
            ..config()
        },
    );

    let user = service.fetch_current_user().await.unwrap();
    assert_eq!(user.id.as_deref(), Some("98"));
    assert_eq!(user.registration.as_deref(), Some("10000287"));
    assert!(service.check_management_access().await);
    assert_eq!(auth.calls(), 0);
}

#[tokio::test]
async fn failed_user_fetch_records_an_error() {
    let (service, _) = users(FakeAuth::default(), config());

    assert!(service.fetch_current_user().await.is_err());
    assert_eq!(service.session().last_error().await.as_deref(), Some(USER_LOAD_ERROR));
    assert!(!service.session().is_loading().await);
}

#[tokio::test]
async fn management_access_uses_registration() {
    let (service, auth) = users(
        FakeAuth {
            details: Some(json!({ "usuarioErp": 12, "matricula": "10000287" })),
            permission: Some(json!({ "permitido": true })),
            ..Default::default()
        },
        config(),
    );

    assert!(service.check_management_access().await);
    assert!(service.session().has_management_access().await);
    assert_eq!(
        auth.permission_args.lock().unwrap().as_slice(),
        &[("10000287".to_string(), MANAGEMENT_CONTROL_HASH.to_string())]
    );
}

#[tokio::test]
async fn management_access_denied_without_registration() {
    let (service, auth) = users(
        FakeAuth {
            details: Some(json!({})),
            permission: Some(json!(true)),
            ..Default::default()
        },
        config(),
    );

    assert!(!service.check_management_access().await);
    assert!(auth.permission_args.lock().unwrap().is_empty());
    assert!(!service.session().is_checking_permission().await);
}

#[tokio::test]
async fn management_access_denied_on_empty_answer() {
    let (service, _) = users(
        FakeAuth {
            details: Some(json!({ "usuarioErp": 12 })),
            permission: Some(json!([])),
            ..Default::default()
        },
        config(),
    );

    assert!(!service.check_management_access().await);
}
