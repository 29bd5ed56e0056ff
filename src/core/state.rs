//! Session state shared by the user service and the route guard.

use tokio::sync::RwLock;
use tracing::debug;

use crate::core::UserProfile;

#[derive(Debug, Default)]
struct SessionState {
    user: Option<UserProfile>,
    loading: bool,
    checking_permission: bool,
    error: Option<String>,
    management_access: bool,
}

/// Explicit session context.
///
/// Created once at startup, wrapped in an `Arc` and handed to the
/// [`UserService`](crate::session::UserService) and
/// [`RouteGuard`](crate::session::RouteGuard) at construction. [`clear`](Self::clear)
/// ends the session on logout.
#[derive(Debug, Default)]
pub struct SessionContext {
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.state.read().await.user.clone()
    }

    /// Id of the signed-in driver, if any.
    pub async fn current_driver_id(&self) -> Option<String> {
        self.state.read().await.user.as_ref().and_then(|u| u.id.clone())
    }

    pub async fn is_user_loaded(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn is_checking_permission(&self) -> bool {
        self.state.read().await.checking_permission
    }

    /// Last user-facing error message, cleared by the next successful fetch.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn has_management_access(&self) -> bool {
        self.state.read().await.management_access
    }

    pub async fn set_user(&self, user: UserProfile) {
        let mut state = self.state.write().await;
        state.user = Some(user);
        state.error = None;
    }

    pub(crate) async fn set_loading(&self, loading: bool) {
        let mut state = self.state.write().await;
        state.loading = loading;
        if loading {
            state.error = None;
        }
    }

    pub(crate) async fn set_error(&self, message: impl Into<String>) {
        self.state.write().await.error = Some(message.into());
    }

    pub(crate) async fn set_checking_permission(&self, checking: bool) {
        self.state.write().await.checking_permission = checking;
    }

    pub(crate) async fn set_management_access(&self, allowed: bool) {
        self.state.write().await.management_access = allowed;
    }

    /// Drops the user and every cached flag.
    pub async fn clear(&self) {
        *self.state.write().await = SessionState::default();
        debug!("Session cleared");
    }
}
