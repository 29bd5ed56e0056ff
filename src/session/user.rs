//! Loading the signed-in user and checking the management permission.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::core::{SessionContext, UserProfile};
use crate::session::auth::{AuthService, MANAGEMENT_CONTROL_HASH, permission_granted};
use crate::session::ApiConfig;
use crate::utils::{SessionError, SessionResult};

/// Message recorded in the session when the user cannot be loaded.
pub const USER_LOAD_ERROR: &str = "Não foi possível obter informações do usuário";

/// Fills the [`SessionContext`] from the auth service.
pub struct UserService<A: AuthService> {
    auth: Arc<A>,
    session: Arc<SessionContext>,
    config: ApiConfig,
}

impl<A: AuthService> UserService<A> {
    pub fn new(auth: Arc<A>, session: Arc<SessionContext>, config: ApiConfig) -> Self {
        Self {
            auth,
            session,
            config,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Loads the current user into the session and returns it.
    ///
    /// In development mode a fixture user is installed without any request.
    /// On failure the session records [`USER_LOAD_ERROR`] and the error is returned.
    pub async fn fetch_current_user(&self) -> SessionResult<UserProfile> {
        self.session.set_loading(true).await;
        let result = self.load_user().await;
        self.session.set_loading(false).await;

        match result {
            Ok(user) => {
                self.session.set_user(user.clone()).await;
                debug!("Current user: {:?} ({:?})", user.name, user.id);
                Ok(user)
            }
            Err(e) => {
                error!("Failed to load current user: {}", e);
                self.session.set_error(USER_LOAD_ERROR).await;
                Err(e)
            }
        }
    }

    async fn load_user(&self) -> SessionResult<UserProfile> {
        if self.config.dev_mode {
            return Ok(UserProfile::development());
        }

        let details = self.auth.user_details().await?;
        UserProfile::from_details(details)
    }

    /// Checks whether the user may open the management tab.
    ///
    /// Denies (returns `false`) on any failure, including a missing registration.
    pub async fn check_management_access(&self) -> bool {
        self.session.set_checking_permission(true).await;
        let allowed = match self.resolve_management_access().await {
            Ok(allowed) => allowed,
            Err(SessionError::MissingRegistration) => {
                warn!("User registration not found; denying management access");
                false
            }
            Err(e) => {
                error!("Failed to check management permission: {}", e);
                false
            }
        };
        self.session.set_management_access(allowed).await;
        self.session.set_checking_permission(false).await;
        allowed
    }

    async fn resolve_management_access(&self) -> SessionResult<bool> {
        if self.config.dev_mode {
            return Ok(true);
        }

        let user = match self.session.current_user().await {
            Some(user) => user,
            None => self.fetch_current_user().await?,
        };

        let registration = user.registration.ok_or(SessionError::MissingRegistration)?;
        let body = self
            .auth
            .sub_permission(&registration, MANAGEMENT_CONTROL_HASH)
            .await?;

        Ok(permission_granted(&body))
    }
}
