//! Navigation guard for the application's routes.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::core::{SessionContext, UserProfile};
use crate::session::auth::{AuthService, is_truthy};
use crate::session::ApiConfig;
use crate::utils::SessionResult;

/// Named application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteName {
    /// Driver home screen
    Home,
    /// Supply registration for a given vehicle/request id
    Supply,
}

/// A route and its guard metadata.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub name: RouteName,
    pub path: &'static str,
    /// A valid session token is required
    pub requires_auth: bool,
    /// The user must also hold the configured routine
    pub requires_auth_routine: bool,
}

lazy_static! {
    static ref ROUTES: Vec<RouteRecord> = vec![
        RouteRecord {
            name: RouteName::Home,
            path: "/",
            requires_auth: true,
            requires_auth_routine: true,
        },
        RouteRecord {
            name: RouteName::Supply,
            path: "/cadastrar/:id",
            requires_auth: true,
            requires_auth_routine: true,
        },
    ];
}

/// All registered routes.
pub fn routes() -> &'static [RouteRecord] {
    &ROUTES
}

/// A matched route with its path parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
    pub name: RouteName,
    pub params: HashMap<String, String>,
}

/// Matches `path` (query and fragment ignored) against the route table.
pub fn match_route(path: &str) -> Option<(&'static RouteRecord, RouteMatch)> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    routes().iter().find_map(|record| {
        let pattern: Vec<&str> = record.path.split('/').filter(|s| !s.is_empty()).collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, actual) in pattern.iter().zip(&segments) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), actual.to_string());
                }
                None if expected == actual => {}
                None => return None,
            }
        }

        Some((record, RouteMatch { name: record.name, params }))
    })
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Navigation {
    /// Continue to the route; `route` is `None` for paths outside the table
    Proceed { route: Option<RouteMatch> },
    /// Leave the app for this URL
    Redirect { url: String },
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Proceed { .. })
    }
}

/// Gates navigation on the auth service's answers.
pub struct RouteGuard<A: AuthService> {
    auth: Arc<A>,
    session: Arc<SessionContext>,
    config: ApiConfig,
}

impl<A: AuthService> RouteGuard<A> {
    pub fn new(auth: Arc<A>, session: Arc<SessionContext>, config: ApiConfig) -> Self {
        Self {
            auth,
            session,
            config,
        }
    }

    /// Decides whether navigation to `path` may proceed.
    ///
    /// Development mode and unguarded paths always proceed. Guarded routes need
    /// a truthy token validation and, when flagged, the configured routine in
    /// the user's routine list. Any service failure redirects to the forbidden page.
    pub async fn before_each(&self, path: &str) -> Navigation {
        let matched = match_route(path);

        if self.config.dev_mode {
            return Navigation::Proceed {
                route: matched.map(|(_, m)| m),
            };
        }

        let Some((record, route)) = matched else {
            return Navigation::Proceed { route: None };
        };

        if !record.requires_auth {
            return Navigation::Proceed { route: Some(route) };
        }

        match self.authorize(record).await {
            Ok(true) => Navigation::Proceed { route: Some(route) },
            Ok(false) => self.forbidden(),
            Err(e) => {
                error!("Authentication error for '{}': {}", path, e);
                self.forbidden()
            }
        }
    }

    async fn authorize(&self, record: &RouteRecord) -> SessionResult<bool> {
        let token = self.auth.validate_token().await?;
        if !is_truthy(&token) {
            debug!("Session token rejected");
            return Ok(false);
        }

        if !record.requires_auth_routine {
            return Ok(true);
        }

        let user = UserProfile::from_details(self.auth.user_details().await?)?;
        if user.routines.is_none() {
            warn!("User routines not found");
            return Ok(false);
        }

        let allowed = user.has_routine(&self.config.routine);
        if allowed {
            self.session.set_user(user).await;
        } else {
            debug!("User lacks routine {}", self.config.routine);
        }
        Ok(allowed)
    }

    fn forbidden(&self) -> Navigation {
        Navigation::Redirect {
            url: self.config.forbidden_url(),
        }
    }
}
