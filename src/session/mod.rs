//! Session layer over the authentication/permission service.
//!
//! - [`ApiConfig`]: service endpoints and development mode
//! - [`AuthService`]: the remote calls, [`HttpAuthService`] in production
//! - [`UserService`]: loads the user and the management permission into the session
//! - [`RouteGuard`]: allows or redirects navigation

mod auth;
mod config;
mod guard;
mod user;

pub use auth::{AuthService, HttpAuthService, MANAGEMENT_CONTROL_HASH, is_truthy, permission_granted};
pub use config::ApiConfig;
pub use guard::{Navigation, RouteGuard, RouteMatch, RouteName, RouteRecord, match_route, routes};
pub use user::{USER_LOAD_ERROR, UserService};
