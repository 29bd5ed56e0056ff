//! Authenticated user profile as returned by the auth service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{SessionError, SessionResult};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// ERP user id, used as the driver id
    pub id: Option<String>,
    pub name: Option<String>,
    /// Employee registration ("matrícula")
    pub registration: Option<String>,
    /// Routine codes the user may access; `None` when the service omitted them
    pub routines: Option<Vec<String>>,
    /// Full user-details body
    #[serde(default)]
    pub details: Value,
}

impl UserProfile {
    /// Fixture user installed in development mode.
    pub fn development() -> Self {
        Self {
            id: Some("98".to_string()),
            name: Some("Motorista Teste".to_string()),
            registration: Some("10000287".to_string()),
            routines: None,
            details: Value::Null,
        }
    }

    /// Maps a user-details body.
    ///
    /// `usuarioErp` becomes the id; the registration is `matricula`, falling
    /// back to `usuarioErp`. Routine codes are compared as strings.
    pub fn from_details(details: Value) -> SessionResult<Self> {
        let obj = details
            .as_object()
            .ok_or_else(|| SessionError::Payload(format!("expected user object, got {details}")))?;

        let id = obj.get("usuarioErp").and_then(scalar_to_string);
        let registration = obj.get("matricula").and_then(scalar_to_string).or_else(|| id.clone());
        let name = obj
            .get("name")
            .or_else(|| obj.get("nome"))
            .and_then(scalar_to_string);
        let routines = obj
            .get("rotinas")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(scalar_to_string).collect());

        Ok(Self {
            id,
            name,
            registration,
            routines,
            details,
        })
    }

    pub fn has_routine(&self, routine: &str) -> bool {
        self.routines
            .as_ref()
            .is_some_and(|routines| routines.iter().any(|r| r == routine))
    }
}

/// Renders a JSON scalar the way a loose string conversion would; null and
/// structured values yield `None`.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
