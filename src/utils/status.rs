//! Colour classes for supply record statuses.

use serde::Serialize;

/// Badge colour shown for a supply record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Red,
    Orange,
    Gray,
}

impl StatusColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Gray => "gray",
        }
    }
}

impl std::fmt::Display for StatusColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a status code (short or long form, any case) to its colour.
pub fn status_class(code: Option<&str>) -> StatusColor {
    let code = code.unwrap_or_default().to_uppercase();
    match code.as_str() {
        "A" | "APPROVED" => StatusColor::Green,
        "R" | "REJECTED" => StatusColor::Red,
        "C" | "CREATED" | "PENDING" => StatusColor::Orange,
        _ => StatusColor::Gray,
    }
}
