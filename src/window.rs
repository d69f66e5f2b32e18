//! Backend time windows and their display labels.

use serde::{Deserialize, Deserializer};

/// Time range of the snapshot the backend returns. Opaque to the client
/// beyond its query id and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    #[default]
    Now,
    LastHour,
    Last24Hours,
    Today,
}

impl Window {
    /// Resolves a window id; unrecognized ids mean `Now`.
    pub fn from_id(id: &str) -> Window {
        match id.trim() {
            "1h" => Window::LastHour,
            "24h" => Window::Last24Hours,
            "today" => Window::Today,
            _ => Window::Now,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Window::Now => "now",
            Window::LastHour => "1h",
            Window::Last24Hours => "24h",
            Window::Today => "today",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Window::Now => "現在",
            Window::LastHour => "過去 1 小時",
            Window::Last24Hours => "過去 24 小時",
            Window::Today => "今日",
        }
    }
}

/// Display name for a raw window id.
pub fn label_of_window(id: &str) -> &'static str {
    Window::from_id(id).label()
}

impl<'de> Deserialize<'de> for Window {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(Window::from_id(&id))
    }
}
