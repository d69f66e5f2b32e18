//! Live wind board client.
//!
//! Polls a backend for per-station wind readings, narrows them to the
//! selected station group, ranks them by speed and renders the board as an
//! HTML page and a console table.
//!
//! Data flow: `controller` fetches → `session` caches → `groups` filters →
//! `sort` ranks → `render` paints. Tab and group changes re-run the last
//! three steps on cached data without a fetch.

pub mod config;
pub mod controller;
pub mod fields;
pub mod format;
pub mod groups;
pub mod logging;
pub mod model;
pub mod render;
pub mod session;
pub mod sort;
pub mod window;

pub use controller::{Controller, DataClient, RefreshOutcome, RefreshTicket};
pub use model::{BoardError, DataResponse, GroupTags, Record, Tab};
pub use session::{FetchStatus, Session};
pub use window::Window;
