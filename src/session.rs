/// Session state for one running board.
///
/// Holds the last fetched records together with the user's current tab,
/// window and group choices. The rendered board is a pure function of this
/// state: `Session::view` never performs I/O, so switching tab or group
/// re-derives the board from cache.
///
/// # Clock injection
/// Mutators that stamp a time take `now: DateTime<Utc>` rather than calling
/// `Utc::now()`, keeping tests deterministic.

use chrono::{DateTime, Utc};

use crate::groups::GroupFilter;
use crate::model::{BoardError, DataResponse, Record, Tab};
use crate::render::{BoardView, build_rows, group_buttons};
use crate::sort::sort_by;
use crate::window::Window;

/// Shown when the backend has not reported an update time.
pub const NOT_YET_UPDATED: &str = "尚未更新";

/// Outcome of the most recent completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    NeverFetched,
    Fresh { fetched_at: DateTime<Utc> },
    /// The last fetch failed; records are from an earlier one, if any.
    Stale { error: String, since: DateTime<Utc> },
}

#[derive(Debug, Clone)]
pub struct Session {
    records: Vec<Record>,
    tab: Tab,
    window: Window,
    groups: GroupFilter,
    updated_at: Option<String>,
    status: FetchStatus,
}

impl Session {
    pub fn new(window: Window, tab: Tab) -> Self {
        Self {
            records: Vec::new(),
            tab,
            window,
            groups: GroupFilter::new(),
            updated_at: None,
            status: FetchStatus::NeverFetched,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn groups(&self) -> &GroupFilter {
        &self.groups
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn set_window(&mut self, window: Window) {
        self.window = window;
    }

    /// See `GroupFilter::select`.
    pub fn select_group(&mut self, group: &str) -> bool {
        self.groups.select(group)
    }

    /// Text for the "last updated" slot. An empty backend value counts as
    /// missing.
    pub fn updated_label(&self) -> &str {
        match self.updated_at.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => NOT_YET_UPDATED,
        }
    }

    /// Replaces the cached records with a fresh payload.
    ///
    /// The previous collection is discarded wholesale. The group bar is only
    /// rebuilt when the payload carries a group list.
    pub fn apply_response(&mut self, response: DataResponse, now: DateTime<Utc>) {
        self.records = response.rows;
        self.updated_at = response.updated_at;
        if let Some(groups) = response.groups {
            self.groups.set_available(&groups);
        }
        self.status = FetchStatus::Fresh { fetched_at: now };
    }

    /// Records a failed fetch. Cached records stay on display.
    pub fn mark_stale(&mut self, error: &BoardError, now: DateTime<Utc>) {
        let since = match &self.status {
            FetchStatus::Stale { since, .. } => *since,
            _ => now,
        };
        self.status = FetchStatus::Stale {
            error: error.to_string(),
            since,
        };
    }

    /// Derives the board: group filter, then sort, then rows.
    pub fn view(&self) -> BoardView {
        let filtered = self.groups.apply(&self.records);
        let sorted = sort_by(self.tab, &filtered);
        BoardView {
            tab: self.tab,
            window: self.window,
            rows: build_rows(self.tab, &sorted),
            groups: group_buttons(&self.groups),
            updated_label: self.updated_label().to_string(),
            stale_error: match &self.status {
                FetchStatus::Stale { error, .. } => Some(error.clone()),
                _ => None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 2, 5, 0).unwrap()
    }

    fn response(body: &str) -> DataResponse {
        DataResponse::from_json(body).expect("fixture should decode")
    }

    fn row_names(session: &Session) -> Vec<String> {
        session.view().rows.into_iter().map(|r| r.name).collect()
    }

    const TWO_GROUPS: &str = r#"{
        "rows": [
            {"name": "tea", "station_id": "1", "speed": 3, "gust_speed": 9, "groups": ["茶葉產區"]},
            {"name": "coffee", "station_id": "2", "speed": 6, "gust_speed": 4, "groups": "咖啡產區"},
            {"name": "loose", "station_id": "3", "speed": 5}
        ],
        "updated_at": "2024-05-01 10:05:00",
        "groups": ["全部", "茶葉產區", "咖啡產區"]
    }"#;

    #[test]
    fn test_new_session_is_empty_and_not_updated() {
        let session = Session::new(Window::Now, Tab::AverageWind);
        assert!(session.records().is_empty());
        assert_eq!(session.updated_label(), NOT_YET_UPDATED);
        assert_eq!(session.status(), &FetchStatus::NeverFetched);
        assert!(session.view().rows.is_empty());
    }

    #[test]
    fn test_view_sorts_all_records_by_default() {
        let mut session = Session::new(Window::Now, Tab::AverageWind);
        session.apply_response(response(TWO_GROUPS), fixed_now());
        assert_eq!(row_names(&session), ["coffee", "loose", "tea"]);
        assert_eq!(session.updated_label(), "2024-05-01 10:05:00");
    }

    #[test]
    fn test_group_and_tab_changes_rederive_from_cache() {
        let mut session = Session::new(Window::Now, Tab::AverageWind);
        session.apply_response(response(TWO_GROUPS), fixed_now());

        assert!(session.select_group("茶葉產區"));
        assert_eq!(row_names(&session), ["tea"]);

        assert!(session.select_group("全部"));
        session.set_tab(Tab::Gust);
        assert_eq!(row_names(&session), ["tea", "coffee", "loose"]);
    }

    #[test]
    fn test_response_replaces_previous_records() {
        let mut session = Session::new(Window::Now, Tab::AverageWind);
        session.apply_response(response(TWO_GROUPS), fixed_now());
        session.apply_response(response(r#"{"rows": [{"name": "only"}]}"#), fixed_now());
        assert_eq!(row_names(&session), ["only"]);
        assert_eq!(session.updated_label(), NOT_YET_UPDATED);
    }

    #[test]
    fn test_response_without_groups_keeps_group_bar() {
        let mut session = Session::new(Window::Now, Tab::AverageWind);
        session.apply_response(response(TWO_GROUPS), fixed_now());
        session.select_group("咖啡產區");
        session.apply_response(
            response(r#"{"rows": [{"name": "c2", "groups": ["咖啡產區"]}]}"#),
            fixed_now(),
        );
        assert_eq!(session.groups().available().len(), 3);
        assert_eq!(session.groups().selected(), "咖啡產區");
        assert_eq!(row_names(&session), ["c2"]);
    }

    #[test]
    fn test_empty_updated_at_shows_placeholder() {
        let mut session = Session::new(Window::Now, Tab::AverageWind);
        session.apply_response(response(r#"{"rows": [], "updated_at": ""}"#), fixed_now());
        assert_eq!(session.updated_label(), NOT_YET_UPDATED);
    }

    #[test]
    fn test_failure_keeps_records_and_marks_stale() {
        let mut session = Session::new(Window::Now, Tab::AverageWind);
        session.apply_response(response(TWO_GROUPS), fixed_now());

        let later = fixed_now() + chrono::Duration::minutes(1);
        session.mark_stale(&BoardError::HttpError(503), later);
        let view = session.view();
        assert_eq!(view.rows.len(), 3, "stale board keeps the previous rows");
        assert_eq!(view.stale_error.as_deref(), Some("HTTP error: 503"));

        // Repeated failures keep the original onset time.
        session.mark_stale(&BoardError::HttpError(504), later + chrono::Duration::minutes(1));
        match session.status() {
            FetchStatus::Stale { error, since } => {
                assert_eq!(error, "HTTP error: 504");
                assert_eq!(*since, later);
            }
            other => panic!("expected stale status, got {:?}", other),
        }

        session.apply_response(response(TWO_GROUPS), later);
        assert_eq!(session.view().stale_error, None, "success clears the stale state");
    }
}
