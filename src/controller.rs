/// Board controller: fetches `/api/data` and applies results to the session.
///
/// Fetches may overlap (a poll tick lands while a tab switch is still
/// loading). Every refresh is issued a ticket carrying a generation number;
/// only the most recently issued ticket may mutate the session, so a slow
/// response can never overwrite a newer one.

use chrono::{DateTime, Utc};
use reqwest::Url;
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};

use crate::config::BoardConfig;
use crate::logging::{self, Component};
use crate::model::{BoardError, DataResponse, Tab};
use crate::session::Session;
use crate::window::Window;

const DATA_PATH: &str = "/api/data";

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking client for the board data endpoint. Cheap to clone; clones
/// share the connection pool.
#[derive(Debug, Clone)]
pub struct DataClient {
    http: reqwest::blocking::Client,
    base: Url,
}

impl DataClient {
    pub fn new(endpoint: &str, timeout: std::time::Duration) -> Result<Self, BoardError> {
        let base = Url::parse(endpoint)
            .map_err(|e| BoardError::ConfigError(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoardError::ConfigError(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &BoardConfig) -> Result<Self, BoardError> {
        Self::new(&config.endpoint, config.request_timeout())
    }

    /// `<endpoint>/api/data?window=<id>&tab=<id>`
    pub fn data_url(&self, window: Window, tab: Tab) -> Url {
        let mut url = self.base.clone();
        url.set_path(DATA_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("window", window.id())
            .append_pair("tab", tab.id());
        url
    }

    /// Fetches one snapshot with response caching disabled.
    pub fn fetch(&self, window: Window, tab: Tab) -> Result<DataResponse, BoardError> {
        let url = self.data_url(window, tab);

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .map_err(|e| BoardError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BoardError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| BoardError::RequestError(e.to_string()))?;
        DataResponse::from_json(&body)
    }
}

// ---------------------------------------------------------------------------
// Refresh bookkeeping
// ---------------------------------------------------------------------------

/// Identifies one issued refresh and the parameters it was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub window: Window,
    pub tab: Tab,
}

impl RefreshTicket {
    /// Short request description for log context.
    pub fn describe(&self) -> String {
        format!("#{} window={} tab={}", self.generation, self.window.id(), self.tab.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New records replaced the cache.
    Applied { rows: usize },
    /// The fetch failed; the session is now stale.
    Failed,
    /// A newer refresh was issued after this one; the result was discarded.
    Superseded,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller {
    client: DataClient,
    session: Session,
    latest_generation: u64,
}

impl Controller {
    pub fn new(client: DataClient, session: Session) -> Self {
        Self {
            client,
            session,
            latest_generation: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &DataClient {
        &self.client
    }

    /// Issues a ticket for the session's current window and tab. Any ticket
    /// issued earlier becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.latest_generation += 1;
        RefreshTicket {
            generation: self.latest_generation,
            window: self.session.window(),
            tab: self.session.tab(),
        }
    }

    /// Applies the result of a ticket's fetch, if the ticket is still the
    /// latest one issued.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<DataResponse, BoardError>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        if ticket.generation != self.latest_generation {
            logging::debug(
                Component::Fetch,
                Some(&ticket.describe()),
                &format!("discarding response, latest is #{}", self.latest_generation),
            );
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let rows = response.rows.len();
                self.session.apply_response(response, now);
                logging::debug(
                    Component::Fetch,
                    Some(&ticket.describe()),
                    &format!("applied {} rows", rows),
                );
                RefreshOutcome::Applied { rows }
            }
            Err(err) => {
                logging::log_fetch_failure(&ticket.describe(), &err);
                self.session.mark_stale(&err, now);
                RefreshOutcome::Failed
            }
        }
    }

    /// Fetches and applies in one blocking call.
    pub fn refresh(&mut self) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let result = self.client.fetch(ticket.window, ticket.tab);
        self.complete_refresh(ticket, result, Utc::now())
    }

    // --- Local interactions (never touch the network) ----------------------

    /// Switches the visible group. Returns `false` for a group the bar does
    /// not offer.
    pub fn select_group(&mut self, group: &str) -> bool {
        let accepted = self.session.select_group(group);
        if !accepted {
            logging::warn(Component::Session, Some(group), "no such group; selection unchanged");
        }
        accepted
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.session.set_tab(tab);
    }

    pub fn select_window(&mut self, window: Window) {
        self.session.set_window(window);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
