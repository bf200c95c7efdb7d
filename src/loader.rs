//! Serialized roster loading for one calendar view
//!
//! A load is split in three steps so that user interactions can run while a fetch
//! is in flight: [`ScheduleLoader::begin_load`] issues a ticket,
//! [`fetch_with_timeout`] talks to the source, and [`ScheduleLoader::finish_load`]
//! applies the body. Only the newest ticket is ever applied, and nothing is applied
//! after [`ScheduleLoader::teardown`].

use std::time::Duration;

use chrono::{Local, NaiveDate};
use log::{info, warn};

use crate::error::{FetchError, LoadError};
use crate::roster::{parse_json, YearMonth};
use crate::selection::SelectionResolver;
use crate::source::RosterSource;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of "today" for month references and auto-selection
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A fixed date, for tests and reproducible runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Identifies one fetch and the month its roster is interpreted against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    month: YearMonth,
}

impl LoadTicket {
    pub fn month(&self) -> YearMonth {
        self.month
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded { events: usize },
    /// The last load failed; previously loaded events are still shown
    Failed { message: String, transport: bool },
}

/// What `finish_load` did with a successful or ignored result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { events: usize },
    /// A newer fetch was started after this one
    Stale,
    /// The view was torn down while this fetch was pending
    Discarded,
}

/// Fetches from `source`, failing with `FetchError::TimedOut` after `timeout`
pub async fn fetch_with_timeout<S: RosterSource + ?Sized>(
    source: &S,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    match tokio::time::timeout(timeout, source.fetch_roster()).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::TimedOut(timeout)),
    }
}

pub struct ScheduleLoader<S, C = SystemClock> {
    source: S,
    clock: C,
    timeout: Duration,
    resolver: SelectionResolver,
    issued: u64,
    torn_down: bool,
    status: LoadStatus,
}

impl<S: RosterSource, C: Clock> ScheduleLoader<S, C> {
    /// Creates a loader whose calendar starts on the current month
    pub fn new(source: S, clock: C, timeout: Duration) -> Self {
        let today = clock.today();
        Self {
            source,
            clock,
            timeout,
            resolver: SelectionResolver::new(YearMonth::of(&today)),
            issued: 0,
            torn_down: false,
            status: LoadStatus::Idle,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn resolver(&self) -> &SelectionResolver {
        &self.resolver
    }

    /// Interactions go straight to the resolver; they never wait on a fetch
    pub fn resolver_mut(&mut self) -> &mut SelectionResolver {
        &mut self.resolver
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Starts a load, superseding any load already in flight
    ///
    /// Returns `None` once the view has been torn down.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.torn_down {
            return None;
        }
        self.issued += 1;
        self.status = LoadStatus::Loading;
        Some(LoadTicket {
            token: self.issued,
            month: YearMonth::of(&self.clock.today()),
        })
    }

    /// Applies a fetch result if `ticket` is still the newest load
    ///
    /// Fetch and parse failures leave the loaded events untouched and are
    /// returned to the caller; the status reports the failure.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<u8>, FetchError>,
    ) -> Result<LoadOutcome, LoadError> {
        if self.torn_down {
            info!("Discarding roster response {} after teardown", ticket.token);
            return Ok(LoadOutcome::Discarded);
        }
        if ticket.token != self.issued {
            info!(
                "Dropping stale roster response {} (newest is {})",
                ticket.token, self.issued
            );
            return Ok(LoadOutcome::Stale);
        }

        let loaded = result
            .map_err(LoadError::from)
            .and_then(|body| {
                parse_json(&body, ticket.month.year, ticket.month.month).map_err(LoadError::from)
            });

        match loaded {
            Ok(events) => {
                let count = events.len();
                self.resolver.on_data_loaded(events, self.clock.today());
                self.status = LoadStatus::Loaded { events: count };
                info!("Loaded {} shift events for {}", count, ticket.month);
                Ok(LoadOutcome::Applied { events: count })
            }
            Err(err) => {
                warn!("Failed to load schedule: {}", err);
                self.status = LoadStatus::Failed {
                    message: err.to_string(),
                    transport: err.is_transport(),
                };
                Err(err)
            }
        }
    }

    /// Runs a whole load cycle against the configured source
    pub async fn refresh(&mut self) -> Result<LoadOutcome, LoadError> {
        let Some(ticket) = self.begin_load() else {
            return Ok(LoadOutcome::Discarded);
        };
        let result = fetch_with_timeout(&self.source, self.timeout).await;
        self.finish_load(ticket, result)
    }

    /// Closes the view; pending and future responses are dropped
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }
}

