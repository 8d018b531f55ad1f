//! Departure boards for a list of requested stations.
//!
//! Planning turns user tokens into one [`Planned`] slot per station, in
//! request order. [`run`] then fetches and parses every slot concurrently,
//! at most `max_concurrent` at a time, and returns one [`StationReport`] per
//! slot in the same order. A failure at one station never affects another.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::directory::{AliasBook, Directory};
use crate::domain::{DepartureRecord, StationRecord};
use crate::feed::{
    FeedRequest, Fetcher, ParseFailure, Parser, StationContext, bart, caltrain, fleet,
};

/// One station to fetch and parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedJob {
    /// Canonical key or abbreviation; failures are reported against it.
    pub station_key: String,
    /// Name shown to people.
    pub display: String,
    pub request: FeedRequest,
    pub parser: Parser,
    /// Page a person can open when the board comes back empty.
    pub browse_url: String,
}

impl FeedJob {
    fn caltrain(station: &StationRecord) -> Self {
        Self {
            station_key: station.key.clone(),
            display: station.display_name().to_string(),
            request: caltrain::page_request(station),
            parser: Parser::CaltrainHtml,
            browse_url: station.url.clone(),
        }
    }

    /// Fetch through the form-based site instead of the station page.
    pub fn via_form(mut self, config: &FeedConfig) -> Self {
        if self.parser == Parser::CaltrainHtml {
            self.request = caltrain::post_request(config, &self.display);
        }
        self
    }
}

/// A slot in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Planned {
    Fetch(FeedJob),
    /// A token the directory did not recognise.
    Unresolved(String),
}

/// Plan Caltrain pages for user tokens.
///
/// Group names are expanded first, then each token is looked up. Unknown
/// tokens keep their slot as [`Planned::Unresolved`].
pub fn plan_caltrain<S: AsRef<str>>(
    directory: &Directory,
    aliases: &AliasBook,
    tokens: &[S],
) -> Vec<Planned> {
    let tokens = aliases.expand_all(tokens);
    directory
        .find_stations(&tokens)
        .into_iter()
        .zip(tokens)
        .map(|(found, token)| match found {
            Some(station) => Planned::Fetch(FeedJob::caltrain(station)),
            None => Planned::Unresolved(token),
        })
        .collect()
}

/// Plan every directory station, in build order.
pub fn plan_caltrain_all(directory: &Directory) -> Vec<Planned> {
    directory
        .iter()
        .map(|station| Planned::Fetch(FeedJob::caltrain(station)))
        .collect()
}

fn bart_job(config: &FeedConfig, abbr: &str, request: FeedRequest, parser: Parser) -> Planned {
    let abbr = abbr.trim().to_uppercase();
    if abbr.is_empty() {
        return Planned::Unresolved(String::new());
    }
    Planned::Fetch(FeedJob {
        station_key: abbr.clone(),
        display: abbr.clone(),
        request,
        parser,
        browse_url: fleet::browse_url(config, &abbr),
    })
}

/// Plan BART estimates for station abbreviations (or [`bart::ALL_STATIONS`]).
pub fn plan_bart<S: AsRef<str>>(config: &FeedConfig, abbrs: &[S]) -> Vec<Planned> {
    abbrs
        .iter()
        .map(|abbr| {
            let abbr = abbr.as_ref();
            bart_job(config, abbr, bart::etd_request(config, abbr.trim()), Parser::BartJson)
        })
        .collect()
}

/// Plan fleet-lookup pages for station abbreviations.
pub fn plan_fleet<S: AsRef<str>>(config: &FeedConfig, abbrs: &[S]) -> Vec<Planned> {
    abbrs
        .iter()
        .map(|abbr| {
            let abbr = abbr.as_ref();
            let request = fleet::route_request(config, &abbr.trim().to_uppercase());
            bart_job(config, abbr, request, Parser::FleetHtml)
        })
        .collect()
}

/// Shared flag that stops new fetches once set.
///
/// Work already in flight finishes and keeps its result.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened at one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StationOutcome {
    /// Parsed successfully; may be empty.
    Departures(Vec<DepartureRecord>),
    Failed(#[serde(serialize_with = "failure_reason")] ParseFailure),
    /// The token did not name a station.
    Unresolved(String),
    /// Skipped because the run was cancelled before it started.
    Cancelled,
}

fn failure_reason<S: serde::Serializer>(failure: &ParseFailure, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&failure.reason())
}

impl StationOutcome {
    /// Departures, if the station was parsed.
    pub fn records(&self) -> &[DepartureRecord] {
        match self {
            StationOutcome::Departures(records) => records,
            _ => &[],
        }
    }
}

/// Result for one planned slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationReport {
    pub station_key: String,
    pub display: String,
    pub browse_url: Option<String>,
    /// URL that was actually requested.
    pub request_url: Option<String>,
    pub outcome: StationOutcome,
}

impl StationReport {
    fn unresolved(token: String) -> Self {
        Self {
            station_key: token.clone(),
            display: token.clone(),
            browse_url: None,
            request_url: None,
            outcome: StationOutcome::Unresolved(token),
        }
    }

    fn for_job(job: &FeedJob, outcome: StationOutcome) -> Self {
        Self {
            station_key: job.station_key.clone(),
            display: job.display.clone(),
            browse_url: Some(job.browse_url.clone()),
            request_url: Some(job.request.url.clone()),
            outcome,
        }
    }

    /// True when the station answered but had nothing to report.
    pub fn is_empty_board(&self) -> bool {
        matches!(&self.outcome, StationOutcome::Departures(records) if records.is_empty())
    }
}

async fn run_job<F: Fetcher>(
    fetcher: &F,
    job: &FeedJob,
    semaphore: &Semaphore,
    cancel: &CancelFlag,
) -> StationOutcome {
    if cancel.is_cancelled() {
        return StationOutcome::Cancelled;
    }
    let Ok(_permit) = semaphore.acquire().await else {
        return StationOutcome::Cancelled;
    };
    if cancel.is_cancelled() {
        return StationOutcome::Cancelled;
    }

    let payload = match fetcher.fetch(&job.request).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(station = %job.station_key, url = %e.url, error = %e.cause, "fetch failed");
            return StationOutcome::Failed(ParseFailure::new(job.station_key.clone(), e));
        }
    };

    let ctx = StationContext::current(job.station_key.clone(), job.display.clone());
    match job.parser.parse_payload(&payload, &ctx) {
        Ok(records) => {
            debug!(station = %job.station_key, count = records.len(), "parsed departures");
            StationOutcome::Departures(records)
        }
        Err(failure) => {
            warn!(station = %job.station_key, reason = %failure.reason(), "parse failed");
            StationOutcome::Failed(failure)
        }
    }
}

/// Fetch and parse every planned slot.
///
/// Returns exactly one report per slot, in plan order.
pub async fn run<F: Fetcher>(
    fetcher: &F,
    plan: Vec<Planned>,
    max_concurrent: usize,
    cancel: &CancelFlag,
) -> Vec<StationReport> {
    let semaphore = Semaphore::new(max_concurrent.max(1));
    info!(stations = plan.len(), max_concurrent, "fetching departure boards");

    let semaphore = &semaphore;
    let futures: Vec<_> = plan
        .into_iter()
        .map(|planned| async move {
            match planned {
                Planned::Unresolved(token) => StationReport::unresolved(token),
                Planned::Fetch(job) => {
                    let outcome = run_job(fetcher, &job, semaphore, cancel).await;
                    StationReport::for_job(&job, outcome)
                }
            }
        })
        .collect();

    join_all(futures).await
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod tests;
