//! Upstream feeds: requests, fetching and parsing.
//!
//! Each source has its own module with request builders and a parser that
//! turns a raw payload into [`DepartureRecord`](crate::domain::DepartureRecord)s.
//! [`Parser`] picks between them by source.

pub mod bart;
pub mod caltrain;
mod client;
mod error;
mod fixture;
pub mod fleet;
mod html;
mod parser;

pub use client::{FeedClient, FeedRequest, Fetcher, Method, RawPayload};
pub use error::{FeedError, ParseFailure, TransportError};
pub use fixture::FixtureFetcher;
pub use parser::{Parser, StationContext, UnknownParser};
