//! Real-time departure boards for Caltrain and BART.
//!
//! Station tokens are resolved against a static [`directory::Directory`],
//! upstream pages and APIs are fetched through a [`feed::Fetcher`], and every
//! format is parsed into the same [`domain::DepartureRecord`]s. The
//! [`board`] module ties these together for a list of stations.

pub mod board;
pub mod config;
pub mod directory;
pub mod domain;
pub mod feed;
pub mod render;
