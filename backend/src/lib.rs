//! # Shift Roster
//!
//! Scheduling core for staff shift rosters.
//!
//! Operators define shifts (label, start and end time of day, color), assign
//! users to them over a date range, optionally repeating weekly, and view the
//! result on a day, week or month timeline. Shifts that end before they start
//! run overnight and are drawn as two fragments.
//!
//! ## Architecture
//!
//! - [`models`]: shifts, assignments, series, scopes and time of day
//! - [`db`]: repository traits, the in-memory and Postgres backends, config
//! - [`services`]: expansion, scoped mutation, timeline layout, relocation
//! - [`http`]: axum REST API over the services
//!
//! Services are generic over the repository traits, so everything below the
//! HTTP layer runs unchanged against [`db::LocalRepository`].

// RepositoryError carries an ErrorContext for diagnostics.
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
