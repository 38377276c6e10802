//! # Khatma
//!
//! Quran reading progress engine.
//!
//! Records reading sessions and derives everything else from them: khatma
//! (complete read-through) counts, a per-juz completion map, daily streaks,
//! a rolling consistency score, and goal progress. Derived values are never
//! stored; every query recomputes them from the logs, so the log table is
//! the single source of truth.
//!
//! Module map:
//!
//! - [`models`]: ids, reading logs, goals, statistics, and the juz table
//! - [`services`]: pure functions that turn logs into progress and streaks
//! - [`db`]: repository traits, the in-memory and Postgres backends, and
//!   service entry points that combine storage with derivation
//! - [`http`]: optional Axum server exposing the service layer as JSON
//!
//! Storage selection is feature-driven. `local-repo` (default) keeps all
//! rows in process memory. `postgres-repo` swaps in Diesel-backed
//! persistence with pooling and retry handling. `http-server` gates the
//! whole HTTP surface so the engine can be embedded without it.

// RepositoryError carries owned context fields and is returned pervasively.
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
