//! # chronoshift
//!
//! Ergonomic timestamps for humans.
//!
//! Chronoshift wraps chrono's instants in a small convenience surface:
//! construct a [`Timestamp`], shift it by duration strings like `"2h 2m"` or
//! `"-1.5h"`, re-render the same instant in another time zone, round it down
//! or up to a time unit, and phrase it relative to now ("in an hour",
//! "3 days ago").
//!
//! ## Modules
//!
//! - [`timestamp`] — The zone-aware [`Timestamp`] type and its operations
//! - [`duration`] — Signed [`Duration`] values and the duration-string grammar
//! - [`zone`] — [`Zone`] name resolution and per-instant offset/name queries
//! - [`error`] — Error types

pub mod duration;
pub mod error;
pub mod timestamp;
pub mod zone;

pub use duration::{Amount, Duration};
pub use error::ShiftError;
pub use timestamp::Timestamp;
pub use zone::Zone;
