//! Survey window and status classification for ship and crew regulatory items.
//!
//! The engine in [`surveys`] is a pure function of item data and an explicit
//! evaluation date. The remaining modules carry the ambient concerns shared with
//! the reporting service: configuration, telemetry bootstrap, and the
//! application error type.

pub mod config;
pub mod error;
pub mod surveys;
pub mod telemetry;
