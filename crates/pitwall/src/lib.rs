//! Turn-based racing season engine: roster, calendar, session simulation and
//! standings behind an axum router.

pub mod config;
pub mod error;
pub mod season;
pub mod telemetry;
