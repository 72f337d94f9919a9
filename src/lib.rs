//! Calendar grids and date-ordered schedule lists for club training sessions.

pub mod calendar;
pub mod config;
pub mod db;
pub mod locale;
pub mod models;
pub mod report;
pub mod schedule;
