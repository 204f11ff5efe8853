//! Shared building blocks for the sales dashboard.
//!
//! Holds the record and dataset model, the fixed calendar tables used to
//! enrich each record, descriptive statistics, number formatting, the error
//! type, and the command-line settings.

pub mod calendar;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod stats;
