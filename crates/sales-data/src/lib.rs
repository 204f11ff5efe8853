//! Data layer for the sales dashboard.
//!
//! Loads the sales source into a dataset, filters it by period and store,
//! aggregates the filtered views and assembles the dashboard snapshot.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use sales_core as core;
