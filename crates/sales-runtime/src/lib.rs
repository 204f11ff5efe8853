//! Runtime layer for the sales dashboard.
//!
//! Turns command-line settings into dashboard filters and keeps one
//! recomputed snapshot per interactive session.

pub mod session;

pub use sales_core as core;
pub use sales_data as data;
