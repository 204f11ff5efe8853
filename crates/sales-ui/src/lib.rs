//! Terminal UI layer for the sales dashboard.
//!
//! Provides themes, bar/header/KPI components, the summary, comparison and
//! explorer tab views, and the main application event loop built on top of
//! [`ratatui`].

pub mod app;
pub mod comparison_view;
pub mod components;
pub mod explorer_view;
pub mod summary_view;
pub mod themes;

pub use sales_core as core;
