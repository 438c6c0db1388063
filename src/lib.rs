//! Flag delays, risks and material shortages in construction site report text.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod nlp;
