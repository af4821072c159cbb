//! BASWAP API - Time-series API for buoy-based water-quality monitoring
//!
//! The library exposes the aggregation pipeline (date-window filtering,
//! hour/day bucket summaries, gap-aware chart series) over in-memory
//! observation tables, plus the HTTP layer serving it.

pub mod common;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod stations;
pub mod table;
