// src/lib.rs
// vacancy-monitor: watches chat channels for job postings and records
// keyword matches to a spreadsheet, once each, across restarts.

pub mod config;
pub mod cursor;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod matcher;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod sink;
pub mod state;
pub mod types;

pub use crate::config::AppConfig;
pub use crate::pipeline::{IngestionPipeline, PipelineCfg};
pub use crate::report::{ChannelReport, RunReport};
