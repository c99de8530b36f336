pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;
pub use crate::config::AppConfig;

pub use crate::adapters::{
    csv_storage::CsvDealStorage,
    http::RadarApiClient,
    sources::{DiscoveryEndpointSource, SimilarStartupsSource},
};
pub use crate::core::workflow::{
    CommitOutcome, RunReport, SourceFailurePolicy, Workflow, WorkflowEngine,
};
pub use crate::domain::ports::{DealStorage, DomainFilter, DomainSource};
pub use crate::utils::error::{RadarError, Result};
