pub mod workflow;

pub use crate::domain::model::{Deal, SyncOutcome};
pub use crate::domain::ports::{DealStorage, DomainFilter, DomainSource};
pub use crate::utils::error::Result;
pub use workflow::{CommitOutcome, RunReport, SourceFailurePolicy, Workflow, WorkflowEngine};
