use crate::domain::model::{canonical_domain, SyncOutcome};
use crate::domain::ports::{DealStorage, DomainFilter, DomainSource};
use crate::utils::error::{RadarError, Result};
use crate::utils::monitor::SystemMonitor;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 單一來源失敗時的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFailurePolicy {
    /// 任何來源失敗就中止整個執行
    #[default]
    Abort,
    /// 記錄警告、略過該來源並繼續
    Skip,
}

impl FromStr for SourceFailurePolicy {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(RadarError::invalid_config(
                "sources.on_failure",
                other,
                "Expected 'abort' or 'skip'",
            )),
        }
    }
}

impl fmt::Display for SourceFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("abort"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// Static binding of domain sources, filters and one deal store.
pub struct Workflow<S: DealStorage> {
    pub sources: Vec<Box<dyn DomainSource>>,
    pub storage: S,
    pub filters: Vec<Box<dyn DomainFilter>>,
    pub failure_policy: SourceFailurePolicy,
}

impl<S: DealStorage> Workflow<S> {
    pub fn new(storage: S) -> Self {
        Self {
            sources: Vec::new(),
            storage,
            filters: Vec::new(),
            failure_policy: SourceFailurePolicy::default(),
        }
    }

    pub fn with_source(mut self, source: impl DomainSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_filter(mut self, filter: impl DomainFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn with_failure_policy(mut self, policy: SourceFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Synced(SyncOutcome),
    DryRun { discarded: usize },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// 所有來源回傳的 domain 數量（去重前）
    pub fetched: usize,
    pub candidates: BTreeSet<String>,
    pub filtered: Vec<String>,
    pub known: Vec<String>,
    pub new: Vec<String>,
    pub skipped_sources: Vec<String>,
    pub commit: CommitOutcome,
}

impl RunReport {
    pub fn persisted(&self) -> bool {
        matches!(
            self.commit,
            CommitOutcome::Synced(SyncOutcome::Committed { .. })
        )
    }
}

/// Runs the fetch, classify, stage and commit cycle once over a [`Workflow`].
pub struct WorkflowEngine<S: DealStorage> {
    workflow: Workflow<S>,
    dry_run: bool,
    monitor: SystemMonitor,
}

impl<S: DealStorage> WorkflowEngine<S> {
    pub fn new(workflow: Workflow<S>) -> Self {
        Self {
            workflow,
            dry_run: false,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(workflow: Workflow<S>, monitor_enabled: bool) -> Self {
        Self {
            workflow,
            dry_run: false,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn storage(&self) -> &S {
        &self.workflow.storage
    }

    pub async fn run(&mut self) -> Result<RunReport> {
        tracing::info!(
            "🚀 Starting deal discovery ({} sources, on_failure={})",
            self.workflow.sources.len(),
            self.workflow.failure_policy
        );
        self.monitor.log_stats("Start");

        // Fetch
        let (fetched, mut candidates, skipped_sources) = self.fetch_candidates().await?;
        tracing::info!(
            "📥 Fetched {} domains, {} unique candidates",
            fetched,
            candidates.len()
        );
        self.monitor.log_stats("Fetch");

        let filtered = self.apply_filters(&mut candidates);

        // Classify
        let (known, new) = self.classify(&candidates).await?;
        tracing::info!("🔎 {} known, {} new", known.len(), new.len());
        self.monitor.log_stats("Classify");

        // Stage
        for domain in &new {
            self.workflow.storage.add_deal(domain, domain)?;
        }

        // Commit
        let commit = if self.dry_run {
            let discarded = self.workflow.storage.discard_pending();
            tracing::warn!(
                "🔍 Dry run: {} staged deals discarded, no data was persisted",
                discarded
            );
            CommitOutcome::DryRun { discarded }
        } else {
            CommitOutcome::Synced(self.workflow.storage.sync().await?)
        };
        self.monitor.log_stats("Commit");

        Ok(RunReport {
            fetched,
            candidates,
            filtered,
            known,
            new,
            skipped_sources,
            commit,
        })
    }

    /// 所有來源並行抓取；全部回報後才會進入分類階段
    async fn fetch_candidates(&self) -> Result<(usize, BTreeSet<String>, Vec<String>)> {
        let sources = &self.workflow.sources;
        for source in sources {
            tracing::info!("Fetching source: {}", source.name());
        }

        let results = join_all(sources.iter().map(|source| source.get_domains())).await;

        let mut fetched = 0;
        let mut candidates = BTreeSet::new();
        let mut skipped = Vec::new();

        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(domains) => {
                    tracing::debug!("{} returned {} domains", source.name(), domains.len());
                    fetched += domains.len();
                    candidates.extend(domains.iter().filter_map(|d| canonical_domain(d)));
                }
                Err(e) => match self.workflow.failure_policy {
                    SourceFailurePolicy::Abort => {
                        tracing::error!("❌ Source {} failed, aborting run: {}", source.name(), e);
                        return Err(e);
                    }
                    SourceFailurePolicy::Skip => {
                        tracing::warn!("⚠️ Skipping source {}: {}", source.name(), e);
                        skipped.push(source.name().to_string());
                    }
                },
            }
        }

        Ok((fetched, candidates, skipped))
    }

    fn apply_filters(&self, candidates: &mut BTreeSet<String>) -> Vec<String> {
        let mut filtered = Vec::new();
        for filter in &self.workflow.filters {
            filtered.extend(filter.apply(candidates));
        }
        if !filtered.is_empty() {
            tracing::info!("🧹 Filtered out {} domains", filtered.len());
        }
        filtered
    }

    async fn classify(&self, candidates: &BTreeSet<String>) -> Result<(Vec<String>, Vec<String>)> {
        let mut known = Vec::new();
        let mut new = Vec::new();

        for domain in candidates {
            let deals = self.workflow.storage.find_deals_by_domain(domain).await?;
            if deals.is_empty() {
                tracing::info!("Deal is new: {}", domain);
                new.push(domain.clone());
            } else {
                tracing::info!("Deal already exists: {} ({:?})", domain, deals);
                known.push(domain.clone());
            }
        }

        Ok((known, new))
    }
}
