use crate::config::toml_config::AppConfig;
use crate::core::SourceFailurePolicy;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "startup-deals")]
#[command(about = "Discover new startup domains and record them as deals")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding the dated deal snapshots
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Newline-delimited seed domains for the similar-startups source
    #[arg(long)]
    pub similar_file: Option<String>,

    /// Discovery endpoints to query (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub endpoints: Option<Vec<String>>,

    /// What to do when a source fails: abort or skip
    #[arg(long)]
    pub on_source_failure: Option<SourceFailurePolicy>,

    /// Fetch and classify, but do not write a snapshot
    #[arg(long)]
    pub dry_run: bool,

    /// Log CPU and memory usage per phase
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.storage.output_directory = dir.clone();
        }
        if let Some(file) = &self.similar_file {
            config.sources.similar_seed_file = Some(file.clone());
        }
        if let Some(endpoints) = &self.endpoints {
            config.sources.discovery_endpoints = endpoints
                .iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }
        if let Some(policy) = self.on_source_failure {
            config.sources.on_failure = policy;
        }
    }
}
