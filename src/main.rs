use clap::Parser;
use startup_deals::app::build_workflow;
use startup_deals::config::API_KEY_ENV;
use startup_deals::domain::model::SyncOutcome;
use startup_deals::utils::error::ErrorSeverity;
use startup_deals::utils::{logger, validation::Validate};
use startup_deals::{AppConfig, CliArgs, CommitOutcome, RunReport, WorkflowEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting startup-deals");

    // 載入配置
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match AppConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);
    let config = config.with_api_key_fallback(std::env::var(API_KEY_ENV).ok());

    if args.verbose {
        tracing::debug!("Storage: {:?}, sources: {:?}", config.storage, config.sources);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let workflow = match build_workflow(&config) {
        Ok(workflow) => workflow,
        Err(e) => {
            tracing::error!("❌ Workflow setup failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written to the store");
    }

    let mut engine = WorkflowEngine::new_with_monitoring(workflow, args.monitor)
        .with_dry_run(args.dry_run);

    match engine.run().await {
        Ok(report) => print_summary(&report),
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼，任何錯誤都不會回傳 0
            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("📋 Run Summary:");
    println!("  Fetched: {} ({} unique)", report.fetched, report.candidates.len());
    if !report.filtered.is_empty() {
        println!("  Filtered: {}", report.filtered.len());
    }
    println!("  Known: {}", report.known.len());
    println!("  New: {}", report.new.len());
    if !report.skipped_sources.is_empty() {
        println!("  ⚠️ Skipped sources: {}", report.skipped_sources.join(", "));
    }

    match &report.commit {
        CommitOutcome::Synced(SyncOutcome::Committed { location, deals }) => {
            println!("✅ Recorded {} new deals", deals);
            println!("📁 Output saved to: {}", location);
        }
        CommitOutcome::Synced(SyncOutcome::NothingToCommit) => {
            println!("✅ No new deals, nothing written");
        }
        CommitOutcome::DryRun { discarded } => {
            println!("🔍 Dry run: {} new deals NOT persisted", discarded);
        }
    }
}
