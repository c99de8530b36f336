use crate::adapters::csv_storage::CsvDealStorage;
use crate::adapters::filter::ExclusionFilter;
use crate::adapters::http::RadarApiClient;
use crate::adapters::seed_list::load_seed_list;
use crate::adapters::sources::{DiscoveryEndpointSource, SimilarStartupsSource};
use crate::config::AppConfig;
use crate::core::Workflow;
use crate::utils::error::{RadarError, Result};

/// 依設定組出 CSV 工作流程：所有 discovery endpoint、可選的 similar-startups 來源與過濾器
pub fn build_workflow(config: &AppConfig) -> Result<Workflow<CsvDealStorage>> {
    let storage = CsvDealStorage::new(&config.storage.output_directory)?;
    let mut workflow = Workflow::new(storage).with_failure_policy(config.sources.on_failure);

    let endpoints = config.endpoints()?;

    let mut seeds = config.sources.similar_seeds.clone();
    if let Some(seed_file) = &config.sources.similar_seed_file {
        if let Some(from_file) = load_seed_list(seed_file)? {
            seeds.extend(from_file);
        }
    }

    if !endpoints.is_empty() || !seeds.is_empty() {
        let api_key = config
            .api
            .api_key
            .clone()
            .ok_or_else(|| RadarError::MissingConfig {
                field: "api.api_key".to_string(),
            })?;
        let client = RadarApiClient::new(&config.api.base_url, api_key, config.timeout())?;

        for endpoint in endpoints {
            workflow = workflow
                .with_source(DiscoveryEndpointSource::for_endpoint(endpoint, client.clone()));
        }

        if !seeds.is_empty() {
            let source = SimilarStartupsSource::new(seeds, client)
                .with_concurrency(config.api.concurrent_requests);
            tracing::info!("Similar-startups source with {} seeds", source.seeds().len());
            workflow = workflow.with_source(source);
        }
    }

    let filter = ExclusionFilter::new(
        &config.filter.excluded_domains,
        &config.filter.excluded_suffixes,
    );
    if !filter.is_empty() {
        workflow = workflow.with_filter(filter);
    }

    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.api.api_key = Some("test-key".to_string());
        config.storage.output_directory = dir.path().join("out").display().to_string();
        config.sources.similar_seed_file =
            Some(dir.path().join("similar.txt").display().to_string());
        config
    }

    #[test]
    fn test_default_workflow_uses_all_endpoints() {
        let dir = TempDir::new().unwrap();
        let workflow = build_workflow(&config_in(&dir)).unwrap();

        let names: Vec<&str> = workflow.sources.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "discovery:in-the-press",
                "discovery:linked-from-sources",
                "discovery:academic-links",
                "discovery:firehose",
            ]
        );
        assert!(workflow.filters.is_empty());
        assert!(dir.path().join("out").is_dir());
    }

    #[test]
    fn test_seed_file_adds_similar_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("similar.txt"), "karllorey.com\n\n").unwrap();
        let mut config = config_in(&dir);
        config.sources.discovery_endpoints.clear();
        config.filter.excluded_suffixes = vec!["github.io".to_string()];

        let workflow = build_workflow(&config).unwrap();

        assert_eq!(workflow.sources.len(), 1);
        assert_eq!(workflow.sources[0].name(), "similar-startups(1 seeds)");
        assert_eq!(workflow.filters.len(), 1);
    }

    #[test]
    fn test_unknown_endpoint_fails_setup() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.sources.discovery_endpoints = vec!["bogus-endpoint".to_string()];

        let err = build_workflow(&config).err().unwrap();
        assert!(matches!(err, RadarError::InvalidConfiguration { .. }));
    }
}
