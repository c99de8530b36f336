use crate::adapters::http::RadarApiClient;
use crate::domain::model::{canonical_domain, DiscoveryEndpoint};
use crate::domain::ports::{DomainSource, DomainStream};
use crate::utils::error::{RadarError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
struct DiscoveryLink {
    to_domain: String,
}

#[derive(Debug, Deserialize)]
struct SimilarDomain {
    domain: String,
}

/// One of the named discovery feeds, `GET {base}/discovery/{endpoint}`.
#[derive(Debug, Clone)]
pub struct DiscoveryEndpointSource {
    endpoint: DiscoveryEndpoint,
    client: RadarApiClient,
    name: String,
}

impl DiscoveryEndpointSource {
    /// 未知的 endpoint 在任何網路請求前就回傳 `InvalidConfiguration`
    pub fn new(endpoint: &str, client: RadarApiClient) -> Result<Self> {
        let endpoint: DiscoveryEndpoint = endpoint.parse()?;
        Ok(Self::for_endpoint(endpoint, client))
    }

    pub fn for_endpoint(endpoint: DiscoveryEndpoint, client: RadarApiClient) -> Self {
        Self {
            endpoint,
            client,
            name: format!("discovery:{}", endpoint),
        }
    }
}

impl DomainSource for DiscoveryEndpointSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_domains(&self) -> DomainStream<'_> {
        stream::once(async move {
            let links: Vec<DiscoveryLink> = self
                .client
                .get_json(&["discovery", self.endpoint.as_str()], &self.name)
                .await?;
            tracing::debug!("{} returned {} links", self.name, links.len());
            Ok::<_, RadarError>(stream::iter(
                links
                    .into_iter()
                    .map(|link| Ok::<_, RadarError>(link.to_domain)),
            ))
        })
        .try_flatten()
        .boxed()
    }
}

/// Finds startups similar to a set of seed domains, one request per seed.
#[derive(Debug, Clone)]
pub struct SimilarStartupsSource {
    seeds: BTreeSet<String>,
    client: RadarApiClient,
    concurrency: usize,
    name: String,
}

impl SimilarStartupsSource {
    pub fn new<I, S>(seeds: I, client: RadarApiClient) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let seeds: BTreeSet<String> = seeds
            .into_iter()
            .filter_map(|seed| canonical_domain(seed.as_ref()))
            .collect();
        let name = format!("similar-startups({} seeds)", seeds.len());

        Self {
            seeds,
            client,
            concurrency: 1,
            name,
        }
    }

    /// 同時進行的 seed 查詢數量，最少 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn seeds(&self) -> &BTreeSet<String> {
        &self.seeds
    }
}

impl DomainSource for SimilarStartupsSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_domains(&self) -> DomainStream<'_> {
        stream::iter(self.seeds.iter())
            .map(move |seed| async move {
                let similar: Vec<SimilarDomain> = self
                    .client
                    .get_json(&["web", "domains", seed.as_str(), "similar"], &self.name)
                    .await?;
                tracing::debug!("{} similar domains for seed {}", similar.len(), seed);
                Ok::<_, RadarError>(stream::iter(
                    similar
                        .into_iter()
                        .map(|d| Ok::<_, RadarError>(d.domain)),
                ))
            })
            .buffer_unordered(self.concurrency)
            .try_flatten()
            .boxed()
    }
}
