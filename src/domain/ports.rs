use crate::domain::model::{Deal, SyncOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::stream::{BoxStream, TryStreamExt};
use std::collections::BTreeSet;

/// 單次使用的 domain 串流
pub type DomainStream<'a> = BoxStream<'a, Result<String>>;

/// A single external origin of candidate domains.
///
/// `generate_domains` is single-pass: every call issues fresh network requests
/// instead of replaying a cached result.
#[async_trait]
pub trait DomainSource: Send + Sync {
    fn name(&self) -> &str;

    fn generate_domains(&self) -> DomainStream<'_>;

    async fn get_domains(&self) -> Result<Vec<String>> {
        self.generate_domains().try_collect().await
    }
}

/// A place where deals are stored, e.g. a CRM or a directory of exports.
///
/// `add_deal` only stages; nothing is durable until `sync` succeeds.
#[async_trait]
pub trait DealStorage: Send + Sync {
    /// 完全比對，空結果代表從未見過
    async fn find_deals_by_domain(&self, domain: &str) -> Result<Vec<Deal>>;

    fn add_deal(&mut self, title: &str, domain: &str) -> Result<()>;

    async fn add_note(&mut self, deal: &Deal, note: &str) -> Result<()>;

    async fn sync(&mut self) -> Result<SyncOutcome>;

    /// 丟棄暫存內容並回傳筆數
    fn discard_pending(&mut self) -> usize;
}

pub trait DomainFilter: Send + Sync {
    fn is_filtered(&self, _domain: &str) -> bool {
        false
    }

    /// 移除被過濾的 domain，回傳被移除的項目
    fn apply(&self, domains: &mut BTreeSet<String>) -> Vec<String> {
        let removed: Vec<String> = domains
            .iter()
            .filter(|domain| self.is_filtered(domain))
            .cloned()
            .collect();
        for domain in &removed {
            domains.remove(domain);
        }
        removed
    }
}
