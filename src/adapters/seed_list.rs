use crate::domain::model::canonical_domain;
use crate::utils::error::Result;
use std::path::Path;

/// 讀取以換行分隔的 seed domain 清單。檔案不存在不是錯誤，回傳 `None`
pub fn load_seed_list(path: impl AsRef<Path>) -> Result<Option<Vec<String>>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No seed list at {}, similar-startups source omitted", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let seeds = parse_seed_list(&content);
    tracing::info!("📄 Loaded {} seed domains from {}", seeds.len(), path.display());
    Ok(Some(seeds))
}

/// 空行與 `#` 開頭的註解行會被略過
pub fn parse_seed_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(canonical_domain)
        .collect()
}
