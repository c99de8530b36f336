use crate::utils::error::{RadarError, Result};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// 一筆被追蹤的潛在投資標的
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub domain: String,
    pub title: Option<String>,
    pub created_at: NaiveDate,
    /// 只能記錄不能更新的後端，等同 `created_at`
    pub last_activity: NaiveDate,
    /// 這筆 deal 來自哪個快照（檔名、CRM id 等）
    pub origin: String,
}

impl Deal {
    /// 檔案型快照只知道建立日期
    pub fn from_snapshot(
        domain: impl Into<String>,
        title: Option<String>,
        snapshot_date: NaiveDate,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            title,
            created_at: snapshot_date,
            last_activity: snapshot_date,
            origin: origin.into(),
        }
    }
}

/// 已暫存但尚未 sync 的 deal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeal {
    pub title: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Committed { location: String, deals: usize },
    NothingToCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiscoveryEndpoint {
    InThePress,
    LinkedFromSources,
    AcademicLinks,
    Firehose,
}

impl DiscoveryEndpoint {
    pub const ALL: [DiscoveryEndpoint; 4] = [
        DiscoveryEndpoint::InThePress,
        DiscoveryEndpoint::LinkedFromSources,
        DiscoveryEndpoint::AcademicLinks,
        DiscoveryEndpoint::Firehose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryEndpoint::InThePress => "in-the-press",
            DiscoveryEndpoint::LinkedFromSources => "linked-from-sources",
            DiscoveryEndpoint::AcademicLinks => "academic-links",
            DiscoveryEndpoint::Firehose => "firehose",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|e| e.as_str()).collect()
    }
}

impl fmt::Display for DiscoveryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoveryEndpoint {
    type Err = RadarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == s)
            .ok_or_else(|| {
                RadarError::invalid_config(
                    "discovery_endpoint",
                    s,
                    format!("Unknown endpoint. Valid endpoints: {}", Self::names().join(", ")),
                )
            })
    }
}

/// 來源不保證格式一致：去除空白與結尾的點、轉小寫，空字串回傳 `None`
pub fn canonical_domain(raw: &str) -> Option<String> {
    let domain = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_domain() {
        assert_eq!(canonical_domain("  Example.COM. "), Some("example.com".to_string()));
        assert_eq!(canonical_domain("a.com"), Some("a.com".to_string()));
        assert_eq!(canonical_domain("   "), None);
        assert_eq!(canonical_domain(""), None);
    }

    #[test]
    fn test_discovery_endpoint_parse() {
        for endpoint in DiscoveryEndpoint::ALL {
            assert_eq!(endpoint.as_str().parse::<DiscoveryEndpoint>().unwrap(), endpoint);
        }

        let err = "bogus-endpoint".parse::<DiscoveryEndpoint>().unwrap_err();
        assert!(matches!(err, RadarError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("bogus-endpoint"));
    }

    #[test]
    fn test_snapshot_deal_activity_defaults_to_creation() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let deal = Deal::from_snapshot("a.com", None, date, "2024-03-01.csv");
        assert_eq!(deal.created_at, deal.last_activity);
    }
}
