use crate::domain::model::canonical_domain;
use crate::domain::ports::DomainFilter;
use std::collections::HashSet;

/// Drops exact domains and whole domain suffixes (e.g. `github.io`).
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    domains: HashSet<String>,
    suffixes: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<D, S>(domains: D, suffixes: S) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .filter_map(|d| canonical_domain(d.as_ref()))
                .collect(),
            suffixes: suffixes
                .into_iter()
                .filter_map(|s| canonical_domain(s.as_ref().trim_start_matches('.')))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.suffixes.is_empty()
    }
}

impl DomainFilter for ExclusionFilter {
    fn is_filtered(&self, domain: &str) -> bool {
        if self.domains.contains(domain) {
            return true;
        }
        // 只比對完整的 label，`notgithub.io` 不算 `github.io` 的子網域
        self.suffixes.iter().any(|suffix| {
            domain == suffix
                || domain
                    .strip_suffix(suffix.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }
}
