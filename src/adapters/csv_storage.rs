use crate::domain::model::{canonical_domain, Deal, PendingDeal, SyncOutcome};
use crate::domain::ports::DealStorage;
use crate::utils::error::{RadarError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SNAPSHOT_EXTENSION: &str = "csv";
const SNAPSHOT_DATE_FORMAT: &str = "%Y-%m-%d";

/// CSV export of deals: one dated snapshot file per run.
///
/// Lookups scan every snapshot in the directory. All deals in one snapshot
/// share the snapshot's date as `created_at`.
#[derive(Debug)]
pub struct CsvDealStorage {
    directory: PathBuf,
    pending: Vec<PendingDeal>,
    snapshot_date: Option<NaiveDate>,
}

impl CsvDealStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();

        if !directory.exists() {
            tracing::warn!("Creating export directory: {}", directory.display());
            fs::create_dir_all(&directory)?;
        }

        Ok(Self {
            directory,
            pending: Vec::new(),
            snapshot_date: None,
        })
    }

    /// 固定快照日期，預設使用本地時間的今天
    pub fn with_snapshot_date(mut self, date: NaiveDate) -> Self {
        self.snapshot_date = Some(date);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn pending(&self) -> &[PendingDeal] {
        &self.pending
    }

    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.directory.join(format!(
            "{}.{}",
            date.format(SNAPSHOT_DATE_FORMAT),
            SNAPSHOT_EXTENSION
        ))
    }

    fn today(&self) -> NaiveDate {
        self.snapshot_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// 目錄中所有快照，依檔名排序；隱藏檔與非 csv 檔略過
    pub fn snapshot_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(true, |name| name.starts_with('.'));
            let is_snapshot = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION));

            if path.is_file() && !hidden && is_snapshot {
                files.push(path);
            } else {
                tracing::debug!("Ignoring non-snapshot entry: {}", path.display());
            }
        }
        files.sort();
        Ok(files)
    }

    fn snapshot_date_of(path: &Path) -> Result<NaiveDate> {
        let from_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| NaiveDate::parse_from_str(stem, SNAPSHOT_DATE_FORMAT).ok());

        match from_name {
            Some(date) => Ok(date),
            None => {
                let modified = fs::metadata(path)?.modified()?;
                Ok(DateTime::<Local>::from(modified).date_naive())
            }
        }
    }

    /// 讀取一個快照中的 (domain, title)，domain 已正規化。舊格式開頭可能有一欄沒有名稱的索引
    fn read_snapshot(path: &Path) -> Result<Vec<(String, Option<String>)>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let domain_idx = headers
            .iter()
            .position(|h| h.trim() == "domain")
            .ok_or_else(|| RadarError::CorruptSnapshot {
                path: path.display().to_string(),
                reason: "missing 'domain' column".to_string(),
            })?;
        let title_idx = headers.iter().position(|h| h.trim() == "title");

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let Some(domain) = record.get(domain_idx).and_then(canonical_domain) else {
                continue;
            };
            let title = title_idx
                .and_then(|idx| record.get(idx))
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            rows.push((domain, title));
        }
        Ok(rows)
    }
}

#[async_trait]
impl DealStorage for CsvDealStorage {
    async fn find_deals_by_domain(&self, domain: &str) -> Result<Vec<Deal>> {
        let mut deals = Vec::new();

        for path in self.snapshot_files()? {
            let rows = Self::read_snapshot(&path)?;
            let Some((_, title)) = rows.into_iter().find(|(d, _)| d == domain) else {
                continue;
            };

            let created_at = Self::snapshot_date_of(&path)?;
            let origin = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            deals.push(Deal::from_snapshot(domain, title, created_at, origin));
        }

        Ok(deals)
    }

    fn add_deal(&mut self, title: &str, domain: &str) -> Result<()> {
        self.pending.push(PendingDeal {
            title: title.to_string(),
            domain: domain.to_string(),
        });
        Ok(())
    }

    async fn add_note(&mut self, _deal: &Deal, _note: &str) -> Result<()> {
        Err(RadarError::not_supported("add_note", "csv"))
    }

    async fn sync(&mut self) -> Result<SyncOutcome> {
        let path = self.snapshot_path(self.today());

        if self.pending.is_empty() {
            if path.exists() {
                tracing::warn!(
                    "⚠️ Snapshot for today already exists ({}), this looks like a repeated run",
                    path.display()
                );
            }
            tracing::info!("No new deals staged, no snapshot written");
            return Ok(SyncOutcome::NothingToCommit);
        }

        if path.exists() {
            return Err(RadarError::StoreCollision {
                path: path.display().to_string(),
            });
        }

        // 先寫到同目錄的暫存檔，再以不覆蓋的方式改名
        let mut staging = tempfile::Builder::new()
            .prefix(".snapshot-")
            .suffix(".tmp")
            .tempfile_in(&self.directory)?;
        {
            let mut writer = csv::Writer::from_writer(staging.as_file_mut());
            writer.write_record(["domain", "title"])?;
            for deal in &self.pending {
                writer.write_record([deal.domain.as_str(), deal.title.as_str()])?;
            }
            writer.flush()?;
        }
        staging.as_file().sync_all()?;

        staging.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                RadarError::StoreCollision {
                    path: path.display().to_string(),
                }
            } else {
                RadarError::IoError(e.error)
            }
        })?;

        let deals = self.pending.len();
        self.pending.clear();
        tracing::info!("💾 Wrote {} deals to {}", deals, path.display());

        Ok(SyncOutcome::Committed {
            location: path.display().to_string(),
            deals,
        })
    }

    fn discard_pending(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join(".out");

        let storage = CsvDealStorage::new(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(storage.directory(), dir.as_path());
    }

    #[tokio::test]
    async fn test_add_then_sync_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = CsvDealStorage::new(temp_dir.path())
            .unwrap()
            .with_snapshot_date(date(2024, 5, 2));

        storage.add_deal("b.com", "b.com").unwrap();
        storage.add_deal("c.com", "c.com").unwrap();
        assert!(storage.find_deals_by_domain("b.com").await.unwrap().is_empty());

        let outcome = storage.sync().await.unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Committed {
                location: temp_dir.path().join("2024-05-02.csv").display().to_string(),
                deals: 2,
            }
        );
        assert!(storage.pending().is_empty());

        let fresh = CsvDealStorage::new(temp_dir.path()).unwrap();
        let deals = fresh.find_deals_by_domain("b.com").await.unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].created_at, date(2024, 5, 2));
        assert_eq!(deals[0].last_activity, date(2024, 5, 2));
        assert_eq!(deals[0].title.as_deref(), Some("b.com"));
        assert_eq!(deals[0].origin, "2024-05-02.csv");
    }

    #[tokio::test]
    async fn test_second_sync_same_day_collides() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = CsvDealStorage::new(temp_dir.path())
            .unwrap()
            .with_snapshot_date(date(2024, 5, 2));

        storage.add_deal("a.com", "a.com").unwrap();
        assert_ok!(storage.sync().await);
        let snapshot = temp_dir.path().join("2024-05-02.csv");
        let first_contents = std::fs::read(&snapshot).unwrap();

        storage.add_deal("b.com", "b.com").unwrap();
        let err = assert_err!(storage.sync().await);

        assert!(matches!(err, RadarError::StoreCollision { .. }));
        assert_eq!(std::fs::read(&snapshot).unwrap(), first_contents);
        // 失敗時暫存內容保留
        assert_eq!(storage.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_spans_snapshots() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("2024-01-01.csv"), "domain,title\na.com,a.com\n").unwrap();
        std::fs::write(temp_dir.path().join("2024-02-01.csv"), "domain,title\na.com,\nb.com,b.com\n").unwrap();

        let storage = CsvDealStorage::new(temp_dir.path()).unwrap();

        let deals = storage.find_deals_by_domain("a.com").await.unwrap();
        assert_eq!(deals.len(), 2);
        assert_eq!(deals[0].created_at, date(2024, 1, 1));
        assert_eq!(deals[1].created_at, date(2024, 2, 1));
        assert_eq!(deals[1].title, None);

        assert_eq!(storage.find_deals_by_domain("b.com").await.unwrap().len(), 1);
        assert!(storage.find_deals_by_domain("A.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_exports_with_index_column() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("2023-11-20.csv"),
            ",domain\n0,legacy.com\n1,other.com\n",
        )
        .unwrap();

        let storage = CsvDealStorage::new(temp_dir.path()).unwrap();
        let deals = storage.find_deals_by_domain("other.com").await.unwrap();

        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].created_at, date(2023, 11, 20));
    }

    #[tokio::test]
    async fn test_legacy_rows_are_canonicalised_on_read() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("2023-11-20.csv"),
            ",domain\n0,Startup.IO\n1,\"  spaced.com. \"\n2,\n",
        )
        .unwrap();

        let storage = CsvDealStorage::new(temp_dir.path()).unwrap();

        assert_eq!(storage.find_deals_by_domain("startup.io").await.unwrap().len(), 1);
        assert_eq!(storage.find_deals_by_domain("spaced.com").await.unwrap().len(), 1);
        assert!(storage.find_deals_by_domain("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ignores_hidden_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".snapshot-abc.tmp"), "domain\na.com\n").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "a.com").unwrap();

        let storage = CsvDealStorage::new(temp_dir.path()).unwrap();

        assert!(storage.snapshot_files().unwrap().is_empty());
        assert!(storage.find_deals_by_domain("a.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_without_domain_column_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("2024-01-01.csv"), "name\na.com\n").unwrap();

        let storage = CsvDealStorage::new(temp_dir.path()).unwrap();
        let err = storage.find_deals_by_domain("a.com").await.unwrap_err();

        assert!(matches!(err, RadarError::CorruptSnapshot { .. }));
    }

    #[tokio::test]
    async fn test_empty_sync_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = CsvDealStorage::new(temp_dir.path()).unwrap();

        assert_eq!(storage.sync().await.unwrap(), SyncOutcome::NothingToCommit);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_sync_after_same_day_snapshot_keeps_it() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot = temp_dir.path().join("2024-05-02.csv");
        std::fs::write(&snapshot, "domain,title\na.com,a.com\n").unwrap();
        let mut storage = CsvDealStorage::new(temp_dir.path())
            .unwrap()
            .with_snapshot_date(date(2024, 5, 2));

        assert_eq!(storage.sync().await.unwrap(), SyncOutcome::NothingToCommit);
        assert_eq!(std::fs::read(&snapshot).unwrap(), b"domain,title\na.com,a.com\n");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_discard_pending() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = CsvDealStorage::new(temp_dir.path()).unwrap();
        storage.add_deal("a.com", "a.com").unwrap();
        storage.add_deal("b.com", "b.com").unwrap();

        assert_eq!(storage.discard_pending(), 2);
        assert!(storage.pending().is_empty());
        assert_eq!(storage.sync().await.unwrap(), SyncOutcome::NothingToCommit);
    }

    #[tokio::test]
    async fn test_add_note_not_supported() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = CsvDealStorage::new(temp_dir.path()).unwrap();
        let deal = Deal::from_snapshot("a.com", None, date(2024, 1, 1), "2024-01-01.csv");

        let err = storage.add_note(&deal, "met the founders").await.unwrap_err();
        assert!(matches!(err, RadarError::NotSupported { .. }));
    }
}
