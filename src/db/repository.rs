use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use tokio::sync::OnceCell;
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{ContentItem, HistoryGroup, NewViewEntry, SearchHistoryEntry, ViewHistoryEntry};

use super::schema::{SCHEMA, SEED_CONTENT, VIEW_LABEL_INDEX};

/// Number of keywords returned by search history reads.
pub const SEARCH_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Storage engine for carousel content, search history and view history.
///
/// The SQLite connection is opened on first use and reused for the lifetime
/// of the handle. Share it between managers with an `Arc`.
///
/// Reads never fail: on any storage error they log and return an empty
/// result. The `try_*` variants expose the error for callers that need to
/// tell an empty store from a broken one. Writes always return `Result`.
pub struct Repository {
    location: Location,
    conn: OnceCell<Connection>,
    /// Fixed offset for calendar days; local time at write when unset
    offset: Option<FixedOffset>,
}

impl Repository {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_location(Location::File(db_path.into()))
    }

    pub fn in_memory() -> Self {
        Self::with_location(Location::Memory)
    }

    fn with_location(location: Location) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
            offset: None,
        }
    }

    /// Offset used to derive the calendar day of a view.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    async fn connection(&self) -> Result<&Connection> {
        self.conn
            .get_or_try_init(|| async {
                let conn = match &self.location {
                    Location::File(path) => {
                        tracing::debug!("Opening database at {}", path.display());
                        Connection::open(path).await
                    }
                    Location::Memory => Connection::open_in_memory().await,
                };
                conn.map_err(|e| AppError::StoreUnavailable(e.to_string()))
            })
            .await
    }

    pub async fn is_available(&self) -> bool {
        self.connection().await.is_ok()
    }

    /// Create the schema and seed the content table if it is empty.
    /// Safe to call on every start.
    pub async fn initialize(&self) -> Result<()> {
        let conn = self.connection().await?;

        let seeded = conn
            .call(|conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                tx.execute_batch(SCHEMA)?;

                let count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM content", [], |row| row.get(0))?;
                let mut seeded = 0;
                if count == 0 {
                    let mut stmt = tx.prepare("INSERT INTO content (markdown) VALUES (?1)")?;
                    for markdown in SEED_CONTENT {
                        stmt.execute(params![markdown])?;
                        seeded += 1;
                    }
                }

                tx.commit()?;
                Ok(seeded)
            })
            .await?;

        if seeded > 0 {
            tracing::debug!("Seeded {} content items", seeded);
        }

        // Rows written before the index existed may repeat a label; the
        // upsert transaction still keeps new views unique without it.
        let indexed = conn
            .call(|conn| {
                conn.execute_batch(VIEW_LABEL_INDEX)?;
                Ok(())
            })
            .await;
        if let Err(e) = indexed {
            tracing::warn!("Could not create unique view history label index: {}", e);
        }
        tracing::info!("Database initialized");
        Ok(())
    }

    // Content

    pub async fn fetch_all_content(&self) -> Vec<ContentItem> {
        self.try_fetch_all_content()
            .await
            .unwrap_or_else(|e| degraded("content", e))
    }

    pub async fn try_fetch_all_content(&self) -> Result<Vec<ContentItem>> {
        let items = self
            .connection()
            .await?
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT id, markdown FROM content ORDER BY id")?;
                let items = stmt
                    .query_map([], content_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    // Search history

    pub async fn fetch_search_history(&self) -> Vec<SearchHistoryEntry> {
        self.try_fetch_search_history()
            .await
            .unwrap_or_else(|e| degraded("search history", e))
    }

    pub async fn try_fetch_search_history(&self) -> Result<Vec<SearchHistoryEntry>> {
        let limit = SEARCH_HISTORY_LIMIT as i64;
        let entries = self
            .connection()
            .await?
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, keyword, timestamp FROM search_history ORDER BY timestamp DESC, id DESC LIMIT ?1",
                )?;
                let entries = stmt
                    .query_map(params![limit], search_entry_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await?;
        Ok(entries)
    }

    pub async fn upsert_search_keyword(&self, keyword: &str) -> Result<()> {
        self.upsert_search_keyword_at(keyword, Utc::now()).await
    }

    pub async fn upsert_search_keyword_at(&self, keyword: &str, at: DateTime<Utc>) -> Result<()> {
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            return Err(AppError::InvalidInput("search keyword is empty".to_string()));
        }
        let timestamp = at.timestamp_millis();

        self.connection()
            .await?
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO search_history (keyword, timestamp)
                       VALUES (?1, ?2)
                       ON CONFLICT(keyword) DO UPDATE SET
                           timestamp = excluded.timestamp"#,
                    params![keyword, timestamp],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn clear_search_history(&self) -> Result<()> {
        self.connection()
            .await?
            .call(|conn| {
                conn.execute("DELETE FROM search_history", [])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // View history

    pub async fn fetch_view_history(&self) -> Vec<HistoryGroup> {
        self.try_fetch_view_history()
            .await
            .unwrap_or_else(|e| degraded("view history", e))
    }

    pub async fn try_fetch_view_history(&self) -> Result<Vec<HistoryGroup>> {
        let entries = self
            .connection()
            .await?
            .call(|conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, label, title, image, teaser, timestamp, date
                       FROM view_history
                       ORDER BY timestamp DESC, id DESC"#,
                )?;
                let entries = stmt
                    .query_map([], view_entry_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await?;
        Ok(group_by_day(entries))
    }

    pub async fn upsert_view_history(&self, entry: NewViewEntry) -> Result<()> {
        self.upsert_view_history_at(entry, Utc::now()).await
    }

    /// Insert the view, or refresh the existing row for the same label.
    pub async fn upsert_view_history_at(&self, entry: NewViewEntry, at: DateTime<Utc>) -> Result<()> {
        let timestamp = at.timestamp_millis();
        let date = self.calendar_day(at);
        let label = entry.label.clone();

        let updated = self
            .connection()
            .await?
            .call(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let existing: Option<i64> = tx
                    .query_row(
                        "SELECT id FROM view_history WHERE label = ?1",
                        params![entry.label],
                        |row| row.get(0),
                    )
                    .optional()?;

                match existing {
                    Some(id) => {
                        tx.execute(
                            r#"UPDATE view_history
                               SET title = ?1, image = ?2, teaser = ?3, timestamp = ?4, date = ?5
                               WHERE id = ?6"#,
                            params![entry.title, entry.image, entry.teaser, timestamp, date, id],
                        )?;
                    }
                    None => {
                        tx.execute(
                            r#"INSERT INTO view_history (label, title, image, teaser, timestamp, date)
                               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                            params![entry.label, entry.title, entry.image, entry.teaser, timestamp, date],
                        )?;
                    }
                }

                tx.commit()?;
                Ok(existing.is_some())
            })
            .await?;

        tracing::debug!(
            "{} view history for {}",
            if updated { "Refreshed" } else { "Added" },
            label
        );
        Ok(())
    }

    pub async fn clear_view_history(&self) -> Result<()> {
        self.connection()
            .await?
            .call(|conn| {
                conn.execute("DELETE FROM view_history", [])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    fn calendar_day(&self, at: DateTime<Utc>) -> NaiveDate {
        match self.offset {
            Some(offset) => at.with_timezone(&offset).date_naive(),
            None => at.with_timezone(&Local).date_naive(),
        }
    }
}

fn degraded<T: Default>(what: &str, err: AppError) -> T {
    tracing::warn!("Failed to read {}, returning empty result: {}", what, err);
    T::default()
}

/// Group rows by calendar day in order of first appearance. Rows keep their
/// relative order inside each group.
fn group_by_day(entries: Vec<ViewHistoryEntry>) -> Vec<HistoryGroup> {
    let mut groups: Vec<HistoryGroup> = Vec::new();
    let mut positions: HashMap<NaiveDate, usize> = HashMap::new();

    for entry in entries {
        match positions.get(&entry.date) {
            Some(&idx) => groups[idx].entries.push(entry),
            None => {
                positions.insert(entry.date, groups.len());
                groups.push(HistoryGroup {
                    date: entry.date,
                    entries: vec![entry],
                });
            }
        }
    }

    groups
}

fn millis_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn content_from_row(row: &Row) -> rusqlite::Result<ContentItem> {
    Ok(ContentItem {
        id: row.get(0)?,
        markdown: row.get(1)?,
    })
}

fn search_entry_from_row(row: &Row) -> rusqlite::Result<SearchHistoryEntry> {
    Ok(SearchHistoryEntry {
        id: row.get(0)?,
        keyword: row.get(1)?,
        timestamp: millis_column(row, 2)?,
    })
}

fn view_entry_from_row(row: &Row) -> rusqlite::Result<ViewHistoryEntry> {
    Ok(ViewHistoryEntry {
        id: row.get(0)?,
        label: row.get(1)?,
        title: row.get(2)?,
        image: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        teaser: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        timestamp: millis_column(row, 5)?,
        date: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tokio_test::{assert_err, assert_ok};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, day, hour, 0, 0).unwrap()
    }

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, day).unwrap()
    }

    fn view(label: &str, title: &str) -> NewViewEntry {
        NewViewEntry {
            label: label.to_string(),
            title: title.to_string(),
            image: String::new(),
            teaser: String::new(),
        }
    }

    async fn store() -> Repository {
        let repo = Repository::in_memory().with_offset(FixedOffset::east_opt(0).unwrap());
        assert_ok!(repo.initialize().await);
        repo
    }

    #[tokio::test]
    async fn seeds_three_documents_into_empty_store() {
        let repo = store().await;

        let content = repo.fetch_all_content().await;
        assert_eq!(content.len(), 3);
        for (i, item) in content.iter().enumerate() {
            assert_eq!(item.id, i as i64 + 1);
            assert_eq!(item.markdown, SEED_CONTENT[i]);
        }
    }

    #[tokio::test]
    async fn initialize_is_idempotent_and_keeps_history() {
        let repo = store().await;
        assert_ok!(repo.upsert_search_keyword_at("rust", at(10, 9)).await);
        assert_ok!(repo.upsert_view_history_at(view("a1", "T1"), at(10, 9)).await);

        for _ in 0..3 {
            assert_ok!(repo.initialize().await);
        }

        let content = repo.fetch_all_content().await;
        assert_eq!(content.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(repo.fetch_search_history().await.len(), 1);
        assert_eq!(repo.fetch_view_history().await.len(), 1);
    }

    #[tokio::test]
    async fn keyword_upsert_trims_and_keeps_latest_timestamp() {
        let repo = store().await;
        assert_ok!(repo.upsert_search_keyword_at("golang", at(10, 9)).await);
        assert_ok!(repo.upsert_search_keyword_at(" golang ", at(10, 11)).await);

        let history = repo.fetch_search_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].keyword, "golang");
        assert_eq!(history[0].timestamp, at(10, 11));
    }

    #[tokio::test]
    async fn keyword_case_is_preserved() {
        let repo = store().await;
        assert_ok!(repo.upsert_search_keyword_at("Rust", at(10, 9)).await);
        assert_ok!(repo.upsert_search_keyword_at("rust", at(10, 10)).await);

        let keywords: Vec<_> = repo
            .fetch_search_history()
            .await
            .into_iter()
            .map(|e| e.keyword)
            .collect();
        assert_eq!(keywords, vec!["rust", "Rust"]);
    }

    #[tokio::test]
    async fn blank_keyword_is_rejected() {
        let repo = store().await;
        let err = assert_err!(repo.upsert_search_keyword("   ").await);
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(repo.fetch_search_history().await.is_empty());
    }

    #[tokio::test]
    async fn search_history_is_bounded_and_most_recent_first() {
        let repo = store().await;
        let start = at(1, 0);
        for i in 0..25 {
            let keyword = format!("keyword-{}", i);
            assert_ok!(
                repo.upsert_search_keyword_at(&keyword, start + Duration::minutes(i))
                    .await
            );
        }
        // Re-searching an old keyword moves it to the front
        assert_ok!(
            repo.upsert_search_keyword_at("keyword-0", start + Duration::hours(1))
                .await
        );

        let history = repo.fetch_search_history().await;
        assert_eq!(history.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(history[0].keyword, "keyword-0");
        assert_eq!(history[1].keyword, "keyword-24");
        assert!(history.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn clearing_search_history_empties_it() {
        let repo = store().await;
        assert_ok!(repo.upsert_search_keyword("rust").await);
        assert_ok!(repo.upsert_search_keyword("tokio").await);

        assert_ok!(repo.clear_search_history().await);
        assert!(repo.fetch_search_history().await.is_empty());
    }

    #[tokio::test]
    async fn reviewing_a_label_updates_the_row_in_place() {
        let repo = store().await;
        assert_ok!(repo.upsert_view_history_at(view("a1", "T1"), at(10, 9)).await);
        let mut updated = view("a1", "T1-updated");
        updated.image = "https://img/a1.png".to_string();
        assert_ok!(repo.upsert_view_history_at(updated, at(11, 9)).await);

        let groups = repo.fetch_view_history().await;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].date, day(11));
        let entry = &groups[0].entries[0];
        assert_eq!(groups[0].entries.len(), 1);
        assert_eq!(entry.label, "a1");
        assert_eq!(entry.title, "T1-updated");
        assert_eq!(entry.image, "https://img/a1.png");
        assert_eq!(entry.timestamp, at(11, 9));
    }

    #[tokio::test]
    async fn view_history_is_grouped_by_day_most_recent_first() {
        let repo = store().await;
        let views = [
            ("a", at(10, 8)),
            ("b", at(12, 7)),
            ("c", at(10, 20)),
            ("d", at(11, 12)),
            ("e", at(12, 22)),
        ];
        for (label, when) in views {
            assert_ok!(repo.upsert_view_history_at(view(label, label), when).await);
        }

        let groups = repo.fetch_view_history().await;
        let shape: Vec<(NaiveDate, Vec<&str>)> = groups
            .iter()
            .map(|g| (g.date, g.entries.iter().map(|e| e.label.as_str()).collect()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (day(12), vec!["e", "b"]),
                (day(11), vec!["d"]),
                (day(10), vec!["c", "a"]),
            ]
        );
        assert_eq!(groups[0].title(), "December 12, 2025");
        for group in &groups {
            assert!(group.entries.iter().all(|e| e.date == group.date));
        }
    }

    #[tokio::test]
    async fn reviewing_moves_entry_to_the_new_day() {
        let repo = store().await;
        assert_ok!(repo.upsert_view_history_at(view("a1", "T1"), at(10, 9)).await);
        assert_ok!(repo.upsert_view_history_at(view("b1", "T2"), at(11, 9)).await);
        assert_ok!(repo.upsert_view_history_at(view("a1", "T1"), at(12, 9)).await);

        let groups = repo.fetch_view_history().await;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, day(12));
        assert_eq!(groups[0].entries[0].label, "a1");
        assert_eq!(groups[1].date, day(11));
    }

    #[tokio::test]
    async fn calendar_day_follows_store_offset() {
        let repo = Repository::in_memory().with_offset(FixedOffset::east_opt(-5 * 3600).unwrap());
        assert_ok!(repo.initialize().await);
        // 02:00 UTC on the 11th is still the 10th at UTC-5
        assert_ok!(repo.upsert_view_history_at(view("a1", "T1"), at(11, 2)).await);

        let groups = repo.fetch_view_history().await;
        assert_eq!(groups[0].date, day(10));
    }

    #[tokio::test]
    async fn unset_offset_uses_local_time_at_write() {
        let repo = Repository::in_memory();
        assert_ok!(repo.initialize().await);
        let when = at(11, 2);
        assert_ok!(repo.upsert_view_history_at(view("a1", "T1"), when).await);

        let groups = repo.fetch_view_history().await;
        assert_eq!(groups[0].date, when.with_timezone(&Local).date_naive());
    }

    #[tokio::test]
    async fn duplicate_legacy_labels_do_not_block_initialize() {
        let repo = Repository::in_memory().with_offset(FixedOffset::east_opt(0).unwrap());
        let conn = assert_ok!(repo.connection().await);
        assert_ok!(
            conn.call(|conn| {
                conn.execute_batch(
                    r#"CREATE TABLE view_history (
                           id INTEGER PRIMARY KEY AUTOINCREMENT,
                           label TEXT NOT NULL,
                           title TEXT NOT NULL,
                           image TEXT,
                           teaser TEXT,
                           timestamp INTEGER NOT NULL,
                           date TEXT NOT NULL
                       );
                       INSERT INTO view_history (label, title, image, teaser, timestamp, date)
                       VALUES ('a1', 'T1', '', '', 1765357200000, '2025-12-10'),
                              ('a1', 'T1', '', '', 1765360800000, '2025-12-10');"#,
                )?;
                Ok(())
            })
            .await
        );

        assert_ok!(repo.initialize().await);
        assert_eq!(repo.fetch_all_content().await.len(), 3);
        assert_eq!(repo.fetch_view_history().await[0].entries.len(), 2);
        assert_ok!(repo.upsert_view_history_at(view("b1", "T2"), at(11, 9)).await);
    }

    #[tokio::test]
    async fn clearing_view_history_empties_it() {
        let repo = store().await;
        assert_ok!(repo.upsert_view_history(view("a1", "T1")).await);
        assert_ok!(repo.clear_view_history().await);
        assert!(repo.fetch_view_history().await.is_empty());
    }

    #[tokio::test]
    async fn unavailable_store_degrades_reads_and_fails_writes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path().join("missing").join("explore.db"));

        assert!(!repo.is_available().await);
        let err = assert_err!(repo.initialize().await);
        assert!(matches!(err, AppError::StoreUnavailable(_)));

        assert!(repo.fetch_all_content().await.is_empty());
        assert!(repo.fetch_search_history().await.is_empty());
        assert!(repo.fetch_view_history().await.is_empty());
        assert_err!(repo.try_fetch_all_content().await);

        assert_err!(repo.upsert_search_keyword("rust").await);
        assert_err!(repo.upsert_view_history(view("a1", "T1")).await);
        assert_err!(repo.clear_search_history().await);
        assert_err!(repo.clear_view_history().await);
    }

    #[tokio::test]
    async fn uninitialized_store_reads_empty() {
        let repo = Repository::in_memory();
        assert!(repo.is_available().await);
        assert!(repo.fetch_all_content().await.is_empty());
        assert!(repo.try_fetch_search_history().await.is_err());
    }
}
