//! Local keyed document store.
//!
//! Every collection is a SQLite table of JSON documents keyed by `id`, with
//! expression indexes over the secondary attributes a record declares in
//! [`Record::INDEXES`]. Scans may only filter or sort on those attributes.
//!
//! Writes from every collection of one [`LocalStore`] are serialized on a
//! shared writer lock, so a read-modify-write never races another writer
//! for SQLite's write lock.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{
    assessment::Assessment, assessment_response::AssessmentResponse, candidate::Candidate,
    job::Job, timeline::CandidateTimelineItem,
};

pub trait Record: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Backing table name.
    const COLLECTION: &'static str;
    /// camelCase document attributes that carry a secondary index.
    const INDEXES: &'static [&'static str];

    fn key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Equality filter and ordering for [`Collection::scan`].
#[derive(Debug, Clone, Default)]
pub struct Scan<'a> {
    filter: Option<(&'static str, &'a str)>,
    order: Option<(&'static str, SortOrder)>,
}

impl<'a> Scan<'a> {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &'static str, value: &'a str) -> Self {
        self.filter = Some((field, value));
        self
    }

    pub fn order_by(mut self, field: &'static str, order: SortOrder) -> Self {
        self.order = Some((field, order));
        self
    }
}

pub struct Collection<T> {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            writer: Arc::clone(&self.writer),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    fn new(pool: SqlitePool, writer: Arc<Mutex<()>>) -> Self {
        Self {
            pool,
            writer,
            _record: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        let sql = format!("SELECT doc FROM {} WHERE id = ?", T::COLLECTION);
        let doc: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        doc.map(|raw| decode(&raw)).transpose()
    }

    /// Inserts a new record; fails with [`Error::DuplicateKey`] when the id
    /// (or a unique secondary attribute) is already taken.
    pub async fn add(&self, record: &T) -> Result<()> {
        let sql = format!("INSERT INTO {} (id, doc) VALUES (?, ?)", T::COLLECTION);
        let _writer = self.writer.lock().await;
        sqlx::query(&sql)
            .bind(record.key())
            .bind(serde_json::to_string(record)?)
            .execute(&self.pool)
            .await
            .map_err(|err| duplicate_or(err, record.key()))?;
        Ok(())
    }

    /// Builds a record from the current record count and inserts it, with no
    /// other write in between.
    pub async fn add_counted<F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(i64) -> T + Send,
    {
        let count = format!("SELECT COUNT(*) FROM {}", T::COLLECTION);
        let insert = format!("INSERT INTO {} (id, doc) VALUES (?, ?)", T::COLLECTION);

        let _writer = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;
        let total: i64 = sqlx::query_scalar(&count).fetch_one(&mut *tx).await?;
        let record = build(total);
        sqlx::query(&insert)
            .bind(record.key())
            .bind(serde_json::to_string(&record)?)
            .execute(&mut *tx)
            .await
            .map_err(|err| duplicate_or(err, record.key()))?;
        tx.commit().await?;
        Ok(record)
    }

    pub async fn put(&self, record: &T) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET doc = excluded.doc",
            T::COLLECTION
        );
        let _writer = self.writer.lock().await;
        sqlx::query(&sql)
            .bind(record.key())
            .bind(serde_json::to_string(record)?)
            .execute(&self.pool)
            .await
            .map_err(|err| duplicate_or(err, record.key()))?;
        Ok(())
    }

    /// Inserts every record or none of them.
    pub async fn bulk_add(&self, records: &[T]) -> Result<()> {
        let sql = format!("INSERT INTO {} (id, doc) VALUES (?, ?)", T::COLLECTION);
        let _writer = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(&sql)
                .bind(record.key())
                .bind(serde_json::to_string(record)?)
                .execute(&mut *tx)
                .await
                .map_err(|err| duplicate_or(err, record.key()))?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Without an explicit order, records come back in primary-key order.
    pub async fn scan(&self, scan: Scan<'_>) -> Result<Vec<T>> {
        let mut sql = format!("SELECT doc FROM {}", T::COLLECTION);
        if let Some((field, _)) = scan.filter {
            sql.push_str(&format!(" WHERE {} = ?", indexed_expr::<T>(field)?));
        }
        match scan.order {
            Some((field, order)) => sql.push_str(&format!(
                " ORDER BY {} {}, id ASC",
                indexed_expr::<T>(field)?,
                order.as_sql()
            )),
            None => sql.push_str(" ORDER BY id ASC"),
        }

        let mut query = sqlx::query_scalar::<_, String>(&sql);
        if let Some((_, value)) = scan.filter {
            query = query.bind(value);
        }
        let docs = query.fetch_all(&self.pool).await?;
        docs.iter().map(|raw| decode(raw)).collect()
    }

    pub async fn to_vec(&self) -> Result<Vec<T>> {
        self.scan(Scan::all()).await
    }

    pub async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::COLLECTION);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Read-modify-write of one record inside a single transaction.
    /// Returns `None` (and writes nothing) when the id is absent.
    pub async fn update<F>(&self, id: &str, apply: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut T) + Send,
    {
        let select = format!("SELECT doc FROM {} WHERE id = ?", T::COLLECTION);
        let update = format!("UPDATE {} SET doc = ? WHERE id = ?", T::COLLECTION);

        let _writer = self.writer.lock().await;
        let mut tx = self.pool.begin().await?;
        let doc: Option<String> = sqlx::query_scalar(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(raw) = doc else {
            return Ok(None);
        };

        let mut record: T = decode(&raw)?;
        apply(&mut record);
        sqlx::query(&update)
            .bind(serde_json::to_string(&record)?)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|err| duplicate_or(err, id))?;
        tx.commit().await?;
        Ok(Some(record))
    }
}

fn decode<T: Record>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|err| {
        Error::Internal(format!(
            "Corrupt document in {}: {}",
            T::COLLECTION,
            err
        ))
    })
}

fn indexed_expr<T: Record>(field: &str) -> Result<String> {
    if !T::INDEXES.contains(&field) {
        return Err(Error::Internal(format!(
            "{} is not an indexed attribute of {}",
            field,
            T::COLLECTION
        )));
    }
    Ok(format!("json_extract(doc, '$.{}')", field))
}

fn duplicate_or(err: sqlx::Error, key: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::DuplicateKey(key.to_string())
        }
        _ => Error::from(err),
    }
}

/// The five collections of the local database over one pool.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    pub jobs: Collection<Job>,
    pub candidates: Collection<Candidate>,
    pub timeline: Collection<CandidateTimelineItem>,
    pub assessments: Collection<Assessment>,
    pub responses: Collection<AssessmentResponse>,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        let writer = Arc::new(Mutex::new(()));
        Self {
            jobs: Collection::new(pool.clone(), Arc::clone(&writer)),
            candidates: Collection::new(pool.clone(), Arc::clone(&writer)),
            timeline: Collection::new(pool.clone(), Arc::clone(&writer)),
            assessments: Collection::new(pool.clone(), Arc::clone(&writer)),
            responses: Collection::new(pool.clone(), writer),
            pool,
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database::pool::{create_pool, run_migrations};
    use crate::models::candidate::Stage;
    use crate::models::job::JobStatus;
    use crate::models::timeline::TimelineKind;
    use crate::utils::time::now;

    async fn memory_store() -> LocalStore {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            ..Config::default()
        };
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        LocalStore::new(pool)
    }

    fn job(id: &str, slug: &str, status: JobStatus) -> Job {
        let ts = now();
        Job {
            id: id.to_string(),
            title: "Engineer".to_string(),
            slug: slug.to_string(),
            status,
            tags: vec![],
            order: 1,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn add_rejects_duplicate_ids() {
        let store = memory_store().await;
        store.jobs.add(&job("a", "engineer-a", JobStatus::Active)).await.unwrap();
        let err = store
            .jobs
            .add(&job("a", "engineer-other", JobStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(key) if key == "a"));
    }

    #[tokio::test]
    async fn slug_index_is_unique() {
        let store = memory_store().await;
        store.jobs.add(&job("a", "engineer-abc", JobStatus::Active)).await.unwrap();
        let err = store
            .jobs
            .add(&job("b", "engineer-abc", JobStatus::Active))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn put_upserts_in_place() {
        let store = memory_store().await;
        let mut record = job("a", "engineer-a", JobStatus::Active);
        store.jobs.put(&record).await.unwrap();
        record.title = "Staff Engineer".to_string();
        store.jobs.put(&record).await.unwrap();

        assert_eq!(store.jobs.count().await.unwrap(), 1);
        let stored = store.jobs.get("a").await.unwrap().unwrap();
        assert_eq!(stored.title, "Staff Engineer");
    }

    #[tokio::test]
    async fn bulk_add_is_all_or_nothing() {
        let store = memory_store().await;
        let records = vec![
            job("a", "engineer-a", JobStatus::Active),
            job("a", "engineer-b", JobStatus::Active),
        ];
        assert!(store.jobs.bulk_add(&records).await.is_err());
        assert_eq!(store.jobs.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scan_filters_by_equality_and_sorts() {
        let store = memory_store().await;
        let mut first = job("c", "engineer-c", JobStatus::Active);
        first.order = 2;
        let mut second = job("a", "engineer-a", JobStatus::Active);
        second.order = 1;
        let archived = job("b", "engineer-b", JobStatus::Archived);
        store
            .jobs
            .bulk_add(&[first, second, archived])
            .await
            .unwrap();

        let active = store
            .jobs
            .scan(Scan::all().where_eq("status", "active").order_by("order", SortOrder::Asc))
            .await
            .unwrap();
        let ids: Vec<_> = active.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let everything = store.jobs.to_vec().await.unwrap();
        let ids: Vec<_> = everything.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn scan_rejects_unindexed_attributes() {
        let store = memory_store().await;
        let err = store
            .jobs
            .scan(Scan::all().where_eq("title", "Engineer"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn add_counted_sees_the_count_before_insert() {
        let store = memory_store().await;
        let mut handles = Vec::new();
        for n in 0..8 {
            let jobs = store.jobs.clone();
            handles.push(tokio::spawn(async move {
                jobs.add_counted(|count| {
                    let mut record = job(&format!("j{}", n), &format!("engineer-{}", n), JobStatus::Active);
                    record.order = count + 1;
                    record
                })
                .await
                .unwrap()
                .order
            }));
        }
        let mut orders = Vec::new();
        for handle in handles {
            orders.push(handle.await.unwrap());
        }
        orders.sort_unstable();
        assert_eq!(orders, (1..=8).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn update_returns_none_for_missing_ids() {
        let store = memory_store().await;
        let result = store
            .candidates
            .update("missing", |c| c.stage = Stage::Hired)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.candidates.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn timeline_scan_orders_by_created_at() {
        let store = memory_store().await;
        let base = now();
        let items: Vec<_> = [3, 1, 2]
            .iter()
            .map(|offset| CandidateTimelineItem {
                id: format!("t{}", offset),
                candidate_id: "cand".to_string(),
                kind: TimelineKind::Note,
                message: format!("note {}", offset),
                created_at: base + chrono::Duration::seconds(*offset),
            })
            .collect();
        store.timeline.bulk_add(&items).await.unwrap();

        let sorted = store
            .timeline
            .scan(
                Scan::all()
                    .where_eq("candidateId", "cand")
                    .order_by("createdAt", SortOrder::Asc),
            )
            .await
            .unwrap();
        let ids: Vec<_> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }
}
