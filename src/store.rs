//! Owner-scoped cycle persistence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{CycleRecord, Flow, NewCycle, UnknownFlow};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cycle {0} not found")]
    NotFound(Uuid),

    #[error("cycle {0} already has an end date")]
    AlreadyEnded(Uuid),

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("stored row is invalid: {0}")]
    Corrupt(#[from] UnknownFlow),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type SharedStore = Arc<dyn CycleStore>;

#[async_trait]
pub trait CycleStore: Send + Sync {
    async fn insert(&self, owner: Uuid, cycle: NewCycle) -> Result<CycleRecord, StoreError>;

    /// Sets the end date once. Records of other owners look missing.
    async fn set_end_date(
        &self,
        owner: Uuid,
        id: Uuid,
        end_date: NaiveDate,
    ) -> Result<CycleRecord, StoreError>;

    /// Newest start date first.
    async fn list(&self, owner: Uuid) -> Result<Vec<CycleRecord>, StoreError>;
}

fn check_end_date(record: &CycleRecord, end_date: NaiveDate) -> Result<(), StoreError> {
    if record.end_date.is_some() {
        return Err(StoreError::AlreadyEnded(record.id));
    }
    if end_date < record.start_date {
        return Err(StoreError::EndBeforeStart {
            start: record.start_date,
            end: end_date,
        });
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryCycleStore {
    cycles: RwLock<Vec<CycleRecord>>,
}

impl MemoryCycleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CycleStore for MemoryCycleStore {
    async fn insert(&self, owner: Uuid, cycle: NewCycle) -> Result<CycleRecord, StoreError> {
        let record = CycleRecord {
            id: Uuid::new_v4(),
            owner,
            start_date: cycle.start_date,
            end_date: None,
            symptoms: cycle.symptoms,
            notes: cycle.notes,
            flow: cycle.flow,
            created_at: Utc::now(),
        };
        self.cycles.write().await.push(record.clone());
        Ok(record)
    }

    async fn set_end_date(
        &self,
        owner: Uuid,
        id: Uuid,
        end_date: NaiveDate,
    ) -> Result<CycleRecord, StoreError> {
        let mut cycles = self.cycles.write().await;
        let record = cycles
            .iter_mut()
            .find(|c| c.id == id && c.owner == owner)
            .ok_or(StoreError::NotFound(id))?;
        check_end_date(record, end_date)?;
        record.end_date = Some(end_date);
        Ok(record.clone())
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<CycleRecord>, StoreError> {
        let mut mine: Vec<CycleRecord> = self
            .cycles
            .read()
            .await
            .iter()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect();
        mine.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(mine)
    }
}

#[derive(Debug, FromRow)]
struct CycleRow {
    id: Uuid,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    symptoms: Option<Vec<String>>,
    notes: Option<String>,
    flow: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CycleRow> for CycleRecord {
    type Error = StoreError;

    fn try_from(row: CycleRow) -> Result<Self, Self::Error> {
        Ok(CycleRecord {
            id: row.id,
            owner: row.user_id,
            start_date: row.start_date,
            end_date: row.end_date,
            symptoms: row.symptoms,
            notes: row.notes,
            flow: row.flow.as_deref().map(str::parse::<Flow>).transpose()?,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str = "id, user_id, start_date, end_date, symptoms, notes, flow, created_at";

#[derive(Debug, Clone)]
pub struct PgCycleStore {
    pool: PgPool,
}

impl PgCycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<CycleRecord, StoreError> {
        let row = sqlx::query_as::<_, CycleRow>(&format!(
            "SELECT {COLUMNS} FROM cycles WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;
        row.try_into()
    }
}

#[async_trait]
impl CycleStore for PgCycleStore {
    async fn insert(&self, owner: Uuid, cycle: NewCycle) -> Result<CycleRecord, StoreError> {
        let row = sqlx::query_as::<_, CycleRow>(&format!(
            "INSERT INTO cycles (id, user_id, start_date, symptoms, notes, flow)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(cycle.start_date)
        .bind(cycle.symptoms)
        .bind(cycle.notes)
        .bind(cycle.flow.map(Flow::as_str))
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn set_end_date(
        &self,
        owner: Uuid,
        id: Uuid,
        end_date: NaiveDate,
    ) -> Result<CycleRecord, StoreError> {
        let current = self.find(owner, id).await?;
        check_end_date(&current, end_date)?;

        // The `end_date IS NULL` guard keeps a racing second patch out.
        let row = sqlx::query_as::<_, CycleRow>(&format!(
            "UPDATE cycles SET end_date = $1
             WHERE id = $2 AND user_id = $3 AND end_date IS NULL
             RETURNING {COLUMNS}"
        ))
        .bind(end_date)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::AlreadyEnded(id))?;
        row.try_into()
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<CycleRecord>, StoreError> {
        sqlx::query_as::<_, CycleRow>(&format!(
            "SELECT {COLUMNS} FROM cycles WHERE user_id = $1 ORDER BY start_date DESC, created_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(CycleRecord::try_from)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_cycle(start: &str) -> NewCycle {
        NewCycle {
            start_date: start.parse().unwrap(),
            symptoms: None,
            notes: None,
            flow: None,
        }
    }

    #[tokio::test]
    async fn list_is_owner_scoped_and_newest_first() {
        let store = MemoryCycleStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.insert(alice, new_cycle("2024-01-01")).await.unwrap();
        store.insert(alice, new_cycle("2024-02-26")).await.unwrap();
        store.insert(bob, new_cycle("2024-03-03")).await.unwrap();
        store.insert(alice, new_cycle("2024-01-29")).await.unwrap();

        let starts: Vec<String> = store
            .list(alice)
            .await
            .unwrap()
            .iter()
            .map(|c| c.start_date.to_string())
            .collect();
        assert_eq!(starts, vec!["2024-02-26", "2024-01-29", "2024-01-01"]);
    }

    #[tokio::test]
    async fn same_start_date_lists_newest_logged_first() {
        let store = MemoryCycleStore::new();
        let owner = Uuid::new_v4();

        let first = store.insert(owner, new_cycle("2024-01-01")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.insert(owner, new_cycle("2024-01-01")).await.unwrap();

        let ids: Vec<Uuid> = store.list(owner).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn end_date_is_set_once() {
        let store = MemoryCycleStore::new();
        let owner = Uuid::new_v4();
        let cycle = store.insert(owner, new_cycle("2024-01-01")).await.unwrap();
        let end = "2024-01-05".parse().unwrap();

        let ended = store.set_end_date(owner, cycle.id, end).await.unwrap();
        assert_eq!(ended.end_date, Some(end));

        let again = store.set_end_date(owner, cycle.id, end).await;
        assert!(matches!(again, Err(StoreError::AlreadyEnded(id)) if id == cycle.id));
    }

    #[tokio::test]
    async fn other_owners_cannot_end_a_cycle() {
        let store = MemoryCycleStore::new();
        let owner = Uuid::new_v4();
        let cycle = store.insert(owner, new_cycle("2024-01-01")).await.unwrap();

        let result = store
            .set_end_date(Uuid::new_v4(), cycle.id, "2024-01-05".parse().unwrap())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let store = MemoryCycleStore::new();
        let owner = Uuid::new_v4();
        let cycle = store.insert(owner, new_cycle("2024-01-10")).await.unwrap();

        let result = store
            .set_end_date(owner, cycle.id, "2024-01-09".parse().unwrap())
            .await;
        assert!(matches!(result, Err(StoreError::EndBeforeStart { .. })));
        assert_eq!(store.list(owner).await.unwrap()[0].end_date, None);
    }

    #[test]
    fn unknown_stored_flow_is_corrupt() {
        let row = CycleRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_date: "2024-01-01".parse().unwrap(),
            end_date: None,
            symptoms: Some(vec![]),
            notes: None,
            flow: Some("spotting".into()),
            created_at: Utc::now(),
        };
        assert!(matches!(CycleRecord::try_from(row), Err(StoreError::Corrupt(_))));
    }
}
