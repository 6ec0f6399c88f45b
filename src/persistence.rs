use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::ScanError;
use crate::models::{IdCard, NewIdCard};

/// Backing store for scan results. Shared by all requests.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn save(&self, card: NewIdCard) -> Result<Uuid, ScanError>;
    async fn list_all(&self) -> Result<Vec<IdCard>, ScanError>;
    async fn get(&self, id: Uuid) -> Result<IdCard, ScanError>;
}

pub struct PgCardStore {
    pool: PgPool,
}

impl PgCardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardStore for PgCardStore {
    async fn save(&self, card: NewIdCard) -> Result<Uuid, ScanError> {
        let created_at = chrono::Utc::now().timestamp_millis();
        let stored = db::cards::create(&self.pool, &card, created_at).await?;
        Ok(stored.id)
    }

    async fn list_all(&self) -> Result<Vec<IdCard>, ScanError> {
        Ok(db::cards::list_all(&self.pool).await?)
    }

    async fn get(&self, id: Uuid) -> Result<IdCard, ScanError> {
        db::cards::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ScanError::NotFound("Record not found".to_string()))
    }
}

/// Stand-in used when no database is configured. Every call fails.
pub struct UnconfiguredCardStore;

impl UnconfiguredCardStore {
    fn error() -> ScanError {
        ScanError::Persistence("DATABASE_URL environment variable is required".to_string())
    }
}

#[async_trait]
impl CardStore for UnconfiguredCardStore {
    async fn save(&self, _card: NewIdCard) -> Result<Uuid, ScanError> {
        Err(Self::error())
    }

    async fn list_all(&self) -> Result<Vec<IdCard>, ScanError> {
        Err(Self::error())
    }

    async fn get(&self, _id: Uuid) -> Result<IdCard, ScanError> {
        Err(Self::error())
    }
}
