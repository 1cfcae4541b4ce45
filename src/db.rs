use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{BlockedTime, Booking, Branch, Service, Staff};
use crate::store::BookingStore;

/// Redis key layout: per-record JSON documents plus membership sets that
/// stand in for the document store's collection queries.
mod keys {
    pub const BRANCHES: &str = "varaamo:branches";
    pub const BRANCH_PREFIX: &str = "varaamo:branch:";
    pub const SERVICES: &str = "varaamo:services";
    pub const SERVICE_PREFIX: &str = "varaamo:service:";
    pub const STAFF: &str = "varaamo:staff";
    pub const STAFF_PREFIX: &str = "varaamo:staff:";
    pub const BOOKING_PREFIX: &str = "varaamo:booking:";
    /// Per staff+date booking index, `varaamo:bookings:<staff_id>:<date>`
    pub const BOOKING_INDEX_PREFIX: &str = "varaamo:bookings:";
    pub const BLOCKED_PREFIX: &str = "varaamo:blocked_time:";
    /// Per date blocked-time index, `varaamo:blocked:<date>`
    pub const BLOCKED_INDEX_PREFIX: &str = "varaamo:blocked:";
}

/// Redis-backed document store
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    /// Create a new Redis store for the given connection string
    pub fn new(redis_url: &str) -> Result<Self, String> {
        info!("Connecting to Redis at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| format!("Failed to create Redis client: {}", e))?;

        Ok(Self { client })
    }

    /// Get a Redis connection from the client
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, String> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| format!("Failed to connect to Redis: {}", e))
    }

    /// Fetch every record whose id is in `set_key`, reading each document at
    /// `prefix<id>`. Ids whose document has gone missing are skipped with a
    /// warning instead of failing the whole listing.
    async fn fetch_indexed<T: DeserializeOwned>(
        &self,
        set_key: &str,
        prefix: &str,
    ) -> Result<Vec<T>, String> {
        let mut conn = self.get_connection().await?;

        let ids: Vec<String> = conn
            .smembers(set_key)
            .await
            .map_err(|e| format!("Redis SMEMBERS error: {}", e))?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let key = format!("{}{}", prefix, id);
            let data: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| format!("Redis GET error: {}", e))?;

            match data {
                Some(json) => {
                    let record =
                        serde_json::from_str(&json).map_err(|e| format!("JSON parse error: {}", e))?;
                    records.push(record);
                }
                None => warn!("Indexed record {} has no document, skipping", key),
            }
        }

        Ok(records)
    }

    /// Read one document at `prefix<id>`
    async fn fetch_one<T: DeserializeOwned>(
        &self,
        prefix: &str,
        id: &str,
    ) -> Result<Option<T>, String> {
        let mut conn = self.get_connection().await?;
        let key = format!("{}{}", prefix, id);

        let data: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| format!("Redis GET error: {}", e))?;

        match data {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| format!("JSON parse error: {}", e)),
            None => Ok(None),
        }
    }

    /// Store one document at `prefix<id>` and add the id to `set_key`
    async fn store_indexed<T: Serialize>(
        &self,
        set_key: &str,
        prefix: &str,
        id: &str,
        record: &T,
    ) -> Result<(), String> {
        let mut conn = self.get_connection().await?;

        let json = serde_json::to_string(record)
            .map_err(|e| format!("JSON serialization error: {}", e))?;

        conn.set::<_, _, ()>(format!("{}{}", prefix, id), &json)
            .await
            .map_err(|e| format!("Redis SET error: {}", e))?;

        conn.sadd::<_, _, ()>(set_key, id)
            .await
            .map_err(|e| format!("Redis SADD error: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl BookingStore for RedisStore {
    async fn list_branches(&self) -> Result<Vec<Branch>, String> {
        self.fetch_indexed(keys::BRANCHES, keys::BRANCH_PREFIX).await
    }

    async fn list_services(&self) -> Result<Vec<Service>, String> {
        self.fetch_indexed(keys::SERVICES, keys::SERVICE_PREFIX).await
    }

    async fn list_staff(&self) -> Result<Vec<Staff>, String> {
        self.fetch_indexed(keys::STAFF, keys::STAFF_PREFIX).await
    }

    async fn get_service(&self, service_id: &str) -> Result<Option<Service>, String> {
        self.fetch_one(keys::SERVICE_PREFIX, service_id).await
    }

    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, String> {
        self.fetch_one(keys::STAFF_PREFIX, staff_id).await
    }

    async fn bookings_for(&self, staff_id: &str, date: &str) -> Result<Vec<Booking>, String> {
        let index = format!("{}{}:{}", keys::BOOKING_INDEX_PREFIX, staff_id, date);
        self.fetch_indexed(&index, keys::BOOKING_PREFIX).await
    }

    async fn blocked_times_for(&self, date: &str) -> Result<Vec<BlockedTime>, String> {
        let index = format!("{}{}", keys::BLOCKED_INDEX_PREFIX, date);
        self.fetch_indexed(&index, keys::BLOCKED_PREFIX).await
    }

    // Check-then-write callers (the booking endpoint) are serialised only by
    // running a single service instance. A multi-writer deployment would
    // need WATCH/MULTI around the index read and this insert.
    async fn insert_booking(&self, booking: &Booking) -> Result<String, String> {
        let id = booking
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut record = booking.clone();
        record.id = Some(id.clone());

        let index = format!(
            "{}{}:{}",
            keys::BOOKING_INDEX_PREFIX,
            record.staff_id,
            record.date
        );
        self.store_indexed(&index, keys::BOOKING_PREFIX, &id, &record)
            .await?;

        info!(
            "Stored booking {} for staff {} on {}",
            id, record.staff_id, record.date
        );
        Ok(id)
    }

    async fn upsert_branch(&self, branch: &Branch) -> Result<(), String> {
        self.store_indexed(keys::BRANCHES, keys::BRANCH_PREFIX, &branch.id, branch)
            .await
    }

    async fn upsert_service(&self, service: &Service) -> Result<(), String> {
        self.store_indexed(keys::SERVICES, keys::SERVICE_PREFIX, &service.id, service)
            .await
    }

    async fn upsert_staff(&self, staff: &Staff) -> Result<(), String> {
        self.store_indexed(keys::STAFF, keys::STAFF_PREFIX, &staff.id, staff)
            .await
    }

    async fn insert_blocked_time(&self, blocked: &BlockedTime) -> Result<String, String> {
        let id = blocked
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut record = blocked.clone();
        record.id = Some(id.clone());

        let index = format!("{}{}", keys::BLOCKED_INDEX_PREFIX, record.date);
        self.store_indexed(&index, keys::BLOCKED_PREFIX, &id, &record)
            .await?;

        Ok(id)
    }
}
