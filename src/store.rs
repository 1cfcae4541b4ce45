use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{BlockedTime, Booking, Branch, Service, Staff};

/// Database trait in front of the hosted document store.
///
/// Errors are reported as strings; handlers decide how much of that reaches
/// the client.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// All branch records, unfiltered
    async fn list_branches(&self) -> Result<Vec<Branch>, String>;

    /// All service records, unfiltered
    async fn list_services(&self) -> Result<Vec<Service>, String>;

    /// All staff records, unfiltered
    async fn list_staff(&self) -> Result<Vec<Staff>, String>;

    /// Look up one service
    async fn get_service(&self, service_id: &str) -> Result<Option<Service>, String>;

    /// Look up one staff member
    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, String>;

    /// Bookings for one staff member on one date, any status
    async fn bookings_for(&self, staff_id: &str, date: &str) -> Result<Vec<Booking>, String>;

    /// Global blocked times for a date
    async fn blocked_times_for(&self, date: &str) -> Result<Vec<BlockedTime>, String>;

    /// Persist a new booking, returning its id
    async fn insert_booking(&self, booking: &Booking) -> Result<String, String>;

    /// Create or replace a branch record
    async fn upsert_branch(&self, branch: &Branch) -> Result<(), String>;

    /// Create or replace a service record
    async fn upsert_service(&self, service: &Service) -> Result<(), String>;

    /// Create or replace a staff record
    async fn upsert_staff(&self, staff: &Staff) -> Result<(), String>;

    /// Persist a blocked time, returning its id
    async fn insert_blocked_time(&self, blocked: &BlockedTime) -> Result<String, String>;
}

/// In-memory implementation, used in tests and as the fallback when Redis
/// is unreachable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    branches: RwLock<HashMap<String, Branch>>,
    services: RwLock<HashMap<String, Service>>,
    staff: RwLock<HashMap<String, Staff>>,
    bookings: RwLock<HashMap<String, Booking>>,
    blocked: RwLock<HashMap<String, BlockedTime>>,
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn list_branches(&self) -> Result<Vec<Branch>, String> {
        let branches = self.branches.read().await;
        Ok(branches.values().cloned().collect())
    }

    async fn list_services(&self) -> Result<Vec<Service>, String> {
        let services = self.services.read().await;
        Ok(services.values().cloned().collect())
    }

    async fn list_staff(&self) -> Result<Vec<Staff>, String> {
        let staff = self.staff.read().await;
        Ok(staff.values().cloned().collect())
    }

    async fn get_service(&self, service_id: &str) -> Result<Option<Service>, String> {
        let services = self.services.read().await;
        Ok(services.get(service_id).cloned())
    }

    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, String> {
        let staff = self.staff.read().await;
        Ok(staff.get(staff_id).cloned())
    }

    async fn bookings_for(&self, staff_id: &str, date: &str) -> Result<Vec<Booking>, String> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|b| b.staff_id == staff_id && b.date == date)
            .cloned()
            .collect())
    }

    async fn blocked_times_for(&self, date: &str) -> Result<Vec<BlockedTime>, String> {
        let blocked = self.blocked.read().await;
        Ok(blocked
            .values()
            .filter(|b| b.date == date)
            .cloned()
            .collect())
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<String, String> {
        let id = booking
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut record = booking.clone();
        record.id = Some(id.clone());
        let mut bookings = self.bookings.write().await;
        bookings.insert(id.clone(), record);
        Ok(id)
    }

    async fn upsert_branch(&self, branch: &Branch) -> Result<(), String> {
        let mut branches = self.branches.write().await;
        branches.insert(branch.id.clone(), branch.clone());
        Ok(())
    }

    async fn upsert_service(&self, service: &Service) -> Result<(), String> {
        let mut services = self.services.write().await;
        services.insert(service.id.clone(), service.clone());
        Ok(())
    }

    async fn upsert_staff(&self, staff: &Staff) -> Result<(), String> {
        let mut records = self.staff.write().await;
        records.insert(staff.id.clone(), staff.clone());
        Ok(())
    }

    async fn insert_blocked_time(&self, blocked: &BlockedTime) -> Result<String, String> {
        let id = blocked
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut record = blocked.clone();
        record.id = Some(id.clone());
        let mut blocks = self.blocked.write().await;
        blocks.insert(id.clone(), record);
        Ok(id)
    }
}
