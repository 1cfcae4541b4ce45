use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Fallback appointment length when a service record carries no duration.
pub const DEFAULT_SERVICE_DURATION: u32 = 60;

fn default_true() -> bool {
    true
}

fn default_duration() -> u32 {
    DEFAULT_SERVICE_DURATION
}

fn default_channel() -> String {
    "web".to_string()
}

/// A bookable location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the branch takes online bookings
    #[serde(default = "default_true")]
    pub online: bool,
    /// Whether the branch is shown to customers
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// A bookable service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Appointment length in minutes
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub price: f64,
    /// Branches where this service is offered
    #[serde(default)]
    pub branches: Vec<String>,
    /// Staff members assigned to this service
    #[serde(default)]
    pub staff_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// A single weekday's working window for a staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    /// Opening time, `HH:mm`
    pub start: String,
    /// Closing time, `HH:mm`
    pub end: String,
    /// When false the whole day is off regardless of the times above
    pub is_working: bool,
}

/// A staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Services this staff member provides
    #[serde(default)]
    pub services: Vec<String>,
    /// Branches this staff member works at
    #[serde(default)]
    pub branches: Vec<String>,
    /// Per-weekday windows, keyed by English day name (`Sunday`..`Saturday`).
    /// An absent entry means the staff member does not work that day.
    #[serde(default)]
    pub working_hours: HashMap<String, DaySchedule>,
}

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status occupies its time range.
    pub fn occupies_time(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A committed reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub branch_id: String,
    #[serde(default)]
    pub branch_name: String,
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
    pub staff_id: String,
    #[serde(default)]
    pub staff_name: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Start time; historical records may use the legacy 12-hour form
    pub start_time: String,
    /// Minutes; absent records fall back to the service duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_notes: String,
    /// Short numeric code quoted by the customer at the desk
    #[serde(default)]
    pub booking_code: String,
    pub status: BookingStatus,
    #[serde(default = "default_channel")]
    pub channel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A global closure period for a date (holiday, maintenance). Not tied to
/// any staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// When true the whole day is closed and the times below are ignored
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A bookable start time offered to the customer. Computed fresh per
/// request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// 24-hour `HH:mm` start time
    pub time: String,
    /// 12-hour rendering shown to customers
    pub display: String,
    /// Date-qualified identifier, `{date}T{time}`
    pub date_time_id: String,
}
