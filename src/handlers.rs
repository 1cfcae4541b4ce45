use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::availability::{compute_slots, slot_is_bookable, DayAvailability};
use crate::catalog;
use crate::error::{not_found, validation_error, AppResult, Error};
use crate::models::{Booking, BookingStatus, Branch, Service, Staff, TimeSlot};
use crate::startup::AppState;
use crate::utils::time::parse_clock_time;

/// Request body for the availability query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    #[serde(default)]
    pub staff_id: String,
    #[serde(default)]
    pub service_id: String,
    /// Accepted for parity with the booking wizard; the computation does
    /// not depend on it
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHoursBody {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub success: bool,
    pub slots: Vec<TimeSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHoursBody>,
    /// Present only when the staff member does not work that day; its
    /// absence is what distinguishes a fully booked day from a day off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Handler for the slot query feeding the date/time step of the wizard
pub async fn availability_handler(
    State(state): State<AppState>,
    Json(request): Json<AvailabilityRequest>,
) -> AppResult<Json<AvailabilityResponse>> {
    if request.staff_id.is_empty() {
        return Err(validation_error("staffId is required"));
    }
    if request.service_id.is_empty() {
        return Err(validation_error("serviceId is required"));
    }
    if request.date.is_empty() {
        return Err(validation_error("date is required"));
    }

    let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d")
        .map_err(|_| validation_error("date must be in YYYY-MM-DD format"))?;

    let staff = state
        .store
        .get_staff(&request.staff_id)
        .await
        .map_err(Error::Store)?
        .ok_or_else(|| not_found("Staff member"))?;
    let service = state
        .store
        .get_service(&request.service_id)
        .await
        .map_err(Error::Store)?
        .ok_or_else(|| not_found("Service"))?;
    if service.duration == 0 {
        return Err(validation_error("service duration must be positive"));
    }

    let bookings = state
        .store
        .bookings_for(&staff.id, &request.date)
        .await
        .map_err(Error::Store)?;
    let blocked = state
        .store
        .blocked_times_for(&request.date)
        .await
        .map_err(Error::Store)?;

    let response = match compute_slots(&staff, &service, date, &bookings, &blocked) {
        DayAvailability::NotWorking { day } => AvailabilityResponse {
            success: true,
            slots: Vec::new(),
            working_hours: None,
            message: Some(format!("{} is not a working day", day)),
        },
        DayAvailability::Working { window, slots } => AvailabilityResponse {
            success: true,
            slots,
            working_hours: Some(WorkingHoursBody {
                start: window.start,
                end: window.end,
            }),
            message: None,
        },
    };

    Ok(Json(response))
}

/// Request body for booking creation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "branchId is required"))]
    pub branch_id: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "serviceId is required"))]
    pub service_id: String,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "staffId is required"))]
    pub staff_id: String,
    #[serde(default)]
    pub staff_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "startTime is required"))]
    pub start_time: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    #[validate(length(min = 1, message = "customerName is required"))]
    pub customer_name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,
    #[serde(default)]
    #[validate(custom(function = validate_phone))]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_notes: Option<String>,
}

/// Permissive phone check: digits plus the usual separators
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let acceptable = !phone.is_empty()
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')'));
    if acceptable {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Invalid phone format".into());
        Err(err)
    }
}

/// Flatten derive-produced validation errors into one client-facing line
fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for err in field_errors.iter() {
            match &err.message {
                Some(message) => parts.push(message.to_string()),
                None => parts.push(format!("Invalid value for {}", field)),
            }
        }
    }
    parts.sort();
    parts.join("; ")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    pub booking_id: String,
    pub booking_code: String,
    pub message: String,
}

/// Generate a random 4-digit booking code
fn generate_booking_code() -> String {
    rand::rng().random_range(1000..10000).to_string()
}

/// Handler for booking creation.
///
/// The requested interval is re-validated against the day's current
/// bookings and blocked times before the write, so two customers racing
/// for the same slot get one confirmation and one conflict.
pub async fn book_handler(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    request
        .validate()
        .map_err(|errors| Error::Validation(validation_message(&errors)))?;

    NaiveDate::parse_from_str(&request.date, "%Y-%m-%d")
        .map_err(|_| validation_error("date must be in YYYY-MM-DD format"))?;

    let start = parse_clock_time(&request.start_time)
        .minutes()
        .ok_or_else(|| validation_error("startTime is not a valid time"))?;

    let staff = state
        .store
        .get_staff(&request.staff_id)
        .await
        .map_err(Error::Store)?
        .ok_or_else(|| not_found("Staff member"))?;
    let service = state
        .store
        .get_service(&request.service_id)
        .await
        .map_err(Error::Store)?
        .ok_or_else(|| not_found("Service"))?;
    if service.duration == 0 {
        return Err(validation_error("service duration must be positive"));
    }

    let duration = match request.duration {
        Some(0) => return Err(validation_error("duration must be positive")),
        Some(minutes) => minutes,
        None => service.duration,
    };

    let bookings = state
        .store
        .bookings_for(&staff.id, &request.date)
        .await
        .map_err(Error::Store)?;
    let blocked = state
        .store
        .blocked_times_for(&request.date)
        .await
        .map_err(Error::Store)?;

    if !slot_is_bookable(start, duration, &service, &bookings, &blocked) {
        return Err(Error::SlotUnavailable);
    }

    let now = Utc::now();
    let booking = Booking {
        id: None,
        branch_id: request.branch_id,
        branch_name: request.branch_name.unwrap_or_default(),
        service_id: request.service_id,
        service_name: request.service_name.unwrap_or_default(),
        staff_id: request.staff_id,
        staff_name: request.staff_name.unwrap_or_default(),
        date: request.date,
        start_time: request.start_time,
        duration: Some(duration),
        customer_name: request.customer_name,
        customer_email: request.customer_email,
        customer_phone: request.customer_phone,
        customer_notes: request.customer_notes.unwrap_or_default(),
        booking_code: generate_booking_code(),
        status: BookingStatus::Confirmed,
        channel: "web".to_string(),
        created_at: now,
        updated_at: now,
    };

    let booking_code = booking.booking_code.clone();
    let booking_id = state
        .store
        .insert_booking(&booking)
        .await
        .map_err(Error::Store)?;

    info!(
        booking_id = %booking_id,
        staff_id = %booking.staff_id,
        date = %booking.date,
        "Booking created"
    );

    Ok(Json(BookingResponse {
        success: true,
        booking_id,
        booking_code,
        message: "Booking created successfully".to_string(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchesResponse {
    pub success: bool,
    pub branches: Vec<Branch>,
}

/// Handler listing branches open for online booking
pub async fn branches_handler(
    State(state): State<AppState>,
) -> AppResult<Json<BranchesResponse>> {
    let branches = state.store.list_branches().await.map_err(Error::Store)?;
    Ok(Json(BranchesResponse {
        success: true,
        branches: catalog::visible_branches(&branches),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesQuery {
    pub branch_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesResponse {
    pub success: bool,
    pub services: Vec<Service>,
}

/// Handler listing the services bookable at a branch
pub async fn services_handler(
    State(state): State<AppState>,
    Query(query): Query<ServicesQuery>,
) -> AppResult<Json<ServicesResponse>> {
    let branch_id = query
        .branch_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| validation_error("branchId is required"))?;

    let services = state.store.list_services().await.map_err(Error::Store)?;
    let staff = state.store.list_staff().await.map_err(Error::Store)?;

    Ok(Json(ServicesResponse {
        success: true,
        services: catalog::services_for_branch(&services, &staff, &branch_id),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffQuery {
    pub service_id: Option<String>,
    pub branch_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffResponse {
    pub success: bool,
    pub staff: Vec<Staff>,
}

/// Handler listing the staff members providing a service
pub async fn staff_handler(
    State(state): State<AppState>,
    Query(query): Query<StaffQuery>,
) -> AppResult<Json<StaffResponse>> {
    let service_id = query
        .service_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| validation_error("serviceId is required"))?;

    let staff = state.store.list_staff().await.map_err(Error::Store)?;

    Ok(Json(StaffResponse {
        success: true,
        staff: catalog::staff_for_service(&staff, &service_id, query.branch_id.as_deref()),
    }))
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
