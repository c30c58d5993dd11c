// libs/doctor-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// SLOT LABELS
// ==============================================================================
//
// Stored records key booked slots by two ad hoc labels: a date label of
// the form `5_3_2025` (non-zero-padded, underscore-separated) and a time
// label of the form `2:00 PM`. Both formats must survive round-trips
// byte-for-byte for compatibility with existing documents, so the
// newtypes below normalize on parse and render the canonical label on
// serialize.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlotLabelError {
    #[error("invalid slot date label: {0}")]
    Date(String),

    #[error("invalid slot time label: {0}")]
    Time(String),
}

/// Calendar-date half of a slot, rendered as `D_M_YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotDate(NaiveDate);

impl SlotDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for SlotDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for SlotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use chrono::Datelike;
        write!(f, "{}_{}_{}", self.0.day(), self.0.month(), self.0.year())
    }
}

impl FromStr for SlotDate {
    type Err = SlotLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('_').collect();
        if parts.len() != 3 {
            return Err(SlotLabelError::Date(s.to_string()));
        }

        let day: u32 = parts[0].parse().map_err(|_| SlotLabelError::Date(s.to_string()))?;
        let month: u32 = parts[1].parse().map_err(|_| SlotLabelError::Date(s.to_string()))?;
        let year: i32 = parts[2].parse().map_err(|_| SlotLabelError::Date(s.to_string()))?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(SlotDate)
            .ok_or_else(|| SlotLabelError::Date(s.to_string()))
    }
}

impl TryFrom<String> for SlotDate {
    type Error = SlotLabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotDate> for String {
    fn from(value: SlotDate) -> Self {
        value.to_string()
    }
}

/// Time-of-day half of a slot, rendered as `H:MM AM/PM`. Parsing also
/// accepts 24-hour input (`"14:00"`, or a bare `"14"`) and normalizes it
/// to the 12-hour label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for SlotTime {
    fn from(time: NaiveTime) -> Self {
        // Labels carry no seconds
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = self.0.hour();
        let minute = self.0.minute();
        let (hour12, meridiem) = match hour {
            0 => (12, "AM"),
            h if h < 12 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        write!(f, "{}:{:02} {}", hour12, minute, meridiem)
    }
}

impl FromStr for SlotTime {
    type Err = SlotLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(SlotLabelError::Time(s.to_string()));
        }

        let lower = raw.to_ascii_lowercase();
        let (clock, meridiem) = if let Some(stripped) = lower.strip_suffix("am") {
            (stripped.trim_end().to_string(), Some(false))
        } else if let Some(stripped) = lower.strip_suffix("pm") {
            (stripped.trim_end().to_string(), Some(true))
        } else {
            (lower, None)
        };

        let mut parts = clock.splitn(2, ':');
        let hour_part = parts.next().unwrap_or_default().trim();
        let minute_part = parts.next().map(str::trim);

        let hour: u32 = hour_part
            .parse()
            .map_err(|_| SlotLabelError::Time(s.to_string()))?;
        let minute: u32 = match minute_part {
            Some(m) if !m.is_empty() => {
                m.parse().map_err(|_| SlotLabelError::Time(s.to_string()))?
            }
            _ => 0,
        };

        if minute >= 60 {
            return Err(SlotLabelError::Time(s.to_string()));
        }

        let hour24 = match meridiem {
            Some(is_pm) => {
                if hour == 0 || hour > 12 {
                    return Err(SlotLabelError::Time(s.to_string()));
                }
                match (hour, is_pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, false) => h,
                    (h, true) => h + 12,
                }
            }
            None => {
                if hour > 23 {
                    return Err(SlotLabelError::Time(s.to_string()));
                }
                hour
            }
        };

        NaiveTime::from_hms_opt(hour24, minute, 0)
            .map(SlotTime)
            .ok_or_else(|| SlotLabelError::Time(s.to_string()))
    }
}

impl TryFrom<String> for SlotTime {
    type Error = SlotLabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.to_string()
    }
}

// ==============================================================================
// AVAILABILITY MAP
// ==============================================================================

/// Per-doctor map from date label to the time labels already booked on
/// that date. Lives as a single JSON field on the doctor document: both
/// booking and cancellation read-modify-write the whole map, and nothing
/// in this codebase serializes those writes. Two near-simultaneous
/// bookings for the same doctor can both observe a slot as free before
/// either write lands; the only atomicity is the store's per-document
/// write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookedSlotMap(BTreeMap<SlotDate, Vec<SlotTime>>);

impl BookedSlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_booked(&self, date: SlotDate, time: SlotTime) -> bool {
        self.0.get(&date).is_some_and(|times| times.contains(&time))
    }

    /// Records a booking. Returns false without mutating when the exact
    /// (date, time) pair is already present.
    pub fn insert(&mut self, date: SlotDate, time: SlotTime) -> bool {
        let times = self.0.entry(date).or_default();
        if times.contains(&time) {
            return false;
        }
        times.push(time);
        true
    }

    /// Filter-based release: removes every matching label for the date,
    /// silently doing nothing when the label (or the date) is absent.
    /// An emptied date entry is kept, matching how stored documents look
    /// after cancellation.
    pub fn release(&mut self, date: SlotDate, time: SlotTime) {
        if let Some(times) = self.0.get_mut(&date) {
            times.retain(|t| *t != time);
        }
    }

    pub fn booked_for(&self, date: SlotDate) -> &[SlotTime] {
        self.0.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

// ==============================================================================
// DOCTOR DOCUMENTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub available: bool,
    pub fees: i64,
    pub address: serde_json::Value,
    #[serde(default)]
    pub slots_booked: BookedSlotMap,
    pub created_at: DateTime<Utc>,
}

/// Public listing view: no credentials, no email. The booked-slot map is
/// included because clients compute offerable slots from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListing {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub available: bool,
    pub fees: i64,
    pub address: serde_json::Value,
    pub slots_booked: BookedSlotMap,
}

impl From<Doctor> for DoctorListing {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            image: doctor.image,
            speciality: doctor.speciality,
            degree: doctor.degree,
            experience: doctor.experience,
            about: doctor.about,
            available: doctor.available,
            fees: doctor.fees,
            address: doctor.address,
            slots_booked: doctor.slots_booked,
        }
    }
}

/// Panel view: everything but the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub available: bool,
    pub fees: i64,
    pub address: serde_json::Value,
    pub slots_booked: BookedSlotMap,
    pub created_at: DateTime<Utc>,
}

impl From<Doctor> for DoctorProfile {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            image: doctor.image,
            speciality: doctor.speciality,
            degree: doctor.degree,
            experience: doctor.experience,
            about: doctor.about,
            available: doctor.available,
            fees: doctor.fees,
            address: doctor.address,
            slots_booked: doctor.slots_booked,
            created_at: doctor.created_at,
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: i64,
    pub address: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorProfileRequest {
    pub fees: Option<i64>,
    pub address: Option<serde_json::Value>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAvailabilityRequest {
    pub doc_id: Uuid,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
