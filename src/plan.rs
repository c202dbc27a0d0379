// src/plan.rs
//
// Core domain types for the shift plan: the closed role/shift/absence/color
// enumerations with their wire strings, the record types, day normalization
// and the error taxonomy shared by every write path.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EmployeeId = String;

// --- Error Types ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Mandatory field missing: {0}")]
    MissingField(&'static str),
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),
    #[error("Unknown shift: '{0}'")]
    UnknownShift(String),
    #[error("Unknown absence type: '{0}'")]
    UnknownAbsenceType(String),
    #[error("Unknown color: '{0}'")]
    UnknownColor(String),
    #[error("Invalid date: '{0}'")]
    BadDate(String),
    #[error("Invalid month: '{0}' (expected YYYY-MM)")]
    BadMonth(String),
    #[error("Range start {start} is after range end {end}")]
    RangeInverted { start: NaiveDate, end: NaiveDate },
    #[error("An assignment needs either a registered employee or a custom name")]
    NothingToAssign,
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound { employee_id: EmployeeId },
    #[error("Another employee is already named '{name}'")]
    NameTaken { name: String },
    #[error("{name} is marked sick on {date} and cannot be assigned")]
    SickDay { name: String, date: NaiveDate },
    #[error("Role '{role}' may not take the position '{position}'")]
    ForbiddenPosition { role: String, position: String },
    #[error("Storage failure: {0}")]
    Storage(String),
}

// --- Role enumeration ---

/// Closed set of production roles. The wire strings are the German role
/// names used on the printed plan; anything outside this set is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Packer,
    Linienfuehrer,
    Maschinenfuehrer,
    MaschineLinienbediener,
    MaschineAnlagenfuehrerAzubis,
    Vorarbeiter,
    Schichtleiter,
    Springer,
    Reiniger,
    Lagerist,
    Staplerfahrer,
    Qualitaetspruefer,
    Techniker,
    Auszubildender,
    Produktionshelfer,
    Teamleiter,
}

pub const ALL_ROLES: [Role; 16] = [
    Role::Packer,
    Role::Linienfuehrer,
    Role::Maschinenfuehrer,
    Role::MaschineLinienbediener,
    Role::MaschineAnlagenfuehrerAzubis,
    Role::Vorarbeiter,
    Role::Schichtleiter,
    Role::Springer,
    Role::Reiniger,
    Role::Lagerist,
    Role::Staplerfahrer,
    Role::Qualitaetspruefer,
    Role::Techniker,
    Role::Auszubildender,
    Role::Produktionshelfer,
    Role::Teamleiter,
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Packer => "Packer",
            Role::Linienfuehrer => "Linienführer",
            Role::Maschinenfuehrer => "Maschinenführer",
            Role::MaschineLinienbediener => "Maschine/Linienbediner",
            Role::MaschineAnlagenfuehrerAzubis => "Maschine/Anlagenführer AZUBIS",
            Role::Vorarbeiter => "Vorarbeiter/in",
            Role::Schichtleiter => "Schichtleiter",
            Role::Springer => "Springer",
            Role::Reiniger => "Reiniger",
            Role::Lagerist => "Lagerist",
            Role::Staplerfahrer => "Staplerfahrer",
            Role::Qualitaetspruefer => "Qualitätsprüfer",
            Role::Techniker => "Techniker",
            Role::Auszubildender => "Auszubildende/r",
            Role::Produktionshelfer => "Produktionshelfer",
            Role::Teamleiter => "Teamleiter",
        }
    }

    pub fn parse(s: &str) -> Result<Role, PlanError> {
        ALL_ROLES
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| PlanError::UnknownRole(s.to_string()))
    }
}

// --- Shift enumeration ---

/// The three daily shifts plus the synthetic "Sonder" pseudo-shift that
/// carries the cross-shift special-role slots (canteen duty etc.). Sonder
/// slots always use an empty line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Frueh,
    Spaet,
    Nacht,
    Sonder,
}

pub const PRODUCTION_SHIFTS: [Shift; 3] = [Shift::Frueh, Shift::Spaet, Shift::Nacht];

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Frueh => "Früh",
            Shift::Spaet => "Spät",
            Shift::Nacht => "Nacht",
            Shift::Sonder => "Sonder",
        }
    }

    pub fn parse(s: &str) -> Result<Shift, PlanError> {
        match s {
            "Früh" => Ok(Shift::Frueh),
            "Spät" => Ok(Shift::Spaet),
            "Nacht" => Ok(Shift::Nacht),
            "Sonder" => Ok(Shift::Sonder),
            other => Err(PlanError::UnknownShift(other.to_string())),
        }
    }
}

// --- Absence types ---

/// Per-day absence codes. U/ZA/K count toward the personal totals,
/// FEIERTAG is a calendar fact, and F/S/N are transient shift-preference
/// markers that are stored but never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbsenceType {
    Urlaub,
    Zeitausgleich,
    Krank,
    Feiertag,
    WunschFrueh,
    WunschSpaet,
    WunschNacht,
}

impl AbsenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsenceType::Urlaub => "U",
            AbsenceType::Zeitausgleich => "ZA",
            AbsenceType::Krank => "K",
            AbsenceType::Feiertag => "FEIERTAG",
            AbsenceType::WunschFrueh => "F",
            AbsenceType::WunschSpaet => "S",
            AbsenceType::WunschNacht => "N",
        }
    }

    pub fn parse(s: &str) -> Result<AbsenceType, PlanError> {
        match s {
            "U" => Ok(AbsenceType::Urlaub),
            "ZA" => Ok(AbsenceType::Zeitausgleich),
            "K" => Ok(AbsenceType::Krank),
            "FEIERTAG" => Ok(AbsenceType::Feiertag),
            "F" => Ok(AbsenceType::WunschFrueh),
            "S" => Ok(AbsenceType::WunschSpaet),
            "N" => Ok(AbsenceType::WunschNacht),
            other => Err(PlanError::UnknownAbsenceType(other.to_string())),
        }
    }

    /// U/ZA/K appear in personal totals and the day summary badges.
    pub fn is_countable(&self) -> bool {
        matches!(
            self,
            AbsenceType::Urlaub | AbsenceType::Zeitausgleich | AbsenceType::Krank
        )
    }
}

// --- Color tags ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Gelb,
    Gruen,
    Blau,
    Rot,
    Orange,
    Lila,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Gelb => "gelb",
            Color::Gruen => "grün",
            Color::Blau => "blau",
            Color::Rot => "rot",
            Color::Orange => "orange",
            Color::Lila => "lila",
        }
    }

    pub fn parse(s: &str) -> Result<Color, PlanError> {
        match s {
            "gelb" => Ok(Color::Gelb),
            "grün" => Ok(Color::Gruen),
            "blau" => Ok(Color::Blau),
            "rot" => Ok(Color::Rot),
            "orange" => Ok(Color::Orange),
            "lila" => Ok(Color::Lila),
            other => Err(PlanError::UnknownColor(other.to_string())),
        }
    }
}

// Serde plumbing: all four enums travel as their wire strings.

macro_rules! wire_serde {
    ($t:ty) => {
        impl Serialize for $t {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                <$t>::parse(&s).map_err(de::Error::custom)
            }
        }
    };
}

wire_serde!(Role);
wire_serde!(Shift);
wire_serde!(AbsenceType);
wire_serde!(Color);

// --- Record types ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: AbsenceType,
}

/// One staffing decision for a single slot. Exactly one of `employee_id`
/// and `custom_name` is set on a stored record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub date: NaiveDate,
    pub shift: Shift,
    pub line: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Denormalized ISO week of `date`, kept for query convenience.
    pub calendar_week: u32,
}

/// The unique key identifying one assignable unit of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub shift: Shift,
    pub line: String,
    pub position: String,
}

// --- Calendar helpers ---

/// Normalizes a request date string to a calendar day. Plain days, local
/// datetime strings and RFC 3339 timestamps all collapse to the same day,
/// so "2025-06-01T08:00" and "2025-06-01T20:00" hit the same record.
pub fn parse_day(s: &str) -> Result<NaiveDate, PlanError> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    Err(PlanError::BadDate(s.to_string()))
}

/// ISO-8601 week number (Thursday-anchored) of a day.
pub fn iso_week_of(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Half-open day window [first, next_first) for a "YYYY-MM" month string.
pub fn month_bounds(ym: &str) -> Result<(NaiveDate, NaiveDate), PlanError> {
    let mut parts = ym.splitn(2, '-');
    let year: i32 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| PlanError::BadMonth(ym.to_string()))?;
    let month: u32 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| PlanError::BadMonth(ym.to_string()))?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| PlanError::BadMonth(ym.to_string()))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| PlanError::BadMonth(ym.to_string()))?;
    Ok((first, next_first))
}
