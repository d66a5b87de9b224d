//! Attendance records as reported by the backend, and the rule for turning a
//! record into the status shown on the calendar.
use crate::calendar::YearMonth;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) enum Status {
    Present,
    #[default]
    Absent,
    Pending,
    Rejected,
}

impl Status {
    /// Parses a status string from the backend.  Anything unrecognized is
    /// treated as an absence.
    fn from_wire(s: &str) -> Status {
        match s {
            "present" => Status::Present,
            "absent" => Status::Absent,
            "pending" => Status::Pending,
            "rejected" => Status::Rejected,
            other => {
                tracing::warn!(status = other, "Unknown attendance status; treating as absent");
                Status::Absent
            }
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Status::Present => "Present",
            Status::Absent => "Absent",
            Status::Pending => "Awaiting review",
            Status::Rejected => "Excuse rejected",
        }
    }

    /// Whether a student may file an excuse for a day with this status
    pub(crate) fn excusable(self) -> bool {
        matches!(self, Status::Absent | Status::Rejected)
    }
}

/// A teacher's decision on an excuse
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Approval {
    Approved,
    Rejected,
    Pending,
}

impl Approval {
    fn from_wire(s: &str) -> Option<Approval> {
        match s {
            "approved" => Some(Approval::Approved),
            "rejected" => Some(Approval::Rejected),
            "pending" => Some(Approval::Pending),
            "" => None,
            other => {
                tracing::warn!(approval = other, "Unknown teacher approval; treating as unset");
                None
            }
        }
    }
}

/// One day's attendance outcome for a student
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct AttendanceRecord {
    pub(crate) status: Status,
    pub(crate) time: String,
    pub(crate) teacher_approval: Option<Approval>,
    pub(crate) teacher_comment: String,
}

impl AttendanceRecord {
    /// The status to display for this record: a pending excuse stays
    /// pending, a rejected excuse overrides the recorded status, and
    /// anything else shows as recorded.
    pub(crate) fn display_status(&self) -> Status {
        resolve_status(self.status, self.teacher_approval)
    }
}

pub(crate) fn resolve_status(status: Status, approval: Option<Approval>) -> Status {
    match (status, approval) {
        (Status::Pending, _) => Status::Pending,
        (_, Some(Approval::Rejected)) => Status::Rejected,
        (s, _) => s,
    }
}

/// The key attendance maps use for a day: `"{month}-{day}"` with a 1-based
/// month and neither part zero-padded
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct DayKey {
    pub(crate) month: u8,
    pub(crate) day: u8,
}

impl DayKey {
    pub(crate) fn new(month: YearMonth, day: u8) -> DayKey {
        DayKey {
            month: month.number(),
            day,
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.month, self.day)
    }
}

impl FromStr for DayKey {
    type Err = DayKeyError;

    fn from_str(s: &str) -> Result<DayKey, DayKeyError> {
        let (month, day) = s.split_once('-').ok_or(DayKeyError)?;
        let month = month.parse::<u8>().map_err(|_| DayKeyError)?;
        let day = day.parse::<u8>().map_err(|_| DayKeyError)?;
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            Ok(DayKey { month, day })
        } else {
            Err(DayKeyError)
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("attendance key is not of the form MONTH-DAY")]
pub(crate) struct DayKeyError;

#[derive(Clone, Debug, Default, Deserialize)]
struct WireRecord {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    teacher_approval: Option<String>,
    #[serde(default)]
    teacher_comment: Option<String>,
}

impl From<WireRecord> for AttendanceRecord {
    fn from(wire: WireRecord) -> AttendanceRecord {
        AttendanceRecord {
            status: wire.status.as_deref().map_or(Status::Absent, Status::from_wire),
            time: wire.time.unwrap_or_default(),
            teacher_approval: wire.teacher_approval.as_deref().and_then(Approval::from_wire),
            teacher_comment: wire.teacher_comment.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    attendance: Option<Map<String, Value>>,
}

/// Splits an `{"attendance": {...}}` response into its well-formed keys and
/// their values.  Malformed keys are logged and dropped.
fn parse_envelope(body: &str) -> Result<Vec<(DayKey, Value)>, serde_json::Error> {
    let envelope = serde_json::from_str::<Envelope>(body)?;
    let mut entries = Vec::new();
    for (key, value) in envelope.attendance.unwrap_or_default() {
        match key.parse::<DayKey>() {
            Ok(k) => entries.push((k, value)),
            Err(_) => tracing::warn!(key = %key, "Skipping attendance entry with malformed key"),
        }
    }
    Ok(entries)
}

/// A student's attendance for one month, keyed by day
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct AttendanceMap(BTreeMap<DayKey, AttendanceRecord>);

impl AttendanceMap {
    pub(crate) fn new() -> AttendanceMap {
        AttendanceMap::default()
    }

    /// Parses a `GET /api/student/attendance` response body.  Entries that
    /// cannot be understood are skipped so that their days fall back to
    /// absent; only a body that is not a JSON object is an error.
    pub(crate) fn from_json(body: &str) -> Result<AttendanceMap, serde_json::Error> {
        let mut map = AttendanceMap::new();
        for (key, value) in parse_envelope(body)? {
            match serde_json::from_value::<WireRecord>(value) {
                Ok(wire) => {
                    map.insert(key, wire.into());
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping malformed attendance record");
                }
            }
        }
        Ok(map)
    }

    pub(crate) fn insert(&mut self, key: DayKey, record: AttendanceRecord) -> &mut Self {
        self.0.insert(key, record);
        self
    }

    pub(crate) fn get(&self, key: DayKey) -> Option<&AttendanceRecord> {
        self.0.get(&key)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// One student's check-in as listed in a teacher's class view
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub(crate) struct StudentEntry {
    #[serde(default)]
    pub(crate) full_name: Option<String>,
    #[serde(default)]
    pub(crate) student_id: Option<String>,
    #[serde(default, deserialize_with = "status_or_absent")]
    pub(crate) status: Status,
    #[serde(default)]
    pub(crate) check_in_time: Option<String>,
}

impl StudentEntry {
    pub(crate) fn name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.student_id.as_deref())
            .unwrap_or("(unnamed student)")
    }
}

fn status_or_absent<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Status, D::Error> {
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.as_deref().map_or(Status::Absent, Status::from_wire))
}

/// A class's check-ins for one month, keyed by day
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ClassAttendance(BTreeMap<DayKey, Vec<StudentEntry>>);

impl ClassAttendance {
    pub(crate) fn new() -> ClassAttendance {
        ClassAttendance::default()
    }

    /// Parses a `GET /api/teacher/attendance` response body, skipping
    /// malformed days and malformed student entries
    pub(crate) fn from_json(body: &str) -> Result<ClassAttendance, serde_json::Error> {
        let mut class = ClassAttendance::new();
        for (key, value) in parse_envelope(body)? {
            let Value::Array(items) = value else {
                tracing::warn!(key = %key, "Skipping class attendance day that is not a list");
                continue;
            };
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                match serde_json::from_value::<StudentEntry>(item) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Skipping malformed student entry");
                    }
                }
            }
            class.insert(key, entries);
        }
        Ok(class)
    }

    pub(crate) fn insert(&mut self, key: DayKey, entries: Vec<StudentEntry>) -> &mut Self {
        self.0.insert(key, entries);
        self
    }

    /// The entries recorded for a day, or `None` if the server sent nothing
    /// for it.  A day can be recorded with no entries.
    pub(crate) fn get(&self, key: DayKey) -> Option<&[StudentEntry]> {
        self.0.get(&key).map(Vec::as_slice)
    }
}
