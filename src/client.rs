//! Blocking HTTP client for the attendance backend.
//!
//! The backend keeps the login session in a cookie, so a single
//! [`ApiClient`] must be used for the login and every request after it.
use crate::attendance::{AttendanceMap, ClassAttendance};
use crate::calendar::YearMonth;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use time::Date;

pub(crate) const DEFAULT_SERVER: &str = "http://localhost:5001";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    Student,
    Teacher,
    Admin,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct UserProfile {
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) role: Role,
    #[serde(default)]
    pub(crate) class_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: UserProfile,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// A student's request to have an absence excused
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub(crate) struct ExcuseForm {
    date: String,
    excuse_reason: String,
    note: String,
}

impl ExcuseForm {
    /// The reason must contain more than whitespace; the note may be empty.
    /// Both are sent as typed.
    pub(crate) fn new(date: Date, reason: &str, note: &str) -> Result<ExcuseForm, MissingReason> {
        if reason.trim().is_empty() {
            return Err(MissingReason);
        }
        Ok(ExcuseForm {
            // The backend expects unpadded month and day
            date: format!("{}-{}-{}", date.year(), u8::from(date.month()), date.day()),
            excuse_reason: reason.to_owned(),
            note: note.to_owned(),
        })
    }

    pub(crate) fn date(&self) -> &str {
        &self.date
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("a reason for the absence is required")]
pub(crate) struct MissingReason;

#[derive(Debug, Error)]
pub(crate) enum ClientError {
    #[error("could not reach the attendance server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("could not understand the server's response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("only students can submit excuses")]
    NotAStudent,
}

/// The backend operations the calendar views depend on
pub(crate) trait AttendanceApi {
    fn student_attendance(&self, month: YearMonth) -> Result<AttendanceMap, ClientError>;

    fn class_attendance(&self, month: YearMonth) -> Result<ClassAttendance, ClientError>;

    fn submit_excuse(&self, form: &ExcuseForm) -> Result<(), ClientError>;
}

impl<T: AttendanceApi + ?Sized> AttendanceApi for &T {
    fn student_attendance(&self, month: YearMonth) -> Result<AttendanceMap, ClientError> {
        (**self).student_attendance(month)
    }

    fn class_attendance(&self, month: YearMonth) -> Result<ClassAttendance, ClientError> {
        (**self).class_attendance(month)
    }

    fn submit_excuse(&self, form: &ExcuseForm) -> Result<(), ClientError> {
        (**self).submit_excuse(form)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub(crate) fn new(server: &str) -> Result<ApiClient, ClientError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(ApiClient {
            http,
            base: api_base(server),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub(crate) fn login(&self, username: &str, password: &str) -> Result<UserProfile, ClientError> {
        tracing::info!(username, server = %self.base, "Logging in");
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(&Credentials { username, password })
            .send()?;
        let body = check(resp)?.text()?;
        let LoginResponse { user } = serde_json::from_str(&body)?;
        tracing::info!(
            username,
            full_name = %user.full_name,
            role = ?user.role,
            class = ?user.class_name,
            "Logged in"
        );
        Ok(user)
    }

    pub(crate) fn logout(&self) -> Result<(), ClientError> {
        let resp = self.http.post(self.url("/auth/logout")).send()?;
        check(resp)?;
        tracing::info!("Logged out");
        Ok(())
    }

    fn get_month(&self, path: &str, month: YearMonth) -> Result<String, ClientError> {
        tracing::debug!(path, %month, "Fetching attendance");
        let resp = self
            .http
            .get(self.url(path))
            .query(&[
                ("year", month.year().to_string()),
                ("month", month.number().to_string()),
            ])
            .send()?;
        Ok(check(resp)?.text()?)
    }
}

impl AttendanceApi for ApiClient {
    fn student_attendance(&self, month: YearMonth) -> Result<AttendanceMap, ClientError> {
        let body = self.get_month("/student/attendance", month)?;
        Ok(AttendanceMap::from_json(&body)?)
    }

    fn class_attendance(&self, month: YearMonth) -> Result<ClassAttendance, ClientError> {
        let body = self.get_month("/teacher/attendance", month)?;
        Ok(ClassAttendance::from_json(&body)?)
    }

    fn submit_excuse(&self, form: &ExcuseForm) -> Result<(), ClientError> {
        tracing::info!(date = form.date(), "Submitting excuse");
        let resp = self
            .http
            .post(self.url("/student/attendance/excuse"))
            .json(form)
            .send()?;
        check(resp)?;
        Ok(())
    }
}

fn api_base(server: &str) -> String {
    format!("{}/api", server.trim_end_matches('/'))
}

/// Turns a non-success response into a [`ClientError::Status`] carrying the
/// server's explanation
fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let body = resp.text().unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(%status, error = %message, "Request failed");
        Err(ClientError::Status { status, message })
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_owned(),
    }
}
