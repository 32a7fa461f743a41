use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Answer produced from the indexed course documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,
    /// Document names the answer was drawn from, when the backend lists them
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableAnswer {
    pub question: String,
    pub answer: String,
}

/// One published timetable document for the student's group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub group_id: i64,
    pub title: String,
    #[serde(default)]
    pub period: Option<String>,
    /// Upload time as reported by the backend (no offset)
    pub created_at: NaiveDateTime,
}

/// The payload of a response body.
///
/// Assistant routes answer with bare objects, but an enveloped `data` member
/// is accepted too.
pub(crate) fn payload(body: &Value) -> &Value {
    match body.get("data") {
        Some(data) if !data.is_null() => data,
        _ => body,
    }
}
