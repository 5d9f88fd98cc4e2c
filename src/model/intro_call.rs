use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntroCall {
    pub name: String,
    pub email: String,
    pub location: CallLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub guests: Vec<String>,
    pub date: DateTime<Utc>,
    /// Call length in minutes.
    pub duration: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CallLocation {
    #[serde(rename = "Google Meet")]
    GoogleMeet,
    Phone,
}

impl CallLocation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Google Meet" => Some(Self::GoogleMeet),
            "Phone" => Some(Self::Phone),
            _ => None,
        }
    }
}
