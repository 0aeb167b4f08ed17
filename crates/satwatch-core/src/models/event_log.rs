//! Audit trail models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetectionInfo {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub detection_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    pub id: i64,
    pub event_type: String,
    #[serde(default)]
    pub event_type_display: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub detection: Option<i64>,
    #[serde(default)]
    pub detection_info: Option<EventDetectionInfo>,
    #[serde(default)]
    pub alert: Option<i64>,
    #[serde(default)]
    pub region: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub time_since: Option<String>,
}

impl EventLog {
    pub fn label(&self) -> &str {
        self.event_type_display.as_deref().unwrap_or(&self.event_type)
    }
}

/// Response of `GET /events/recent/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentEvents {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub results: Vec<EventLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTypeCount {
    pub event_type: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub count: u64,
}

/// Response of `GET /events/by-type/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsByType {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub by_type: Vec<EventTypeCount>,
}
