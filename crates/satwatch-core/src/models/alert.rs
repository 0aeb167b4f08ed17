//! Alert models.

use serde::{Deserialize, Serialize};

/// Criticality of an alert, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => AlertLevel::Low,
            "MEDIUM" => AlertLevel::Medium,
            "HIGH" => AlertLevel::High,
            "CRITICAL" => AlertLevel::Critical,
            _ => AlertLevel::Unknown,
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Unknown => write!(f, "Unknown"),
            AlertLevel::Low => write!(f, "Low"),
            AlertLevel::Medium => write!(f, "Medium"),
            AlertLevel::High => write!(f, "High"),
            AlertLevel::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    FalseAlarm,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "ACTIVE",
            AlertStatus::Acknowledged => "ACKNOWLEDGED",
            AlertStatus::Resolved => "RESOLVED",
            AlertStatus::FalseAlarm => "FALSE_ALARM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ACTIVE" => Some(AlertStatus::Active),
            "ACKNOWLEDGED" => Some(AlertStatus::Acknowledged),
            "RESOLVED" => Some(AlertStatus::Resolved),
            "FALSE_ALARM" => Some(AlertStatus::FalseAlarm),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection summary embedded in an alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDetectionInfo {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub detection_type: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub area_hectares: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detection: Option<i64>,
    #[serde(default)]
    pub detection_info: Option<AlertDetectionInfo>,
    #[serde(default)]
    pub region: Option<i64>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub alert_status: String,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub time_since_created: Option<String>,
}

impl Alert {
    pub fn level(&self) -> AlertLevel {
        AlertLevel::from_str(&self.level)
    }

    pub fn status(&self) -> Option<AlertStatus> {
        AlertStatus::from_str(&self.alert_status)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status(), Some(AlertStatus::Active | AlertStatus::Acknowledged))
    }
}

/// Body of `PATCH /alerts/{id}/status/`
#[derive(Debug, Clone, Serialize)]
pub struct AlertStatusUpdate {
    pub alert_status: AlertStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<i64>,
}

/// Response of the status action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertUpdate {
    #[serde(default)]
    pub message: String,
    pub data: Alert,
}
