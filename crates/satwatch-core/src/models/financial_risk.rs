use serde::{Deserialize, Serialize};

use super::alert::AlertLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDetectionInfo {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub detection_type: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub coordinates: Option<String>,
}

/// Estimated financial loss attached to a detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRisk {
    pub id: i64,
    #[serde(default)]
    pub detection: Option<i64>,
    #[serde(default)]
    pub detection_info: Option<RiskDetectionInfo>,
    #[serde(default)]
    pub area_hectares: f64,
    #[serde(default)]
    pub cost_per_hectare: f64,
    #[serde(default)]
    pub estimated_loss: f64,
    #[serde(default)]
    pub sensitive_zone_distance_km: Option<f64>,
    #[serde(default)]
    pub occurrence_count: u32,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl FinancialRisk {
    /// Risk levels share the alert criticality scale
    pub fn level(&self) -> AlertLevel {
        AlertLevel::from_str(&self.risk_level)
    }
}

/// Response of `GET /financial-risks/high-impact/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighImpactRisks {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_estimated_loss: f64,
    #[serde(default)]
    pub results: Vec<FinancialRisk>,
}
