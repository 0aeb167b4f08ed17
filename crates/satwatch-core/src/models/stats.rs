//! Dashboard and statistics models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedZone {
    pub zone: String,
    #[serde(default)]
    pub detections: u64,
}

/// Response of `GET /stats/dashboard/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_detections: u64,
    #[serde(default)]
    pub active_alerts: u64,
    #[serde(default)]
    pub pending_investigations: u64,
    #[serde(default)]
    pub total_financial_risk: f64,
    #[serde(default)]
    pub analysis_period_days: u32,
    #[serde(default)]
    pub last_analysis_date: Option<String>,
    #[serde(default)]
    pub accuracy_rate: f64,
    #[serde(default)]
    pub high_confidence_detections: u64,
    #[serde(default)]
    pub detections_trend: Vec<DailyCount>,
    #[serde(default)]
    pub alerts_by_level: HashMap<String, u64>,
    #[serde(default)]
    pub affected_zones: Vec<AffectedZone>,
}

impl DashboardStats {
    /// Alert counts sorted by descending count, then name
    pub fn alerts_by_level_sorted(&self) -> Vec<(&str, u64)> {
        let mut levels: Vec<(&str, u64)> = self
            .alerts_by_level
            .iter()
            .map(|(level, count)| (level.as_str(), *count))
            .collect();
        levels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        levels
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyMetrics {
    #[serde(default)]
    pub total_detections: u64,
    #[serde(default)]
    pub critical_situations: u64,
    #[serde(default)]
    pub estimated_financial_impact_fcfa: f64,
    #[serde(default)]
    pub system_accuracy_percent: f64,
    #[serde(default)]
    pub active_field_investigations: u64,
}

/// Response of `GET /stats/summary/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub key_metrics: KeyMetrics,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub next_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendCount {
    pub day: String,
    #[serde(default)]
    pub count: u64,
}

/// Response of `GET /stats/detection-trends/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionTrends {
    #[serde(default)]
    pub period_days: u32,
    #[serde(default)]
    pub daily_detections: Vec<TrendCount>,
    #[serde(default)]
    pub average_confidence: Option<f64>,
    #[serde(default)]
    pub high_confidence_count: u64,
    #[serde(default)]
    pub trend_analysis: Option<String>,
}

impl DetectionTrends {
    pub fn total(&self) -> u64 {
        self.daily_detections.iter().map(|d| d.count).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub risk_level: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub avg_amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomicContext {
    #[serde(default)]
    pub ministry_annual_estimate_fcfa: f64,
    #[serde(default)]
    pub our_detection_percentage: f64,
}

/// Response of `GET /stats/financial-impact/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialImpact {
    #[serde(default)]
    pub total_estimated_loss_fcfa: f64,
    #[serde(default)]
    pub total_affected_area_hectares: f64,
    #[serde(default)]
    pub average_cost_per_hectare_fcfa: f64,
    #[serde(default)]
    pub breakdown_by_risk_level: Vec<RiskBreakdown>,
    #[serde(default)]
    pub economic_context: EconomicContext,
}
