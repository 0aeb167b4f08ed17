//! Generated report models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Summary,
    RegionDetail,
    AlertSummary,
    DeforestationTrend,
    WaterQualityTrend,
}

impl ReportType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUMMARY" => Some(ReportType::Summary),
            "REGION_DETAIL" => Some(ReportType::RegionDetail),
            "ALERT_SUMMARY" => Some(ReportType::AlertSummary),
            "DEFORESTATION_TREND" => Some(ReportType::DeforestationTrend),
            "WATER_QUALITY_TREND" => Some(ReportType::WaterQualityTrend),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub name: String,
    pub report_type: String,
    #[serde(default)]
    pub report_type_display: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub file_format: Option<String>,
    #[serde(default)]
    pub generated_by: Option<i64>,
    #[serde(default)]
    pub generated_by_name: Option<String>,
    #[serde(default)]
    pub region: Option<i64>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub report_file_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub processing_error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Report {
    /// Where the report can be downloaded, if anywhere yet
    pub fn download_url(&self) -> Option<&str> {
        self.report_file_url
            .as_deref()
            .or(self.external_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Body of `POST /reports/generate-report/`
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub name: String,
    pub report_type: ReportType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,
}

impl ReportRequest {
    pub fn new(name: &str, report_type: ReportType) -> Self {
        Self {
            name: name.to_string(),
            report_type,
            region_id: None,
            start_date: None,
            end_date: None,
            file_format: None,
        }
    }
}
