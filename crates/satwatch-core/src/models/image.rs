//! Satellite image and analysis-run models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl ProcessingStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(ProcessingStatus::Pending),
            "PROCESSING" => Some(ProcessingStatus::Processing),
            "COMPLETED" => Some(ProcessingStatus::Completed),
            "ERROR" => Some(ProcessingStatus::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Pending => write!(f, "Pending"),
            ProcessingStatus::Processing => write!(f, "Processing"),
            ProcessingStatus::Completed => write!(f, "Completed"),
            ProcessingStatus::Error => write!(f, "Error"),
        }
    }
}

/// A satellite scene ingested by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub name: String,
    pub capture_date: Option<String>,
    #[serde(default)]
    pub satellite_source: Option<String>,
    #[serde(default)]
    pub cloud_coverage: Option<f64>,
    #[serde(default)]
    pub resolution: Option<f64>,
    #[serde(default)]
    pub gee_asset_id: Option<String>,
    #[serde(default)]
    pub gee_collection: Option<String>,
    #[serde(default)]
    pub processing_status: String,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub processing_error: Option<String>,
    #[serde(default)]
    pub ndvi_mean: Option<f64>,
    #[serde(default)]
    pub ndwi_mean: Option<f64>,
    #[serde(default)]
    pub ndti_mean: Option<f64>,
    #[serde(default)]
    pub region: Option<i64>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub requested_by: Option<i64>,
    #[serde(default)]
    pub requested_by_name: Option<String>,
    #[serde(default)]
    pub center_lat: Option<f64>,
    #[serde(default)]
    pub center_lon: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Image {
    pub fn status(&self) -> Option<ProcessingStatus> {
        ProcessingStatus::from_str(&self.processing_status)
    }

    /// True once spectral means are available
    pub fn has_indices(&self) -> bool {
        self.ndvi_mean.is_some() && self.ndwi_mean.is_some() && self.ndti_mean.is_some()
    }
}

/// Counters reported by a completed analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub images_processed: u64,
    #[serde(default)]
    pub detections_found: u64,
    #[serde(default)]
    pub alerts_generated: u64,
    #[serde(default)]
    pub investigations_created: u64,
    #[serde(default)]
    pub analysis_date: Option<String>,
}

/// Response of `POST /analysis/run/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<AnalysisSummary>,
    #[serde(default)]
    pub errors: Vec<String>,
}
