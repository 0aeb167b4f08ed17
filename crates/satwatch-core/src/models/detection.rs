//! Anomaly detection models.

use serde::{Deserialize, Serialize};

/// Kind of anomaly the detector flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionType {
    MiningSite,
    WaterPollution,
    Deforestation,
    SoilDisturbance,
    Other,
}

impl DetectionType {
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "MINING_SITE" => DetectionType::MiningSite,
            "WATER_POLLUTION" => DetectionType::WaterPollution,
            "DEFORESTATION" => DetectionType::Deforestation,
            "SOIL_DISTURBANCE" => DetectionType::SoilDisturbance,
            _ => DetectionType::Other,
        }
    }
}

impl std::fmt::Display for DetectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionType::MiningSite => write!(f, "Mining site"),
            DetectionType::WaterPollution => write!(f, "Water pollution"),
            DetectionType::Deforestation => write!(f, "Deforestation"),
            DetectionType::SoilDisturbance => write!(f, "Soil disturbance"),
            DetectionType::Other => write!(f, "Other"),
        }
    }
}

/// Review state of a detection. Serialized in the backend's wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Detected,
    Validated,
    FalsePositive,
    Confirmed,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Detected => "DETECTED",
            ValidationStatus::Validated => "VALIDATED",
            ValidationStatus::FalsePositive => "FALSE_POSITIVE",
            ValidationStatus::Confirmed => "CONFIRMED",
        }
    }

    /// States a reviewer may set. `Detected` is only assigned by the detector.
    pub fn is_review_outcome(&self) -> bool {
        !matches!(self, ValidationStatus::Detected)
    }

    /// Accepts the wire form as well as lowercase/dashed variants
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "DETECTED" => Some(ValidationStatus::Detected),
            "VALIDATED" => Some(ValidationStatus::Validated),
            "FALSE_POSITIVE" => Some(ValidationStatus::FalsePositive),
            "CONFIRMED" => Some(ValidationStatus::Confirmed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub id: i64,
    #[serde(default)]
    pub image: Option<i64>,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub image_capture_date: Option<String>,
    #[serde(default)]
    pub region: Option<i64>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub detection_type: String,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub area_hectares: Option<f64>,
    #[serde(default)]
    pub ndvi_anomaly_score: Option<f64>,
    #[serde(default)]
    pub ndwi_anomaly_score: Option<f64>,
    #[serde(default)]
    pub ndti_anomaly_score: Option<f64>,
    #[serde(default)]
    pub validation_status: String,
    #[serde(default)]
    pub validated_by: Option<i64>,
    #[serde(default)]
    pub validated_by_name: Option<String>,
    #[serde(default)]
    pub validated_at: Option<String>,
    #[serde(default)]
    pub detection_date: Option<String>,
    #[serde(default)]
    pub algorithm_version: Option<String>,
}

/// Response of the validate action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionUpdate {
    #[serde(default)]
    pub message: String,
    pub data: Detection,
}

/// Confidence at or above which the backend lists a detection as high-confidence
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

impl Detection {
    pub fn kind(&self) -> DetectionType {
        DetectionType::from_str(&self.detection_type)
    }

    pub fn status(&self) -> Option<ValidationStatus> {
        ValidationStatus::from_str(&self.validation_status)
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence_score >= HIGH_CONFIDENCE_THRESHOLD
    }

    /// "lat, lon" with 5 decimals, if both are known
    pub fn coordinates(&self) -> Option<String> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(format!("{:.5}, {:.5}", lat, lon)),
            _ => None,
        }
    }
}
