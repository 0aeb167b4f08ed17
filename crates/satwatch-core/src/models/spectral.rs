//! Spectral-index analytics: response records plus the interpretation
//! thresholds and the anomaly score used by the analysis views.
//!
//! - NDVI: vegetation density
//! - NDWI: surface water / moisture
//! - NDTI: soil turbidity and disturbance

use serde::{Deserialize, Serialize};

// ============================================================================
// Response records
// ============================================================================

/// Summary statistics for one index over an image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub stddev: f64,
    #[serde(default)]
    pub computed_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpectralBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl SpectralBounds {
    pub fn center(&self) -> (f64, f64) {
        ((self.north + self.south) / 2.0, (self.east + self.west) / 2.0)
    }
}

/// Tile URLs for the three index layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralMaps {
    #[serde(default)]
    pub ndvi_map_url: Option<String>,
    #[serde(default)]
    pub ndwi_map_url: Option<String>,
    #[serde(default)]
    pub ndti_map_url: Option<String>,
    #[serde(default)]
    pub bounds: SpectralBounds,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapIndices {
    #[serde(default)]
    pub ndvi: IndexStats,
    #[serde(default)]
    pub ndwi: IndexStats,
    #[serde(default)]
    pub ndti: IndexStats,
}

/// Response of `GET /spectral/maps/{image_id}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralMapsData {
    pub image_id: i64,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub capture_date: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub spectral_maps: SpectralMaps,
    #[serde(default)]
    pub indices_data: MapIndices,
}

/// Response of `GET /spectral/indices/{image_id}/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicesData {
    pub image_id: i64,
    #[serde(default)]
    pub ndvi_data: Option<IndexStats>,
    #[serde(default)]
    pub ndwi_data: Option<IndexStats>,
    #[serde(default)]
    pub ndti_data: Option<IndexStats>,
    #[serde(default)]
    pub ndvi_mean: f64,
    #[serde(default)]
    pub ndwi_mean: f64,
    #[serde(default)]
    pub ndti_mean: f64,
    #[serde(default)]
    pub processing_status: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

impl IndicesData {
    pub fn mean(&self, index: SpectralIndex) -> f64 {
        match index {
            SpectralIndex::Ndvi => self.ndvi_mean,
            SpectralIndex::Ndwi => self.ndwi_mean,
            SpectralIndex::Ndti => self.ndti_mean,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(default)]
    pub ndvi_mean: Option<f64>,
    #[serde(default)]
    pub ndwi_mean: Option<f64>,
    #[serde(default)]
    pub ndti_mean: Option<f64>,
    #[serde(default)]
    pub image_id: Option<i64>,
}

/// Response of `GET /spectral/trends/{region_id}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsData {
    pub region_id: i64,
    #[serde(default)]
    pub period: Option<TrendPeriod>,
    #[serde(default)]
    pub trends: Vec<TrendPoint>,
}

// ============================================================================
// Interpretation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralIndex {
    Ndvi,
    Ndwi,
    Ndti,
}

impl SpectralIndex {
    pub const ALL: [SpectralIndex; 3] = [SpectralIndex::Ndvi, SpectralIndex::Ndwi, SpectralIndex::Ndti];
}

impl std::fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpectralIndex::Ndvi => write!(f, "NDVI"),
            SpectralIndex::Ndwi => write!(f, "NDWI"),
            SpectralIndex::Ndti => write!(f, "NDTI"),
        }
    }
}

/// Qualitative reading of an index value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReading {
    pub status: &'static str,
    pub description: &'static str,
}

impl IndexReading {
    const fn new(status: &'static str, description: &'static str) -> Self {
        Self { status, description }
    }
}

/// Map an index value to a qualitative band. Bounds are exclusive.
pub fn interpret_index(value: f64, index: SpectralIndex) -> IndexReading {
    match index {
        SpectralIndex::Ndvi => {
            if value > 0.6 {
                IndexReading::new("excellent", "Very dense vegetation")
            } else if value > 0.4 {
                IndexReading::new("good", "Dense vegetation")
            } else if value > 0.2 {
                IndexReading::new("moderate", "Moderate vegetation")
            } else if value > 0.0 {
                IndexReading::new("poor", "Sparse vegetation")
            } else {
                IndexReading::new("critical", "No vegetation")
            }
        }
        SpectralIndex::Ndwi => {
            if value > 0.3 {
                IndexReading::new("high", "Strong water presence")
            } else if value > 0.1 {
                IndexReading::new("moderate", "Moderate water presence")
            } else if value > -0.1 {
                IndexReading::new("low", "Low moisture")
            } else {
                IndexReading::new("dry", "Dry area")
            }
        }
        SpectralIndex::Ndti => {
            if value > 0.2 {
                IndexReading::new("disturbed", "Heavily disturbed soil")
            } else if value > 0.1 {
                IndexReading::new("modified", "Modified soil")
            } else if value > 0.0 {
                IndexReading::new("slight", "Slight modification")
            } else {
                IndexReading::new("natural", "Natural soil")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Index weights in the anomaly score. Vegetation loss dominates.
const NDVI_WEIGHT: f64 = 0.4;
const NDWI_WEIGHT: f64 = 0.3;
const NDTI_WEIGHT: f64 = 0.3;

const HIGH_RISK_SCORE: f64 = 0.4;
const MEDIUM_RISK_SCORE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyAssessment {
    pub ndvi_anomaly: f64,
    pub ndwi_anomaly: f64,
    pub ndti_anomaly: f64,
    pub anomaly_score: f64,
    pub overall_risk: RiskLevel,
}

/// Compare an image's index means against a reference image.
///
/// Without a reference there is nothing to compare and the result is a
/// zero score with low risk.
pub fn analyze_anomalies(current: &IndicesData, reference: Option<&IndicesData>) -> AnomalyAssessment {
    let Some(reference) = reference else {
        return AnomalyAssessment {
            ndvi_anomaly: 0.0,
            ndwi_anomaly: 0.0,
            ndti_anomaly: 0.0,
            anomaly_score: 0.0,
            overall_risk: RiskLevel::Low,
        };
    };

    let ndvi_anomaly = (current.ndvi_mean - reference.ndvi_mean).abs();
    let ndwi_anomaly = (current.ndwi_mean - reference.ndwi_mean).abs();
    let ndti_anomaly = (current.ndti_mean - reference.ndti_mean).abs();

    let anomaly_score =
        ndvi_anomaly * NDVI_WEIGHT + ndwi_anomaly * NDWI_WEIGHT + ndti_anomaly * NDTI_WEIGHT;

    let overall_risk = if anomaly_score > HIGH_RISK_SCORE {
        RiskLevel::High
    } else if anomaly_score > MEDIUM_RISK_SCORE {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    AnomalyAssessment {
        ndvi_anomaly,
        ndwi_anomaly,
        ndti_anomaly,
        anomaly_score,
        overall_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(ndvi: f64, ndwi: f64, ndti: f64) -> IndicesData {
        IndicesData {
            image_id: 1,
            ndvi_mean: ndvi,
            ndwi_mean: ndwi,
            ndti_mean: ndti,
            ..IndicesData::default()
        }
    }

    #[test]
    fn test_interpret_ndvi_bands() {
        assert_eq!(interpret_index(0.75, SpectralIndex::Ndvi).status, "excellent");
        assert_eq!(interpret_index(0.5, SpectralIndex::Ndvi).status, "good");
        assert_eq!(interpret_index(0.3, SpectralIndex::Ndvi).status, "moderate");
        assert_eq!(interpret_index(0.1, SpectralIndex::Ndvi).status, "poor");
        assert_eq!(interpret_index(0.0, SpectralIndex::Ndvi).status, "critical");
        assert_eq!(interpret_index(-0.3, SpectralIndex::Ndvi).status, "critical");
    }

    #[test]
    fn test_interpret_ndwi_bands() {
        assert_eq!(interpret_index(0.35, SpectralIndex::Ndwi).status, "high");
        assert_eq!(interpret_index(0.2, SpectralIndex::Ndwi).status, "moderate");
        assert_eq!(interpret_index(0.0, SpectralIndex::Ndwi).status, "low");
        assert_eq!(interpret_index(-0.1, SpectralIndex::Ndwi).status, "dry");
    }

    #[test]
    fn test_interpret_ndti_bands() {
        assert_eq!(interpret_index(0.25, SpectralIndex::Ndti).status, "disturbed");
        assert_eq!(interpret_index(0.15, SpectralIndex::Ndti).status, "modified");
        assert_eq!(interpret_index(0.05, SpectralIndex::Ndti).status, "slight");
        assert_eq!(interpret_index(-0.02, SpectralIndex::Ndti).status, "natural");
    }

    #[test]
    fn test_analyze_without_reference() {
        let assessment = analyze_anomalies(&indices(0.1, 0.1, 0.3), None);
        assert_eq!(assessment.anomaly_score, 0.0);
        assert_eq!(assessment.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn test_analyze_weighted_score() {
        // Vegetation dropped by 0.5, water unchanged, turbidity up by 0.5
        let current = indices(0.1, 0.05, 0.6);
        let reference = indices(0.6, 0.05, 0.1);
        let assessment = analyze_anomalies(&current, Some(&reference));

        assert!((assessment.ndvi_anomaly - 0.5).abs() < 1e-9);
        assert!(assessment.ndwi_anomaly.abs() < 1e-9);
        assert!((assessment.anomaly_score - 0.35).abs() < 1e-9);
        assert_eq!(assessment.overall_risk, RiskLevel::Medium);
    }

    #[test]
    fn test_analyze_risk_bands() {
        let reference = indices(0.0, 0.0, 0.0);
        assert_eq!(analyze_anomalies(&indices(0.1, 0.1, 0.1), Some(&reference)).overall_risk, RiskLevel::Low);
        assert_eq!(analyze_anomalies(&indices(1.0, 0.5, 0.5), Some(&reference)).overall_risk, RiskLevel::High);
    }

    #[test]
    fn test_parse_spectral_maps() {
        let json = r#"{
            "image_id": 17,
            "image_name": "S2_BONDOUKOU_20240312",
            "capture_date": "2024-03-12",
            "region": "BONDOUKOU",
            "spectral_maps": {
                "ndvi_map_url": "https://earthengine.googleapis.com/ndvi/{z}/{x}/{y}",
                "ndwi_map_url": null,
                "ndti_map_url": null,
                "bounds": {"north": 8.2, "south": 7.8, "east": -2.6, "west": -3.0}
            },
            "indices_data": {
                "ndvi": {"mean": 0.41, "stddev": 0.08, "computed_at": "2024-03-13T08:00:00Z"},
                "ndwi": {"mean": -0.05, "stddev": 0.02, "computed_at": "2024-03-13T08:00:00Z"},
                "ndti": {"mean": 0.12, "stddev": 0.04, "computed_at": "2024-03-13T08:00:00Z"}
            }
        }"#;
        let maps: SpectralMapsData = serde_json::from_str(json).expect("parse maps");
        let (lat, lon) = maps.spectral_maps.bounds.center();
        assert!((lat - 8.0).abs() < 1e-9);
        assert!((lon + 2.8).abs() < 1e-9);
        assert_eq!(maps.indices_data.ndvi.mean, 0.41);
    }

    #[test]
    fn test_parse_trends() {
        let json = r#"{
            "region_id": 4,
            "period": {"start": "2024-01-01", "end": "2024-03-31"},
            "trends": [{"date": "2024-01-15", "ndvi_mean": 0.52, "ndwi_mean": 0.01, "ndti_mean": 0.05, "image_id": 11}]
        }"#;
        let trends: TrendsData = serde_json::from_str(json).expect("parse trends");
        assert_eq!(trends.trends.len(), 1);
        assert_eq!(trends.trends[0].image_id, Some(11));
    }
}
