use serde::{Deserialize, Serialize};

/// A monitored administrative region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub area_km2: Option<f64>,
    #[serde(default)]
    pub center_lat: Option<f64>,
    #[serde(default)]
    pub center_lon: Option<f64>,
    #[serde(default)]
    pub monitored_zones: Vec<String>,
    #[serde(default)]
    pub authorized_sites: Vec<String>,
    #[serde(default)]
    pub protected_zones: Vec<String>,
}
