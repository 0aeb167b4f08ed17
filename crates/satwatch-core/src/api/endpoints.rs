//! Typed endpoint calls, one method per backend operation.
//!
//! Every call goes through the session-aware pipeline in `client.rs`, so
//! each one gets bearer authentication and the one-shot refresh.

use serde::Serialize;

use crate::models::{
    AgentAssignment, AgentAvailability, Alert, AlertStatus, AlertStatusUpdate, AlertUpdate,
    AnalysisRun, AssignmentResult, DashboardStats, Detection, DetectionTrends, DetectionUpdate,
    EventLog, EventsByType, ExecutiveSummary, FinancialImpact, FinancialRisk, HighImpactRisks,
    Image, IndicesData, Investigation, MessageResponse, Page, PasswordChange, ProfileUpdate,
    RecentEvents, Region, Report, ReportRequest, ResultSubmission, ResultUpdate,
    SpectralMapsData, TrendsData, UserProfile, ValidationStatus,
};

use super::{ApiClient, ApiError};

/// Default look-back window for detection trends
const DEFAULT_TREND_DAYS: u32 = 30;

/// Default look-back window for an analysis run
pub const DEFAULT_ANALYSIS_MONTHS: u32 = 3;

/// Query parameters for collection endpoints.
///
/// Pages are 1-based, as the backend expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn ordering(mut self, field: &str) -> Self {
        self.ordering = Some(field.to_string());
        self
    }

    pub fn filter(mut self, key: &str, value: impl ToString) -> Self {
        self.filters.push((key.to_string(), value.to_string()));
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size".to_string(), size.to_string()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(ref ordering) = self.ordering {
            pairs.push(("ordering".to_string(), ordering.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

#[derive(Debug, Serialize)]
struct ValidationUpdate {
    validation_status: ValidationStatus,
}

#[derive(Debug, Serialize)]
struct AnalysisRequest {
    months_back: u32,
}

impl ApiClient {
    // ===== Account =====

    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.get("/account/profile/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.put("/account/profile/", update).await
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let body = PasswordChange {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.post("/account/change-password/", &body).await
    }

    // ===== Images & analysis =====

    pub async fn fetch_images(&self, query: &ListQuery) -> Result<Page<Image>, ApiError> {
        self.get_with_query("/images/", query.to_pairs()).await
    }

    pub async fn fetch_image(&self, id: i64) -> Result<Image, ApiError> {
        self.get(&format!("/images/{}/", id)).await
    }

    pub async fn fetch_recent_images(&self) -> Result<Page<Image>, ApiError> {
        self.get("/images/recent/").await
    }

    /// Ask the backend to ingest and analyse imagery from the last `months_back` months
    pub async fn run_analysis(&self, months_back: u32) -> Result<AnalysisRun, ApiError> {
        self.post("/analysis/run/", &AnalysisRequest { months_back }).await
    }

    // ===== Detections =====

    pub async fn fetch_detections(&self, query: &ListQuery) -> Result<Page<Detection>, ApiError> {
        self.get_with_query("/detections/", query.to_pairs()).await
    }

    pub async fn fetch_detection(&self, id: i64) -> Result<Detection, ApiError> {
        self.get(&format!("/detections/{}/", id)).await
    }

    pub async fn fetch_high_confidence_detections(&self) -> Result<Page<Detection>, ApiError> {
        self.get("/detections/high-confidence/").await
    }

    /// Record a review outcome. The backend answers with `{message, data}`.
    pub async fn validate_detection(
        &self,
        id: i64,
        status: ValidationStatus,
    ) -> Result<Detection, ApiError> {
        let body = ValidationUpdate {
            validation_status: status,
        };
        let update: DetectionUpdate = self.patch(&format!("/detections/{}/validate/", id), &body).await?;
        Ok(update.data)
    }

    pub async fn delete_detection(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/detections/{}/", id)).await
    }

    // ===== Alerts =====

    pub async fn fetch_alerts(&self, query: &ListQuery) -> Result<Page<Alert>, ApiError> {
        self.get_with_query("/alerts/", query.to_pairs()).await
    }

    pub async fn fetch_alert(&self, id: i64) -> Result<Alert, ApiError> {
        self.get(&format!("/alerts/{}/", id)).await
    }

    pub async fn fetch_active_alerts(&self) -> Result<Page<Alert>, ApiError> {
        self.get("/alerts/active/").await
    }

    pub async fn fetch_critical_alerts(&self) -> Result<Page<Alert>, ApiError> {
        self.get("/alerts/critical/").await
    }

    pub async fn update_alert_status(
        &self,
        id: i64,
        status: AlertStatus,
        assigned_to: Option<i64>,
    ) -> Result<Alert, ApiError> {
        let body = AlertStatusUpdate {
            alert_status: status,
            assigned_to,
        };
        let update: AlertUpdate = self.patch(&format!("/alerts/{}/status/", id), &body).await?;
        Ok(update.data)
    }

    // ===== Investigations =====

    pub async fn fetch_investigations(&self, query: &ListQuery) -> Result<Page<Investigation>, ApiError> {
        self.get_with_query("/investigations/", query.to_pairs()).await
    }

    pub async fn fetch_investigation(&self, id: i64) -> Result<Investigation, ApiError> {
        self.get(&format!("/investigations/{}/", id)).await
    }

    pub async fn fetch_pending_investigations(&self) -> Result<Page<Investigation>, ApiError> {
        self.get("/investigations/pending/").await
    }

    pub async fn fetch_my_investigations(&self) -> Result<Page<Investigation>, ApiError> {
        self.get("/investigations/assigned-to-me/").await
    }

    pub async fn fetch_available_agents(&self) -> Result<AgentAvailability, ApiError> {
        self.get("/investigations/available-agents/").await
    }

    pub async fn assign_investigation(
        &self,
        id: i64,
        assignment: &AgentAssignment,
    ) -> Result<AssignmentResult, ApiError> {
        self.patch(&format!("/investigations/{}/assign/", id), assignment).await
    }

    pub async fn submit_investigation_result(
        &self,
        id: i64,
        submission: &ResultSubmission,
    ) -> Result<ResultUpdate, ApiError> {
        self.patch(&format!("/investigations/{}/result/", id), submission).await
    }

    // ===== Regions =====

    /// Regions are few and returned as a plain array
    pub async fn fetch_regions(&self) -> Result<Vec<Region>, ApiError> {
        self.get("/regions/").await
    }

    pub async fn fetch_region(&self, id: i64) -> Result<Region, ApiError> {
        self.get(&format!("/regions/{}/", id)).await
    }

    // ===== Financial risks =====

    pub async fn fetch_financial_risks(&self, query: &ListQuery) -> Result<Page<FinancialRisk>, ApiError> {
        self.get_with_query("/financial-risks/", query.to_pairs()).await
    }

    pub async fn fetch_financial_risk(&self, id: i64) -> Result<FinancialRisk, ApiError> {
        self.get(&format!("/financial-risks/{}/", id)).await
    }

    pub async fn fetch_high_impact_risks(&self) -> Result<HighImpactRisks, ApiError> {
        self.get("/financial-risks/high-impact/").await
    }

    // ===== Event logs =====

    pub async fn fetch_event_logs(&self, query: &ListQuery) -> Result<Page<EventLog>, ApiError> {
        self.get_with_query("/events/", query.to_pairs()).await
    }

    pub async fn fetch_recent_events(&self) -> Result<RecentEvents, ApiError> {
        self.get("/events/recent/").await
    }

    pub async fn fetch_events_by_type(&self) -> Result<EventsByType, ApiError> {
        self.get("/events/by-type/").await
    }

    // ===== Spectral analytics =====

    pub async fn fetch_spectral_maps(&self, image_id: i64) -> Result<SpectralMapsData, ApiError> {
        self.get(&format!("/spectral/maps/{}/", image_id)).await
    }

    pub async fn fetch_spectral_indices(&self, image_id: i64) -> Result<IndicesData, ApiError> {
        self.get(&format!("/spectral/indices/{}/", image_id)).await
    }

    pub async fn fetch_spectral_trends(&self, region_id: i64) -> Result<TrendsData, ApiError> {
        self.get(&format!("/spectral/trends/{}/", region_id)).await
    }

    // ===== Statistics =====

    pub async fn fetch_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/stats/dashboard/").await
    }

    pub async fn fetch_executive_summary(&self) -> Result<ExecutiveSummary, ApiError> {
        self.get("/stats/summary/").await
    }

    pub async fn fetch_detection_trends(&self, days: Option<u32>) -> Result<DetectionTrends, ApiError> {
        let days = days.unwrap_or(DEFAULT_TREND_DAYS);
        self.get_with_query(
            "/stats/detection-trends/",
            vec![("days".to_string(), days.to_string())],
        )
        .await
    }

    pub async fn fetch_financial_impact(&self) -> Result<FinancialImpact, ApiError> {
        self.get("/stats/financial-impact/").await
    }

    // ===== Reports =====

    pub async fn fetch_reports(&self, query: &ListQuery) -> Result<Page<Report>, ApiError> {
        self.get_with_query("/reports/", query.to_pairs()).await
    }

    pub async fn fetch_report(&self, id: i64) -> Result<Report, ApiError> {
        self.get(&format!("/reports/{}/", id)).await
    }

    /// Queue report generation. The returned report is usually still pending.
    pub async fn generate_report(&self, request: &ReportRequest) -> Result<Report, ApiError> {
        self.post("/reports/generate-report/", request).await
    }
}
