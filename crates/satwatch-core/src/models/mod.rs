//! Data models for the monitoring backend.
//!
//! One explicit record per endpoint response:
//!
//! - `User`, `UserProfile`: account identity and profile
//! - `Image`, `AnalysisRun`: satellite imagery and analysis runs
//! - `Detection`, `Alert`, `Investigation`, `FinancialRisk`: anomaly workflow
//! - `Region`, `EventLog`, `Report`: reference data and audit trail
//! - Spectral and statistics types for the analytics views
//! - `Page<T>`: the paginated list envelope

pub mod account;
pub mod alert;
pub mod detection;
pub mod event_log;
pub mod financial_risk;
pub mod image;
pub mod investigation;
pub mod page;
pub mod region;
pub mod report;
pub mod spectral;
pub mod stats;

pub use account::{Authority, MessageResponse, PasswordChange, ProfileUpdate, User, UserProfile};
pub use alert::{
    Alert, AlertDetectionInfo, AlertLevel, AlertStatus, AlertStatusUpdate, AlertUpdate,
};
pub use detection::{Detection, DetectionType, DetectionUpdate, ValidationStatus};
pub use event_log::{EventLog, EventTypeCount, EventsByType, RecentEvents};
pub use financial_risk::{FinancialRisk, HighImpactRisks};
pub use image::{AnalysisRun, AnalysisSummary, Image, ProcessingStatus};
pub use investigation::{
    Agent, AgentAvailability, AgentAssignment, AgentWorkloadSummary, AssignmentResult,
    Investigation, InvestigationResult, InvestigationStatus, ResultSubmission, ResultUpdate,
};
pub use page::Page;
pub use region::Region;
pub use report::{Report, ReportRequest, ReportType};
pub use spectral::{
    analyze_anomalies, interpret_index, AnomalyAssessment, IndexReading, IndexStats,
    IndicesData, RiskLevel, SpectralBounds, SpectralIndex, SpectralMaps, SpectralMapsData,
    TrendPoint, TrendsData,
};
pub use stats::{
    AffectedZone, DailyCount, DashboardStats, DetectionTrends, EconomicContext,
    ExecutiveSummary, FinancialImpact, KeyMetrics, RiskBreakdown, TrendCount,
};
