//! Field investigation models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestigationStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
}

impl InvestigationStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(InvestigationStatus::Pending),
            "ASSIGNED" => Some(InvestigationStatus::Assigned),
            "IN_PROGRESS" => Some(InvestigationStatus::InProgress),
            "COMPLETED" => Some(InvestigationStatus::Completed),
            _ => None,
        }
    }
}

/// Outcome recorded by the field agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestigationResult {
    Confirmed,
    FalsePositive,
    NeedsMonitoring,
}

impl InvestigationResult {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "CONFIRMED" => Some(InvestigationResult::Confirmed),
            "FALSE_POSITIVE" => Some(InvestigationResult::FalsePositive),
            "NEEDS_MONITORING" => Some(InvestigationResult::NeedsMonitoring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationDetectionInfo {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub detection_type: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub area_hectares: Option<f64>,
    #[serde(default)]
    pub detection_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investigation {
    pub id: i64,
    #[serde(default)]
    pub detection: Option<i64>,
    #[serde(default)]
    pub detection_info: Option<InvestigationDetectionInfo>,
    #[serde(default)]
    pub target_coordinates: Option<String>,
    #[serde(default)]
    pub access_instructions: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub result_display: Option<String>,
    #[serde(default)]
    pub field_notes: Option<String>,
    #[serde(default)]
    pub investigation_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub agents: Vec<AgentRef>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Investigation {
    pub fn state(&self) -> Option<InvestigationStatus> {
        InvestigationStatus::from_str(&self.status)
    }

    pub fn outcome(&self) -> Option<InvestigationResult> {
        self.result.as_deref().and_then(InvestigationResult::from_str)
    }

    /// Display label for the status, preferring the server-provided one
    pub fn status_label(&self) -> &str {
        self.status_display.as_deref().unwrap_or(&self.status)
    }
}

/// A field agent with workload counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub active_investigations_count: u32,
    #[serde(default)]
    pub pending_investigations_count: u32,
    #[serde(default)]
    pub total_workload: u32,
    #[serde(default)]
    pub availability_status: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentWorkloadSummary {
    #[serde(default)]
    pub total_agents: u32,
    #[serde(default)]
    pub available_agents: u32,
    #[serde(default)]
    pub busy_agents: u32,
    #[serde(default)]
    pub overloaded_agents: u32,
}

/// Response of `GET /investigations/available-agents/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAvailability {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub summary: AgentWorkloadSummary,
}

/// Body of `PATCH /investigations/{id}/assign/`
#[derive(Debug, Clone, Serialize)]
pub struct AgentAssignment {
    pub assigned_to: i64,
    pub priority: String,
    pub notes: String,
}

impl AgentAssignment {
    pub fn new(assigned_to: i64) -> Self {
        Self {
            assigned_to,
            priority: "MEDIUM".to_string(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedAgentInfo {
    pub name: String,
    #[serde(default)]
    pub new_workload: u32,
}

/// Response of the assign action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Investigation,
    #[serde(default)]
    pub agent_info: Option<AssignedAgentInfo>,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Body of `PATCH /investigations/{id}/result/`
#[derive(Debug, Clone, Serialize)]
pub struct ResultSubmission {
    pub result: InvestigationResult,
    pub field_notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investigation_date: Option<String>,
}

/// Response of the result action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultUpdate {
    #[serde(default)]
    pub message: String,
    pub data: Investigation,
}
