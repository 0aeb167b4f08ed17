//! Account identity and profile models.

use serde::{Deserialize, Serialize};

/// An authority (role) held by a user.
///
/// The login endpoint returns `{name, status}` objects while the profile
/// endpoint returns bare names; both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authority {
    Name(String),
    Detailed {
        name: String,
        #[serde(default = "default_true")]
        status: bool,
    },
}

fn default_true() -> bool {
    true
}

impl Authority {
    pub fn name(&self) -> &str {
        match self {
            Authority::Name(name) => name,
            Authority::Detailed { name, .. } => name,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Authority::Name(_) => true,
            Authority::Detailed { status, .. } => *status,
        }
    }
}

/// The authenticated identity returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub authorized_region: Option<String>,
    #[serde(default)]
    pub authorities: Vec<Authority>,
    #[serde(default)]
    pub primary_authority: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        match self.full_name.as_deref() {
            Some(full) if !full.trim().is_empty() => full.trim().to_string(),
            _ => {
                let name = format!("{} {}", self.first_name, self.last_name);
                let name = name.trim();
                if name.is_empty() {
                    self.email.clone()
                } else {
                    name.to_string()
                }
            }
        }
    }

    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities
            .iter()
            .any(|a| a.is_active() && a.name().eq_ignore_ascii_case(name))
    }
}

/// Full profile from `GET /account/profile/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub authorized_region: Option<String>,
    #[serde(default)]
    pub authorities: Vec<Authority>,
    #[serde(default)]
    pub primary_authority: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Editable profile fields for `PUT /account/profile/`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_region: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

/// Generic `{message}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, alias = "detail")]
    pub message: String,
}
