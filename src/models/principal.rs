use serde::{Deserialize, Serialize};

/// Roles a principal can hold. Unknown role strings parse to `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Hr,
    Manager,
    Admin,
}

impl Role {
    /// Case-insensitive match against the four role names; anything else
    /// (including the empty string) is `User`.
    pub fn parse(raw: &str) -> Role {
        match raw.to_ascii_uppercase().as_str() {
            "USER" => Role::User,
            "HR" => Role::Hr,
            "MANAGER" => Role::Manager,
            "ADMIN" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Hr => "HR",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewAllTimesheets,
    ViewUserTimesheets,
    ViewAllReports,
    ManageUsers,
}

/// Externally-asserted role claim: a single role name or an array of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

/// Per-call identity used by every authorization decision. Built once per
/// request by the identity service, never persisted.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    pub principal_id: String,
    /// Non-empty; defaults to `[Role::User]`.
    pub roles: Vec<Role>,
    /// Principal ids this principal manages (delegated view access).
    pub direct_reports: Vec<String>,
}

impl AuthorizationContext {
    pub fn new(principal_id: impl Into<String>, roles: Vec<Role>) -> Self {
        let roles = if roles.is_empty() { vec![Role::User] } else { roles };
        Self {
            principal_id: principal_id.into(),
            roles,
            direct_reports: Vec::new(),
        }
    }

    pub fn with_direct_reports(mut self, reports: Vec<String>) -> Self {
        self.direct_reports = reports;
        self
    }

    pub fn held_roles(&self) -> String {
        self.roles
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Outcome of an authorization check. Checks never fail with an error;
/// a denial always carries a reason suitable for a 403 response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub authorized: bool,
    pub reason: Option<String>,
}

impl AccessDecision {
    pub fn allow() -> Self {
        Self { authorized: true, reason: None }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self { authorized: false, reason: Some(reason.into()) }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Denial reason, or a generic fallback for the (defect) case of a
    /// reasonless denial.
    pub fn reason_or_default(&self) -> String {
        self.reason.clone().unwrap_or_else(|| "access denied".to_string())
    }
}

/// Stored side of the role precedence rule: the principal row as persisted.
#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub id: String,
    pub role: Option<String>,
    pub direct_reports: Vec<String>,
}
