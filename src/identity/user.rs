use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed role enumeration. Anything the backend sends that is not recognised lands on
/// `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "GeneralManager", alias = "generalManager")]
    GeneralManager,
    #[serde(alias = "HRManager", alias = "HrManager", alias = "hrManager")]
    HrManager,
    #[serde(alias = "TeamLeader", alias = "teamLeader")]
    TeamLeader,
    #[default]
    #[serde(other)]
    Default,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::GeneralManager, Role::HrManager, Role::TeamLeader, Role::Default];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::GeneralManager => "general_manager",
            Role::HrManager => "hr_manager",
            Role::TeamLeader => "team_leader",
            Role::Default => "default",
        }
    }

    /// Lenient parse used for CLI flags and role-name lookups: case-insensitive, accepts
    /// snake_case, kebab-case and the backend's PascalCase names.
    pub fn parse(s: &str) -> Role {
        let norm: String = s.trim().chars().filter(|c| *c != '_' && *c != '-' && *c != ' ').collect::<String>().to_ascii_lowercase();
        match norm.as_str() {
            "generalmanager" => Role::GeneralManager,
            "hrmanager" => Role::HrManager,
            "teamleader" => Role::TeamLeader,
            _ => Role::Default,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

fn default_active() -> bool { true }

/// Profile snapshot cached next to the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default, alias = "fullName", alias = "userName")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Minimal profile for a backend that answered a login with a bare token.
    /// The display name is the local part of the email.
    pub fn from_login_email(email: &str) -> Self {
        let name = email.split_once('@').map(|(local, _)| local).unwrap_or(email).to_string();
        User {
            id: 0,
            name,
            email: email.to_string(),
            role: Role::Default,
            department_id: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_backend_spellings() {
        let r: Role = serde_json::from_str("\"HRManager\"").unwrap();
        assert_eq!(r, Role::HrManager);
        let r: Role = serde_json::from_str("\"team_leader\"").unwrap();
        assert_eq!(r, Role::TeamLeader);
        let r: Role = serde_json::from_str("\"Janitor\"").unwrap();
        assert_eq!(r, Role::Default);
        assert_eq!(serde_json::to_string(&Role::GeneralManager).unwrap(), "\"general_manager\"");
    }

    #[test]
    fn role_parse_is_lenient() {
        assert_eq!(Role::parse("General-Manager"), Role::GeneralManager);
        assert_eq!(Role::parse("hr_manager"), Role::HrManager);
        assert_eq!(Role::parse("TeamLeader"), Role::TeamLeader);
        assert_eq!(Role::parse("intern"), Role::Default);
    }

    #[test]
    fn synthesized_user_uses_email_local_part() {
        let u = User::from_login_email("a@b.com");
        assert_eq!(u.name, "a");
        assert_eq!(u.email, "a@b.com");
        assert_eq!(u.role, Role::Default);
        assert!(u.is_active);

        let u = User::from_login_email("no-at-sign");
        assert_eq!(u.name, "no-at-sign");
    }

    #[test]
    fn user_tolerates_sparse_backend_payload() {
        let u: User = serde_json::from_str(r#"{"id":7,"fullName":"Sara","email":"s@kmt.io","role":"HRManager","departmentId":3}"#).unwrap();
        assert_eq!(u.id, 7);
        assert_eq!(u.name, "Sara");
        assert_eq!(u.role, Role::HrManager);
        assert_eq!(u.department_id, Some(3));
        assert!(u.is_active);
    }
}
