//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Business role attached to an authenticated session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Manager,
    Employee,
    Coworker,
}

impl Role {
    /// Wire name used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
            Role::Coworker => "COWORKER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MANAGER" => Ok(Role::Manager),
            "EMPLOYEE" => Ok(Role::Employee),
            "COWORKER" => Ok(Role::Coworker),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Client-held record of a successful authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque bearer credential
    pub token: String,
    pub role: Role,
    /// Canonical string form of the employee identifier
    pub employee_id: String,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role, employee_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role,
            employee_id: employee_id.into(),
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    /// Whether this session belongs to the given employee
    pub fn is_owner(&self, employee_id: &str) -> bool {
        !employee_id.is_empty() && self.employee_id == employee_id
    }

    /// Managers and owners see unmasked sensitive profile fields
    pub fn can_view_sensitive(&self, employee_id: &str) -> bool {
        self.is_manager() || self.is_owner(employee_id)
    }

    pub fn can_edit_profile(&self, employee_id: &str) -> bool {
        self.is_manager() || self.is_owner(employee_id)
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .field("employee_id", &self.employee_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"MANAGER\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"COWORKER\"").unwrap(),
            Role::Coworker
        );
        assert!(serde_json::from_str::<Role>("\"ADMIN\"").is_err());
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
        assert!("boss".parse::<Role>().is_err());
        assert_eq!(Role::Employee.to_string(), "EMPLOYEE");
    }

    #[test]
    fn test_session_access_rules() {
        let manager = Session::new("t1", Role::Manager, "1");
        let employee = Session::new("t2", Role::Employee, "7");
        let coworker = Session::new("t3", Role::Coworker, "9");

        assert!(manager.can_edit_profile("7"));
        assert!(employee.can_edit_profile("7"));
        assert!(!employee.can_edit_profile("8"));
        assert!(!coworker.can_view_sensitive("7"));
        assert!(coworker.can_view_sensitive("9"));
        assert!(!employee.is_owner(""));
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("super-secret", Role::Manager, "42");
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("42"));
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = Session::new("tok1", Role::Manager, "42");
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["employeeId"], "42");
        assert_eq!(value["role"], "MANAGER");
        assert_eq!(value["token"], "tok1");
    }
}
