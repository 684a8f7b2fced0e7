//! Acting-user references.
//!
//! Every mutating operation receives an explicit [`Actor`]; there is no ambient
//! "current user" or "current company" anywhere in the engine.

use serde::{Deserialize, Serialize};

/// The fixed role set operations are authorized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A regular employee; may not mutate payroll.
    Employee,
    /// Human resources staff.
    Hr,
    /// Company owner; the only role that may approve overrides and finalize.
    Owner,
}

impl Role {
    /// Returns the string representation of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Hr => "hr",
            Self::Owner => "owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user performing an operation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Actor, Role};
///
/// let owner = Actor {
///     id: "user_001".to_string(),
///     role: Role::Owner,
///     company_id: "acme".to_string(),
/// };
/// assert!(owner.has_any_role(&[Role::Hr, Role::Owner]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the acting user.
    pub id: String,
    /// The role the user acts with.
    pub role: Role,
    /// The company the user acts for.
    pub company_id: String,
}

impl Actor {
    /// Returns true if the actor holds one of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
