//! Caller identity.
//!
//! Produced by the server's identity guard from a verified bearer credential
//! and passed explicitly into every engine operation. Never read from ambient
//! state, never persisted here - the account store owns the records.

use serde::{Deserialize, Serialize};

use crate::types::CustomerId;

/// Role attached to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    /// Whether this role carries store-management privileges.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// A verified caller: who they are and what they may broadly do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The caller's customer record ID.
    pub id: CustomerId,
    /// The caller's role.
    pub role: Role,
}

impl Identity {
    /// Create an identity.
    #[must_use]
    pub const fn new(id: CustomerId, role: Role) -> Self {
        Self { id, role }
    }

    /// Shorthand for a customer-role identity.
    #[must_use]
    pub const fn customer(id: CustomerId) -> Self {
        Self::new(id, Role::Customer)
    }

    /// Shorthand for an admin-role identity.
    #[must_use]
    pub const fn admin(id: CustomerId) -> Self {
        Self::new(id, Role::Admin)
    }

    /// Whether this identity is the given customer.
    #[must_use]
    pub fn is(&self, customer_id: CustomerId) -> bool {
        self.id == customer_id
    }
}
