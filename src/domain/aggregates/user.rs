//! User records and roles.
//!
//! Users are registered by the external sign-in service; this service reads
//! them to resolve the role behind a session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { #[default] User, Admin }

/// Operations gated by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    PlaceOrders,
    ManageCatalog,
    IssueCoupons,
    UploadImages,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn grants(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Self::Admin, _) => true,
            (Self::User, Capability::PlaceOrders) => true,
            (Self::User, Capability::ManageCatalog | Capability::IssueCoupons | Capability::UploadImages) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
