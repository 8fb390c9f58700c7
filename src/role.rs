//! User roles and their privilege ordering.
//!
//! DESIGN
//! ======
//! Roles form a chain `USER < ADMIN < SUPERADMIN`. Route requirements are
//! checked with a single `satisfies` comparison instead of one branch per
//! flag, so a super-admin can open every admin route.

use std::fmt;
use std::str::FromStr;

/// Role carried in the session token.
///
/// Variant order is the privilege order; `Ord` is derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role grants at least the privileges of `required`.
    #[must_use]
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    /// Elevated roles are exempt from the household-membership requirement.
    #[must_use]
    pub fn is_elevated(self) -> bool {
        self.satisfies(Role::Admin)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPERADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role claim names no known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts `USER`, `ADMIN`, `SUPERADMIN` in any case, with or without a
    /// `ROLE_` prefix. `SUPER_ADMIN` is accepted as an alias.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let upper = raw.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match name {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "SUPERADMIN" | "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            _ => Err(UnknownRole(raw.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
