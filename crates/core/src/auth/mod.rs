//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User roles within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access including user management.
    Admin,
    /// Committee member, manages members, dues and the cashbook.
    Pengurus,
    /// Coach, records assessments and archery scores.
    Tentor,
    /// Regular member, sees their own dues, assessments and games.
    User,
}

impl UserRole {
    /// All roles, most privileged first.
    pub const ALL: [Self; 4] = [Self::Admin, Self::Pengurus, Self::Tentor, Self::User];

    /// Returns the role name as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Pengurus => "pengurus",
            Self::Tentor => "tentor",
            Self::User => "user",
        }
    }

    /// Returns true if this role can manage login accounts.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role can manage members, tariffs, dues and the cashbook.
    #[must_use]
    pub const fn can_manage_records(&self) -> bool {
        matches!(self, Self::Admin | Self::Pengurus)
    }

    /// Returns true if this role can record assessments and archery scores for anyone.
    #[must_use]
    pub const fn can_score(&self) -> bool {
        matches!(self, Self::Admin | Self::Pengurus | Self::Tentor)
    }

    /// Returns true if this is a regular member restricted to their own records.
    #[must_use]
    pub const fn is_member(&self) -> bool {
        matches!(self, Self::User)
    }
}

/// Error for role names that are not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Self::Admin),
            "pengurus" => Ok(Self::Pengurus),
            "tentor" => Ok(Self::Tentor),
            "user" => Ok(Self::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares two display names the way members are matched to login accounts.
///
/// Names match when equal after trimming and lowercasing.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.can_manage_users());
        assert!(!UserRole::Pengurus.can_manage_users());

        assert!(UserRole::Admin.can_manage_records());
        assert!(UserRole::Pengurus.can_manage_records());
        assert!(!UserRole::Tentor.can_manage_records());
        assert!(!UserRole::User.can_manage_records());

        assert!(UserRole::Tentor.can_score());
        assert!(!UserRole::User.can_score());
        assert!(UserRole::User.is_member());
    }

    #[rstest]
    #[case("admin", UserRole::Admin)]
    #[case("pengurus", UserRole::Pengurus)]
    #[case(" tentor ", UserRole::Tentor)]
    #[case("user", UserRole::User)]
    fn test_parse_role(#[case] input: &str, #[case] expected: UserRole) {
        assert_eq!(input.parse::<UserRole>(), Ok(expected));
        assert_eq!(expected.to_string(), input.trim());
    }

    #[test]
    fn test_unknown_role() {
        assert_eq!(
            "owner".parse::<UserRole>(),
            Err(UnknownRole("owner".to_string()))
        );
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("  Budi Santoso", "budi santoso "));
        assert!(!names_match("Budi", "Budiman"));
    }
}
