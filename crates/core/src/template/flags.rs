//! Role-derived page flags.

use std::collections::BTreeMap;

use crate::auth::UserRole;

use super::context::UserInfo;

/// Flags synthesized from the user's role when the page does not set them.
pub const ROLE_FLAGS: [&str; 5] = [
    "isAdmin",
    "isAdminOrPengurus",
    "isUser",
    "isTentor",
    "isAdminOrPengurusOrTentor",
];

/// The complete flag set a template is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFlags {
    flags: BTreeMap<String, bool>,
}

impl ResolvedFlags {
    /// Merges explicit page flags with flags derived from the user's role.
    ///
    /// Explicit values always win. Without a user only the explicit flags
    /// exist. An unrecognized role derives every role flag as false.
    #[must_use]
    pub fn resolve(user: Option<&UserInfo>, partial: &BTreeMap<String, bool>) -> Self {
        let mut flags = partial.clone();

        if let Some(user) = user {
            let role = user.role.parse::<UserRole>().ok();
            for key in ROLE_FLAGS {
                flags
                    .entry(key.to_string())
                    .or_insert_with(|| role.is_some_and(|r| derive(key, r)));
            }
        }

        Self { flags }
    }

    /// Returns the value of a flag; unknown flags are false.
    #[must_use]
    pub fn get(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Evaluates a block condition. Only `active.KEY` conditions can be true.
    #[must_use]
    pub fn condition_holds(&self, condition: &str) -> bool {
        condition
            .trim()
            .strip_prefix("active.")
            .is_some_and(|key| self.get(key.trim()))
    }
}

fn derive(key: &str, role: UserRole) -> bool {
    match key {
        "isAdmin" => role.can_manage_users(),
        "isAdminOrPengurus" => role.can_manage_records(),
        "isUser" => role.is_member(),
        "isTentor" => role == UserRole::Tentor,
        "isAdminOrPengurusOrTentor" => role.can_score(),
        _ => false,
    }
}
