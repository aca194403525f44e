//! Values a page template is rendered against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The logged-in user as shown on pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Display name, substituted for `{{user.nama}}`.
    pub name: String,
    /// Role name, substituted for `{{user.role}}`.
    pub role: String,
}

impl UserInfo {
    /// Creates user info from a name and role.
    #[must_use]
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }
}

/// Everything a template may refer to.
///
/// `active` holds page flags as given by the caller; role-derived flags are
/// filled in at render time by [`super::ResolvedFlags::resolve`].
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Page title.
    pub title: String,
    /// Logged-in user, if any.
    pub user: Option<UserInfo>,
    /// Page flags tested by `{{#if active.KEY}}`.
    pub active: BTreeMap<String, bool>,
    /// Opaque page body for `{{content}}`.
    pub content: String,
    /// Organization profile for `{{organisasi}}`.
    pub organisasi: Option<Value>,
    /// Extra page payloads such as `bukuKas` or `stats`.
    pub vars: BTreeMap<String, Value>,
}

impl TemplateContext {
    /// Creates a context with a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the logged-in user.
    #[must_use]
    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    /// Sets a page flag.
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.active.insert(key.into(), value);
        self
    }

    /// Sets the page body.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the organization payload.
    #[must_use]
    pub fn with_organisasi(mut self, organisasi: Value) -> Self {
        self.organisasi = Some(organisasi);
        self
    }

    /// Adds a page payload.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: Value) -> Self {
        self.vars.insert(name.into(), value);
        self
    }
}
