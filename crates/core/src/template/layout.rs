//! Where layouts and page fragments come from.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// Layout used when the views directory has no `layout.html`.
pub const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
  <script>window.organisasi = {{organisasi}};</script>
</head>
<body>
  <nav>
    <a href="/dashboard">Dashboard</a>
    {{#if active.isAdminOrPengurus}}
    <a href="/anggota">Anggota</a>
    <a href="/tarif">Tarif</a>
    <a href="/iuran">Iuran</a>
    <a href="/buku-kas">Buku Kas</a>
    <a href="/arus-kas">Arus Kas</a>
    {{/if}}
    {{#if active.isUser}}
    <a href="/tagihan">Tagihan</a>
    {{/if}}
    {{#if active.isAdminOrPengurusOrTentor}}
    <a href="/jenis-penilaian">Jenis Penilaian</a>
    {{/if}}
    <a href="/penilaian">Penilaian</a>
    <a href="/panahan">Panahan</a>
    <span>{{user.nama}} ({{user.role}})</span>
  </nav>
  <main>{{content}}</main>
</body>
</html>
"#;

/// Errors raised while loading templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Page name contains path components.
    #[error("invalid page name: {0}")]
    InvalidPageName(String),

    /// Page does not exist.
    #[error("page not found: {0}")]
    PageNotFound(String),

    /// Reading a template failed.
    #[error("failed to read template {name}: {message}")]
    Io {
        /// Template name.
        name: String,
        /// Underlying error.
        message: String,
    },
}

/// Supplies the layout and page fragments to render.
pub trait LayoutSource: Send + Sync {
    /// Returns the layout wrapping every page.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Io` when an existing layout cannot be read.
    fn layout(&self) -> Result<String, TemplateError>;

    /// Returns the page fragment with the given file name, e.g. `bukuKas.html`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::PageNotFound` for unknown pages.
    fn page(&self, name: &str) -> Result<String, TemplateError>;
}

/// Reads templates from a views directory on every call.
#[derive(Debug, Clone)]
pub struct DirLayoutSource {
    root: PathBuf,
}

impl DirLayoutSource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LayoutSource for DirLayoutSource {
    fn layout(&self) -> Result<String, TemplateError> {
        match std::fs::read_to_string(self.root.join("layout.html")) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DEFAULT_LAYOUT.to_string()),
            Err(e) => Err(TemplateError::Io {
                name: "layout.html".to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn page(&self, name: &str) -> Result<String, TemplateError> {
        check_page_name(name)?;
        std::fs::read_to_string(self.root.join(name)).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                TemplateError::PageNotFound(name.to_string())
            } else {
                TemplateError::Io {
                    name: name.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

/// Holds templates in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayoutSource {
    layout: Option<String>,
    pages: BTreeMap<String, String>,
}

impl MemoryLayoutSource {
    /// Creates an empty source that serves the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Adds a page fragment.
    #[must_use]
    pub fn with_page(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(name.into(), body.into());
        self
    }
}

impl LayoutSource for MemoryLayoutSource {
    fn layout(&self) -> Result<String, TemplateError> {
        Ok(self
            .layout
            .clone()
            .unwrap_or_else(|| DEFAULT_LAYOUT.to_string()))
    }

    fn page(&self, name: &str) -> Result<String, TemplateError> {
        check_page_name(name)?;
        self.pages
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::PageNotFound(name.to_string()))
    }
}

fn check_page_name(name: &str) -> Result<(), TemplateError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.contains("..");
    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidPageName(name.to_string()))
    }
}
