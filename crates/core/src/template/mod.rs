//! Conditional page template evaluation.
//!
//! Templates mix HTML with four kinds of markers:
//!
//! ```text
//! {{#if active.KEY}} ... {{else}} ... {{/if}}   blocks, nesting to any depth
//! {{dotted.path}}                              substitutions
//! ```
//!
//! A template is parsed into a tree once and evaluated in one pass, so the
//! output never contains a block marker. Flags come from the page plus the
//! flags derived from the user's role (see [`ResolvedFlags`]).

pub mod context;
pub mod flags;
pub mod layout;
pub mod parser;
pub mod render;

#[cfg(test)]
mod props;

pub use context::{TemplateContext, UserInfo};
pub use flags::{ROLE_FLAGS, ResolvedFlags};
pub use layout::{DEFAULT_LAYOUT, DirLayoutSource, LayoutSource, MemoryLayoutSource, TemplateError};
pub use parser::{Diagnostic, DiagnosticKind, Node, parse};
pub use render::{MISSING_VALUE, Rendered, TemplateEngine};
