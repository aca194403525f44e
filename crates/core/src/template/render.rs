//! Single-pass template evaluation.

use serde::Serialize;
use serde_json::Value;

use super::context::TemplateContext;
use super::flags::ResolvedFlags;
use super::parser::{Diagnostic, Node, parse};

/// Text substituted for a variable nothing provides.
pub const MISSING_VALUE: &str = "\"\"";

/// Output of a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    /// Final text with every conditional resolved and every variable substituted.
    pub html: String,
    /// Problems found in the source; empty for well-formed templates.
    pub diagnostics: Vec<Diagnostic>,
}

/// Stateless template evaluator.
pub struct TemplateEngine;

impl TemplateEngine {
    /// Renders `source` against `ctx`, resolving role flags first.
    #[must_use]
    pub fn render(source: &str, ctx: &TemplateContext) -> Rendered {
        let flags = ResolvedFlags::resolve(ctx.user.as_ref(), &ctx.active);
        Self::render_with(source, ctx, &flags)
    }

    /// Renders `source` against `ctx` with already resolved flags.
    #[must_use]
    pub fn render_with(source: &str, ctx: &TemplateContext, flags: &ResolvedFlags) -> Rendered {
        render_inner(source, ctx, &ctx.content, flags)
    }

    /// Renders a page fragment, then the layout with the fragment as `{{content}}`.
    ///
    /// Both are evaluated against the same flags. The rendered fragment is
    /// inserted verbatim and not evaluated a second time.
    #[must_use]
    pub fn render_page(layout: &str, page: &str, ctx: &TemplateContext) -> Rendered {
        let flags = ResolvedFlags::resolve(ctx.user.as_ref(), &ctx.active);

        let body = render_inner(page, ctx, &ctx.content, &flags);
        let mut outer = render_inner(layout, ctx, &body.html, &flags);

        let mut diagnostics = body.diagnostics;
        diagnostics.append(&mut outer.diagnostics);
        Rendered {
            html: outer.html,
            diagnostics,
        }
    }
}

fn render_inner(
    source: &str,
    ctx: &TemplateContext,
    content: &str,
    flags: &ResolvedFlags,
) -> Rendered {
    let (nodes, diagnostics) = parse(source);

    let scope = Scope {
        ctx,
        content,
        flags,
    };
    let mut html = String::with_capacity(source.len());
    scope.emit(&nodes, &mut html);

    Rendered { html, diagnostics }
}

struct Scope<'a> {
    ctx: &'a TemplateContext,
    content: &'a str,
    flags: &'a ResolvedFlags,
}

impl Scope<'_> {
    fn emit(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Var(path) => self.substitute(path, out),
                Node::Block {
                    condition,
                    then,
                    otherwise,
                } => {
                    if self.flags.condition_holds(condition) {
                        self.emit(then, out);
                    } else if let Some(otherwise) = otherwise {
                        self.emit(otherwise, out);
                    }
                }
            }
        }
    }

    fn substitute(&self, path: &str, out: &mut String) {
        let ctx = self.ctx;
        match path {
            "content" => out.push_str(self.content),
            "title" => out.push_str(&ctx.title),
            "user.nama" => out.push_str(ctx.user.as_ref().map_or("", |u| u.name.as_str())),
            "user.role" => out.push_str(ctx.user.as_ref().map_or("", |u| u.role.as_str())),
            "organisasi" => match &ctx.organisasi {
                Some(value) => push_json(value, out),
                None => out.push_str("{}"),
            },
            _ => match lookup(&ctx.vars, path) {
                Some(Value::String(s)) => out.push_str(s),
                Some(value) => push_json(value, out),
                None => out.push_str(MISSING_VALUE),
            },
        }
    }
}

/// Resolves a dotted path against the page payloads.
fn lookup<'v>(
    vars: &'v std::collections::BTreeMap<String, Value>,
    path: &str,
) -> Option<&'v Value> {
    if let Some(value) = vars.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = vars.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes JSON that is safe inside a `<script>` element.
fn push_json(value: &Value, out: &mut String) {
    let json = value.to_string();
    out.push_str(&json.replace("</", "<\\/"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::context::UserInfo;
    use crate::template::parser::DiagnosticKind;
    use serde_json::json;

    fn ctx() -> TemplateContext {
        TemplateContext::new("Buku Kas").with_user(UserInfo::new("Siti", "pengurus"))
    }

    #[test]
    fn test_known_substitutions() {
        let out = TemplateEngine::render(
            "<title>{{title}}</title>{{user.nama}}/{{user.role}}",
            &ctx(),
        );
        assert_eq!(out.html, "<title>Buku Kas</title>Siti/pengurus");
    }

    #[test]
    fn test_organisasi_as_json_and_default() {
        let with = ctx().with_organisasi(json!({ "name": "Klub Panahan" }));
        assert_eq!(
            TemplateEngine::render("{{organisasi}}", &with).html,
            r#"{"name":"Klub Panahan"}"#
        );
        assert_eq!(TemplateEngine::render("{{organisasi}}", &ctx()).html, "{}");
    }

    #[test]
    fn test_vars_strings_verbatim_others_as_json() {
        let c = ctx()
            .with_var("bukuKas", json!([{ "balance": 500 }]))
            .with_var("nama", json!("Budi"))
            .with_var("anggota", json!({ "id": 4, "nama": "Ani" }));
        let out = TemplateEngine::render(
            "{{bukuKas}}|{{nama}}|{{anggota.nama}}|{{anggota.id}}",
            &c,
        );
        assert_eq!(out.html, r#"[{"balance":500}]|Budi|Ani|4"#);
    }

    #[test]
    fn test_leftover_variable_becomes_empty_literal() {
        let out = TemplateEngine::render("const x = {{stats.total}};", &ctx());
        assert_eq!(out.html, r#"const x = "";"#);
    }

    #[test]
    fn test_inserted_values_not_rescanned() {
        let c = ctx().with_var("nama", json!("{{title}}"));
        assert_eq!(TemplateEngine::render("{{nama}}", &c).html, "{{title}}");
    }

    #[test]
    fn test_json_closing_script_escaped() {
        let c = ctx().with_var("data", json!({ "note": "</script>" }));
        assert_eq!(
            TemplateEngine::render("{{data}}", &c).html,
            r#"{"note":"<\/script>"}"#
        );
    }

    #[test]
    fn test_role_flag_drives_block() {
        let source = "{{#if active.isAdmin}}A{{else}}B{{/if}}{{#if active.isAdminOrPengurus}}P{{/if}}";
        assert_eq!(TemplateEngine::render(source, &ctx()).html, "BP");
    }

    #[test]
    fn test_unknown_condition_is_false() {
        let source = "{{#if active.nothing}}x{{else}}y{{/if}}{{#if isAdmin}}z{{/if}}";
        assert_eq!(TemplateEngine::render(source, &ctx()).html, "y");
    }

    #[test]
    fn test_malformed_input_reports_diagnostics() {
        let out = TemplateEngine::render("a{{#if active.isAdmin}}b{{/if}}{{/if}}c", &ctx());
        assert_eq!(out.html, "ac");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::StrayEndIf);
    }

    #[test]
    fn test_render_page_inserts_fragment() {
        let layout = "<nav>{{#if active.isAdminOrPengurus}}kas{{/if}}</nav><main>{{content}}</main>";
        let page = "{{#if active.bukuKas}}<h1>{{title}}</h1>{{/if}}<script>const rows = {{rows}};</script>";
        let c = ctx().with_flag("bukuKas", true).with_var("rows", json!([]));

        let out = TemplateEngine::render_page(layout, page, &c);
        assert_eq!(
            out.html,
            "<nav>kas</nav><main><h1>Buku Kas</h1><script>const rows = [];</script></main>"
        );
        assert!(out.diagnostics.is_empty());
    }
}
