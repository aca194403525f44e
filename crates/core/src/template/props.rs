//! Property-based tests for the template evaluator.
//!
//! Feature: page-templates
//! - Property 5: Nested Blocks Resolve Innermost First
//! - Property 6: No Residual Markers
//! - Property 7: Role Flag Synthesis
//! - Property 8: Idempotent Re-render

use std::collections::BTreeMap;

use proptest::prelude::*;
use rstest::rstest;

use super::context::{TemplateContext, UserInfo};
use super::render::TemplateEngine;

/// A well-formed template, generated as a tree and printed to text.
#[derive(Debug, Clone)]
enum Tpl {
    Text(String),
    Block {
        key: String,
        then: Vec<Tpl>,
        otherwise: Option<Vec<Tpl>>,
    },
}

const KEYS: [&str; 4] = ["a", "b", "c", "bukuKas"];

/// Strategy to generate a flag key.
fn key() -> impl Strategy<Value = String> {
    prop::sample::select(KEYS.to_vec()).prop_map(str::to_string)
}

/// Strategy to generate a template tree without stray braces.
fn template() -> impl Strategy<Value = Vec<Tpl>> {
    let leaf = "[a-z<>/ =]{0,6}".prop_map(Tpl::Text);
    let node = leaf.prop_recursive(5, 48, 4, |inner| {
        (
            key(),
            prop::collection::vec(inner.clone(), 0..4),
            prop::option::of(prop::collection::vec(inner, 0..4)),
        )
            .prop_map(|(key, then, otherwise)| Tpl::Block {
                key,
                then,
                otherwise,
            })
    });
    prop::collection::vec(node, 0..6)
}

/// Strategy to generate a flag map over the known keys.
fn flags() -> impl Strategy<Value = BTreeMap<String, bool>> {
    prop::collection::vec(any::<bool>(), KEYS.len()).prop_map(|values| {
        KEYS.iter()
            .map(|k| (*k).to_string())
            .zip(values)
            .collect()
    })
}

fn print(nodes: &[Tpl], out: &mut String) {
    for node in nodes {
        match node {
            Tpl::Text(text) => out.push_str(text),
            Tpl::Block {
                key,
                then,
                otherwise,
            } => {
                out.push_str("{{#if active.");
                out.push_str(key);
                out.push_str("}}");
                print(then, out);
                if let Some(otherwise) = otherwise {
                    out.push_str("{{else}}");
                    print(otherwise, out);
                }
                out.push_str("{{/if}}");
            }
        }
    }
}

fn expected(nodes: &[Tpl], flags: &BTreeMap<String, bool>, out: &mut String) {
    for node in nodes {
        match node {
            Tpl::Text(text) => out.push_str(text),
            Tpl::Block {
                key,
                then,
                otherwise,
            } => {
                if flags.get(key).copied().unwrap_or(false) {
                    expected(then, flags, out);
                } else if let Some(otherwise) = otherwise {
                    expected(otherwise, flags, out);
                }
            }
        }
    }
}

fn context(active: BTreeMap<String, bool>) -> TemplateContext {
    TemplateContext {
        active,
        ..TemplateContext::new("Test")
    }
}

fn has_marker(s: &str) -> bool {
    s.contains("{{#if") || s.contains("{{/if}}") || s.contains("{{else}}")
}

// =========================================================================
// Property 5: Nested Blocks Resolve Innermost First
// =========================================================================

#[rstest]
#[case(true, true, "XYZ")]
#[case(true, false, "XZ")]
#[case(false, true, "")]
#[case(false, false, "")]
fn test_nested_block_outcomes(#[case] a: bool, #[case] b: bool, #[case] want: &str) {
    let ctx = TemplateContext::new("t").with_flag("a", a).with_flag("b", b);
    let out = TemplateEngine::render("{{#if active.a}}X{{#if active.b}}Y{{/if}}Z{{/if}}", &ctx);
    assert_eq!(out.html, want);
    assert!(out.diagnostics.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 6: No Residual Markers
    // =========================================================================

    /// Property 6.1: Well-formed templates render without markers or
    /// diagnostics, and each block keeps exactly the branch its flag selects.
    #[test]
    fn prop_well_formed_templates_leave_no_markers(
        tree in template(),
        active in flags(),
    ) {
        let mut source = String::new();
        print(&tree, &mut source);
        let mut want = String::new();
        expected(&tree, &active, &mut want);

        let out = TemplateEngine::render(&source, &context(active));

        prop_assert!(!has_marker(&out.html), "residual marker in {:?}", out.html);
        prop_assert!(out.diagnostics.is_empty());
        prop_assert_eq!(out.html, want);
    }

    /// Property 6.2: Markers in any order never survive, and content
    /// around dropped markers is kept.
    #[test]
    fn prop_unbalanced_markers_are_dropped(
        source in "(\\{\\{#if active\\.a\\}\\}|\\{\\{ else \\}\\}|\\{\\{/if\\}\\}|[a-z ]){0,40}",
        active in flags(),
    ) {
        let out = TemplateEngine::render(&source, &context(active));
        prop_assert!(!has_marker(&out.html), "residual marker in {:?}", out.html);
        prop_assert!(out.html.len() <= source.len());
    }

    /// Property 6.3: Arbitrary brace soup never panics.
    #[test]
    fn prop_brace_soup_is_total(source in "[a-z{}#/. ]{0,60}") {
        let _ = TemplateEngine::render(&source, &context(BTreeMap::new()));
    }

    // =========================================================================
    // Property 7: Role Flag Synthesis
    // =========================================================================

    /// Property 7.1: A pengurus sees `isAdminOrPengurus` blocks unless the
    /// page sets the flag itself.
    #[test]
    fn prop_pengurus_derives_admin_or_pengurus(active in flags()) {
        let ctx = context(active).with_user(UserInfo::new("Siti", "pengurus"));
        let out = TemplateEngine::render(
            "{{#if active.isAdminOrPengurus}}yes{{else}}no{{/if}}",
            &ctx,
        );
        prop_assert_eq!(out.html, "yes");
    }

    /// Property 7.2: An explicit flag overrides the role.
    #[test]
    fn prop_explicit_flag_overrides_role(value in any::<bool>()) {
        let ctx = TemplateContext::new("t")
            .with_user(UserInfo::new("Siti", "pengurus"))
            .with_flag("isAdminOrPengurus", value);
        let out = TemplateEngine::render("{{#if active.isAdminOrPengurus}}yes{{/if}}", &ctx);
        prop_assert_eq!(out.html.is_empty(), !value);
    }

    // =========================================================================
    // Property 8: Idempotent Re-render
    // =========================================================================

    /// Property 8.1: Rendering rendered output changes nothing.
    #[test]
    fn prop_rerender_is_noop(
        tree in template(),
        active in flags(),
    ) {
        let mut source = String::new();
        print(&tree, &mut source);
        let ctx = context(active);

        let once = TemplateEngine::render(&source, &ctx).html;
        let twice = TemplateEngine::render(&once, &ctx).html;
        prop_assert_eq!(once, twice);
    }
}
