//! Placeholder expansion for command templates.
//!
//! Three token forms are recognised, all wrapped as `{{ <key> }}` with exactly
//! one space inside each brace pair:
//!
//! - `{{ self.commands.<name> }}`: the raw template of another command on the
//!   same component
//! - `{{ self.name }}`, `{{ self.rootDir }}`: the component's own attributes
//! - `{{ <key> }}`: an external template variable
//!
//! [`expand`] runs one pass per form, in that order. Each pass scans its input
//! once and never rescans text it inserted, so a replacement value that looks
//! like a token survives into the next pass untouched by the current one.
//! Tokens nothing resolves are left verbatim.

use crate::registry::Component;
use std::collections::BTreeMap;

/// External template variables: `defaultTemplateVars` merged with `-t` pairs.
pub type TemplateVars = BTreeMap<String, String>;

const OPEN: &str = "{{ ";
const CLOSE: &str = " }}";
const COMMAND_PREFIX: &str = "self.commands.";
const SELF_NAME: &str = "self.name";
const SELF_ROOT_DIR: &str = "self.rootDir";

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'t> {
    Text(&'t str),
    /// `raw` is the whole `{{ key }}` slice, emitted as-is when unresolved.
    Token { key: &'t str, raw: &'t str },
}

fn tokenize(template: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let body = &rest[start + OPEN.len()..];
        let Some(end) = body.find(CLOSE) else {
            break;
        };
        let key = &body[..end];

        // `{{ a {{ b }}`: the outer opener is plain text.
        if let Some(nested) = key.find(OPEN) {
            let split = start + OPEN.len() + nested;
            pieces.push(Piece::Text(&rest[..split]));
            rest = &rest[split..];
            continue;
        }

        if start > 0 {
            pieces.push(Piece::Text(&rest[..start]));
        }
        let token_len = OPEN.len() + end + CLOSE.len();
        pieces.push(Piece::Token {
            key,
            raw: &rest[start..start + token_len],
        });
        rest = &rest[start + token_len..];
    }

    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    pieces
}

fn substitute<'v>(template: &str, resolve: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    for piece in tokenize(template) {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Token { key, raw } => match resolve(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(raw),
            },
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// Replace `{{ self.commands.<name> }}` with the raw template of `<name>`.
pub fn expand_command_refs(template: &str, component: &Component) -> String {
    substitute(template, |key| {
        key.strip_prefix(COMMAND_PREFIX)
            .and_then(|name| component.command(name))
    })
}

/// Replace `{{ self.name }}` and `{{ self.rootDir }}`.
pub fn expand_attributes(template: &str, component: &Component) -> String {
    substitute(template, |key| match key {
        SELF_NAME => Some(component.name.as_str()),
        SELF_ROOT_DIR => Some(component.root_dir.as_str()),
        _ => None,
    })
}

/// Replace `{{ <key> }}` for every key in `vars`.
pub fn expand_variables(template: &str, vars: &TemplateVars) -> String {
    substitute(template, |key| vars.get(key).map(String::as_str))
}

/// Full expansion: self-command refs, then self attributes, then variables.
///
/// Pure: the same inputs always produce the same output.
pub fn expand(template: &str, component: &Component, vars: &TemplateVars) -> String {
    let expanded = expand_command_refs(template, component);
    let expanded = expand_attributes(&expanded, component);
    expand_variables(&expanded, vars)
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Keys of every `{{ ... }}` token still present in `text`.
pub fn unresolved_tokens(text: &str) -> Vec<&str> {
    tokenize(text)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Token { key, .. } => Some(key),
            Piece::Text(_) => None,
        })
        .collect()
}

/// Names of the commands `template` references through `{{ self.commands.* }}`.
pub fn command_refs(template: &str) -> Vec<&str> {
    unresolved_tokens(template)
        .into_iter()
        .filter_map(|key| key.strip_prefix(COMMAND_PREFIX))
        .collect()
}

/// Find a chain of self-command references leading from `command` back to
/// `command` itself, e.g. `["build", "deps", "build"]`. Loops among other
/// commands that never return to `command` are not reported.
pub fn find_command_cycle(component: &Component, command: &str) -> Option<Vec<String>> {
    fn visit(component: &Component, name: &str, chain: &mut Vec<String>) -> Option<Vec<String>> {
        if let Some(pos) = chain.iter().position(|c| c == name) {
            if pos != 0 {
                return None;
            }
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        let template = component.command(name)?;
        chain.push(name.to_string());
        for next in command_refs(template) {
            if let Some(cycle) = visit(component, next, chain) {
                return Some(cycle);
            }
        }
        chain.pop();
        None
    }

    visit(component, command, &mut Vec::new())
}

/// Log a warning when `command` reaches itself. Returns whether it does.
pub fn warn_on_command_cycle(component: &Component, command: &str) -> bool {
    let Some(cycle) = find_command_cycle(component, command) else {
        return false;
    };
    tracing::warn!(
        component = %component.name,
        cycle = %cycle.join(" -> "),
        "command references itself; the nested reference is left unexpanded"
    );
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
