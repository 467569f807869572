//! `${dotted.path}` interpolation over loaded profile YAML.
//!
//! Every string in the profile is scanned once. Tokens resolve against a
//! context mapping built from the profile itself:
//!
//! ```text
//! { site: <site.yaml>, navigation: <navigation.yaml>, pages: {name: <page>},
//!   <site.yaml top-level keys not named site/navigation/pages> }
//! ```
//!
//! so `${brand.company_name}` and `${site.brand.company_name}` both work.
//! Substituted text is not scanned again.

use crate::error::{Result, SeedError};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("interpolation pattern is valid"));

/// Build the lookup context for a profile.
pub fn build_context<'a>(
    site: &Mapping,
    navigation: &Mapping,
    pages: impl IntoIterator<Item = (&'a String, &'a Mapping)>,
) -> Mapping {
    let mut context = Mapping::new();
    context.insert("site".into(), Value::Mapping(site.clone()));
    context.insert("navigation".into(), Value::Mapping(navigation.clone()));
    let pages: Mapping = pages
        .into_iter()
        .map(|(name, page)| (Value::String(name.clone()), Value::Mapping(page.clone())))
        .collect();
    context.insert("pages".into(), Value::Mapping(pages));
    for (key, value) in site {
        if !context.contains_key(key) {
            context.insert(key.clone(), value.clone());
        }
    }
    context
}

/// Interpolate every string inside `value`.
pub fn interpolate(value: &Value, context: &Mapping) -> Result<Value> {
    match value {
        Value::String(text) => interpolate_str(text, context).map(Value::String),
        Value::Sequence(items) => items
            .iter()
            .map(|item| interpolate(item, context))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(map) => interpolate_mapping(map, context).map(Value::Mapping),
        other => Ok(other.clone()),
    }
}

pub fn interpolate_mapping(map: &Mapping, context: &Mapping) -> Result<Mapping> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), interpolate(value, context)?)))
        .collect()
}

fn interpolate_str(text: &str, context: &Mapping) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in TOKEN.captures_iter(text) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&lookup(path.as_str().trim(), context)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn lookup(path: &str, context: &Mapping) -> Result<String> {
    let mut segments = path.split('.').map(str::trim).filter(|s| !s.is_empty());
    let not_found = || SeedError::ContentSchema(format!("Interpolation path not found: {path}"));

    let first = segments.next().ok_or_else(not_found)?;
    let mut current = context.get(first).ok_or_else(not_found)?;
    for segment in segments {
        current = current
            .as_mapping()
            .and_then(|map| map.get(segment))
            .ok_or_else(not_found)?;
    }

    match current {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(SeedError::ContentSchema(format!(
            "Interpolation value for '{path}' must be a scalar"
        ))),
    }
}
