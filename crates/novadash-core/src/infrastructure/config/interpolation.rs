use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpolationError {
    #[error("Required environment variable not found: {0}")]
    RequiredVarNotFound(String),

    #[error("Recursive interpolation limit exceeded")]
    RecursionLimit,
}

pub type InterpolationResult<T> = Result<T, InterpolationError>;

const MAX_RECURSION_DEPTH: usize = 10;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Expands `${VAR}` and `${VAR:-default}` from the process environment
///
/// Each pass may expose further references (nested defaults); passes repeat
/// until none remain, up to the recursion limit.
pub fn interpolate(input: &str) -> InterpolationResult<String> {
    expand(input, 0)
}

fn expand(input: &str, depth: usize) -> InterpolationResult<String> {
    if !VAR_PATTERN.is_match(input) {
        return Ok(input.to_string());
    }
    if depth >= MAX_RECURSION_DEPTH {
        return Err(InterpolationError::RecursionLimit);
    }

    let mut missing: Option<String> = None;
    let expanded = VAR_PATTERN.replace_all(input, |caps: &Captures| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => match caps.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            },
        }
    });

    if let Some(name) = missing {
        return Err(InterpolationError::RequiredVarNotFound(name));
    }

    expand(&expanded, depth + 1)
}

/// Interpolates every string value of a parsed TOML document in place
pub fn interpolate_toml(value: &mut toml::Value) -> InterpolationResult<()> {
    match value {
        toml::Value::String(s) => {
            *s = interpolate(s)?;
        }
        toml::Value::Array(items) => {
            for item in items {
                interpolate_toml(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                interpolate_toml(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}
