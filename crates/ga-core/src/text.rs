//! Human-readable multivector text.
//!
//! Blades are written `1`, `e1`, `e1^e3` (1-based, ascending); term lists
//! as `blade=coefficient` pairs separated by commas: `1=3, e1=2, e1^e3=-0.5`.

use std::sync::LazyLock;

use regex::Regex;

use crate::basis::{blade_name, grade, validate_id};
use crate::composer::Composer;
use crate::constants::MAX_DIMENSION;
use crate::error::{GaError, Result};
use crate::scalar::ScalarProcessor;
use crate::storage::Storage;

static BLADE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^e\d+(?:\^?e\d+)*$").unwrap());
static BASIS_VECTOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"e(\d+)").unwrap());
static TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^=\s]+)\s*=\s*(\S+)$").unwrap());

/// Renders `storage` as `1 + 2 e1 - 0.5 e1^e3`, ordered by grade then ID.
pub fn format_storage<P: ScalarProcessor>(processor: &P, storage: &Storage<P::Scalar>) -> String {
    let mut terms: Vec<(u64, &P::Scalar)> = storage
        .terms()
        .filter(|(_, value)| !processor.is_zero(value))
        .collect();
    if terms.is_empty() {
        return "0".to_string();
    }
    terms.sort_by_key(|(id, _)| (grade(*id), *id));

    let mut out = String::new();
    for (i, (id, value)) in terms.into_iter().enumerate() {
        let body = format_term(id, &processor.to_text(value));
        match (i, body.strip_prefix('-')) {
            (0, _) => out.push_str(&body),
            (_, Some(rest)) => {
                out.push_str(" - ");
                out.push_str(rest);
            }
            (_, None) => {
                out.push_str(" + ");
                out.push_str(&body);
            }
        }
    }
    out
}

fn format_term(id: u64, coefficient: &str) -> String {
    if id == 0 {
        return coefficient.to_string();
    }
    let name = blade_name(id);
    let compound = coefficient.contains(" + ") || coefficient.contains(" - ");
    match coefficient {
        "1" => name,
        "-1" => format!("-{name}"),
        _ if compound => format!("({coefficient}) {name}"),
        _ => format!("{coefficient} {name}"),
    }
}

/// Parses a blade name into its ID. Basis vector indices must be 1-based and
/// strictly ascending.
pub fn parse_blade(text: &str) -> Result<u64> {
    let text = text.trim();
    if text == "1" {
        return Ok(0);
    }
    if !BLADE.is_match(text) {
        return Err(GaError::invalid(format!("malformed blade '{text}'")));
    }
    let mut id = 0u64;
    let mut previous = 0u32;
    for capture in BASIS_VECTOR.captures_iter(text) {
        let index: u32 = capture[1]
            .parse()
            .map_err(|_| GaError::invalid(format!("basis vector index too large in '{text}'")))?;
        if index == 0 || index > MAX_DIMENSION {
            return Err(GaError::invalid(format!(
                "basis vector index {index} in '{text}' outside 1..={MAX_DIMENSION}"
            )));
        }
        if index <= previous {
            return Err(GaError::invalid(format!(
                "basis vectors in '{text}' must be strictly ascending"
            )));
        }
        previous = index;
        id |= 1u64 << (index - 1);
    }
    Ok(id)
}

/// Parses `blade=coefficient` pairs. Repeated blades are summed by callers.
pub fn parse_terms(text: &str) -> Result<Vec<(u64, f64)>> {
    let text = text.trim();
    if text.is_empty() || text == "0" {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|part| {
            let part = part.trim();
            let caps = TERM.captures(part).ok_or_else(|| {
                GaError::invalid(format!("expected blade=coefficient, got '{part}'"))
            })?;
            let id = parse_blade(&caps[1])?;
            let value: f64 = caps[2]
                .parse()
                .map_err(|_| GaError::invalid(format!("bad coefficient '{}'", &caps[2])))?;
            if !value.is_finite() {
                return Err(GaError::invalid(format!(
                    "coefficient '{}' is not finite",
                    &caps[2]
                )));
            }
            Ok((id, value))
        })
        .collect()
}

/// Parses a term list into a storage of an `dimension`-dimensional algebra.
pub fn parse_storage<P: ScalarProcessor>(
    processor: &P,
    dimension: u32,
    text: &str,
) -> Result<Storage<P::Scalar>> {
    let mut composer = Composer::new(processor);
    for (id, value) in parse_terms(text)? {
        validate_id(dimension, id)?;
        composer.add_term(id, processor.from_f64(value));
    }
    Ok(composer.into_storage())
}
