// SPDX-License-Identifier: MIT

//! Condition string parser
//!
//! Grammar: `["-"]["#"]attribute[operator value]`, e.g.
//! - `base=main`
//! - `#approved-reviews-by>=1`
//! - `-label=wip`
//! - `title~=^feat`
//! - `label includes bug`
//! - `draft`

use regex::Regex;

use super::ast::{CompareOp, Condition};
use crate::kit::error::ConditionError;

/// Symbolic operators, longest first
const OPERATORS: [(&str, CompareOp); 7] = [
    ("!=", CompareOp::NotEq),
    (">=", CompareOp::Gte),
    ("<=", CompareOp::Lte),
    ("~=", CompareOp::Matches),
    ("=", CompareOp::Eq),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
];

const INCLUDES: &str = "includes";

/// Parse a condition string
pub fn parse(input: &str) -> Result<Condition, ConditionError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ConditionError::Empty);
    }

    let (negated, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let (count, rest) = match rest.strip_prefix('#') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    let name_len = rest
        .find(|c: char| !is_attribute_char(c))
        .unwrap_or(rest.len());
    let attribute = &rest[..name_len];
    if attribute.is_empty() {
        return Err(ConditionError::MissingAttribute(input.to_string()));
    }
    if !attribute.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ConditionError::InvalidAttribute(attribute.to_string()));
    }

    let rest = rest[name_len..].trim_start();
    if rest.is_empty() {
        return Ok(Condition {
            attribute: attribute.to_string(),
            op: None,
            value: String::new(),
            count,
            negated,
            pattern: None,
        });
    }

    let (op, value) = split_operator(rest)
        .ok_or_else(|| ConditionError::InvalidAttribute(format!("{}{}", attribute, rest)))?;
    let value = unquote(value.trim());
    if value.is_empty() {
        return Err(ConditionError::MissingValue(input.to_string()));
    }

    let pattern = match op {
        CompareOp::Matches => Some(Regex::new(value).map_err(|e| {
            ConditionError::InvalidRegex {
                pattern: value.to_string(),
                message: e.to_string(),
            }
        })?),
        _ => None,
    };

    Ok(Condition {
        attribute: attribute.to_string(),
        op: Some(op),
        value: value.to_string(),
        count,
        negated,
        pattern,
    })
}

fn is_attribute_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn split_operator(rest: &str) -> Option<(CompareOp, &str)> {
    for (symbol, op) in OPERATORS {
        if let Some(value) = rest.strip_prefix(symbol) {
            return Some((op, value));
        }
    }
    rest.strip_prefix(INCLUDES)
        .filter(|value| value.starts_with(char::is_whitespace))
        .map(|value| (CompareOp::Includes, value))
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('\'') && value.ends_with('\''))
            || (value.starts_with('"') && value.ends_with('"')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
