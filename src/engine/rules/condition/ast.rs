// SPDX-License-Identifier: MIT

//! Condition representation

use regex::Regex;

/// A single predicate over one pull request attribute
#[derive(Debug, Clone)]
pub struct Condition {
    /// Attribute name, e.g. `base` or `approved-reviews-by`
    pub attribute: String,
    /// `None` tests the attribute's truthiness (`draft`, `-merged`)
    pub op: Option<CompareOp>,
    /// Right-hand side as written, quotes removed
    pub value: String,
    /// `#attr`: compare the attribute's cardinality instead of its value
    pub count: bool,
    /// `-attr...`: invert the result for a known attribute
    pub negated: bool,
    /// Compiled pattern for `~=`
    pub(crate) pattern: Option<Regex>,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// =
    Eq,
    /// !=
    NotEq,
    /// >
    Gt,
    /// >=
    Gte,
    /// <
    Lt,
    /// <=
    Lte,
    /// includes (list membership or substring)
    Includes,
    /// ~= (regular expression search)
    Matches,
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.attribute == other.attribute
            && self.op == other.op
            && self.value == other.value
            && self.count == other.count
            && self.negated == other.negated
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Includes => write!(f, " includes "),
            CompareOp::Matches => write!(f, "~="),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "-")?;
        }
        if self.count {
            write!(f, "#")?;
        }
        write!(f, "{}", self.attribute)?;
        if let Some(op) = &self.op {
            write!(f, "{}{}", op, self.value)?;
        }
        Ok(())
    }
}
