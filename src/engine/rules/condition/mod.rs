// SPDX-License-Identifier: MIT

//! Condition language for rules
//!
//! This module provides parsing and evaluation of rule conditions.
//! Conditions are single predicates like:
//! - `base=main`
//! - `#approved-reviews-by>=2`
//! - `-label=do-not-merge`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Condition};
pub use evaluator::evaluate;
pub use parser::parse;
