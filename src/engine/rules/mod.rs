// SPDX-License-Identifier: MIT

//! Rules: definitions, loading, compilation and matching

pub mod condition;
pub mod loader;
pub mod matcher;
mod ruleset;
pub mod types;

pub use ruleset::{Rule, Ruleset};
