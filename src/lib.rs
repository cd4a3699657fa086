// SPDX-License-Identifier: MIT

//! prflow-rs: rule-driven pull request automation
//!
//! - `kit` holds the seams: error types, the `Action` trait and the
//!   platform traits the engine talks through.
//! - `engine` holds the rule matcher, condition language, template
//!   renderer, actions, check-run reporting and the evaluation pass.

pub mod engine;
pub mod kit;
