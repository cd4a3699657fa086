// SPDX-License-Identifier: MIT

pub mod actions;
pub mod pass;
pub mod platforms;
pub mod report;
pub mod rules;
pub mod server;
pub mod template;

pub use pass::{Engine, PassSummary};
