// SPDX-License-Identifier: MIT

pub mod action;
pub mod error;
pub mod platform;
pub mod snapshot;
