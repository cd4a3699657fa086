// SPDX-License-Identifier: MIT

pub mod github;
pub mod memory;
