// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ro-storage: the persistence contract (`Store`) and record schema for
//! rollouts and their task trees.

pub mod error;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use record::{ActionRecord, RolloutRecord, TaskRecord, ERROR_CAP_BYTES, TRACEBACK_CAP_BYTES};
pub use store::{MemStore, Store};
