// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persistence and scheduling calculations for Chime cron jobs.
//!
//! The repository owns projects, jobs, and execution logs; next-run
//! calculation feeds the executor report path.

pub mod error;
pub mod next_run;
pub mod repository;

pub use error::{CronsServerError, Result};
pub use next_run::{calculate_next_run, validate_cron_expression};
pub use repository::{CronsRepository, SqliteCronsRepository};
