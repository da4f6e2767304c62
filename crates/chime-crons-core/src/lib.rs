// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Chime scheduled HTTP job system.
//!
//! This crate contains the domain model shared between the server and its
//! clients: projects, cron jobs, execution logs, the schedule expression
//! model, and the pure validation applied to job submissions. It has no
//! persistence or transport dependencies.

pub mod job;
pub mod log;
pub mod pairs;
pub mod project;
pub mod schedule;
pub mod validate;

pub use job::{CronJob, CronJobId, HttpMethod};
pub use log::{truncate_response_body, ExecutionLog, ExecutionLogId, MAX_RESPONSE_BODY_BYTES};
pub use pairs::{build_object_from_pairs, KeyValuePair};
pub use project::{OwnerId, Project, ProjectId};
pub use schedule::{build_cron_expression, describe_cron_expression, ScheduleSpec};
pub use validate::{validate_job_form, FieldErrorKind, JobForm, ValidationErrors};
