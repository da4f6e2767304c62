// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence plumbing for the Chime server.
//!
//! Provides the connection pool, the embedded startup schema, and the
//! repositories for users and sessions. Project/job/log persistence lives
//! in `chime-server-crons`.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod session;
pub mod user;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use session::SessionRepository;
pub use user::UserRepository;
