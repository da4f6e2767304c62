// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, each with a resolved config and a partial layer.

pub mod auth;
pub mod database;
pub mod http;
pub mod logging;
pub mod oauth;
pub mod paths;

pub use auth::{AuthConfig, AuthConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use oauth::{GoogleOAuthConfigLayer, GoogleOAuthSettings, OAuthConfig, OAuthConfigLayer};
pub use paths::{PathsConfig, PathsConfigLayer};
