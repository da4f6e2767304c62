// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, GoogleOAuthConfigLayer, HttpConfigLayer,
	LoggingConfigLayer, OAuthConfigLayer, PathsConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/chime/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: CHIME_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()),
			auth: Some(load_auth_from_env()?),
			oauth: Some(load_oauth_from_env()),
			logging: Some(load_logging_from_env()),
			paths: Some(load_paths_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		None => Ok(None),
		Some(raw) => raw.parse().map(Some).map_err(|_| ConfigError::Env {
			var: name.to_string(),
			message: format!("cannot parse {:?}", raw),
		}),
	}
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v == "1" || v.to_lowercase() == "true")
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("CHIME_SERVER_HTTP_HOST"),
		port: env_parse("CHIME_SERVER_HTTP_PORT")?,
		base_url: env_var("CHIME_SERVER_HTTP_BASE_URL"),
	})
}

fn load_database_from_env() -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		url: env_var("CHIME_SERVER_DATABASE_URL"),
	}
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		dev_mode: env_bool("CHIME_SERVER_AUTH_DEV_MODE"),
		environment: env_var("CHIME_SERVER_ENV"),
		session_ttl_secs: env_parse("CHIME_SERVER_AUTH_SESSION_TTL_SECS")?,
		session_cleanup_interval_secs: env_parse(
			"CHIME_SERVER_AUTH_SESSION_CLEANUP_INTERVAL_SECS",
		)?,
		executor_token: env_var("CHIME_SERVER_EXECUTOR_TOKEN"),
	})
}

fn load_oauth_from_env() -> OAuthConfigLayer {
	OAuthConfigLayer {
		google: Some(GoogleOAuthConfigLayer {
			client_id: env_var("CHIME_SERVER_GOOGLE_CLIENT_ID"),
			client_secret: env_var("CHIME_SERVER_GOOGLE_CLIENT_SECRET"),
			redirect_path: env_var("CHIME_SERVER_GOOGLE_REDIRECT_PATH"),
		}),
	}
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("CHIME_SERVER_LOG_LEVEL"),
	}
}

fn load_paths_from_env() -> PathsConfigLayer {
	PathsConfigLayer {
		web_dir: env_var("CHIME_SERVER_WEB_DIR"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn missing_toml_file_is_an_empty_layer() {
		let source = TomlSource::new("/nonexistent/chime-server.toml");
		let layer = source.load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.database.is_none());
	}

	#[test]
	fn toml_file_populates_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
			[http]
			port = 9001

			[database]
			url = "sqlite:/tmp/test.db"

			[oauth.google]
			client_id = "id"
			client_secret = "secret"
			"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9001));
		assert_eq!(
			layer.database.unwrap().url.as_deref(),
			Some("sqlite:/tmp/test.db")
		);
		assert!(layer.oauth.unwrap().finalize().google.is_some());
	}

	#[test]
	fn invalid_toml_is_a_parse_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "this is not toml [").unwrap();

		let result = TomlSource::new(file.path()).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn precedence_ordering_is_stable() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}
}
