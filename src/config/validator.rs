//! Config validation and defaulting
//!
//! Rules run in a fixed order and the first violated rule wins, so the
//! message a user sees is deterministic when several things are wrong.
//! Validation never touches the network or the file system.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

use super::types::{
    Config, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PATH, DEFAULT_PORT,
    DEFAULT_USER,
};

impl Config {
    /// Check the values of the config, filling in defaults where possible.
    ///
    /// Idempotent: validating an already validated config changes nothing.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        // selector
        if !self.loadbalancer.is_empty() && !self.tag.is_empty() {
            return Err(ConfigError::AmbiguousSelector);
        }
        if self.loadbalancer.is_empty() && self.tag.is_empty() {
            return Err(ConfigError::MissingSelector);
        }

        if self.user.is_empty() {
            self.user = DEFAULT_USER.to_string();
        }

        // credential
        match self.credential_count() {
            0 => return Err(ConfigError::MissingCredential),
            1 => {}
            _ => return Err(ConfigError::AmbiguousCredential),
        }

        if self.port <= 0 {
            self.port = DEFAULT_PORT;
        }
        // The port is carried on to ssh as u16.
        if self.port > i32::from(u16::MAX) {
            self.port = DEFAULT_PORT;
        }

        if self.connect_timeout == Duration::ZERO {
            self.connect_timeout = DEFAULT_CONNECT_TIMEOUT;
        }

        if self.pat.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        if self.source_path.as_os_str().is_empty() {
            self.source_path = PathBuf::from(DEFAULT_PATH);
        }
        if self.target_path.is_empty() {
            self.target_path = DEFAULT_PATH.to_string();
        }

        if self.command_timeout == Duration::ZERO {
            self.command_timeout = DEFAULT_COMMAND_TIMEOUT;
        }
        if self.command_timeout < self.connect_timeout {
            self.command_timeout = self.connect_timeout;
        }

        Ok(())
    }
}
