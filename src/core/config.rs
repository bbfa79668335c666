// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Emulator configuration
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. A TOML file (`--config FILE`)
//! 2. Environment variables (`GBARX_BIOS`, `GBARX_ROM`, `GBARX_INSTRUCTIONS`),
//!    which may be provided through a `.env` file
//! 3. Command-line flags
//!
//! # Example
//! ```
//! use gbarx::core::config::Config;
//!
//! let config = Config::from_toml_str(
//!     r#"
//!     rom = "game.gba"
//!     instructions = 5000
//!     skip_bios = true
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.rom.as_deref(), Some("game.gba"));
//! assert_eq!(config.instructions, 5000);
//! assert!(config.skip_bios);
//! ```

use std::fs;

use serde::Deserialize;

use super::error::{EmulatorError, Result};

/// Environment variable overriding [`Config::bios`]
pub const ENV_BIOS: &str = "GBARX_BIOS";

/// Environment variable overriding [`Config::rom`]
pub const ENV_ROM: &str = "GBARX_ROM";

/// Environment variable overriding [`Config::instructions`]
pub const ENV_INSTRUCTIONS: &str = "GBARX_INSTRUCTIONS";

/// Runtime settings for the emulator binary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Boot ROM image path
    pub bios: Option<String>,

    /// Cartridge ROM image path
    pub rom: Option<String>,

    /// Number of instructions to execute
    pub instructions: usize,

    /// Start directly at the cartridge entry point instead of the boot ROM
    pub skip_bios: bool,

    /// Default log filter (`RUST_LOG` still takes precedence)
    pub log_level: Option<String>,
}

impl Config {
    /// Instruction count used when nothing else is configured
    pub const DEFAULT_INSTRUCTIONS: usize = 100_000;

    /// Parse a configuration from TOML text
    ///
    /// Missing keys take their default values; unknown keys are rejected.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EmulatorError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` if the file was read and parsed
    /// - `Err(EmulatorError::Config)` if the file is unreadable or invalid
    pub fn load(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| EmulatorError::Config(format!("{}: {}", path, e)))?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| EmulatorError::Config(format!("{}: {}", path, e)))?;

        log::debug!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Apply `GBARX_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply `GBARX_*` overrides using `lookup` to read variables
    ///
    /// An unparsable instruction count is ignored with a warning.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bios) = lookup(ENV_BIOS) {
            self.bios = Some(bios);
        }
        if let Some(rom) = lookup(ENV_ROM) {
            self.rom = Some(rom);
        }
        if let Some(count) = lookup(ENV_INSTRUCTIONS) {
            match count.trim().parse() {
                Ok(count) => self.instructions = count,
                Err(e) => log::warn!("Ignoring {}={:?}: {}", ENV_INSTRUCTIONS, count, e),
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bios: None,
            rom: None,
            instructions: Self::DEFAULT_INSTRUCTIONS,
            skip_bios: false,
            log_level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bios, None);
        assert_eq!(config.rom, None);
        assert_eq!(config.instructions, Config::DEFAULT_INSTRUCTIONS);
        assert!(!config.skip_bios);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let config = Config::from_toml_str(
            r#"
            bios = "gba_bios.bin"
            rom = "game.gba"
            instructions = 42
            skip_bios = true
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.bios.as_deref(), Some("gba_bios.bin"));
        assert_eq!(config.rom.as_deref(), Some("game.gba"));
        assert_eq!(config.instructions, 42);
        assert!(config.skip_bios);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = Config::from_toml_str("frameskip = 2");
        assert!(matches!(result, Err(EmulatorError::Config(_))));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result = Config::from_toml_str("instructions = \"many\"");
        assert!(matches!(result, Err(EmulatorError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "rom = \"from_file.gba\"").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.rom.as_deref(), Some("from_file.gba"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/gbarx.toml");
        assert!(matches!(result, Err(EmulatorError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BIOS, "env_bios.bin"),
            (ENV_ROM, "env_game.gba"),
            (ENV_INSTRUCTIONS, "123"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::from_toml_str("rom = \"file.gba\"").unwrap();
        config.apply_env_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.bios.as_deref(), Some("env_bios.bin"));
        assert_eq!(config.rom.as_deref(), Some("env_game.gba"));
        assert_eq!(config.instructions, 123);
    }

    #[test]
    fn test_invalid_env_instruction_count_is_ignored() {
        let mut config = Config::default();
        config.apply_env_with(|key| (key == ENV_INSTRUCTIONS).then(|| "lots".to_string()));

        assert_eq!(config.instructions, Config::DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn test_missing_env_leaves_config_alone() {
        let mut config = Config::from_toml_str("bios = \"a.bin\"").unwrap();
        config.apply_env_with(|_| None);

        assert_eq!(config.bios.as_deref(), Some("a.bin"));
    }
}
