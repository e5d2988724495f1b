//! Configuration for cc-obs.
//!
//! cc-obs has no config file: everything comes from `CC_OBS_*` environment
//! variables, parsed with source tracking.
//!
//! | Variable            | Meaning                                      |
//! |---------------------|----------------------------------------------|
//! | `CC_OBS_LOG_LEVEL`  | tracing filter (default `warn`)              |
//! | `CC_OBS_LOG_FORMAT` | `pretty` or `json`                           |
//! | `CC_OBS_LOG_FILE`   | also write logs to this file                 |
//! | `CC_OBS_HOME`       | home directory used for global settings      |

pub mod env;

pub use env::{ConfigSource, EnvError, EnvParser, Sourced};

use std::path::PathBuf;

/// Settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct ObsConfig {
    /// Overrides the user's home directory for `--global` installs.
    pub home: Option<Sourced<PathBuf>>,
}

impl ObsConfig {
    pub fn from_env() -> (Self, Vec<EnvError>) {
        Self::from_parser(EnvParser::new())
    }

    pub fn from_parser(mut parser: EnvParser) -> (Self, Vec<EnvError>) {
        let config = Self {
            home: parser.get_path("HOME"),
        };
        (config, parser.take_errors())
    }

    /// Home directory holding the global `.claude/` directory.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.home
            .as_ref()
            .map(|s| s.value.clone())
            .or_else(dirs::home_dir)
    }
}
