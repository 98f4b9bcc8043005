//! Process-level configuration for the worker.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::exclusion::DEFAULT_SCAN_WINDOW;
use crate::optimizer::SearchParams;

pub use self::error::Error;

mod error {
    /// Error type for configuration loading.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("invalid value {value:?} for {name}")]
        InvalidValue { name: &'static str, value: String },
    }
}

pub const ENV_POLL_INTERVAL_SECS: &str = "CODONOPT_POLL_INTERVAL_SECS";
pub const ENV_BEAM_WIDTH: &str = "CODONOPT_BEAM_WIDTH";
pub const ENV_PATHS_PER_STATE: &str = "CODONOPT_PATHS_PER_STATE";
pub const ENV_SCAN_WINDOW: &str = "CODONOPT_SCAN_WINDOW";
pub const ENV_SCORING_TABLE: &str = "CODONOPT_SCORING_TABLE";
pub const ENV_EXCLUSION_FILE: &str = "CODONOPT_EXCLUSION_FILE";
pub const ENV_NOTIFY_ENDPOINT: &str = "CODONOPT_NOTIFY_ENDPOINT";
pub const ENV_NOTIFY_TOKEN: &str = "CODONOPT_NOTIFY_TOKEN";

/// Worker configuration; defaults match the documented operational settings
/// (poll every 5 s, beam width 100, 8 paths per state, 100 nt scan window).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub poll_interval: Duration,
    pub search: SearchParams,
    /// Bound on the incremental exclusion scan window, in nucleotides.
    pub scan_window: usize,
    /// Location of the scoring table JSON; `None` means score everything 0.
    pub scoring_table: Option<PathBuf>,
    /// Base exclusion file; `None` means the embedded standard set.
    pub exclusion_file: Option<PathBuf>,
    pub notify_endpoint: Option<String>,
    pub notify_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            search: SearchParams::default(),
            scan_window: DEFAULT_SCAN_WINDOW,
            scoring_table: None,
            exclusion_file: None,
            notify_endpoint: None,
            notify_token: None,
        }
    }
}

impl Config {
    /// Reads the configuration from `CODONOPT_*` environment variables,
    /// falling back to defaults for absent ones.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(secs) = parse_var::<u64>(ENV_POLL_INTERVAL_SECS)? {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(beam_width) = parse_var(ENV_BEAM_WIDTH)? {
            config.search.beam_width = beam_width;
        }
        if let Some(paths_per_state) = parse_var(ENV_PATHS_PER_STATE)? {
            config.search.paths_per_state = paths_per_state;
        }
        if let Some(scan_window) = parse_var(ENV_SCAN_WINDOW)? {
            config.scan_window = scan_window;
        }
        config.scoring_table = env::var_os(ENV_SCORING_TABLE).map(PathBuf::from);
        config.exclusion_file = env::var_os(ENV_EXCLUSION_FILE).map(PathBuf::from);
        config.notify_endpoint = string_var(ENV_NOTIFY_ENDPOINT);
        config.notify_token = string_var(ENV_NOTIFY_TOKEN);
        Ok(config)
    }
}

fn string_var(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, Error> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidValue { name, value: raw }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(raw)) => Err(Error::InvalidValue {
            name,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_settings() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.search.beam_width, 100);
        assert_eq!(config.search.paths_per_state, 8);
        assert_eq!(config.scan_window, 100);
        assert_eq!(config.scoring_table, None);
    }

    // One test mutates the process environment; keeping every `from_env`
    // call in it avoids races with parallel test threads.
    #[test]
    fn reads_overrides_from_the_environment() {
        env::set_var(ENV_BEAM_WIDTH, "25");
        env::set_var(ENV_NOTIFY_ENDPOINT, "https://notify.example/send");
        let config = Config::from_env().unwrap();
        assert_eq!(config.search.beam_width, 25);
        assert_eq!(
            config.notify_endpoint.as_deref(),
            Some("https://notify.example/send")
        );
        env::remove_var(ENV_BEAM_WIDTH);
        env::remove_var(ENV_NOTIFY_ENDPOINT);

        env::set_var(ENV_PATHS_PER_STATE, "many");
        let err = Config::from_env().unwrap_err();
        assert_eq!(
            err,
            Error::InvalidValue {
                name: ENV_PATHS_PER_STATE,
                value: "many".into()
            }
        );
        env::remove_var(ENV_PATHS_PER_STATE);
    }
}

// <LICENSE>
// Copyright 2026 codonopt Contributors
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
// </LICENSE>
