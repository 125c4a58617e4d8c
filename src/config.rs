// Copyright (C) 2026 The logpipe developers
//
// This file is part of logpipe.
//
// logpipe is free software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// logpipe is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even
// the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details.
//
// You should have received a copy of the GNU General Public License along with logpipe.  If not,
// see <http://www.gnu.org/licenses/>.

//! [logpipe](crate) configuration.
//!
//! The configuration file is TOML, one `[[pipe]]` table per named pipe:
//!
//! ```toml
//! [[pipe]]
//! path = "/tmp/access_log"
//! facility = "local6"
//! severity = "info"
//! tag = "nginx"
//! ```
//!
//! Parsing yields a list of [`RawPipe`]s; each is then validated into a [`PipeSpec`]. The first
//! invalid pipe stops validation, so no worker is ever started against a bad configuration.

use crate::{
    byte_utils::bytes_from_os_str,
    error::{Error, Result},
    facility::{Facility, Level, Priority},
};

use backtrace::Backtrace;
use serde::Deserialize;

use std::path::{Path, PathBuf};

/// Where we look for our configuration absent any instructions to the contrary
pub const DEFAULT_CONFIG_PATH: &str = "/etc/logpipe.conf";

const EXAMPLE_CONFIG: &str = r#"[[pipe]]
path = "/tmp/access_log"
facility = "local6"
severity = "info"
tag = "nginx"

[[pipe]]
path = "/tmp/error_log"
facility = "local6"
severity = "err"
tag = "nginx""#;

/// Produce the corrective text shown to the operator on any configuration error.
pub fn usage(config_path: &Path) -> String {
    format!(
        "Write configuration file like this:\n---\n{}\n---\nsave in {}\n",
        EXAMPLE_CONFIG,
        config_path.display()
    )
}

/// What to tell the operator when loading the configuration fails.
///
/// Errors that editing the configuration file would fix are followed by the [`usage`] template;
/// anything else (no tag can be derived, say) is reported on its own.
pub fn explain(err: &Error, config_path: &Path) -> String {
    if err.is_configuration() {
        format!("{}\n{}", err, usage(config_path))
    } else {
        format!("{}\n", err)
    }
}

/// One `[[pipe]]` table, exactly as it appears in the configuration file
///
/// Every field defaults to the empty string so that a missing field is reported by
/// [`PipeSpec::new`] (naming the offending pipe) rather than as a bare parse failure.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawPipe {
    pub path: String,
    pub facility: String,
    pub severity: String,
    pub tag: String,
}

/// The parsed configuration file
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pipe: Vec<RawPipe>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| Error::ConfigRead {
            path: path.to_path_buf(),
            source: err,
            back: Backtrace::new(),
        })?;
        Config::from_toml(&text).map_err(|err| match err {
            Error::ConfigParse { source, back, .. } => Error::ConfigParse {
                path: path.to_path_buf(),
                source,
                back,
            },
            err => err,
        })
    }
    pub fn from_toml(text: &str) -> Result<Config> {
        toml::from_str(text).map_err(|err| Error::ConfigParse {
            path: PathBuf::new(),
            source: err,
            back: Backtrace::new(),
        })
    }
    /// Validate every pipe, in order, stopping at the first bad one.
    pub fn pipe_specs(&self) -> Result<Vec<PipeSpec>> {
        self.pipe.iter().map(PipeSpec::try_from).collect()
    }
}

/// A validated description of one forwarding job
///
/// Construction resolves the facility & severity names, so a [`PipeSpec`] always carries a
/// [`Priority`] drawn from the static tables.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeSpec {
    path: PathBuf,
    facility: Facility,
    level: Level,
    priority: Priority,
    tag: String,
}

impl PipeSpec {
    /// Checks are made in a fixed order (path, facility presence, facility name, severity
    /// presence, severity name) and the first failure is returned.
    ///
    /// An empty `tag` defaults to the name of the running executable.
    pub fn new(path: &str, facility: &str, severity: &str, tag: &str) -> Result<PipeSpec> {
        if path.is_empty() {
            return Err(Error::NoPath {
                back: Backtrace::new(),
            });
        }
        let path = PathBuf::from(path);

        if facility.is_empty() {
            return Err(Error::NoFacility {
                path,
                back: Backtrace::new(),
            });
        }
        let facility = Facility::from_name(facility).ok_or_else(|| Error::UnknownFacility {
            path: path.clone(),
            name: facility.to_owned(),
            back: Backtrace::new(),
        })?;

        if severity.is_empty() {
            return Err(Error::NoSeverity {
                path,
                back: Backtrace::new(),
            });
        }
        let level = Level::from_name(severity).ok_or_else(|| Error::UnknownSeverity {
            path: path.clone(),
            name: severity.to_owned(),
            back: Backtrace::new(),
        })?;

        let tag = if tag.is_empty() {
            default_tag(&path)?
        } else {
            tag.to_owned()
        };

        Ok(PipeSpec {
            path,
            facility,
            level,
            priority: Priority::new(facility, level),
            tag,
        })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn facility(&self) -> Facility {
        self.facility
    }
    pub fn level(&self) -> Level {
        self.level
    }
    pub fn priority(&self) -> Priority {
        self.priority
    }
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl std::convert::TryFrom<&RawPipe> for PipeSpec {
    type Error = Error;
    fn try_from(raw: &RawPipe) -> std::result::Result<Self, Self::Error> {
        PipeSpec::new(&raw.path, &raw.facility, &raw.severity, &raw.tag)
    }
}

impl std::fmt::Display for PipeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}.{}, tag {})",
            self.path.display(),
            self.facility.name(),
            self.level.name(),
            self.tag
        )
    }
}

/// The syslog client libraries tag messages with the program name when the caller doesn't supply
/// one; so do we.
fn default_tag(path: &Path) -> Result<String> {
    std::env::current_exe()
        .ok()
        .and_then(|pbuf| pbuf.file_name().map(|os_str| os_str.to_os_string()))
        .map(|os_str| String::from_utf8_lossy(&bytes_from_os_str(os_str)).into_owned())
        .filter(|tag| !tag.is_empty())
        .ok_or_else(|| Error::NoTag {
            path: path.to_path_buf(),
            back: Backtrace::new(),
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_valid_spec() {
        let spec = PipeSpec::new("/tmp/access_log", "local6", "info", "nginx").unwrap();
        assert_eq!(spec.path(), Path::new("/tmp/access_log"));
        assert_eq!(spec.facility(), Facility::LOG_LOCAL6);
        assert_eq!(spec.level(), Level::LOG_INFO);
        assert_eq!(
            spec.priority(),
            Priority::new(Facility::LOG_LOCAL6, Level::LOG_INFO)
        );
        assert_eq!(spec.tag(), "nginx");
        assert_eq!(format!("{}", spec), "/tmp/access_log (local6.info, tag nginx)");
    }

    #[test]
    fn test_validation_order() {
        assert!(matches!(
            PipeSpec::new("", "", "", "nginx"),
            Err(Error::NoPath { .. })
        ));
        // Both fields are bad; the facility is reported
        assert!(matches!(
            PipeSpec::new("/tmp/x", "", "bogus", "nginx"),
            Err(Error::NoFacility { .. })
        ));
        match PipeSpec::new("/tmp/x", "local9", "bogus", "nginx") {
            Err(Error::UnknownFacility { path, name, .. }) => {
                assert_eq!(path, PathBuf::from("/tmp/x"));
                assert_eq!(name, "local9");
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            PipeSpec::new("/tmp/x", "local6", "", "nginx"),
            Err(Error::NoSeverity { .. })
        ));
        match PipeSpec::new("/tmp/x", "local6", "loud", "nginx") {
            Err(err @ Error::UnknownSeverity { .. }) => {
                assert!(err.is_configuration());
                assert_eq!(
                    format!("{}", err),
                    "Configuration error: \"/tmp/x\" has unknown severity (loud)"
                );
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_default_tag() {
        let spec = PipeSpec::new("/tmp/x", "daemon", "notice", "").unwrap();
        assert!(!spec.tag().is_empty());
    }

    #[test]
    fn test_parse() {
        let cfg = Config::from_toml(EXAMPLE_CONFIG).unwrap();
        assert_eq!(cfg.pipe.len(), 2);
        let specs = cfg.pipe_specs().unwrap();
        assert_eq!(specs[0].path(), Path::new("/tmp/access_log"));
        assert_eq!(specs[1].level(), Level::LOG_ERR);

        // Missing fields parse, but fail validation
        let cfg = Config::from_toml("[[pipe]]\npath = \"/tmp/a\"\nseverity = \"info\"\n").unwrap();
        assert!(matches!(cfg.pipe_specs(), Err(Error::NoFacility { .. })));

        // An empty file is an empty configuration
        assert!(Config::from_toml("").unwrap().pipe_specs().unwrap().is_empty());

        assert!(matches!(
            Config::from_toml("[[pipe]\npath ="),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_first_bad_pipe_fails_all() {
        let cfg = Config::from_toml(
            r#"
[[pipe]]
path = "/tmp/a"
facility = "local0"
severity = "info"

[[pipe]]
path = "/tmp/b"
facility = "local0"
severity = "verbose"
"#,
        )
        .unwrap();
        assert!(matches!(
            cfg.pipe_specs(),
            Err(Error::UnknownSeverity { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logpipe.conf");
        assert!(matches!(
            Config::from_file(&path),
            Err(Error::ConfigRead { .. })
        ));

        std::fs::write(&path, EXAMPLE_CONFIG).unwrap();
        assert_eq!(Config::from_file(&path).unwrap().pipe.len(), 2);

        std::fs::write(&path, "pipe = 3").unwrap();
        match Config::from_file(&path) {
            Err(Error::ConfigParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_usage() {
        let text = usage(Path::new(DEFAULT_CONFIG_PATH));
        assert!(text.starts_with("Write configuration file like this:\n---\n[[pipe]]"));
        assert!(text.ends_with("save in /etc/logpipe.conf\n"));
    }

    #[test]
    fn test_explain() {
        let path = Path::new("/etc/logpipe.conf");

        let err = Config::from_toml(
            "[[pipe]]\npath = \"/tmp/access_log\"\nfacility = \"local9\"\nseverity = \"info\"\n",
        )
        .and_then(|cfg| cfg.pipe_specs())
        .unwrap_err();
        let text = explain(&err, path);
        assert!(text.starts_with(&format!("{}\n", err)));
        assert!(text.ends_with(&usage(path)));

        // Not something the operator can fix by editing the file
        let err = Error::NoTag {
            path: PathBuf::from("/tmp/access_log"),
            back: Backtrace::new(),
        };
        let text = explain(&err, path);
        assert_eq!(text, format!("{}\n", err));
        assert!(!text.contains("Write configuration file like this"));
    }
}
