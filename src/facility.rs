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

//! syslog facility, level & priority defintions.
//!
//! [`Facility`] and [`Level`] replicate the names used in `<syslog.h>`. The configuration file
//! names them the way `logger(1)` & `syslog.conf(5)` do: `local6`, `info` and so on. The mapping
//! between the two lives in a pair of `static` tables, so it is fixed at compile time & may be
//! shared freely between worker threads.

type StdResult<T, E> = std::result::Result<T, E>;

/// The twenty facilities [logpipe](crate) recognizes. The enumeration values duplicate the
/// constants defined in `<syslog.h>`, albeit multiplied by 8 for convenience in forming priorities
/// (which again mirrors the `#define`s in `<syslog.h>`).
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Facility {
    /// kernel messages
    LOG_KERN = 0 << 3,
    /// random user-level messages
    LOG_USER = 1 << 3,
    /// mail system
    LOG_MAIL = 2 << 3,
    /// system daemons
    LOG_DAEMON = 3 << 3,
    /// security/authorization messages
    LOG_AUTH = 4 << 3,
    /// messages generated internally by syslogd
    LOG_SYSLOG = 5 << 3,
    /// line printer subsystem
    LOG_LPR = 6 << 3,
    /// network news subsystem
    LOG_NEWS = 7 << 3,
    /// UUCP subsystem
    LOG_UUCP = 8 << 3,
    /// clock daemon
    LOG_CRON = 9 << 3,
    /// security/authorization messages (private)
    LOG_AUTHPRIV = 10 << 3,
    /// ftp daemon
    LOG_FTP = 11 << 3,
    /// reserved for local use
    LOG_LOCAL0 = 16 << 3,
    /// reserved for local use
    LOG_LOCAL1 = 17 << 3,
    /// reserved for local use
    LOG_LOCAL2 = 18 << 3,
    /// reserved for local use
    LOG_LOCAL3 = 19 << 3,
    /// reserved for local use
    LOG_LOCAL4 = 20 << 3,
    /// reserved for local use
    LOG_LOCAL5 = 21 << 3,
    /// reserved for local use
    LOG_LOCAL6 = 22 << 3,
    /// reserved for local use
    LOG_LOCAL7 = 23 << 3,
}

/// Configuration file names for each [`Facility`]
pub static FACILITIES: [(&str, Facility); 20] = [
    ("kern", Facility::LOG_KERN),
    ("user", Facility::LOG_USER),
    ("mail", Facility::LOG_MAIL),
    ("daemon", Facility::LOG_DAEMON),
    ("auth", Facility::LOG_AUTH),
    ("syslog", Facility::LOG_SYSLOG),
    ("lpr", Facility::LOG_LPR),
    ("news", Facility::LOG_NEWS),
    ("uucp", Facility::LOG_UUCP),
    ("cron", Facility::LOG_CRON),
    ("authpriv", Facility::LOG_AUTHPRIV),
    ("ftp", Facility::LOG_FTP),
    ("local0", Facility::LOG_LOCAL0),
    ("local1", Facility::LOG_LOCAL1),
    ("local2", Facility::LOG_LOCAL2),
    ("local3", Facility::LOG_LOCAL3),
    ("local4", Facility::LOG_LOCAL4),
    ("local5", Facility::LOG_LOCAL5),
    ("local6", Facility::LOG_LOCAL6),
    ("local7", Facility::LOG_LOCAL7),
];

impl Facility {
    /// Look up a facility by its configuration file name (`"local6"`, say); names are
    /// case-sensitive
    pub fn from_name(name: &str) -> Option<Facility> {
        FACILITIES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, facility)| *facility)
    }
    /// The configuration file name for this facility
    pub fn name(&self) -> &'static str {
        match self {
            Facility::LOG_KERN => "kern",
            Facility::LOG_USER => "user",
            Facility::LOG_MAIL => "mail",
            Facility::LOG_DAEMON => "daemon",
            Facility::LOG_AUTH => "auth",
            Facility::LOG_SYSLOG => "syslog",
            Facility::LOG_LPR => "lpr",
            Facility::LOG_NEWS => "news",
            Facility::LOG_UUCP => "uucp",
            Facility::LOG_CRON => "cron",
            Facility::LOG_AUTHPRIV => "authpriv",
            Facility::LOG_FTP => "ftp",
            Facility::LOG_LOCAL0 => "local0",
            Facility::LOG_LOCAL1 => "local1",
            Facility::LOG_LOCAL2 => "local2",
            Facility::LOG_LOCAL3 => "local3",
            Facility::LOG_LOCAL4 => "local4",
            Facility::LOG_LOCAL5 => "local5",
            Facility::LOG_LOCAL6 => "local6",
            Facility::LOG_LOCAL7 => "local7",
        }
    }
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Facility::LOG_KERN => "LOG_KERN",
                Facility::LOG_USER => "LOG_USER",
                Facility::LOG_MAIL => "LOG_MAIL",
                Facility::LOG_DAEMON => "LOG_DAEMON",
                Facility::LOG_AUTH => "LOG_AUTH",
                Facility::LOG_SYSLOG => "LOG_SYSLOG",
                Facility::LOG_LPR => "LOG_LPR",
                Facility::LOG_NEWS => "LOG_NEWS",
                Facility::LOG_UUCP => "LOG_UUCP",
                Facility::LOG_CRON => "LOG_CRON",
                Facility::LOG_AUTHPRIV => "LOG_AUTHPRIV",
                Facility::LOG_FTP => "LOG_FTP",
                Facility::LOG_LOCAL0 => "LOG_LOCAL0",
                Facility::LOG_LOCAL1 => "LOG_LOCAL1",
                Facility::LOG_LOCAL2 => "LOG_LOCAL2",
                Facility::LOG_LOCAL3 => "LOG_LOCAL3",
                Facility::LOG_LOCAL4 => "LOG_LOCAL4",
                Facility::LOG_LOCAL5 => "LOG_LOCAL5",
                Facility::LOG_LOCAL6 => "LOG_LOCAL6",
                Facility::LOG_LOCAL7 => "LOG_LOCAL7",
            }
        )
    }
}

/// The eight syslog severity levels. The enumeration values duplicate the constants documented as
/// per the `syslog()` manual [page] & defined in `<syslog.h>`.
///
/// [page]: https://man7.org/linux/man-pages/man3/syslog.3.html
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    /// system is unusable
    LOG_EMERG,
    /// action must be take immediately
    LOG_ALERT,
    /// critical conditions
    LOG_CRIT,
    /// error conditions
    LOG_ERR,
    /// warning conditions
    LOG_WARNING,
    /// normal, but significant condition
    LOG_NOTICE,
    /// informational message
    LOG_INFO,
    /// debug-level message
    LOG_DEBUG,
}

/// Configuration file names for each [`Level`]
pub static LEVELS: [(&str, Level); 8] = [
    ("emerg", Level::LOG_EMERG),
    ("alert", Level::LOG_ALERT),
    ("crit", Level::LOG_CRIT),
    ("err", Level::LOG_ERR),
    ("warning", Level::LOG_WARNING),
    ("notice", Level::LOG_NOTICE),
    ("info", Level::LOG_INFO),
    ("debug", Level::LOG_DEBUG),
];

impl Level {
    /// Look up a severity by its configuration file name (`"info"`, say)
    pub fn from_name(name: &str) -> Option<Level> {
        LEVELS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, level)| *level)
    }
    pub fn name(&self) -> &'static str {
        LEVELS[*self as usize].0
    }
    fn from_code(code: u8) -> Level {
        LEVELS[(code & 0x07) as usize].1
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Level::LOG_EMERG => "LOG_EMERG",
                Level::LOG_ALERT => "LOG_ALERT",
                Level::LOG_CRIT => "LOG_CRIT",
                Level::LOG_ERR => "LOG_ERR",
                Level::LOG_WARNING => "LOG_WARNING",
                Level::LOG_NOTICE => "LOG_NOTICE",
                Level::LOG_INFO => "LOG_INFO",
                Level::LOG_DEBUG => "LOG_DEBUG",
            }
        )
    }
}

/// A syslog priority: facility & level, packed into a single byte
///
/// The facility occupies the high five bits, the level the low three. The only way to build one
/// is from a [`Facility`] and a [`Level`], so a [`Priority`] can never hold a value that didn't
/// come out of the tables above.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Priority(u8);

impl Priority {
    pub fn new(facility: Facility, level: Level) -> Priority {
        Priority(facility as u8 | level as u8)
    }
    pub fn value(&self) -> u8 {
        self.0
    }
    pub fn facility(&self) -> Option<Facility> {
        let code = self.0 & !0x07;
        FACILITIES
            .iter()
            .find(|(_, facility)| *facility as u8 == code)
            .map(|(_, facility)| *facility)
    }
    pub fn level(&self) -> Level {
        Level::from_code(self.0)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod facility_level_tests {
    use super::*;
    /// Test basic PRI formatting
    #[test]
    fn test_pri() {
        assert_eq!(14, Priority::new(Facility::LOG_USER, Level::LOG_INFO).value());
        assert_eq!(182, Priority::new(Facility::LOG_LOCAL6, Level::LOG_INFO).value());
        assert_eq!(format!("{}", Facility::LOG_FTP), "LOG_FTP".to_string());
        assert_eq!(format!("{:?}", Facility::LOG_FTP), "LOG_FTP".to_string());
    }

    #[test]
    fn test_names() {
        assert_eq!(Facility::from_name("local6"), Some(Facility::LOG_LOCAL6));
        assert_eq!(Facility::from_name("authpriv"), Some(Facility::LOG_AUTHPRIV));
        assert_eq!(Facility::from_name("LOCAL6"), None);
        assert_eq!(Facility::from_name("local8"), None);
        assert_eq!(Facility::from_name(""), None);
        assert_eq!(Level::from_name("err"), Some(Level::LOG_ERR));
        assert_eq!(Level::from_name("error"), None);
        assert_eq!(Level::from_name(""), None);

        // Names & table agree in both directions, with no two facilities sharing a name
        let mut names = std::collections::HashSet::new();
        for (name, facility) in FACILITIES.iter() {
            assert_eq!(facility.name(), *name);
            assert_eq!(Facility::from_name(facility.name()), Some(*facility));
            assert!(names.insert(facility.name()));
        }
        assert_eq!(Facility::LOG_USER.name(), "user");
        assert_eq!(Facility::LOG_KERN.name(), "kern");
        for (name, level) in LEVELS.iter() {
            assert_eq!(level.name(), *name);
        }
    }

    /// Every (facility, level) pair must map to its own priority, and decode back again
    #[test]
    fn test_encoding_is_injective() {
        let mut seen = std::collections::HashSet::new();
        for (_, facility) in FACILITIES.iter() {
            for (_, level) in LEVELS.iter() {
                let pri = Priority::new(*facility, *level);
                assert!(seen.insert(pri.value()), "collision at {}", pri);
                assert_eq!(pri.facility(), Some(*facility));
                assert_eq!(pri.level(), *level);
            }
        }
        assert_eq!(seen.len(), 160);
    }
}
