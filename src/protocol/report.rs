// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt;

use super::Topic;
use crate::name::CanonicalName;

/// Severity of warning and error reports, carried on the wire as 1-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Minor = 1,
    Major = 2,
    Critical = 3,
}

impl Severity {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Out-of-range values clamp to the nearest severity.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 | 1 => Severity::Minor,
            2 => Severity::Major,
            _ => Severity::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Categories of reports a service publishes about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Done,
    Data,
    Warning(Severity),
    Error(Severity),
    Info,
}

impl ReportKind {
    /// `done:<name>`, `warning:<severity>:<name>`, ...
    pub fn topic(self, name: &CanonicalName) -> Topic {
        match self {
            ReportKind::Done => Topic::new(format!("done:{}", name)),
            ReportKind::Data => Topic::new(format!("data:{}", name)),
            ReportKind::Warning(severity) => Topic::new(format!("warning:{}:{}", severity, name)),
            ReportKind::Error(severity) => Topic::new(format!("error:{}:{}", severity, name)),
            ReportKind::Info => Topic::new(format!("info:{}", name)),
        }
    }

    /// The prefix a subscriber uses to receive every report of this category.
    pub fn category(self) -> Topic {
        match self {
            ReportKind::Done => Topic::new("done"),
            ReportKind::Data => Topic::new("data"),
            ReportKind::Warning(_) => Topic::new("warning"),
            ReportKind::Error(_) => Topic::new("error"),
            ReportKind::Info => Topic::new("info"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_topics() {
        let name: CanonicalName = "10.1.1.1_java:c:S1".parse().unwrap();
        assert_eq!(ReportKind::Done.topic(&name).as_str(), "done:10.1.1.1_java:c:S1");
        assert_eq!(ReportKind::Data.topic(&name).as_str(), "data:10.1.1.1_java:c:S1");
        assert_eq!(
            ReportKind::Error(Severity::Critical).topic(&name).as_str(),
            "error:3:10.1.1.1_java:c:S1"
        );
        assert_eq!(
            ReportKind::Warning(Severity::Minor).topic(&name).as_str(),
            "warning:1:10.1.1.1_java:c:S1"
        );
        assert!(ReportKind::Error(Severity::Minor)
            .category()
            .matches(&ReportKind::Error(Severity::Major).topic(&name)));
    }

    #[test]
    fn test_severity_clamps() {
        assert_eq!(Severity::from_u32(0), Severity::Minor);
        assert_eq!(Severity::from_u32(2), Severity::Major);
        assert_eq!(Severity::from_u32(42), Severity::Critical);
    }
}
