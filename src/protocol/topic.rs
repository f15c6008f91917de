// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::name::CanonicalName;

/// `:`-separated pub/sub topic.
///
/// A subscription topic matches every published topic it is a prefix of at a
/// `:` boundary: `done` matches `done:10.1.1.1_java:c:S1`, and
/// `10.1.1.1_java:c` matches every service in container `c`, but
/// `10.1.1.1_java:c:S1` does not match `10.1.1.1_java:c:S10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(String);

/// Domain of DPE control topics.
pub const CONTROL_DOMAIN: &str = "dpe";
/// Domain of synchronous reply topics.
pub const REPLY_DOMAIN: &str = "ret";

impl Topic {
    pub fn new(topic: impl Into<String>) -> Self {
        Self(topic.into())
    }

    /// Topic a service (or any named component) receives data on.
    pub fn of(name: &CanonicalName) -> Self {
        Self(name.to_string())
    }

    /// Topic the DPE `dpe` receives control commands on.
    pub fn control(dpe: &CanonicalName) -> Self {
        Self(format!("{}:{}", CONTROL_DOMAIN, dpe.dpe_name()))
    }

    pub fn reply(id: u64) -> Self {
        Self(format!("{}:{}", REPLY_DOMAIN, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when a subscription on `self` should receive `published`.
    pub fn matches(&self, published: &Topic) -> bool {
        match published.0.strip_prefix(&self.0) {
            Some(rest) => rest.is_empty() || rest.starts_with(':'),
            None => false,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching_respects_boundaries() {
        let published = Topic::new("done:10.1.1.1_java:c:S10");
        assert!(Topic::new("done").matches(&published));
        assert!(Topic::new("done:10.1.1.1_java:c").matches(&published));
        assert!(Topic::new("done:10.1.1.1_java:c:S10").matches(&published));
        assert!(!Topic::new("done:10.1.1.1_java:c:S1").matches(&published));
        assert!(!Topic::new("data").matches(&published));
    }

    #[test]
    fn test_control_topic_uses_dpe_part() {
        let service: CanonicalName = "10.1.1.1_java:c:S1".parse().unwrap();
        assert_eq!(Topic::control(&service).as_str(), "dpe:10.1.1.1_java");
    }
}
