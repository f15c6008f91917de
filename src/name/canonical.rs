// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use super::Lang;
use crate::errors::NameError;

/// Which level of the hierarchy a canonical name addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Dpe,
    Container,
    Service,
}

/// Immutable, structurally compared address of a DPE, container or service.
///
/// Invariant: `engine` is only ever set together with `container`, and no
/// component contains a separator character (`:`, `_` in the host, `%`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalName {
    host: String,
    port: u16,
    lang: Lang,
    container: Option<String>,
    engine: Option<String>,
}

impl CanonicalName {
    /// Build a DPE name. `port` defaults to the language default.
    pub fn dpe(host: &str, port: Option<u16>, lang: Lang) -> Result<Self, NameError> {
        let name = Self {
            host: host.to_string(),
            port: port.unwrap_or_else(|| lang.default_port()),
            lang,
            container: None,
            engine: None,
        };
        validate_host(&name.to_string(), host)?;
        if name.port == 0 {
            return Err(NameError::InvalidPort {
                name: name.to_string(),
                port: "0".to_string(),
            });
        }
        Ok(name)
    }

    /// Build the name of container `container` on the DPE `dpe`.
    pub fn container(dpe: &CanonicalName, container: &str) -> Result<Self, NameError> {
        let mut name = dpe.dpe_name();
        name.container = Some(container.to_string());
        validate_component(&name.to_string(), "container", container)?;
        Ok(name)
    }

    /// Build the name of service `engine` inside the container `container`.
    pub fn service(container: &CanonicalName, engine: &str) -> Result<Self, NameError> {
        if container.kind() != NameKind::Container {
            return Err(NameError::WrongKind {
                name: container.to_string(),
                expected: "container",
            });
        }
        let mut name = container.clone();
        name.engine = Some(engine.to_string());
        validate_component(&name.to_string(), "engine", engine)?;
        Ok(name)
    }

    /// Parse `s` and require it to name a service.
    pub fn parse_service(s: &str) -> Result<Self, NameError> {
        Self::parse_kind(s, NameKind::Service, "service")
    }

    pub fn parse_container(s: &str) -> Result<Self, NameError> {
        Self::parse_kind(s, NameKind::Container, "container")
    }

    pub fn parse_dpe(s: &str) -> Result<Self, NameError> {
        Self::parse_kind(s, NameKind::Dpe, "DPE")
    }

    fn parse_kind(s: &str, kind: NameKind, expected: &'static str) -> Result<Self, NameError> {
        let name: CanonicalName = s.parse()?;
        if name.kind() != kind {
            return Err(NameError::WrongKind {
                name: s.to_string(),
                expected,
            });
        }
        Ok(name)
    }

    pub fn kind(&self) -> NameKind {
        match (&self.container, &self.engine) {
            (None, _) => NameKind::Dpe,
            (Some(_), None) => NameKind::Container,
            (Some(_), Some(_)) => NameKind::Service,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn container_part(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn engine_part(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    /// The DPE this name lives on (itself for a DPE name).
    pub fn dpe_name(&self) -> CanonicalName {
        Self {
            host: self.host.clone(),
            port: self.port,
            lang: self.lang,
            container: None,
            engine: None,
        }
    }

    /// The container of a service, the container itself, or `None` for a DPE.
    pub fn container_name(&self) -> Option<CanonicalName> {
        self.container.as_ref().map(|container| Self {
            host: self.host.clone(),
            port: self.port,
            lang: self.lang,
            container: Some(container.clone()),
            engine: None,
        })
    }

    /// True when both names live in the same DPE process (host + port).
    ///
    /// Two DPEs of different languages on one host never share a port, so
    /// the language is not compared.
    pub fn same_dpe(&self, other: &CanonicalName) -> bool {
        self.host == other.host && self.port == other.port
    }

    /// `self` is a DPE name and `other` is a container or service on it.
    pub fn is_dpe_of(&self, other: &CanonicalName) -> bool {
        self.kind() == NameKind::Dpe
            && other.kind() != NameKind::Dpe
            && self.same_dpe(other)
            && self.lang == other.lang
    }

    /// `self` is a container name and `service` is a service inside it.
    pub fn is_container_of(&self, service: &CanonicalName) -> bool {
        self.kind() == NameKind::Container
            && service.kind() == NameKind::Service
            && service.container_name().as_ref() == Some(self)
    }

    /// `self` is a service name living inside `container`.
    pub fn is_service_of(&self, container: &CanonicalName) -> bool {
        container.is_container_of(self)
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)?;
        if self.port != self.lang.default_port() {
            write!(f, "%{}", self.port)?;
        }
        write!(f, "_{}", self.lang)?;
        if let Some(container) = &self.container {
            write!(f, ":{}", container)?;
        }
        if let Some(engine) = &self.engine {
            write!(f, ":{}", engine)?;
        }
        Ok(())
    }
}

impl FromStr for CanonicalName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }

        let mut parts = s.split(':');
        let dpe = parts.next().unwrap_or_default();
        let container = parts.next();
        let engine = parts.next();
        if parts.next().is_some() {
            return Err(NameError::TooManyParts { name: s.to_string() });
        }

        let (host_port, lang) = dpe.split_once('_').ok_or_else(|| NameError::MissingLang {
            name: s.to_string(),
        })?;
        let lang: Lang = lang.parse()?;

        let (host, port) = match host_port.split_once('%') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| NameError::InvalidPort {
                        name: s.to_string(),
                        port: port.to_string(),
                    })?;
                (host, port)
            }
            None => (host_port, lang.default_port()),
        };
        validate_host(s, host)?;

        if let Some(container) = container {
            validate_component(s, "container", container)?;
        }
        if let Some(engine) = engine {
            validate_component(s, "engine", engine)?;
        }

        Ok(Self {
            host: host.to_string(),
            port,
            lang,
            container: container.map(str::to_string),
            engine: engine.map(str::to_string),
        })
    }
}

fn validate_host(name: &str, host: &str) -> Result<(), NameError> {
    let valid = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(NameError::InvalidComponent {
            name: name.to_string(),
            component: "host",
            value: host.to_string(),
        })
    }
}

fn validate_component(name: &str, component: &'static str, value: &str) -> Result<(), NameError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(NameError::InvalidComponent {
            name: name.to_string(),
            component,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_driven() {
        struct TestCase {
            name: &'static str,
            input: &'static str,
            expected_kind: Option<NameKind>,
        }

        let test_cases = vec![
            TestCase { name: "dpe", input: "10.1.1.1_java", expected_kind: Some(NameKind::Dpe) },
            TestCase { name: "dpe with port", input: "10.1.1.1%8000_cpp", expected_kind: Some(NameKind::Dpe) },
            TestCase { name: "container", input: "localhost_python:text", expected_kind: Some(NameKind::Container) },
            TestCase { name: "service", input: "10.1.1.1_java:text:Upper", expected_kind: Some(NameKind::Service) },
            TestCase { name: "empty", input: "", expected_kind: None },
            TestCase { name: "no lang", input: "10.1.1.1:text", expected_kind: None },
            TestCase { name: "bad lang", input: "10.1.1.1_rust", expected_kind: None },
            TestCase { name: "bad port", input: "10.1.1.1%x_java", expected_kind: None },
            TestCase { name: "zero port", input: "10.1.1.1%0_java", expected_kind: None },
            TestCase { name: "four parts", input: "10.1.1.1_java:a:b:c", expected_kind: None },
            TestCase { name: "empty container", input: "10.1.1.1_java::b", expected_kind: None },
            TestCase { name: "ampersand", input: "10.1.1.1_java:a:&b", expected_kind: None },
            TestCase { name: "underscore host", input: "my_host_java", expected_kind: None },
        ];

        for case in test_cases {
            let parsed = case.input.parse::<CanonicalName>();
            match case.expected_kind {
                Some(kind) => {
                    let name = parsed.unwrap_or_else(|e| panic!("{}: unexpected error {e}", case.name));
                    assert_eq!(name.kind(), kind, "{}", case.name);
                }
                None => assert!(parsed.is_err(), "{}: expected an error", case.name),
            }
        }
    }

    #[test]
    fn test_default_port_is_normalised() {
        let implicit: CanonicalName = "10.1.1.1_java:c:S1".parse().unwrap();
        let explicit: CanonicalName = "10.1.1.1%7771_java:c:S1".parse().unwrap();
        assert_eq!(implicit, explicit);
        assert_eq!(explicit.to_string(), "10.1.1.1_java:c:S1");

        let custom: CanonicalName = "10.1.1.1%9000_java:c:S1".parse().unwrap();
        assert_ne!(custom, implicit);
        assert_eq!(custom.to_string(), "10.1.1.1%9000_java:c:S1");
        assert_eq!(custom.port(), 9000);
    }

    #[test]
    fn test_engine_names_do_not_match_by_prefix() {
        let s1: CanonicalName = "10.1.1.1_java:C:S1".parse().unwrap();
        let s10: CanonicalName = "10.1.1.1_java:C:S10".parse().unwrap();
        assert_ne!(s1, s10);
    }

    #[test]
    fn test_containment() {
        let dpe = CanonicalName::dpe("10.1.1.1", None, Lang::Java).unwrap();
        let container = CanonicalName::container(&dpe, "text").unwrap();
        let service = CanonicalName::service(&container, "Upper").unwrap();
        let elsewhere: CanonicalName = "10.1.1.2_java:text:Upper".parse().unwrap();

        assert!(dpe.is_dpe_of(&container));
        assert!(dpe.is_dpe_of(&service));
        assert!(container.is_container_of(&service));
        assert!(service.is_service_of(&container));
        assert!(!container.is_container_of(&elsewhere));
        assert!(!service.is_container_of(&service));
        assert!(!dpe.is_dpe_of(&dpe));

        assert_eq!(service.dpe_name(), dpe);
        assert_eq!(service.container_name(), Some(container.clone()));
        assert_eq!(dpe.container_name(), None);
        assert_eq!(service.engine_part(), Some("Upper"));
    }

    #[test]
    fn test_same_dpe_compares_host_and_port() {
        let a: CanonicalName = "10.1.1.1_java:c:A".parse().unwrap();
        let b: CanonicalName = "10.1.1.1_java:d:B".parse().unwrap();
        let c: CanonicalName = "10.1.1.1%9999_java:c:C".parse().unwrap();
        let d: CanonicalName = "10.1.1.2_java:c:A".parse().unwrap();
        assert!(a.same_dpe(&b));
        assert!(!a.same_dpe(&c));
        assert!(!a.same_dpe(&d));
    }

    #[test]
    fn test_builders_validate_components() {
        let dpe = CanonicalName::dpe("10.1.1.1", Some(8000), Lang::Cpp).unwrap();
        assert!(CanonicalName::container(&dpe, "bad:name").is_err());
        assert!(CanonicalName::service(&dpe, "Engine").is_err());
        assert!(CanonicalName::dpe("bad_host", None, Lang::Java).is_err());
        assert!(CanonicalName::parse_service("10.1.1.1_java:text").is_err());
        assert!(CanonicalName::parse_container("10.1.1.1_java:text").is_ok());
    }
}
