// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Control commands exchanged between orchestrators, front-end and DPEs.
//!
//! Commands are plain text: a verb followed by `?`-separated positional
//! arguments, e.g.
//!
//! ```text
//! START_CONTAINER?10.1.1.1_java:text?text services
//! DEPLOY_SERVICE?10.1.1.1_java:text:Upper?change_text_case_upper?4?upper-cases text
//! SERVICE_REPORT_DONE?10.1.1.1_java:text:Upper?10
//! SET_FRONT_END?10.1.1.9?7771?java
//! ```
//!
//! A trailing description is the last argument and may itself contain `?`.

use std::fmt;
use std::str::FromStr;

use crate::errors::ControlError;
use crate::name::{CanonicalName, Lang};

pub const START_DPE: &str = "START_DPE";
pub const STOP_DPE: &str = "STOP_DPE";
pub const PING_DPE: &str = "PING_DPE";
pub const SET_FRONT_END: &str = "SET_FRONT_END";
pub const START_CONTAINER: &str = "START_CONTAINER";
pub const STOP_CONTAINER: &str = "STOP_CONTAINER";
pub const DEPLOY_SERVICE: &str = "DEPLOY_SERVICE";
pub const REMOVE_SERVICE: &str = "REMOVE_SERVICE";
pub const SERVICE_REPORT_DONE: &str = "SERVICE_REPORT_DONE";
pub const SERVICE_REPORT_DATA: &str = "SERVICE_REPORT_DATA";

const SEPARATOR: char = '?';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// A DPE announces itself to its front-end.
    StartDpe { dpe: CanonicalName },
    /// A DPE leaves; addressed to itself it means "shut down".
    StopDpe { dpe: CanonicalName },
    PingDpe,
    SetFrontEnd { front_end: CanonicalName },
    StartContainer {
        container: CanonicalName,
        description: String,
    },
    StopContainer { container: CanonicalName },
    DeployService {
        service: CanonicalName,
        engine_type: String,
        pool_size: usize,
        description: String,
    },
    RemoveService { service: CanonicalName },
    ReportDone { service: CanonicalName, every: u32 },
    ReportData { service: CanonicalName, every: u32 },
}

impl ControlRequest {
    pub fn verb(&self) -> &'static str {
        match self {
            ControlRequest::StartDpe { .. } => START_DPE,
            ControlRequest::StopDpe { .. } => STOP_DPE,
            ControlRequest::PingDpe => PING_DPE,
            ControlRequest::SetFrontEnd { .. } => SET_FRONT_END,
            ControlRequest::StartContainer { .. } => START_CONTAINER,
            ControlRequest::StopContainer { .. } => STOP_CONTAINER,
            ControlRequest::DeployService { .. } => DEPLOY_SERVICE,
            ControlRequest::RemoveService { .. } => REMOVE_SERVICE,
            ControlRequest::ReportDone { .. } => SERVICE_REPORT_DONE,
            ControlRequest::ReportData { .. } => SERVICE_REPORT_DATA,
        }
    }
}

impl fmt::Display for ControlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.verb();
        match self {
            ControlRequest::StartDpe { dpe } | ControlRequest::StopDpe { dpe } => {
                write!(f, "{verb}?{dpe}")
            }
            ControlRequest::PingDpe => f.write_str(verb),
            ControlRequest::SetFrontEnd { front_end } => write!(
                f,
                "{verb}?{}?{}?{}",
                front_end.host(),
                front_end.port(),
                front_end.lang()
            ),
            ControlRequest::StartContainer { container, description } => {
                write!(f, "{verb}?{container}")?;
                if !description.is_empty() {
                    write!(f, "?{description}")?;
                }
                Ok(())
            }
            ControlRequest::StopContainer { container } => write!(f, "{verb}?{container}"),
            ControlRequest::DeployService {
                service,
                engine_type,
                pool_size,
                description,
            } => {
                write!(f, "{verb}?{service}?{engine_type}?{pool_size}")?;
                if !description.is_empty() {
                    write!(f, "?{description}")?;
                }
                Ok(())
            }
            ControlRequest::RemoveService { service } => write!(f, "{verb}?{service}"),
            ControlRequest::ReportDone { service, every }
            | ControlRequest::ReportData { service, every } => {
                write!(f, "{verb}?{service}?{every}")
            }
        }
    }
}

impl FromStr for ControlRequest {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ControlError::Empty);
        }
        let (verb, rest) = match s.split_once(SEPARATOR) {
            Some((verb, rest)) => (verb, Some(rest)),
            None => (s, None),
        };
        let args = Args::new(rest);

        match verb {
            START_DPE => {
                args.arity(START_DPE, "1", 1..=1)?;
                Ok(ControlRequest::StartDpe {
                    dpe: args.dpe(START_DPE, 0)?,
                })
            }
            STOP_DPE => {
                args.arity(STOP_DPE, "1", 1..=1)?;
                Ok(ControlRequest::StopDpe {
                    dpe: args.dpe(STOP_DPE, 0)?,
                })
            }
            PING_DPE => {
                args.arity(PING_DPE, "0", 0..=0)?;
                Ok(ControlRequest::PingDpe)
            }
            SET_FRONT_END => {
                args.arity(SET_FRONT_END, "3", 3..=3)?;
                let port: u16 = args.number(SET_FRONT_END, 1)?;
                let lang: Lang = args.get(2).parse().map_err(|e: crate::errors::NameError| {
                    ControlError::InvalidArgument {
                        verb: SET_FRONT_END,
                        value: args.get(2).to_string(),
                        reason: e.to_string(),
                    }
                })?;
                let front_end = CanonicalName::dpe(args.get(0), Some(port), lang).map_err(|e| {
                    ControlError::InvalidArgument {
                        verb: SET_FRONT_END,
                        value: args.get(0).to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(ControlRequest::SetFrontEnd { front_end })
            }
            START_CONTAINER => {
                args.arity(START_CONTAINER, "1-2", 1..=usize::MAX)?;
                Ok(ControlRequest::StartContainer {
                    container: args.container(START_CONTAINER, 0)?,
                    description: args.tail(1),
                })
            }
            STOP_CONTAINER => {
                args.arity(STOP_CONTAINER, "1", 1..=1)?;
                Ok(ControlRequest::StopContainer {
                    container: args.container(STOP_CONTAINER, 0)?,
                })
            }
            DEPLOY_SERVICE => {
                args.arity(DEPLOY_SERVICE, "3-4", 3..=usize::MAX)?;
                Ok(ControlRequest::DeployService {
                    service: args.service(DEPLOY_SERVICE, 0)?,
                    engine_type: args.get(1).to_string(),
                    pool_size: args.number(DEPLOY_SERVICE, 2)?,
                    description: args.tail(3),
                })
            }
            REMOVE_SERVICE => {
                args.arity(REMOVE_SERVICE, "1", 1..=1)?;
                Ok(ControlRequest::RemoveService {
                    service: args.service(REMOVE_SERVICE, 0)?,
                })
            }
            SERVICE_REPORT_DONE => {
                args.arity(SERVICE_REPORT_DONE, "2", 2..=2)?;
                Ok(ControlRequest::ReportDone {
                    service: args.service(SERVICE_REPORT_DONE, 0)?,
                    every: args.number(SERVICE_REPORT_DONE, 1)?,
                })
            }
            SERVICE_REPORT_DATA => {
                args.arity(SERVICE_REPORT_DATA, "2", 2..=2)?;
                Ok(ControlRequest::ReportData {
                    service: args.service(SERVICE_REPORT_DATA, 0)?,
                    every: args.number(SERVICE_REPORT_DATA, 1)?,
                })
            }
            other => Err(ControlError::UnknownVerb(other.to_string())),
        }
    }
}

/// Positional arguments of one command.
struct Args<'a> {
    raw: Option<&'a str>,
    parts: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn new(raw: Option<&'a str>) -> Self {
        let parts = raw.map(|r| r.split(SEPARATOR).collect()).unwrap_or_default();
        Self { raw, parts }
    }

    fn arity(
        &self,
        verb: &'static str,
        expected: &'static str,
        range: std::ops::RangeInclusive<usize>,
    ) -> Result<(), ControlError> {
        if range.contains(&self.parts.len()) {
            Ok(())
        } else {
            Err(ControlError::Arity {
                verb,
                expected,
                got: self.parts.len(),
            })
        }
    }

    fn get(&self, index: usize) -> &'a str {
        self.parts.get(index).copied().unwrap_or_default()
    }

    /// Everything from argument `index` on, re-joined with `?`.
    fn tail(&self, index: usize) -> String {
        let Some(raw) = self.raw else {
            return String::new();
        };
        raw.splitn(index + 1, SEPARATOR)
            .nth(index)
            .unwrap_or_default()
            .to_string()
    }

    fn number<T: FromStr>(&self, verb: &'static str, index: usize) -> Result<T, ControlError>
    where
        T::Err: fmt::Display,
    {
        self.get(index)
            .parse()
            .map_err(|e: T::Err| ControlError::InvalidArgument {
                verb,
                value: self.get(index).to_string(),
                reason: e.to_string(),
            })
    }

    fn named(
        &self,
        verb: &'static str,
        index: usize,
        parse: fn(&str) -> Result<CanonicalName, crate::errors::NameError>,
    ) -> Result<CanonicalName, ControlError> {
        parse(self.get(index)).map_err(|e| ControlError::InvalidArgument {
            verb,
            value: self.get(index).to_string(),
            reason: e.to_string(),
        })
    }

    fn dpe(&self, verb: &'static str, index: usize) -> Result<CanonicalName, ControlError> {
        self.named(verb, index, CanonicalName::parse_dpe)
    }

    fn container(&self, verb: &'static str, index: usize) -> Result<CanonicalName, ControlError> {
        self.named(verb, index, CanonicalName::parse_container)
    }

    fn service(&self, verb: &'static str, index: usize) -> Result<CanonicalName, ControlError> {
        self.named(verb, index, CanonicalName::parse_service)
    }
}
