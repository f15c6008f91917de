// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::NameError;

/// Language a DPE runs engines in. Determines the default DPE port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Java,
    Cpp,
    Python,
}

impl Lang {
    pub fn default_port(self) -> u16 {
        match self {
            Lang::Java => 7771,
            Lang::Cpp => 7781,
            Lang::Python => 7791,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lang::Java => "java",
            Lang::Cpp => "cpp",
            Lang::Python => "python",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "java" => Ok(Lang::Java),
            "cpp" => Ok(Lang::Cpp),
            "python" => Ok(Lang::Python),
            other => Err(NameError::UnknownLang {
                lang: other.to_string(),
            }),
        }
    }
}
