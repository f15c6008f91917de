// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while parsing or building canonical names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("canonical name is empty")]
    Empty,

    #[error("'{name}' is missing the '_lang' suffix of the DPE part")]
    MissingLang { name: String },

    #[error("'{lang}' is not a supported language (expected java, cpp or python)")]
    UnknownLang { lang: String },

    #[error("'{name}' has an invalid port '{port}'")]
    InvalidPort { name: String, port: String },

    #[error("'{name}' has an invalid {component} component '{value}'")]
    InvalidComponent {
        name: String,
        component: &'static str,
        value: String,
    },

    #[error("'{name}' has more than three ':'-separated parts")]
    TooManyParts { name: String },

    #[error("'{name}' is not a {expected} name")]
    WrongKind { name: String, expected: &'static str },
}
