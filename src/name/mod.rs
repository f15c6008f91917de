// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Canonical names for DPEs, containers and services.
//!
//! Every addressable component of the runtime is identified by a canonical
//! name of the form
//!
//! ```text
//! host[%port]_lang[:container[:engine]]
//! ```
//!
//! * `10.1.1.1_java` names a DPE (default port for `java`)
//! * `10.1.1.1%8000_java:text` names a container on a DPE listening on 8000
//! * `10.1.1.1_java:text:Upper` names a service
//!
//! Names compare structurally: the default port is filled in while parsing, so
//! `10.1.1.1_java` and `10.1.1.1%7771_java` are the same DPE.

mod canonical;
mod lang;

pub use canonical::{CanonicalName, NameKind};
pub use lang::Lang;
