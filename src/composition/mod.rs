// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Composition compiler.
//!
//! A composition is the routing expression attached to every request. It is
//! compiled once per owning service into the instructions that concern that
//! service only: where its input may come from and where its output goes.
//!
//! # Grammar
//!
//! ```text
//! composition   ::= clause (';' clause)*
//! clause        ::= chain | conditional
//! chain         ::= term ('+' term)*
//! conditional   ::= 'if' '(' condition ')' '{' block '}'
//!                   ('elseif' '(' condition ')' '{' block '}')*
//!                   ('else' '{' block '}')?
//! block         ::= chain (';' chain)*
//! condition     ::= predicate (('&&' | '||') predicate)*
//! predicate     ::= name ('==' | '!=') '"' literal '"'
//! term          ::= '&'? name (',' name)*
//! ```
//!
//! Whitespace outside string literals is ignored, `else if` is accepted as
//! `elseif`, and a condition may join predicates with `&&` or with `||` but
//! not both.
//!
//! # Example
//!
//! ```
//! use dpe_runtime::composition::compile;
//! use dpe_runtime::name::CanonicalName;
//!
//! let owner: CanonicalName = "10.1.1.1_java:c:B".parse().unwrap();
//! let compiled = compile(
//!     "10.1.1.1_java:c:A+10.1.1.1_java:c:B+10.1.1.1_java:c:C,10.1.1.1_java:c:D",
//!     &owner,
//! )
//! .unwrap();
//!
//! let statement = &compiled.statements().next().unwrap();
//! assert_eq!(statement.output_links.len(), 2);
//! ```

mod cache;
mod compiler;
mod model;

pub use cache::CompositionCache;
pub use compiler::{compile, entry_services};
pub use model::{
    Branch, Comparison, CompiledComposition, Condition, Instruction, Junction, Predicate, Statement,
    StatementId,
};
