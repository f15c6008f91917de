// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use crate::name::CanonicalName;

/// Identity of a statement within one compiled composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementId(pub(crate) usize);

/// One owner occurrence inside a `+` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub id: StatementId,
    /// Term right before the owner. Empty when the owner heads the chain.
    pub input_links: BTreeSet<CanonicalName>,
    /// Term right after the owner. Empty when the owner ends the chain.
    pub output_links: BTreeSet<CanonicalName>,
    /// Set when the owner is written `&owner`: every input must deliver
    /// before the statement fires. Always equal to `input_links`.
    pub and_group: Option<BTreeSet<CanonicalName>>,
}

impl Statement {
    pub fn is_head(&self) -> bool {
        self.input_links.is_empty()
    }

    pub fn is_and(&self) -> bool {
        self.and_group.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub service: CanonicalName,
    pub comparison: Comparison,
    pub state: String,
}

impl Predicate {
    /// `==` needs the exact (case-sensitive) state; `!=` also holds when the
    /// service has not reported any state yet.
    pub fn holds(&self, observed: Option<&str>) -> bool {
        let equal = observed == Some(self.state.as_str());
        match self.comparison {
            Comparison::Equals => equal,
            Comparison::NotEquals => !equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    All,
    Any,
}

/// Guard of an `if` / `elseif` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub predicates: Vec<Predicate>,
    pub junction: Junction,
}

impl Condition {
    pub fn is_satisfied<F>(&self, state_of: &F) -> bool
    where
        F: Fn(&CanonicalName) -> Option<String>,
    {
        let check = |p: &Predicate| p.holds(state_of(&p.service).as_deref());
        match self.junction {
            Junction::All => self.predicates.iter().all(check),
            Junction::Any => self.predicates.iter().any(check),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub condition: Condition,
    pub statements: Vec<Statement>,
}

/// One top-level `;`-separated clause, as it concerns the owner.
///
/// A clause is either unconditional or conditional, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Unconditional(Vec<Statement>),
    Conditional {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Statement>>,
    },
}

impl Instruction {
    /// The statement set active for the current states: the unconditional
    /// set, the first branch whose guard holds, the `else` set, or nothing.
    pub fn select<F>(&self, state_of: &F) -> Option<&[Statement]>
    where
        F: Fn(&CanonicalName) -> Option<String>,
    {
        match self {
            Instruction::Unconditional(statements) => Some(statements.as_slice()),
            Instruction::Conditional { branches, otherwise } => branches
                .iter()
                .find(|branch| branch.condition.is_satisfied(state_of))
                .map(|branch| branch.statements.as_slice())
                .or(otherwise.as_deref()),
        }
    }

    /// Every statement of the instruction regardless of guards.
    pub fn statements(&self) -> Box<dyn Iterator<Item = &Statement> + '_> {
        match self {
            Instruction::Unconditional(statements) => Box::new(statements.iter()),
            Instruction::Conditional { branches, otherwise } => Box::new(
                branches
                    .iter()
                    .flat_map(|b| b.statements.iter())
                    .chain(otherwise.iter().flatten()),
            ),
        }
    }
}

/// A composition compiled for one owner service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledComposition {
    pub(crate) raw: String,
    pub(crate) owner: CanonicalName,
    pub(crate) instructions: Vec<Instruction>,
    /// Every service named in a chain term, the owner's clauses or not.
    pub(crate) participants: BTreeSet<CanonicalName>,
}

impl CompiledComposition {
    /// The exact source text this was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn owner(&self) -> &CanonicalName {
        &self.owner
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.instructions.iter().flat_map(|i| i.statements())
    }

    pub fn participants(&self) -> &BTreeSet<CanonicalName> {
        &self.participants
    }

    /// Whether a message from `sender` activates the (non-AND) `statement`.
    ///
    /// A statement heading its chain only accepts senders from outside the
    /// composition, such as an orchestrator injecting a request. A service of
    /// the composition reaches the owner through the statement listing it as
    /// input, so in `S1+S3+S1` the result coming back from `S3` ends at the
    /// tail occurrence instead of starting the chain again.
    pub fn accepts(&self, statement: &Statement, sender: &CanonicalName) -> bool {
        if statement.is_head() {
            !self.participants.contains(sender)
        } else {
            statement.input_links.contains(sender)
        }
    }

    pub fn has_and_statements(&self) -> bool {
        self.statements().any(Statement::is_and)
    }
}
