// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{compile, CompiledComposition};
use crate::errors::CompositionError;
use crate::name::CanonicalName;
use crate::observability::messages::composition::{CompositionCompiled, CompositionRejected};
use crate::observability::messages::StructuredLog;

/// Single-slot cache of the last composition compiled for one service.
///
/// Requests of one application usually carry the same composition text, so a
/// service compiles once and reuses the result until a different text shows
/// up, which replaces the slot.
pub struct CompositionCache {
    owner: CanonicalName,
    slot: RwLock<Option<Arc<CompiledComposition>>>,
    compilations: AtomicUsize,
}

impl CompositionCache {
    pub fn new(owner: CanonicalName) -> Self {
        Self {
            owner,
            slot: RwLock::new(None),
            compilations: AtomicUsize::new(0),
        }
    }

    /// Compiled form of `raw`, compiling only when it differs from the
    /// cached text. A failed compilation leaves the slot untouched.
    pub fn resolve(&self, raw: &str) -> Result<Arc<CompiledComposition>, CompositionError> {
        if let Some(cached) = self.slot.read().as_ref().filter(|c| c.raw() == raw) {
            return Ok(Arc::clone(cached));
        }

        let owner = self.owner.to_string();
        let compiled = match compile(raw, &self.owner) {
            Ok(compiled) => Arc::new(compiled),
            Err(e) => {
                CompositionRejected {
                    owner: &owner,
                    error: &e,
                }
                .log();
                return Err(e);
            }
        };
        self.compilations.fetch_add(1, Ordering::Relaxed);
        CompositionCompiled {
            owner: &owner,
            composition: raw,
            instructions: compiled.instructions().len(),
            statements: compiled.statements().count(),
        }
        .log();

        *self.slot.write() = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn current(&self) -> Option<Arc<CompiledComposition>> {
        self.slot.read().clone()
    }

    /// Number of compilations performed, cache hits excluded.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AB: &str = "10.1.1.1_java:c:A+10.1.1.1_java:c:B";
    const BC: &str = "10.1.1.1_java:c:B+10.1.1.1_java:c:C";

    fn cache() -> CompositionCache {
        CompositionCache::new("10.1.1.1_java:c:B".parse().unwrap())
    }

    #[test]
    fn test_same_text_compiles_once() {
        let cache = cache();
        let first = cache.resolve(AB).unwrap();
        let second = cache.resolve(AB).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.compilations(), 1);
    }

    #[test]
    fn test_new_text_replaces_slot() {
        let cache = cache();
        cache.resolve(AB).unwrap();
        cache.resolve(BC).unwrap();
        assert_eq!(cache.current().unwrap().raw(), BC);
        cache.resolve(AB).unwrap();
        assert_eq!(cache.compilations(), 3);
    }

    #[test]
    fn test_failed_compile_keeps_slot() {
        let cache = cache();
        cache.resolve(AB).unwrap();
        assert!(cache.resolve("10.1.1.1_java:c:A+").is_err());
        assert_eq!(cache.current().unwrap().raw(), AB);
        assert_eq!(cache.compilations(), 1);
    }
}
