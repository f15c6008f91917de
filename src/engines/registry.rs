use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::builtin::*;
use super::Engine;
use crate::errors::DeployError;

/// Constructor for one engine instance.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn Engine> + Send + Sync>;

/// Plugin table mapping an engine type name to its constructor.
///
/// Deploying a service looks up its engine type here and calls the
/// constructor once per object-pool slot.
///
/// # Example
/// ```
/// use dpe_runtime::engines::EngineRegistry;
///
/// let registry = EngineRegistry::with_builtins();
/// assert!(registry.contains("reverse_text"));
/// let engines = registry.instantiate("reverse_text", 3).unwrap();
/// assert_eq!(engines.len(), 3);
/// ```
#[derive(Clone, Default)]
pub struct EngineRegistry {
    factories: HashMap<String, EngineFactory>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the engines shipped in [`super::builtin`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("change_text_case_upper", || Box::new(ChangeTextCaseEngine::upper()));
        registry.register("change_text_case_lower", || Box::new(ChangeTextCaseEngine::lower()));
        registry.register("change_text_case_title", || Box::new(ChangeTextCaseEngine::title()));
        registry.register("reverse_text", || Box::new(ReverseTextEngine::new()));
        registry.register("token_counter", || Box::new(TokenCounterEngine::new()));
        registry.register("text_length_classifier", || Box::new(TextLengthClassifierEngine::new()));
        registry.register("prefix_suffix_adder", || Box::new(PrefixSuffixAdderEngine::default()));
        registry
    }

    /// Register (or replace) the constructor for `engine_type`.
    pub fn register<F>(&mut self, engine_type: &str, factory: F)
    where
        F: Fn() -> Box<dyn Engine> + Send + Sync + 'static,
    {
        self.factories.insert(engine_type.to_string(), Arc::new(factory));
    }

    pub fn contains(&self, engine_type: &str) -> bool {
        self.factories.contains_key(engine_type)
    }

    /// Sorted list of registered engine types.
    pub fn list_available(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn create(&self, engine_type: &str) -> Result<Box<dyn Engine>, DeployError> {
        self.factories
            .get(engine_type)
            .map(|factory| factory())
            .ok_or_else(|| DeployError::UnknownEngineType(engine_type.to_string()))
    }

    /// Create `count` independent instances for one service's object pool.
    pub fn instantiate(&self, engine_type: &str, count: usize) -> Result<Vec<Box<dyn Engine>>, DeployError> {
        let factory = self
            .factories
            .get(engine_type)
            .ok_or_else(|| DeployError::UnknownEngineType(engine_type.to_string()))?;
        Ok((0..count).map(|_| factory()).collect())
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engine_types", &self.list_available())
            .finish()
    }
}
