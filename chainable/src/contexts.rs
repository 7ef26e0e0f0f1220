use crate::dispatch::Dispatchable;
use crate::error::ChainError;
use std::collections::HashMap;
use std::sync::Arc;

/// Named contexts a chain can be repointed to mid-way.
#[derive(Clone, Default)]
pub struct Contexts {
    contexts: HashMap<String, Arc<dyn Dispatchable>>,
}

impl Contexts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Dispatchable + 'static>(&mut self, name: &str, context: Arc<C>) {
        self.contexts.insert(name.to_string(), context);
    }

    pub fn register_shared(&mut self, name: &str, context: Arc<dyn Dispatchable>) {
        self.contexts.insert(name.to_string(), context);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Dispatchable>> {
        self.contexts.get(name)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Dispatchable>, ChainError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ChainError::ContextNotFound(name.to_string()))
    }
}

impl std::fmt::Debug for Contexts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.contexts.keys().collect();
        names.sort();

        f.debug_struct("Contexts").field("contexts", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::NoContext;
    use crate::module::Module;

    #[test]
    fn test_resolve_registered_context() {
        let mut contexts = Contexts::new();
        contexts.register("Nothing", Arc::new(NoContext));
        contexts.register("Tools", Arc::new(Module::new()));

        assert_eq!(contexts.resolve("Nothing").unwrap().kind(), "no context");
        assert_eq!(contexts.resolve("Tools").unwrap().kind(), "module");
    }

    #[test]
    fn test_resolve_unknown_context() {
        let contexts = Contexts::new();

        match contexts.resolve("Missing") {
            Err(ChainError::ContextNotFound(name)) => assert_eq!(name, "Missing"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("context should not resolve"),
        }
    }
}
