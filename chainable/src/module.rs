use crate::dispatch::{Callback, Dispatchable};
use crate::error::ChainError;
use std::collections::HashMap;
use std::sync::Arc;
use valu3::value::Value;

/// A named operation. `args[0]` is the chain's current value.
pub type Operation =
    Arc<dyn Fn(&[Value], Option<Callback<'_>>) -> Result<Value, ChainError> + Send + Sync>;

#[derive(Clone)]
struct OperationEntry {
    arity: Option<usize>,
    call: Operation,
}

/// A context built from closures, keyed by operation name.
#[derive(Clone, Default)]
pub struct Module {
    operations: HashMap<String, OperationEntry>,
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.operations.keys().collect();
        names.sort();

        f.debug_struct("Module")
            .field("operations", &names)
            .finish()
    }
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation accepting any number of arguments.
    pub fn register<F>(&mut self, name: &str, call: F)
    where
        F: Fn(&[Value], Option<Callback<'_>>) -> Result<Value, ChainError> + Send + Sync + 'static,
    {
        self.insert(name, None, operation(call));
    }

    /// Registers an operation that only answers when called with exactly
    /// `arity` arguments, the current value included.
    pub fn register_with_arity<F>(&mut self, name: &str, arity: usize, call: F)
    where
        F: Fn(&[Value], Option<Callback<'_>>) -> Result<Value, ChainError> + Send + Sync + 'static,
    {
        self.insert(name, Some(arity), operation(call));
    }

    pub fn insert(&mut self, name: &str, arity: Option<usize>, call: Operation) {
        self.operations
            .insert(name.to_string(), OperationEntry { arity, call });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Dispatchable for Module {
    fn supports(&self, name: &str, arity: usize) -> bool {
        match self.operations.get(name) {
            Some(entry) => entry.arity.map_or(true, |expected| expected == arity),
            None => false,
        }
    }

    fn responds_to(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
        callback: Option<Callback<'_>>,
    ) -> Result<Value, ChainError> {
        match self.operations.get(name) {
            Some(entry) if entry.arity.map_or(true, |expected| expected == args.len()) => {
                (entry.call)(&args, callback)
            }
            _ => Err(ChainError::missing(name, args.len(), self.kind())),
        }
    }

    fn kind(&self) -> &'static str {
        "module"
    }
}

pub fn operation<F>(call: F) -> Operation
where
    F: Fn(&[Value], Option<Callback<'_>>) -> Result<Value, ChainError> + Send + Sync + 'static,
{
    Arc::new(call)
}

/// Wraps a closure into an [`Operation`].
#[macro_export]
macro_rules! operation {
    ($call:expr) => {
        $crate::module::operation($call)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::text;
    use valu3::prelude::*;

    fn greeter() -> Module {
        let mut module = Module::new();

        module.register("greet", |args, _| {
            Ok(format!("Hello, {}", text(&args[0])).to_value())
        });
        module.register_with_arity("append", 2, |args, _| {
            Ok(format!("{} {}", text(&args[0]), text(&args[1])).to_value())
        });

        module
    }

    #[test]
    fn test_module_invokes_registered_operation() {
        let module = greeter();

        let result = module.invoke("greet", vec![Value::from("chain")], None).unwrap();

        assert_eq!(result, Value::from("Hello, chain"));
    }

    #[test]
    fn test_module_respects_fixed_arity() {
        let module = greeter();

        assert!(module.supports("append", 2));
        assert!(!module.supports("append", 1));
        assert!(module.responds_to("append"));
        assert!(!module.responds_to("shout"));

        let result = module.invoke("append", vec![Value::from("only")], None);
        assert!(result.unwrap_err().is_missing_capability());
    }

    #[test]
    fn test_module_unknown_operation() {
        let module = greeter();

        match module.invoke("shout", vec![Value::Null], None) {
            Err(ChainError::MissingCapability { name, target, .. }) => {
                assert_eq!(name, "shout");
                assert_eq!(target, "module");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_module_passes_callback() {
        let mut module = Module::new();
        module.register("filter", |args, callback| match callback {
            Some(callback) => callback(args[0].clone()),
            None => Err(ChainError::invalid_argument("filter", "a callback is required")),
        });

        let shout = |value: Value| -> Result<Value, ChainError> {
            Ok(text(&value).to_uppercase().to_value())
        };
        let result = module
            .invoke("filter", vec![Value::from("quiet")], Some(&shout))
            .unwrap();

        assert_eq!(result, Value::from("QUIET"));
    }

    #[test]
    fn test_operation_macro_inserts() {
        let mut module = Module::new();
        module.insert(
            "identity",
            Some(1),
            operation!(|args, _| Ok(args[0].clone())),
        );

        assert!(module.contains("identity"));
        assert_eq!(module.len(), 1);
        assert_eq!(
            module.invoke("identity", vec![Value::from(7i64)], None).unwrap(),
            Value::from(7i64)
        );
    }
}
