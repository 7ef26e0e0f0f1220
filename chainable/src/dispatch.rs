use crate::error::ChainError;
use std::sync::Arc;
use valu3::value::Value;

/// Single-argument function handed to an operation alongside its arguments,
/// e.g. the mapper of `map` or the predicate of `filter`.
pub type Callback<'a> = &'a dyn Fn(Value) -> Result<Value, ChainError>;

/// The contract a chain needs from both the value and the context.
///
/// `supports` probes whether an operation exists for a given argument count,
/// `responds_to` whether it exists under that name at all. `invoke` runs it.
/// When an object acts as context it receives the current value as
/// `args[0]`, so its arity includes that leading argument.
pub trait Dispatchable {
    fn supports(&self, name: &str, arity: usize) -> bool;

    fn responds_to(&self, name: &str) -> bool;

    fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
        callback: Option<Callback<'_>>,
    ) -> Result<Value, ChainError>;

    /// Short label used in logs and in `MissingCapability` errors.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Dispatchable + ?Sized> Dispatchable for Arc<T> {
    fn supports(&self, name: &str, arity: usize) -> bool {
        (**self).supports(name, arity)
    }

    fn responds_to(&self, name: &str) -> bool {
        (**self).responds_to(name)
    }

    fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
        callback: Option<Callback<'_>>,
    ) -> Result<Value, ChainError> {
        (**self).invoke(name, args, callback)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

/// Context that responds to nothing. Every step on a chain rooted here
/// falls through to the value's own methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoContext;

impl Dispatchable for NoContext {
    fn supports(&self, _name: &str, _arity: usize) -> bool {
        false
    }

    fn responds_to(&self, _name: &str) -> bool {
        false
    }

    fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
        _callback: Option<Callback<'_>>,
    ) -> Result<Value, ChainError> {
        Err(ChainError::missing(name, args.len(), self.kind()))
    }

    fn kind(&self) -> &'static str {
        "no context"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_context_supports_nothing() {
        assert!(!NoContext.supports("upcase", 0));
        assert!(!NoContext.supports("[]", 1));
        assert!(!NoContext.responds_to("upcase"));
    }

    #[test]
    fn test_no_context_invoke_is_missing_capability() {
        let result = NoContext.invoke("upcase", vec![Value::from("hi")], None);

        match result {
            Err(ChainError::MissingCapability {
                name,
                arity,
                target,
            }) => {
                assert_eq!(name, "upcase");
                assert_eq!(arity, 1);
                assert_eq!(target, "no context");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_arc_forwards_to_inner() {
        let shared = Arc::new(NoContext);

        assert!(!shared.supports("anything", 0));
        assert!(!shared.responds_to("anything"));
        assert_eq!(shared.kind(), "no context");
    }
}
