use crate::dispatch::{Dispatchable, NoContext};
use crate::link::Link;
use std::sync::Arc;
use valu3::value::Value;

/// Starts a chain whose fallback operations come from `context`.
pub fn wrap<C: Dispatchable + 'static>(context: Arc<C>, value: impl Into<Value>) -> Link {
    Link::new(value, context)
}

/// Starts a chain with no context: every step runs on the value itself.
pub fn chain(value: impl Into<Value>) -> Link {
    Link::new(value, Arc::new(NoContext))
}

/// Lets a shared context start chains that use itself as context.
///
/// ```rust
/// use chainable::prelude::*;
/// use std::sync::Arc;
///
/// let mut tools = Module::new();
/// tools.register("exclaim", |args, _| Ok(format!("{}!", args[0].as_str()).to_value()));
///
/// let tools = Arc::new(tools);
/// let result = tools.chain_from("hey").step("exclaim").unwrap().unwrap();
///
/// assert_eq!(result, Value::from("hey!"));
/// ```
pub trait ChainFrom {
    fn chain_from(&self, value: impl Into<Value>) -> Link;
}

impl<C: Dispatchable + 'static> ChainFrom for Arc<C> {
    fn chain_from(&self, value: impl Into<Value>) -> Link {
        Link::new(value, self.clone())
    }
}

impl ChainFrom for Arc<dyn Dispatchable> {
    fn chain_from(&self, value: impl Into<Value>) -> Link {
        Link::new(value, self.clone())
    }
}
