use crate::collector::{send_step, Step, StepSender, Target};
use crate::contexts::Contexts;
use crate::dispatch::{Callback, Dispatchable};
use crate::error::ChainError;
use crate::settings::Settings;
use log::{debug, trace};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use valu3::prelude::*;

/// One immutable step of a chain: the current value plus the context that
/// supplies fallback operations. Every step returns a new `Link`; the one it
/// was derived from stays valid and can be branched again.
#[derive(Clone)]
pub struct Link {
    value: Value,
    context: Arc<dyn Dispatchable>,
    collector: Option<StepSender>,
}

impl Debug for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("value", &self.value.to_json(JsonMode::Inline))
            .field("context", &self.context.kind())
            .field("collector", &self.collector.is_some())
            .finish()
    }
}

impl Link {
    pub fn new(value: impl Into<Value>, context: Arc<dyn Dispatchable>) -> Self {
        Self {
            value: value.into(),
            context,
            collector: None,
        }
    }

    /// Reports every following step to `sender`. Links derived from the
    /// returned one keep reporting to it.
    pub fn with_collector(&self, sender: StepSender) -> Self {
        Self {
            value: self.value.clone(),
            context: self.context.clone(),
            collector: Some(sender),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn context(&self) -> &Arc<dyn Dispatchable> {
        &self.context
    }

    /// Returns the held value. The link stays usable.
    pub fn unwrap(&self) -> Value {
        self.value.clone()
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn step(&self, name: &str) -> Result<Link, ChainError> {
        self.resolve(name, Vec::new(), None)
    }

    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Link, ChainError> {
        self.resolve(name, args, None)
    }

    pub fn call_with<F>(
        &self,
        name: &str,
        args: Vec<Value>,
        callback: F,
    ) -> Result<Link, ChainError>
    where
        F: Fn(Value) -> Result<Value, ChainError>,
    {
        self.resolve(name, args, Some(&callback))
    }

    /// Picks who runs `name` and derives the next link from the result.
    ///
    /// The value runs it only when it supports `name` at this arity and the
    /// context has no operation of that name at all. In every other case the
    /// context runs it with the current value prepended to `args`, so a
    /// context can shadow a method the value already has, whatever its arity.
    /// When neither supports it, the context's `MissingCapability` error is
    /// returned unchanged.
    pub fn resolve(
        &self,
        name: &str,
        args: Vec<Value>,
        callback: Option<Callback<'_>>,
    ) -> Result<Link, ChainError> {
        let arity = args.len();
        let target = self.target_for(name, arity);
        let settings = Settings::current();

        if settings.log_steps {
            debug!(
                "Resolving `{}` with {} argument(s) on {} (value: {}, context: {})",
                name,
                arity,
                target.as_str(),
                settings.render(&self.value),
                self.context.kind()
            );
        }

        let result = match target {
            Target::Value => Dispatchable::invoke(&self.value, name, args, callback),
            _ => {
                let mut context_args = Vec::with_capacity(arity + 1);
                context_args.push(self.value.clone());
                context_args.extend(args);

                self.context.invoke(name, context_args, callback)
            }
        };

        match result {
            Ok(output) => Ok(self.derive(name, target, output)),
            Err(err) => {
                debug!("Step `{}` failed on {}: {}", name, target.as_str(), err);
                Err(err)
            }
        }
    }

    pub fn apply<F>(&self, transform: F) -> Link
    where
        F: FnOnce(Value) -> Value,
    {
        let output = transform(self.value.clone());
        self.derive("apply", Target::Apply, output)
    }

    pub fn try_apply<F>(&self, transform: F) -> Result<Link, ChainError>
    where
        F: FnOnce(Value) -> Result<Value, ChainError>,
    {
        let output = transform(self.value.clone())?;
        Ok(self.derive("apply", Target::Apply, output))
    }

    /// Same value, different context for the steps that follow.
    pub fn repoint(&self, context: Arc<dyn Dispatchable>) -> Link {
        debug!(
            "Repointing chain from {} to {}",
            self.context.kind(),
            context.kind()
        );

        send_step(
            self.collector.as_ref(),
            Step {
                name: "repoint".to_string(),
                target: Target::Repoint,
                input: self.value.clone(),
                output: self.value.clone(),
            },
        );

        Self {
            value: self.value.clone(),
            context,
            collector: self.collector.clone(),
        }
    }

    pub fn repoint_named(&self, name: &str, contexts: &Contexts) -> Result<Link, ChainError> {
        let context = contexts.resolve(name)?;
        Ok(self.repoint(context))
    }

    fn target_for(&self, name: &str, arity: usize) -> Target {
        let value_has_capability = Dispatchable::supports(&self.value, name, arity);
        let context_has_capability = self.context.responds_to(name);

        if value_has_capability && !context_has_capability {
            Target::Value
        } else {
            Target::Context
        }
    }

    fn derive(&self, name: &str, target: Target, output: Value) -> Link {
        if Settings::current().log_steps {
            trace!(
                "Step `{}` produced {}",
                name,
                Settings::current().render(&output)
            );
        }

        send_step(
            self.collector.as_ref(),
            Step {
                name: name.to_string(),
                target,
                input: self.value.clone(),
                output: output.clone(),
            },
        );

        Self {
            value: output,
            context: self.context.clone(),
            collector: self.collector.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::NoContext;
    use crate::module::Module;
    use crate::native::text;
    use std::sync::mpsc::channel;
    use valu3::json;

    fn shouting_module() -> Arc<dyn Dispatchable> {
        let mut module = Module::new();

        // shadows String#upcase
        module.register("upcase", |args, _| {
            Ok(format!("{}!", text(&args[0]).to_uppercase()).to_value())
        });
        module.register("append_message", |args, _| {
            Ok(format!("{} {}", text(&args[0]), text(&args[1])).to_value())
        });

        Arc::new(module)
    }

    #[test]
    fn test_unwrap_is_identity() {
        let link = Link::new(json!({ "a": [1, 2] }), Arc::new(NoContext));

        assert_eq!(link.unwrap(), json!({ "a": [1, 2] }));
        assert_eq!(link.unwrap(), link.unwrap());
    }

    #[test]
    fn test_value_runs_unshadowed_method() {
        let link = Link::new("hello", shouting_module());

        let result = link.call("split", vec![Value::from("l")]).unwrap();

        assert_eq!(result.unwrap(), json!(["he", "", "o"]));
    }

    #[test]
    fn test_context_wins_when_both_support() {
        let link = Link::new("hello", shouting_module());

        let result = link.step("upcase").unwrap();

        assert_eq!(result.unwrap(), Value::from("HELLO!"));
    }

    #[test]
    fn test_context_runs_with_value_prepended() {
        let link = Link::new("Hello", shouting_module());

        let result = link
            .call("append_message", vec![Value::from("World")])
            .unwrap();

        assert_eq!(result.unwrap(), Value::from("Hello World"));
    }

    #[test]
    fn test_missing_everywhere_reports_context() {
        let link = Link::new("hello", shouting_module());

        match link.step("explode") {
            Err(ChainError::MissingCapability {
                name,
                arity,
                target,
            }) => {
                assert_eq!(name, "explode");
                assert_eq!(arity, 1);
                assert_eq!(target, "module");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_context_name_wins_regardless_of_arity() {
        let mut module = Module::new();
        module.register_with_arity("upcase", 3, |args, _| Ok(args[0].clone()));
        let link = Link::new("abc", Arc::new(module));

        let result = link.step("upcase");

        match result {
            Err(ChainError::MissingCapability { arity, target, .. }) => {
                assert_eq!(arity, 1);
                assert_eq!(target, "module");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_arity_mismatch_falls_to_context() {
        let link = Link::new("hello", Arc::new(NoContext));

        let result = link.call("upcase", vec![Value::from("extra")]);

        assert!(result.unwrap_err().is_missing_capability());
    }

    #[test]
    fn test_steps_share_context() {
        let root = Link::new("hello", shouting_module());

        let next = root.step("upcase").unwrap();

        assert!(Arc::ptr_eq(root.context(), next.context()));
    }

    #[test]
    fn test_branches_are_independent() {
        let root = Link::new("Hello", shouting_module());

        let left = root.step("upcase").unwrap();
        let right = root.step("downcase").unwrap();

        assert_eq!(left.unwrap(), Value::from("HELLO!"));
        assert_eq!(right.unwrap(), Value::from("hello"));
        assert_eq!(root.unwrap(), Value::from("Hello"));
    }

    #[test]
    fn test_apply_and_try_apply() {
        let link = Link::new("a b c", Arc::new(NoContext));

        let split = link.apply(|value| {
            let words: Vec<Value> = value.as_str().split(' ').map(|w| w.to_value()).collect();
            words.to_value()
        });
        assert_eq!(split.unwrap(), json!(["a", "b", "c"]));

        let failed = link.try_apply(|_| Err(ChainError::operation("no network")));
        assert!(matches!(failed, Err(ChainError::Operation(_))));
    }

    #[test]
    fn test_call_with_passes_callback() {
        let link = Link::new(json!(["x", "y"]), Arc::new(NoContext));

        let result = link
            .call_with("map", vec![], |item| {
                Ok(format!("<{}>", text(&item)).to_value())
            })
            .unwrap();

        assert_eq!(result.unwrap(), json!(["<x>", "<y>"]));
    }

    #[test]
    fn test_repoint_changes_context_only() {
        let root = Link::new("hello", Arc::new(NoContext));

        let repointed = root.repoint(shouting_module());

        assert_eq!(repointed.unwrap(), root.unwrap());
        assert_eq!(repointed.context().kind(), "module");
        assert_eq!(root.context().kind(), "no context");
        assert_eq!(
            repointed.step("upcase").unwrap().unwrap(),
            Value::from("HELLO!")
        );
    }

    #[test]
    fn test_repoint_named_unknown() {
        let root = Link::new("hello", Arc::new(NoContext));

        let result = root.repoint_named("Shouter", &Contexts::new());

        assert!(matches!(result, Err(ChainError::ContextNotFound(_))));
    }

    #[test]
    fn test_collector_records_steps() {
        let (sender, receiver) = channel();
        let link = Link::new("hi", shouting_module()).with_collector(sender);

        let _ = link
            .step("upcase")
            .and_then(|link| link.step("downcase"))
            .unwrap();

        let steps: Vec<Step> = receiver.try_iter().collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].target, Target::Context);
        assert_eq!(steps[0].output, Value::from("HI!"));
        assert_eq!(steps[1].target, Target::Value);
        assert_eq!(steps[1].input, Value::from("HI!"));
    }
}
