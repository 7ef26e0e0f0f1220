use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::mpsc::Sender;
use valu3::prelude::*;

pub type StepSender = Sender<Step>;

/// Who produced a step's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    Value,
    Context,
    Apply,
    Repoint,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Value => "value",
            Target::Context => "context",
            Target::Apply => "apply",
            Target::Repoint => "repoint",
        }
    }
}

impl ToValueBehavior for Target {
    fn to_value(&self) -> Value {
        self.as_str().to_value()
    }
}

#[derive(Clone, PartialEq, Serialize)]
pub struct Step {
    pub name: String,
    pub target: Target,
    pub input: Value,
    pub output: Value,
}

impl ToValueBehavior for Step {
    fn to_value(&self) -> Value {
        let mut value = HashMap::new();

        value.insert("name", self.name.to_value());
        value.insert("target", self.target.to_value());
        value.insert("input", self.input.clone());
        value.insert("output", self.output.clone());

        value.to_value()
    }
}

impl Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value().to_json(JsonMode::Inline))
    }
}

pub(crate) fn send_step(sender: Option<&StepSender>, step: Step) {
    if let Some(sender) = sender {
        if let Err(err) = sender.send(step) {
            log::debug!("Step collector disconnected, dropping step: {:?}", err.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn sample() -> Step {
        Step {
            name: "upcase".to_string(),
            target: Target::Value,
            input: Value::from("hi"),
            output: Value::from("HI"),
        }
    }

    #[test]
    fn test_step_to_value() {
        let value = sample().to_value();

        assert_eq!(value.get("name"), Some(&Value::from("upcase")));
        assert_eq!(value.get("target"), Some(&Value::from("value")));
        assert_eq!(value.get("output"), Some(&Value::from("HI")));
    }

    #[test]
    fn test_step_serializes() {
        let serialized = serde_json::to_value(sample()).unwrap();

        assert_eq!(serialized["name"], "upcase");
        assert_eq!(serialized["target"], "Value");
        assert!(serialized.get("input").is_some());
        assert!(serialized.get("output").is_some());
    }

    #[test]
    fn test_send_step_delivers() {
        let (sender, receiver) = channel();

        send_step(Some(&sender), sample());

        assert_eq!(receiver.try_recv().unwrap(), sample());
    }

    #[test]
    fn test_send_step_ignores_closed_receiver() {
        let (sender, receiver) = channel();
        drop(receiver);

        send_step(Some(&sender), sample());
        send_step(None, sample());
    }
}
