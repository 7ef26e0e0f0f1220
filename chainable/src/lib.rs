//! # chainable - fluent value pipelines
//!
//! `chainable` threads a value through a sequence of named steps without
//! intermediate variables. Each step is resolved against two objects:
//!
//! - the **value** itself, which knows built-in methods (`upcase`, `split`,
//!   `join`, `map`, `[]`, arithmetic and so on), and
//! - the **context**, any [`Dispatchable`] that supplies named operations
//!   taking the current value as their first argument.
//!
//! ## Resolution
//!
//! The value runs a step only when it supports the name and the context does
//! not. Otherwise the context runs it, which lets a context shadow a method
//! the value already has. When neither supports the name the context's
//! [`ChainError::MissingCapability`] comes back unchanged.
//!
//! Every step returns a new [`Link`]. Earlier links are never touched, so a
//! partial chain can be kept and branched.
//!
//! ## Example
//!
//! ```rust
//! use chainable::prelude::*;
//! use std::sync::Arc;
//!
//! let mut words = Module::new();
//! words.register("append_message", |args, _| {
//!     Ok(format!("{} {}", args[0].as_str(), args[1].as_str()).to_value())
//! });
//!
//! let result = wrap(Arc::new(words), "Hello")
//!     .step("upcase")
//!     .and_then(|link| link.call("append_message", vec![Value::from("World")]))
//!     .and_then(|link| link.call("split", vec![Value::from(" ")]))
//!     .unwrap();
//!
//! assert_eq!(result.unwrap(), json!(["HELLO", "World"]));
//! ```
//!
//! ## Modules
//!
//! - [`link`] - the immutable chain step and the resolution rule.
//! - [`dispatch`] - the [`Dispatchable`] contract and the empty context.
//! - [`native`] - built-in methods of `valu3` values.
//! - [`module`] - a context made of registered closures.
//! - [`contexts`] - named contexts for explicit repointing.
//! - [`collector`] - opt-in record of every step taken.
//! - [`settings`] - environment driven logging knobs.
pub mod collector;
pub mod contexts;
pub mod dispatch;
pub mod entry;
pub mod error;
mod macros;
pub mod module;
pub mod native;
pub mod settings;

pub mod link;

pub use collector::{Step, StepSender, Target};
pub use contexts::Contexts;
pub use dispatch::{Callback, Dispatchable, NoContext};
pub use entry::{chain, wrap, ChainFrom};
pub use error::ChainError;
pub use link::Link;
pub use module::{Module, Operation};
pub use settings::Settings;
pub use valu3;

pub mod prelude {
    pub use crate::*;
    pub use valu3::json;
    pub use valu3::prelude::*;
}
