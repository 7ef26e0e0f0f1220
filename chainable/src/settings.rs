use once_cell::sync::Lazy;
use valu3::prelude::*;

const DEFAULT_LOG_TRUNCATE: usize = 100;

static SETTINGS: Lazy<Settings> =
    Lazy::new(|| Settings::from_env_vars(|key| std::env::var(key).ok()));

/// Runtime knobs read once from the environment.
///
/// - `CHAINABLE_LOG_TRUNCATE`: max characters of a value rendered in a log line (default 100)
/// - `CHAINABLE_LOG_STEPS`: emit one debug line per resolved step (default true)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_truncate: usize,
    pub log_steps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_truncate: DEFAULT_LOG_TRUNCATE,
            log_steps: true,
        }
    }
}

impl Settings {
    pub fn current() -> &'static Settings {
        &SETTINGS
    }

    pub fn from_env_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_truncate = match lookup("CHAINABLE_LOG_TRUNCATE") {
            Some(value) => value.parse::<usize>().unwrap_or(DEFAULT_LOG_TRUNCATE),
            None => DEFAULT_LOG_TRUNCATE,
        };
        let log_steps = match lookup("CHAINABLE_LOG_STEPS") {
            Some(value) => value.parse::<bool>().unwrap_or(true),
            None => true,
        };

        Self {
            log_truncate,
            log_steps,
        }
    }

    /// Inline JSON of `value`, cut at `log_truncate` characters.
    pub fn render(&self, value: &Value) -> String {
        let rendered = value.to_json(JsonMode::Inline);

        if rendered.chars().count() > self.log_truncate {
            let cut: String = rendered.chars().take(self.log_truncate).collect();
            format!("{}...", cut)
        } else {
            rendered
        }
    }
}
