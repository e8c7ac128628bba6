//! Human and JSON rendering of command results
//!
//! Results go to stdout; errors, warnings and logs go to stderr so that
//! `gdc ... --json | jq` always sees a single JSON document.

use console::style;
use serde::Serialize;

use super::OutputConfig;

/// Writes command results in the mode picked by [`OutputConfig`]
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// `--json` (or `output = "json"` in the config)
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// `✓ message` on stdout
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{}", self.success_line(message));
    }

    /// `✗ message` on stderr, or `{"error": ...}` in JSON mode. Never silenced.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{}", self.error_line(message));
        }
    }

    /// Pretty-printed JSON on stdout
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Emphasize a name (folders in listings)
    pub fn highlight(&self, text: &str) -> String {
        if self.colors_enabled() {
            style(text).blue().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn success_line(&self, message: &str) -> String {
        if self.colors_enabled() {
            format!("{} {message}", style("✓").green())
        } else {
            format!("✓ {message}")
        }
    }

    fn error_line(&self, message: &str) -> String {
        if self.colors_enabled() {
            format!("{} {message}", style("✗").red())
        } else {
            format!("✗ {message}")
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
