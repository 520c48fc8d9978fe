//! Result type for a completed capture.

use std::time::Duration;

use super::sanitize::sanitize;

/// Raw output of one completed session.
#[derive(Debug, Clone)]
pub struct Capture {
    /// The commands that were sent, in order.
    pub commands: Vec<String>,

    /// Everything the device sent, ANSI-stripped, pagination markers removed.
    pub raw: String,

    /// How many pagination continuations were sent.
    pub pages: usize,

    /// Time taken for the whole capture.
    pub elapsed: Duration,
}

impl Capture {
    /// Configuration text with banner and command echo removed.
    ///
    /// Sanitizing is not idempotent, so the raw text is kept as-is and this
    /// is the single place the sanitizer is applied.
    pub fn config(&self) -> String {
        sanitize(&self.raw, &self.commands)
    }
}

impl std::fmt::Display for Capture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_strips_echo() {
        let capture = Capture {
            commands: vec!["show running-config".to_string()],
            raw: "Welcome\nR1#show running-config\nhostname R1\n".to_string(),
            pages: 0,
            elapsed: Duration::from_millis(10),
        };
        assert_eq!(capture.config(), "hostname R1\n");
        assert!(capture.raw.starts_with("Welcome"));
    }
}
