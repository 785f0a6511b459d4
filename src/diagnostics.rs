// ABOUTME: Structured diagnostics emitted by every pipeline stage

use std::fmt;

/// Which stage of the pipeline produced a diagnostic. The CLI exit code is
/// derived from the phase of the first reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub line: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    pub fn lexical(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            phase: Phase::Lexical,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn syntax(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            phase: Phase::Syntax,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn semantic(line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            phase: Phase::Semantic,
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Diagnostic {
            phase: Phase::Runtime,
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_carries_phase_and_line() {
        let diag = Diagnostic::lexical(3, "Invalid token '@' @ line 3");
        assert_eq!(diag.phase, Phase::Lexical);
        assert_eq!(diag.line, Some(3));
        assert_eq!(format!("{}", diag), "Invalid token '@' @ line 3");
    }

    #[test]
    fn test_runtime_diagnostic_has_no_line() {
        let diag = Diagnostic::runtime("Division by zero.");
        assert_eq!(diag.phase, Phase::Runtime);
        assert_eq!(diag.line, None);
    }
}
