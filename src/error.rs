use crate::parser::tokenizer::State;
use std::fmt;

/// Kind of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A dynamic value landed in a scanner state that cannot take it
    UnsupportedInterpolation,
    /// Element nesting exceeded `Options::max_depth`
    NestingTooDeep,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedInterpolation => "Unsupported interpolation",
            ErrorKind::NestingTooDeep => "Nesting too deep",
        }
    }
}

/// Error during parsing
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    /// Scanner state when the error was raised
    pub state: Option<State>,
    /// Index of the interpolated value involved, counted from 0
    pub value_index: Option<usize>,
    pub help: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            state: None,
            value_index: None,
            help: None,
        }
    }

    /// A value of the given shape cannot be used in `state`.
    pub fn unsupported_interpolation(description: &str, state: State) -> Self {
        Self::new(
            ErrorKind::UnsupportedInterpolation,
            format!(
                "Interpolated {} is not supported in the {} context.",
                description,
                state.as_str()
            ),
        )
        .with_state(state)
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    /// Record which interpolated value caused the error
    pub fn with_value_index(mut self, index: usize) -> Self {
        self.value_index = Some(index);
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error as a multi-line report
    pub fn render(&self) -> String {
        self.render_inner(false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self) -> String {
        self.render_inner(true)
    }

    fn render_inner(&self, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let bold = if color { "\x1b[1m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push_str(&format!(
            "{}error{}: {}{}{}\n",
            red,
            reset,
            bold,
            self.kind.as_str(),
            reset
        ));

        let mut location = Vec::new();
        if let Some(index) = self.value_index {
            location.push(format!("value #{}", index));
        }
        if let Some(state) = self.state {
            location.push(format!("state {}", state.as_str()));
        }
        if !location.is_empty() {
            output.push_str(&format!(" {}-->{} {}\n", dim, reset, location.join(", ")));
        }

        output.push_str(&format!("  {}\n", self.message));

        if let Some(help) = &self.help {
            output.push_str(&format!("  {}help{}: {}\n", cyan, reset, help));
        }

        output
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_interpolation_message() {
        let err = ParseError::unsupported_interpolation("number 3", State::AttrKey);
        assert_eq!(err.kind, ErrorKind::UnsupportedInterpolation);
        assert_eq!(err.state, Some(State::AttrKey));
        assert_eq!(
            err.to_string(),
            "Interpolated number 3 is not supported in the AttrKey context."
        );
    }

    #[test]
    fn test_render_plain() {
        let err = ParseError::unsupported_interpolation("boolean true", State::Attr)
            .with_value_index(2)
            .with_help("Pass a string or a mapping of attributes.");

        assert_eq!(
            err.render(),
            "error: Unsupported interpolation\n \
             --> value #2, state Attr\n  \
             Interpolated boolean true is not supported in the Attr context.\n  \
             help: Pass a string or a mapping of attributes.\n"
        );
    }

    #[test]
    fn test_render_color_wraps_kind() {
        let err = ParseError::new(ErrorKind::NestingTooDeep, "too deep");
        let rendered = err.render_color();
        assert!(rendered.starts_with("\x1b[1;31merror\x1b[0m"));
        assert!(rendered.contains("Nesting too deep"));
        assert!(!rendered.contains("-->"));
    }
}
