// Author: Dustin Pilgrim
// License: MIT

use thiserror::Error;

/// The main error type for template parsing, rendering and orchestration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeeError {
    #[error("[GEECO] Syntax Error at {line}:{column}: {message}{}", suffix(.hint, .code))]
    TemplateSyntax {
        message: String,
        line: usize,
        column: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when block nesting goes past the renderer's limit.
    #[error("[GEECO] Render depth exceeded: blocks nested deeper than {limit}")]
    RenderDepthExceeded { limit: usize },
    #[error("[GEECO] Template not found '{path}': {message}{}", suffix(.hint, .code))]
    TemplateNotFound {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[GEECO] Output Error '{path}': {message}{}", suffix(.hint, .code))]
    OutputWrite {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when input data has a shape the value model cannot take.
    #[error("[GEECO] Conversion Error: {message}{}", suffix(.hint, .code))]
    Conversion {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[GEECO] Data Error '{path}': {message}{}", suffix(.hint, .code))]
    Data {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[GEECO] Script Error: {message}")]
    Script { message: String },
    #[error("[GEECO] Config Error: {message}{}", suffix(.hint, .code))]
    Config {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl GeeError {
    pub fn syntax(message: impl Into<String>, line: usize, column: usize, code: u32) -> Self {
        GeeError::TemplateSyntax {
            message: message.into(),
            line,
            column,
            hint: None,
            code: Some(code),
        }
    }

    /// Attach a hint to a syntax error. Other kinds pass through unchanged.
    pub fn with_hint(self, text: impl Into<String>) -> Self {
        match self {
            GeeError::TemplateSyntax { message, line, column, code, .. } => GeeError::TemplateSyntax {
                message,
                line,
                column,
                hint: Some(text.into()),
                code,
            },
            other => other,
        }
    }

    pub fn template_not_found(path: impl Into<String>, message: impl Into<String>) -> Self {
        GeeError::TemplateNotFound {
            message: message.into(),
            path: path.into(),
            hint: Some("Paths are resolved against the work folder".into()),
            code: Some(301),
        }
    }

    pub fn output_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        GeeError::OutputWrite {
            message: message.into(),
            path: path.into(),
            hint: Some("Check that the destination is writable".into()),
            code: Some(302),
        }
    }

    pub fn data(path: impl Into<String>, message: impl Into<String>) -> Self {
        GeeError::Data {
            message: message.into(),
            path: path.into(),
            hint: None,
            code: Some(303),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = GeeError::syntax("Unterminated tag", 3, 7, 101).with_hint("Close it with '}}'");
        assert_eq!(
            err.to_string(),
            "[GEECO] Syntax Error at 3:7: Unterminated tag Hint: Close it with '}}' Code: 101"
        );
    }

    #[test]
    fn test_hint_ignored_on_other_kinds() {
        let err = GeeError::Script { message: "boom".into() }.with_hint("nope");
        assert_eq!(err, GeeError::Script { message: "boom".into() });
    }
}
