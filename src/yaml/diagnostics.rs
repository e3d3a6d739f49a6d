//! YAML error diagnostics with source-span labels

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("YAML syntax error")]
#[diagnostic(code(sgt::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    /// The underlying parser message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Generic YAML error wrapper
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert line/column (1-based) to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            let line_start = i;
            let mut col = 1;
            for (j, c) in source[line_start..].char_indices() {
                if col == column {
                    return line_start + j;
                }
                if c == '\n' {
                    break;
                }
                col += 1;
            }
            return line_start + column.saturating_sub(1);
        }
        if ch == '\n' {
            current_line += 1;
        }
    }

    source.len().saturating_sub(1)
}

/// Suggest a fix for common YAML mistakes
fn generate_help(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    if lower.contains("unknown field") {
        Some("check the field name against the entity's documented fields".to_string())
    } else if lower.contains("missing field") {
        Some("add the missing field; required fields cannot be omitted".to_string())
    } else if lower.contains("invalid type") {
        Some("check that the value matches the expected type (string, number, list)".to_string())
    } else if lower.contains("did not find expected") || lower.contains("mapping values") {
        Some("check indentation; YAML nesting must use consistent spaces".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let src = "a: 1\nb: 2\nc: 3\n";
        assert_eq!(line_col_to_offset(src, 1, 1), 0);
        assert_eq!(line_col_to_offset(src, 2, 1), 5);
        assert_eq!(line_col_to_offset(src, 2, 4), 8);
    }

    #[test]
    fn test_help_for_missing_field() {
        let help = generate_help("missing field `rank`");
        assert!(help.unwrap().contains("missing field"));
    }

    #[test]
    fn test_no_help_for_unrecognized_message() {
        assert!(generate_help("something exotic").is_none());
    }
}
