//! YAML parsing with rich diagnostics

pub mod diagnostics;

pub use diagnostics::{YamlError, YamlSyntaxError};

use miette::{IntoDiagnostic, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Parse a YAML file into an entity, attaching a source-span diagnostic
/// on failure so the user sees where in the file the problem is.
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).into_diagnostic()?;
    parse_yaml_str(&content, &path.to_string_lossy())
}

/// Parse a YAML string into an entity with diagnostics
pub fn parse_yaml_str<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T> {
    serde_yml::from_str(content).map_err(|e| {
        miette::Report::new(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Market;

    #[test]
    fn test_parse_valid_yaml() {
        let market = Market::new("Japan".to_string(), "test".to_string());
        let yaml = serde_yml::to_string(&market).unwrap();

        let parsed: Market = parse_yaml_str(&yaml, "market.sgt.yaml").unwrap();
        assert_eq!(parsed.id, market.id);
    }

    #[test]
    fn test_parse_invalid_yaml_reports_error() {
        let result: Result<Market> = parse_yaml_str("name: [unclosed", "broken.sgt.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_file() {
        let result: Result<Market> = parse_yaml_file(Path::new("/nonexistent/x.sgt.yaml"));
        assert!(result.is_err());
    }
}
