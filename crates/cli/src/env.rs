use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CliError;

pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const PIXEL_ID: &str = "PIXEL_ID";
pub const DATASET_ID: &str = "DATASET_ID";
pub const API_VERSION: &str = "API_VERSION";

/// Environment variable manager that loads from the process and .env files.
///
/// Values from a .env file override the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)?;
        Ok(())
    }

    /// Loads `path` only if it exists.
    pub fn load_optional<P: AsRef<Path>>(&mut self, path: P) -> Result<bool, CliError> {
        if !path.as_ref().exists() {
            return Ok(false);
        }
        self.load_from_file(path)?;
        Ok(true)
    }

    /// Non-blank value of `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if key.is_empty() {
                    return Err(CliError::Config(format!(
                        "Invalid env file: empty key at line {}",
                        line_num + 1
                    )));
                }

                self.vars
                    .insert(key.to_string(), Self::unquote_value(value));
            } else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            }
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic_env() {
        let mut env = EnvManager::default();
        let content = r#"
# Comment
ACCESS_TOKEN=abc123
export PIXEL_ID=1234567890
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get(ACCESS_TOKEN), Some("abc123"));
        assert_eq!(env.get(PIXEL_ID), Some("1234567890"));
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = EnvManager::default();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
EMPTY=""
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("single quoted"));
        assert_eq!(env.get("EMPTY"), None);
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvManager::default();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn test_load_optional() {
        let mut env = EnvManager::default();
        assert!(!env.load_optional("/definitely/not/here/.env").unwrap());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "DATASET_ID=987654321").unwrap();
        assert!(env.load_optional(file.path()).unwrap());
        assert_eq!(env.get(DATASET_ID), Some("987654321"));
    }
}
