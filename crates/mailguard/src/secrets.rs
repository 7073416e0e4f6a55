//! Mailbox password resolution.
//!
//! A password can come from three places, tried in order:
//!
//! 1. **Direct value** - `passwordInsecure` in the config file, for local testing
//! 2. **File reference** - `passwordFile`, e.g. a mounted secret
//! 3. **Env var reference** - `passwordEnvVar`, e.g. `MAILGUARD_IMAP_PASSWORD`

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from multiple sources in priority order:
/// 1. Direct value (if provided and non-empty)
/// 2. File contents (if path provided)
/// 3. Environment variable (if name provided)
///
/// Surrounding whitespace is trimmed from file and env values.
///
/// # Examples
///
/// ```ignore
/// use mailguard::secrets::resolve_secret;
///
/// let password = resolve_secret(None, Some("~/.config/mailguard/password"), Some("IMAP_PASSWORD"))?;
/// ```
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    // Priority 1: Direct value
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    // Priority 2: File
    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        return fs::read_to_string(&expanded)
            .map(|content| SecretString::from(content.trim().to_string()))
            .map_err(|source| SecretError::FileReadError {
                path: expanded,
                source,
            });
    }

    // Priority 3: Environment variable
    if let Some(var_name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(var_name) {
            Ok(value) => Ok(SecretString::from(value.trim())),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: var_name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: var_name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

/// Checks if at least one secret source is configured (non-empty).
pub fn has_secret_source(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> bool {
    direct.is_some_and(|s| !s.is_empty())
        || file_path.is_some_and(|s| !s.is_empty())
        || env_var.is_some_and(|s| !s.is_empty())
}

/// Expands a leading `~` or `~/` to the home directory (HOME, then USERPROFILE).
/// `~user/...` is left untouched.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    #[serial]
    fn test_direct_value_takes_priority() {
        std::env::set_var("MAILGUARD_TEST_SECRET_1", "env_value");
        let result =
            resolve_secret(Some("direct_value"), None, Some("MAILGUARD_TEST_SECRET_1")).unwrap();
        assert_eq!(result.expose_secret(), "direct_value");
        std::env::remove_var("MAILGUARD_TEST_SECRET_1");
    }

    #[test]
    #[serial]
    fn test_file_takes_priority_over_env() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "file_value").unwrap();

        std::env::set_var("MAILGUARD_TEST_SECRET_2", "env_value");
        let result = resolve_secret(
            None,
            Some(temp_file.path().to_str().unwrap()),
            Some("MAILGUARD_TEST_SECRET_2"),
        )
        .unwrap();
        assert_eq!(result.expose_secret(), "file_value");
        std::env::remove_var("MAILGUARD_TEST_SECRET_2");
    }

    #[test]
    #[serial]
    fn test_env_var_fallback() {
        std::env::set_var("MAILGUARD_TEST_SECRET_3", "env_value");
        let result = resolve_secret(None, None, Some("MAILGUARD_TEST_SECRET_3")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("MAILGUARD_TEST_SECRET_3");
    }

    #[test]
    fn test_no_source_error() {
        let result = resolve_secret(None, None, None);
        assert!(matches!(result, Err(SecretError::NoSourceProvided)));
    }

    #[test]
    #[serial]
    fn test_empty_strings_ignored() {
        std::env::set_var("MAILGUARD_TEST_SECRET_4", "env_value");
        let result =
            resolve_secret(Some(""), Some(""), Some("MAILGUARD_TEST_SECRET_4")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("MAILGUARD_TEST_SECRET_4");
    }

    #[test]
    fn test_file_not_found_error() {
        let result = resolve_secret(None, Some("/nonexistent/path/to/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    fn test_env_var_not_set_error() {
        let result = resolve_secret(None, None, Some("DEFINITELY_NOT_SET_VAR_12345"));
        assert!(matches!(result, Err(SecretError::EnvVarNotSet { .. })));
    }

    #[test]
    fn test_file_content_trimmed() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "  secret_with_whitespace  ").unwrap();

        let result = resolve_secret(None, Some(temp_file.path().to_str().unwrap()), None).unwrap();
        assert_eq!(result.expose_secret(), "secret_with_whitespace");
    }

    #[test]
    fn test_has_secret_source() {
        assert!(has_secret_source(Some("value"), None, None));
        assert!(has_secret_source(None, Some("/path"), None));
        assert!(has_secret_source(None, None, Some("ENV_VAR")));
        assert!(!has_secret_source(None, None, None));
        assert!(!has_secret_source(Some(""), Some(""), Some("")));
    }

    #[test]
    #[serial]
    fn test_expand_home() {
        // Test that non-home paths are unchanged
        assert_eq!(expand_home("/absolute/path"), "/absolute/path");
        assert_eq!(expand_home("relative/path"), "relative/path");

        // Test home expansion (only if HOME is set)
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_home("~/test"), format!("{}/test", home));
            // Test standalone ~ expansion
            assert_eq!(expand_home("~"), home);
        }
    }
}
