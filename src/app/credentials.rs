//! API-key resolution.
//!
//! The key for the generation endpoint can come from three places, polled in
//! strict order with first match winning: the `GEMINI_API_KEY` environment
//! variable, a `GEMINI_API_KEY` entry in the per-user `secrets.toml`, or the
//! masked text field in the control panel. Each source is a
//! [`CredentialProvider`]; the [`CredentialResolver`] walks the ordered list.
//! A provider that cannot produce a value (missing file, bad TOML, empty
//! entry) simply yields nothing - resolution never errors.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Environment variable consulted first.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Key looked up inside `secrets.toml`, same semantic as the variable.
pub const SECRETS_KEY: &str = "GEMINI_API_KEY";

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SecretsFile,
    ManualEntry,
}

impl CredentialSource {
    pub fn label(&self) -> &'static str {
        match self {
            CredentialSource::Environment => "environment",
            CredentialSource::SecretsFile => "secrets store",
            CredentialSource::ManualEntry => "manual entry",
        }
    }
}

/// A resolved API key. `Debug` redacts the secret so credentials never land
/// in logs.
#[derive(Clone)]
pub struct Credential {
    secret: String,
    pub source: CredentialSource,
}

impl Credential {
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// One source of an API key. Returns a non-empty secret or nothing.
pub trait CredentialProvider {
    fn source(&self) -> CredentialSource;
    fn resolve(&self) -> Option<String>;
}

/// Reads a process environment variable.
pub struct EnvVarProvider {
    var: String,
}

impl EnvVarProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvVarProvider {
    fn source(&self) -> CredentialSource {
        CredentialSource::Environment
    }

    fn resolve(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Reads one string entry from a TOML secrets file. Absent or malformed
/// files count as "no value" here.
pub struct SecretsFileProvider {
    path: PathBuf,
    key: String,
}

impl SecretsFileProvider {
    pub fn new(path: PathBuf, key: impl Into<String>) -> Self {
        Self {
            path,
            key: key.into(),
        }
    }

    /// Default location: `secrets.toml` in the per-user config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "", "uiforge")
            .map(|dirs| dirs.config_dir().join("secrets.toml"))
    }
}

impl CredentialProvider for SecretsFileProvider {
    fn source(&self) -> CredentialSource {
        CredentialSource::SecretsFile
    }

    fn resolve(&self) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                log_debug!("No secrets file at {:?}: {}", self.path, e);
                return None;
            }
        };

        let table: toml::Table = match raw.parse() {
            Ok(table) => table,
            Err(e) => {
                log_debug!("Unparseable secrets file {:?}: {}", self.path, e);
                return None;
            }
        };

        table
            .get(&self.key)
            .and_then(|v| v.as_str())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// The masked text field in the control panel. The UI and the provider share
/// the entry buffer.
pub struct ManualEntryProvider {
    value: Rc<RefCell<String>>,
}

impl ManualEntryProvider {
    pub fn new(value: Rc<RefCell<String>>) -> Self {
        Self { value }
    }
}

impl CredentialProvider for ManualEntryProvider {
    fn source(&self) -> CredentialSource {
        CredentialSource::ManualEntry
    }

    fn resolve(&self) -> Option<String> {
        let value = self.value.borrow().trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Ordered provider list, polled until one yields a value.
pub struct CredentialResolver {
    providers: Vec<Box<dyn CredentialProvider>>,
    manual_entry: Rc<RefCell<String>>,
}

impl CredentialResolver {
    /// The standard chain: environment variable, secrets file, manual entry.
    pub fn standard() -> Self {
        let manual_entry = Rc::new(RefCell::new(String::new()));
        let mut providers: Vec<Box<dyn CredentialProvider>> =
            vec![Box::new(EnvVarProvider::new(API_KEY_VAR))];

        if let Some(path) = SecretsFileProvider::default_path() {
            providers.push(Box::new(SecretsFileProvider::new(path, SECRETS_KEY)));
        }

        providers.push(Box::new(ManualEntryProvider::new(manual_entry.clone())));

        Self {
            providers,
            manual_entry,
        }
    }

    /// Build a resolver from an explicit provider list (tests).
    pub fn with_providers(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self {
            providers,
            manual_entry: Rc::new(RefCell::new(String::new())),
        }
    }

    /// Shared buffer backing the masked text field.
    pub fn manual_entry(&self) -> Rc<RefCell<String>> {
        self.manual_entry.clone()
    }

    /// Poll the providers in order; first non-empty value wins.
    pub fn resolve(&self) -> Option<Credential> {
        for provider in &self.providers {
            if let Some(secret) = provider.resolve() {
                log_debug!("API key resolved from {}", provider.source().label());
                return Some(Credential {
                    secret,
                    source: provider.source(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedProvider {
        source: CredentialSource,
        value: Option<&'static str>,
    }

    impl CredentialProvider for FixedProvider {
        fn source(&self) -> CredentialSource {
            self.source
        }

        fn resolve(&self) -> Option<String> {
            self.value.map(|v| v.to_string())
        }
    }

    #[test]
    fn test_first_provider_wins() {
        let resolver = CredentialResolver::with_providers(vec![
            Box::new(FixedProvider {
                source: CredentialSource::Environment,
                value: Some("env-key"),
            }),
            Box::new(FixedProvider {
                source: CredentialSource::SecretsFile,
                value: Some("file-key"),
            }),
        ]);

        let credential = resolver.resolve().unwrap();
        assert_eq!(credential.secret(), "env-key");
        assert_eq!(credential.source, CredentialSource::Environment);
    }

    #[test]
    fn test_chain_falls_through_empty_providers() {
        let resolver = CredentialResolver::with_providers(vec![
            Box::new(FixedProvider {
                source: CredentialSource::Environment,
                value: None,
            }),
            Box::new(FixedProvider {
                source: CredentialSource::SecretsFile,
                value: Some("file-key"),
            }),
        ]);

        let credential = resolver.resolve().unwrap();
        assert_eq!(credential.source, CredentialSource::SecretsFile);
    }

    #[test]
    fn test_no_provider_yields_none() {
        let resolver = CredentialResolver::with_providers(vec![Box::new(FixedProvider {
            source: CredentialSource::Environment,
            value: None,
        })]);

        assert!(resolver.resolve().is_none());
    }

    #[test]
    fn test_env_provider_ignores_blank_values() {
        std::env::set_var("UIFORGE_TEST_BLANK_KEY", "   ");
        let provider = EnvVarProvider::new("UIFORGE_TEST_BLANK_KEY");
        assert!(provider.resolve().is_none());
        std::env::remove_var("UIFORGE_TEST_BLANK_KEY");
    }

    #[test]
    fn test_secrets_file_provider_reads_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "GEMINI_API_KEY = \"from-secrets\"").unwrap();

        let provider = SecretsFileProvider::new(path, SECRETS_KEY);
        assert_eq!(provider.resolve().as_deref(), Some("from-secrets"));
    }

    #[test]
    fn test_secrets_file_provider_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = SecretsFileProvider::new(dir.path().join("absent.toml"), SECRETS_KEY);
        assert!(provider.resolve().is_none());
    }

    #[test]
    fn test_secrets_file_provider_tolerates_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let provider = SecretsFileProvider::new(path, SECRETS_KEY);
        assert!(provider.resolve().is_none());
    }

    #[test]
    fn test_manual_entry_provider_shares_buffer() {
        let buffer = Rc::new(RefCell::new(String::new()));
        let provider = ManualEntryProvider::new(buffer.clone());
        assert!(provider.resolve().is_none());

        *buffer.borrow_mut() = "typed-key".to_string();
        assert_eq!(provider.resolve().as_deref(), Some("typed-key"));
    }

    #[test]
    fn test_credential_debug_redacts_secret() {
        let resolver = CredentialResolver::with_providers(vec![Box::new(FixedProvider {
            source: CredentialSource::ManualEntry,
            value: Some("super-secret"),
        })]);

        let credential = resolver.resolve().unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
