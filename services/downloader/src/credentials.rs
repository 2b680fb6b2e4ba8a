//! Injected archive credentials.
//!
//! The archive requires HTTP Basic authentication. Credentials are supplied
//! by a provider so batch runs are unattended: explicit flags win, otherwise
//! the environment (optionally via a .env file) is consulted.

use thiserror::Error;

/// Username/password pair for the data archive.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Errors raised while resolving credentials.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// A required environment variable is unset.
    #[error("missing credential: set {0}")]
    Missing(&'static str),
}

/// Source of archive credentials.
pub trait CredentialProvider {
    fn credentials(&self) -> Result<Credentials, CredentialError>;
}

/// Credentials passed explicitly (CLI flags).
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        Ok(self.0.clone())
    }
}

/// Credentials read from the environment.
pub struct EnvCredentials {
    pub user_var: &'static str,
    pub pass_var: &'static str,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            user_var: "EARTHDATA_USERNAME",
            pass_var: "EARTHDATA_PASSWORD",
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        let username =
            std::env::var(self.user_var).map_err(|_| CredentialError::Missing(self.user_var))?;
        let password =
            std::env::var(self.pass_var).map_err(|_| CredentialError::Missing(self.pass_var))?;
        Ok(Credentials { username, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider() {
        let provider = StaticCredentials(Credentials {
            username: "user".to_string(),
            password: "secret".to_string(),
        });
        let creds = provider.credentials().unwrap();
        assert_eq!(creds.username, "user");
    }

    #[test]
    fn test_env_provider_missing() {
        let provider = EnvCredentials {
            user_var: "NO_SUCH_VAR_FOR_TEST",
            pass_var: "NO_SUCH_VAR_FOR_TEST_2",
        };
        assert!(provider.credentials().is_err());
    }
}
