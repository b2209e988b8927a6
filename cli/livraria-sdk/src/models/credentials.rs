//! The read-only list of accounts that may log in.
//!
//! Credentials are configuration, not user data:
//! they are loaded once and never written back.
//! Signup only validates against the store.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::utils::traceable_path;

/// Identifier of a credential record.
///
/// Credential files in the wild use both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialId {
    Number(u64),
    Text(String),
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialId::Number(n) => write!(f, "{n}"),
            CredentialId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A single account: the username is the login identifier,
/// the password its secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub username: String,
    pub password: String,
    #[serde(rename = "nomeCompleto")]
    pub display_name: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl Credential {
    /// Exact, case-sensitive match on both identifier and secret
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("couldn't read credentials file")]
    ReadFile(#[source] std::io::Error),
    #[error("couldn't parse credentials")]
    Parse(#[source] serde_json::Error),
}

/// Reasons a signup form is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignupError {
    #[error("todos os campos são obrigatórios")]
    MissingField,
    #[error("as senhas não coincidem")]
    PasswordMismatch,
    #[error("o usuário '{0}' já existe")]
    UsernameTaken(String),
}

/// The values entered into a signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
}

/// A fixed, read-only list of credentials.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    credentials: Vec<Credential>,
}

impl CredentialStore {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    /// Parse a JSON array of credential records
    pub fn from_json(json: &str) -> Result<Self, CredentialStoreError> {
        let credentials: Vec<Credential> =
            serde_json::from_str(json).map_err(CredentialStoreError::Parse)?;
        Ok(Self::new(credentials))
    }

    /// Read a JSON array of credential records from `path`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CredentialStoreError> {
        let path = path.as_ref();
        debug!(path = traceable_path(path), "reading credentials file");
        let contents = std::fs::read_to_string(path).map_err(CredentialStoreError::ReadFile)?;
        Self::from_json(&contents)
    }

    /// Find the credential matching both `username` and `password`.
    ///
    /// Returns `None` unless exactly one record matches.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Credential> {
        let mut matching = self
            .credentials
            .iter()
            .filter(|credential| credential.matches(username, password));

        match (matching.next(), matching.next()) {
            (Some(credential), None) => Some(credential),
            _ => None,
        }
    }

    pub fn contains_username(&self, username: &str) -> bool {
        self.credentials
            .iter()
            .any(|credential| credential.username == username)
    }

    /// Check a signup form against the store.
    ///
    /// A valid request is *not* added to the store.
    pub fn validate_signup(&self, request: &SignupRequest) -> Result<(), SignupError> {
        if request.username.is_empty()
            || request.password.is_empty()
            || request.password_confirmation.is_empty()
        {
            return Err(SignupError::MissingField);
        }
        if request.password != request.password_confirmation {
            return Err(SignupError::PasswordMismatch);
        }
        if self.contains_username(&request.username) {
            return Err(SignupError::UsernameTaken(request.username.clone()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    pub(crate) fn ana() -> Credential {
        Credential {
            id: CredentialId::Text("1".to_string()),
            username: "ana".to_string(),
            password: "1234".to_string(),
            display_name: "Ana".to_string(),
        }
    }

    pub(crate) fn bruno() -> Credential {
        Credential {
            id: CredentialId::Number(2),
            username: "bruno".to_string(),
            password: "senha".to_string(),
            display_name: "Bruno Lima".to_string(),
        }
    }

    pub(crate) fn store() -> CredentialStore {
        CredentialStore::new(vec![ana(), bruno()])
    }

    #[test]
    fn parses_credential_records() {
        let store = CredentialStore::from_json(indoc! {r#"
            [
              { "id": 1, "username": "ana", "password": "1234", "nomeCompleto": "Ana" },
              { "id": "b", "username": "bruno", "password": "senha", "nomeCompleto": "Bruno" }
            ]
        "#})
        .unwrap();

        assert_eq!(store.len(), 2);
        let ana = store.authenticate("ana", "1234").unwrap();
        assert_eq!(ana.id, CredentialId::Number(1));
        assert_eq!(ana.display_name, "Ana");
        let bruno = store.authenticate("bruno", "senha").unwrap();
        assert_eq!(bruno.id, CredentialId::Text("b".to_string()));
    }

    #[test]
    fn authenticate_is_exact_and_case_sensitive() {
        let store = store();
        assert!(store.authenticate("ana", "1234").is_some());
        assert!(store.authenticate("Ana", "1234").is_none());
        assert!(store.authenticate("ana", "1234 ").is_none());
        assert!(store.authenticate("ana", "senha").is_none());
        assert!(store.authenticate("nobody", "1234").is_none());
    }

    #[test]
    fn ambiguous_credentials_do_not_authenticate() {
        let store = CredentialStore::new(vec![ana(), ana()]);
        assert!(store.authenticate("ana", "1234").is_none());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", ana());
        assert!(!rendered.contains("1234"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn signup_validation() {
        let store = store();
        let request = |username: &str, password: &str, confirmation: &str| SignupRequest {
            username: username.to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        };

        assert_eq!(
            store.validate_signup(&request("", "a", "a")),
            Err(SignupError::MissingField)
        );
        assert_eq!(
            store.validate_signup(&request("carla", "a", "b")),
            Err(SignupError::PasswordMismatch)
        );
        assert_eq!(
            store.validate_signup(&request("ana", "a", "a")),
            Err(SignupError::UsernameTaken("ana".to_string()))
        );
        assert_eq!(store.validate_signup(&request("carla", "a", "a")), Ok(()));

        // validation never adds to the store
        assert!(!store.contains_username("carla"));
        assert_eq!(store.len(), 2);
    }
}
