use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not read session file `{path}`: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("could not write session file `{path}`: {source}")]
    Write { path: String, source: std::io::Error },
    #[error("session file is corrupt: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    pub email: String,
}

/// Signed-in marker for the single operator. A missing file means signed
/// out; no expiry, no tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    signed_in: bool,
    operator: Option<Operator>,
}

impl Session {
    /// Checks the supplied credentials against the configured operator pair.
    /// Returns a signed-in session on match, `None` otherwise.
    pub fn login(auth: &AuthConfig, email: &str, password: &str) -> Option<Self> {
        if email == auth.operator_email && password == auth.operator_password.expose_secret() {
            Some(Self {
                signed_in: true,
                operator: Some(Operator {
                    name: auth.operator_name.clone(),
                    email: auth.operator_email.clone(),
                }),
            })
        } else {
            None
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => {
                Err(SessionError::Read { path: path.display().to_string(), source })
            }
        }
    }

    pub fn persist(&self, path: &Path) -> Result<(), SessionError> {
        let payload = serde_json::to_string(self)?;
        fs::write(path, payload)
            .map_err(|source| SessionError::Write { path: path.display().to_string(), source })
    }

    /// Removes the session flag. Clearing an absent session is not an error.
    pub fn clear(path: &Path) -> Result<(), SessionError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => {
                Err(SessionError::Write { path: path.display().to_string(), source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::Session;
    use crate::config::AuthConfig;

    fn auth() -> AuthConfig {
        AuthConfig {
            operator_name: "Administrator".to_string(),
            operator_email: "operator@marcena.local".to_string(),
            operator_password: "wood-and-glue".to_string().into(),
            session_path: PathBuf::from(".marcena-session.json"),
        }
    }

    #[test]
    fn login_accepts_the_configured_pair() {
        let session =
            Session::login(&auth(), "operator@marcena.local", "wood-and-glue").expect("login");

        assert!(session.is_signed_in());
        assert_eq!(session.operator().map(|op| op.name.as_str()), Some("Administrator"));
    }

    #[test]
    fn login_rejects_wrong_credentials() {
        assert!(Session::login(&auth(), "operator@marcena.local", "wrong").is_none());
        assert!(Session::login(&auth(), "other@marcena.local", "wood-and-glue").is_none());
    }

    #[test]
    fn session_round_trips_through_the_flag_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("session.json");

        let session =
            Session::login(&auth(), "operator@marcena.local", "wood-and-glue").expect("login");
        session.persist(&path).expect("persist");

        let loaded = Session::load(&path).expect("load");
        assert_eq!(loaded, session);

        Session::clear(&path).expect("clear");
        let after_clear = Session::load(&path).expect("load after clear");
        assert!(!after_clear.is_signed_in());
    }

    #[test]
    fn clearing_an_absent_session_is_fine() {
        let dir = TempDir::new().expect("tempdir");
        Session::clear(&dir.path().join("missing.json")).expect("clear absent");
    }
}
