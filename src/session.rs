//! Operator session handling
//!
//! A thin gate in front of mutating commands: the shop tracks which operator
//! is working at this terminal. Identity lives in the settings file; there is
//! no authentication here - account verification is the concern of the
//! hosted backend this tool syncs against.

use crate::config::{Settings, WorkshopPaths};
use crate::error::{WorkshopError, WorkshopResult};

/// The operator currently using the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

/// Session provider backed by the settings file
pub struct SessionProvider<'a> {
    paths: &'a WorkshopPaths,
}

impl<'a> SessionProvider<'a> {
    pub fn new(paths: &'a WorkshopPaths) -> Self {
        Self { paths }
    }

    /// The logged-in operator, if any
    pub fn current_user(&self) -> WorkshopResult<Option<Identity>> {
        let settings = Settings::load_or_create(self.paths)?;
        Ok(settings.operator.map(|name| Identity { name }))
    }

    /// Log an operator in, replacing any previous session
    pub fn login(&self, name: &str) -> WorkshopResult<Identity> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkshopError::Session("Operator name cannot be empty".into()));
        }

        let mut settings = Settings::load_or_create(self.paths)?;
        settings.operator = Some(name.to_string());
        settings.save(self.paths)?;

        Ok(Identity {
            name: name.to_string(),
        })
    }

    /// End the current session
    pub fn logout(&self) -> WorkshopResult<()> {
        let mut settings = Settings::load_or_create(self.paths)?;
        if settings.operator.is_none() {
            return Err(WorkshopError::Session("No operator is logged in".into()));
        }
        settings.operator = None;
        settings.save(self.paths)
    }

    /// Require a logged-in operator; used to gate mutating commands
    pub fn require_user(&self) -> WorkshopResult<Identity> {
        self.current_user()?.ok_or_else(|| {
            WorkshopError::Session("No operator logged in. Run 'workshop login <name>' first".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_paths() -> (TempDir, WorkshopPaths) {
        let temp_dir = TempDir::new().unwrap();
        let paths = WorkshopPaths::with_base_dir(temp_dir.path().to_path_buf());
        (temp_dir, paths)
    }

    #[test]
    fn test_no_session_by_default() {
        let (_temp_dir, paths) = test_paths();
        let session = SessionProvider::new(&paths);

        assert!(session.current_user().unwrap().is_none());
        assert!(matches!(
            session.require_user(),
            Err(WorkshopError::Session(_))
        ));
    }

    #[test]
    fn test_login_logout() {
        let (_temp_dir, paths) = test_paths();
        let session = SessionProvider::new(&paths);

        let identity = session.login("marta").unwrap();
        assert_eq!(identity.name, "marta");
        assert_eq!(session.require_user().unwrap().name, "marta");

        session.logout().unwrap();
        assert!(session.current_user().unwrap().is_none());
    }

    #[test]
    fn test_login_rejects_blank_name() {
        let (_temp_dir, paths) = test_paths();
        let session = SessionProvider::new(&paths);

        assert!(matches!(
            session.login("   "),
            Err(WorkshopError::Session(_))
        ));
    }

    #[test]
    fn test_logout_without_session_fails() {
        let (_temp_dir, paths) = test_paths();
        let session = SessionProvider::new(&paths);

        assert!(matches!(session.logout(), Err(WorkshopError::Session(_))));
    }
}
