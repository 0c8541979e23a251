use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::Customer;

/// Pinned at build time; a persisted override remains available for
/// pointing one installation at another environment.
pub const DEFAULT_API_BASE: &str = match option_env!("ORDENES_API_BASE") {
    Some(base) => base,
    None => "http://localhost:4000",
};

/// State retained across runs: the logged-in customer and an optional
/// API base override. The on-disk file is plain JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub me: Option<Customer>,
}

impl Session {
    /// A missing or unreadable file is a fresh session, not an error.
    pub fn load(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;

        Ok(())
    }

    /// Resolved API base: command-line flag, then the persisted
    /// override, then the build-time default. Trailing slashes dropped.
    pub fn api_base(&self, flag: Option<&str>) -> String {
        flag.or(self.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn set_identity(&mut self, me: Customer) {
        self.me = Some(me);
    }

    pub fn clear_identity(&mut self) {
        self.me = None;
    }
}

pub fn session_path() -> PathBuf {
    if let Ok(path) = env::var("ORDENES_SESSION_FILE") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".config/ordenes/session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ana() -> Customer {
        Customer {
            id: 7,
            nombre: "Ana".into(),
            email: "ana@x.com".into(),
            telefono: "555-1".into(),
        }
    }

    #[test]
    fn missing_file_is_a_fresh_session() {
        let dir = tempdir().unwrap();
        let session = Session::load(&dir.path().join("absent.json"));

        assert!(session.me.is_none());
        assert!(session.api_base.is_none());
    }

    #[test]
    fn corrupt_file_is_a_fresh_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all").unwrap();

        assert!(Session::load(&path).me.is_none());
    }

    #[test]
    fn identity_survives_a_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/session.json");

        let mut session = Session::default();
        session.set_identity(ana());
        session.save(&path).unwrap();

        let reloaded = Session::load(&path);
        assert_eq!(reloaded.me.unwrap().email, "ana@x.com");
    }

    #[test]
    fn logout_clears_the_persisted_identity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut session = Session::default();
        session.set_identity(ana());
        session.save(&path).unwrap();

        session.clear_identity();
        session.save(&path).unwrap();

        assert!(Session::load(&path).me.is_none());
    }

    #[test]
    fn api_base_precedence() {
        let mut session = Session::default();
        assert_eq!(session.api_base(None), DEFAULT_API_BASE);

        session.api_base = Some("http://staging:4000/".into());
        assert_eq!(session.api_base(None), "http://staging:4000");

        assert_eq!(
            session.api_base(Some("http://flag:4000")),
            "http://flag:4000"
        );
    }
}
