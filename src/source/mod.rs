//! Data source for the user directory.
//!
//! Records come from a static JSON resource holding an array of
//! `{id, name, email, role}` objects. A load either yields every record in
//! resource order or fails as a whole.
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{info, warn};

use crate::error::{LoadError, Result};

/// Unique record identifier. The resource may carry it as a number or a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        UserId::Number(n)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::Text(s.to_string())
    }
}

/// One entry of the directory. Never mutated after load.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }
}

/// Something that can hand over the full record set in one call.
pub trait UserSource: Send + 'static {
    /// Human-readable locator, used in logs.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<Vec<User>>;
}

/// Reads the record set from a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UserSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<User>> {
        let payload = std::fs::read(&self.path).map_err(|source| LoadError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_users(&self.path, &payload)
    }
}

/// Decode a JSON array of user records. Any malformed record or a repeated id
/// rejects the whole payload.
pub fn parse_users(origin: &Path, payload: &[u8]) -> Result<Vec<User>> {
    let users: Vec<User> =
        serde_json::from_slice(payload).map_err(|source| LoadError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
    let mut seen = HashSet::with_capacity(users.len());
    for u in &users {
        if !seen.insert(&u.id) {
            return Err(LoadError::DuplicateId {
                id: u.id.to_string(),
            });
        }
    }
    Ok(users)
}

/// A load running on a worker thread.
pub struct PendingLoad {
    rx: Receiver<Result<Vec<User>>>,
}

impl PendingLoad {
    /// Non-blocking check for the outcome. Returns `None` while still running.
    pub fn poll(&self) -> Option<Result<Vec<User>>> {
        match self.rx.try_recv() {
            Ok(res) => Some(res),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Disconnected)),
        }
    }
}

/// Run `source` once in the background. There is no retry.
pub fn spawn_load<S: UserSource>(source: S) -> PendingLoad {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("user-loader".into())
        .spawn(move || {
            let target = source.describe();
            info!(source = %target, "loading users");
            let res = source.fetch();
            match &res {
                Ok(users) => info!(source = %target, count = users.len(), "users loaded"),
                Err(err) => warn!(source = %target, error = %err, "user load failed"),
            }
            // Receiver gone means the UI already quit.
            let _ = tx.send(res);
        });
    if let Err(err) = spawned {
        warn!(error = %err, "could not start loader thread");
    }
    PendingLoad { rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn finish(load: PendingLoad) -> Result<Vec<User>> {
        loop {
            if let Some(res) = load.poll() {
                return res;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("tmp file");
        f.write_all(contents.as_bytes()).expect("write tmp");
        f
    }

    #[test]
    fn parse_users_keeps_resource_order() {
        let json = r#"[
            {"id": 2, "name": "bob", "email": "b@x.com", "role": "user"},
            {"id": "u-1", "name": "Alice", "email": "a@x.com", "role": "admin", "extra": true}
        ]"#;
        let users = parse_users(Path::new("inline"), json.as_bytes()).expect("parse");
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, UserId::Number(2));
        assert_eq!(users[1].id, UserId::Text("u-1".into()));
        assert_eq!(users[1].name, "Alice");
    }

    #[test]
    fn parse_users_rejects_missing_field() {
        let json = r#"[{"id": 1, "name": "a", "email": "a@x.com"}]"#;
        let err = parse_users(Path::new("inline"), json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn parse_users_rejects_duplicate_ids() {
        let json = r#"[
            {"id": 1, "name": "a", "email": "a@x.com", "role": "r"},
            {"id": 1, "name": "b", "email": "b@x.com", "role": "r"}
        ]"#;
        let err = parse_users(Path::new("inline"), json.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateId { ref id } if id == "1"));
    }

    #[test]
    fn json_file_source_reads_file() {
        let f = write_tmp(r#"[{"id": 1, "name": "a", "email": "a@x.com", "role": "r"}]"#);
        let users = JsonFileSource::new(f.path()).fetch().expect("fetch");
        assert_eq!(users, vec![User::new(1, "a", "a@x.com", "r")]);
    }

    #[test]
    fn json_file_source_missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = JsonFileSource::new(dir.path().join("absent.json"))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn spawn_load_delivers_result() {
        let f = write_tmp(r#"[{"id": 1, "name": "a", "email": "a@x.com", "role": "r"}]"#);
        let users = finish(spawn_load(JsonFileSource::new(f.path()))).expect("load");
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn spawn_load_reports_failure() {
        let f = write_tmp("{not json");
        let err = finish(spawn_load(JsonFileSource::new(f.path()))).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
