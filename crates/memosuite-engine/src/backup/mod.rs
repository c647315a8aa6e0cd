//! JSON backup and restore.
//!
//! A backup file is one of three shapes:
//!
//! - an envelope `{version, timestamp, appName, data}` around the payload
//! - an encrypted envelope `{version, isEncrypted: true, appName, encryptedContent}`
//!   whose content decrypts to either of the other two shapes
//! - a bare payload `{version, timestamp, memos, comments, folders}` from older exports
//!
//! Importing merges into an existing [`Library`] rather than replacing it.

pub mod crypto;
pub mod merge;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Comment, Folder, Library, Memo, MemoId};

pub use crypto::{CryptoError, decrypt, encrypt};
pub use merge::MergeReport;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("This backup is encrypted and needs a password")]
    PasswordRequired,
    #[error("Wrong password or damaged encrypted content")]
    InvalidPassword,
    #[error("Invalid backup file format: {0}")]
    InvalidFormat(String),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not encrypt backup: {0}")]
    Crypto(CryptoError),
}

fn backup_version() -> u32 {
    BACKUP_VERSION
}

/// The library contents carried by a backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default = "backup_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(alias = "logs")]
    pub memos: Vec<Memo>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub folders: Vec<Folder>,
}

impl BackupData {
    /// Snapshot `library`, optionally limited to some memos and their comments.
    ///
    /// Folders are always included in full.
    pub fn from_library(library: &Library, selected: Option<&[MemoId]>, now: DateTime<Utc>) -> Self {
        let is_selected = |id: MemoId| selected.is_none_or(|ids| ids.contains(&id));

        Self {
            version: BACKUP_VERSION,
            timestamp: Some(now),
            memos: library
                .memos
                .iter()
                .filter(|m| selected.is_none() || m.id.is_some_and(is_selected))
                .cloned()
                .collect(),
            comments: library
                .comments
                .iter()
                .filter(|c| is_selected(c.memo_id))
                .cloned()
                .collect(),
            folders: library.folders.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    pub data: BackupData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedBackup {
    pub version: u32,
    pub is_encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    pub encrypted_content: String,
}

/// A backup file as read from disk, before any password is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupFile {
    Encrypted(EncryptedBackup),
    Plain(BackupData),
}

impl BackupFile {
    pub fn parse(json: &str) -> Result<Self, BackupError> {
        let value: Value = serde_json::from_str(json)?;

        let encrypted = value.get("isEncrypted").and_then(Value::as_bool) == Some(true)
            && value.get("encryptedContent").is_some_and(Value::is_string);
        if encrypted {
            let file: EncryptedBackup = serde_json::from_value(value)
                .map_err(|e| BackupError::InvalidFormat(e.to_string()))?;
            return Ok(Self::Encrypted(file));
        }

        Ok(Self::Plain(unwrap_payload(value)?))
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }

    /// Resolve to the payload, decrypting with `password` when needed.
    pub fn into_data(self, password: Option<&str>) -> Result<BackupData, BackupError> {
        match self {
            Self::Plain(data) => Ok(data),
            Self::Encrypted(file) => {
                let password = password
                    .filter(|p| !p.is_empty())
                    .ok_or(BackupError::PasswordRequired)?;
                let decrypted = decrypt(&file.encrypted_content, password)
                    .map_err(|_| BackupError::InvalidPassword)?;
                let value: Value =
                    serde_json::from_str(&decrypted).map_err(|_| BackupError::InvalidPassword)?;
                unwrap_payload(value)
            }
        }
    }
}

/// Accept either an envelope with a `data` object or a bare payload.
fn unwrap_payload(value: Value) -> Result<BackupData, BackupError> {
    let payload = match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(payload).map_err(|e| BackupError::InvalidFormat(e.to_string()))
}

/// Serialize `library` as a backup file, encrypted when a password is given.
pub fn export_backup(
    library: &Library,
    selected: Option<&[MemoId]>,
    app_name: &str,
    password: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String, BackupError> {
    let envelope = BackupEnvelope {
        version: BACKUP_VERSION,
        timestamp: now,
        app_name: Some(app_name.to_string()),
        data: BackupData::from_library(library, selected, now),
    };
    log::info!(
        "Exporting {} memos, {} comments, {} folders",
        envelope.data.memos.len(),
        envelope.data.comments.len(),
        envelope.data.folders.len()
    );

    match password.filter(|p| !p.is_empty()) {
        None => Ok(serde_json::to_string_pretty(&envelope)?),
        Some(password) => {
            let plaintext = serde_json::to_string(&envelope)?;
            let file = EncryptedBackup {
                version: BACKUP_VERSION,
                is_encrypted: true,
                app_name: Some(app_name.to_string()),
                encrypted_content: encrypt(&plaintext, password).map_err(BackupError::Crypto)?,
            };
            Ok(serde_json::to_string_pretty(&file)?)
        }
    }
}

/// Parse a backup file and resolve it to its payload.
pub fn import_backup(json: &str, password: Option<&str>) -> Result<BackupData, BackupError> {
    let data = BackupFile::parse(json)?.into_data(password)?;
    log::info!(
        "Read backup with {} memos, {} comments, {} folders",
        data.memos.len(),
        data.comments.len(),
        data.folders.len()
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
    }

    fn sample_library() -> Library {
        let mut library = Library::new();
        let folder = library.add_folder(Folder::new("Inbox", now()));
        for title in ["one", "two"] {
            let mut memo = Memo::new(title, format!("{title} body"), now());
            memo.folder_id = Some(folder);
            let id = library.add_memo(memo);
            library.add_comment(Comment {
                id: None,
                memo_id: id,
                content: format!("about {title}"),
                created_at: now(),
                updated_at: now(),
            });
        }
        library
    }

    #[test]
    fn test_plain_export_roundtrip() {
        let library = sample_library();
        let json = export_backup(&library, None, "handmemo", None, now()).unwrap();

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["appName"], "handmemo");
        assert_eq!(value["data"]["memos"].as_array().unwrap().len(), 2);

        let data = import_backup(&json, None).unwrap();
        assert_eq!(data.memos, library.memos);
        assert_eq!(data.folders, library.folders);
    }

    #[test]
    fn test_partial_export_keeps_all_folders() {
        let library = sample_library();
        let data = BackupData::from_library(&library, Some(&[2]), now());

        assert_eq!(data.memos.len(), 1);
        assert_eq!(data.memos[0].title, "two");
        assert_eq!(data.comments.len(), 1);
        assert_eq!(data.comments[0].memo_id, 2);
        assert_eq!(data.folders.len(), 1);
    }

    #[test]
    fn test_encrypted_export_needs_password() {
        let library = sample_library();
        let json = export_backup(&library, None, "handmemo", Some("pw"), now()).unwrap();

        let file = BackupFile::parse(&json).unwrap();
        assert!(file.is_encrypted());
        assert!(!json.contains("one body"));

        assert!(matches!(
            import_backup(&json, None),
            Err(BackupError::PasswordRequired)
        ));
        assert!(matches!(
            import_backup(&json, Some("wrong")),
            Err(BackupError::InvalidPassword)
        ));
        assert_eq!(import_backup(&json, Some("pw")).unwrap().memos.len(), 2);
    }

    #[test]
    fn test_legacy_bare_payload_is_accepted() {
        let json = r#"{
            "version": 1,
            "timestamp": "2024-01-01T00:00:00.000Z",
            "logs": [{"id": 1, "title": "old", "content": "",
                      "createdAt": "2024-01-01T00:00:00.000Z",
                      "updatedAt": "2024-01-01T00:00:00.000Z"}],
            "comments": [{"id": 1, "logId": 1, "content": "c",
                          "createdAt": "2024-01-01T00:00:00.000Z",
                          "updatedAt": "2024-01-01T00:00:00.000Z"}]
        }"#;

        let data = import_backup(json, None).unwrap();

        assert_eq!(data.memos[0].title, "old");
        assert_eq!(data.comments[0].memo_id, 1);
        assert!(data.folders.is_empty());
    }

    #[test]
    fn test_unrecognized_shape_is_invalid_format() {
        assert!(matches!(
            import_backup(r#"{"version": 1, "books": []}"#, None),
            Err(BackupError::InvalidFormat(_))
        ));
        assert!(matches!(import_backup("{", None), Err(BackupError::Json(_))));
    }
}
