use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::submission::GuestSubmission;

/// One immutable record in the guest ledger
///
/// Serialized with the field names of the ledger file. `folderId` and
/// `arquivos` are absent for submissions without media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "sobrenome")]
    pub surname: String,
    #[serde(rename = "whatsapp")]
    pub phone: String,
    #[serde(rename = "nascimento")]
    pub birth_date: String,
    /// RFC 3339, UTC, millisecond precision
    #[serde(rename = "dataEnvio")]
    pub submitted_at: String,
    #[serde(rename = "folderId", default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Original filenames, in submission order
    #[serde(rename = "arquivos", default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl From<&GuestSubmission> for LedgerEntry {
    fn from(submission: &GuestSubmission) -> Self {
        LedgerEntry {
            name: submission.guest.name.clone(),
            surname: submission.guest.surname.clone(),
            phone: submission.guest.phone.clone(),
            birth_date: submission.guest.birth_date.clone(),
            submitted_at: submission
                .submitted_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            container_id: submission.container_id().map(String::from),
            files: submission
                .files
                .iter()
                .map(|f| f.original_name.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuestContact;
    use chrono::{TimeZone, Utc};

    #[test]
    fn data_only_entry_has_no_file_fields() {
        let submitted_at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let submission = GuestSubmission::new(
            GuestContact {
                name: "Ana".to_string(),
                surname: "Silva".to_string(),
                phone: "5511900000000".to_string(),
                birth_date: "2010-05-01".to_string(),
            },
            vec![],
            submitted_at,
        );

        let value = serde_json::to_value(LedgerEntry::from(&submission)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "nome": "Ana",
                "sobrenome": "Silva",
                "whatsapp": "5511900000000",
                "nascimento": "2010-05-01",
                "dataEnvio": "2026-10-19T12:00:00.000Z",
            })
        );
    }

    #[test]
    fn entries_without_optional_fields_deserialize() {
        let entry: LedgerEntry = serde_json::from_str(
            r#"{"nome":"Ana","sobrenome":"Silva","whatsapp":"1","nascimento":"x","dataEnvio":"t"}"#,
        )
        .unwrap();
        assert!(entry.container_id.is_none());
        assert!(entry.files.is_empty());
    }
}
