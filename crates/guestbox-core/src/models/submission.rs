use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::staged_file::StagedFile;

/// Identity and contact data of a guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub surname: String,
    /// Phone number used as the messaging recipient id
    pub phone: String,
    /// Date of birth as typed in the form (not parsed)
    pub birth_date: String,
}

/// Request DTO for both intake operations
///
/// Field names follow the web form; English aliases are accepted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmissionRequest {
    #[serde(default, alias = "name")]
    #[validate(custom(function = "validate_not_blank", message = "nome is required"))]
    pub nome: String,
    #[serde(default, alias = "surname")]
    #[validate(custom(function = "validate_not_blank", message = "sobrenome is required"))]
    pub sobrenome: String,
    #[serde(default, alias = "phone")]
    #[validate(custom(function = "validate_not_blank", message = "whatsapp is required"))]
    pub whatsapp: String,
    #[serde(default, alias = "birthDate")]
    #[validate(custom(function = "validate_not_blank", message = "nascimento is required"))]
    pub nascimento: String,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl SubmissionRequest {
    /// Trimmed contact data. Call after `validate()`.
    pub fn into_contact(self) -> GuestContact {
        GuestContact {
            name: self.nome.trim().to_string(),
            surname: self.sobrenome.trim().to_string(),
            phone: self.whatsapp.trim().to_string(),
            birth_date: self.nascimento.trim().to_string(),
        }
    }
}

/// Step of the pipeline at which a submission failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStage {
    Container,
    Upload,
    Ledger,
}

impl SubmissionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStage::Container => "container",
            SubmissionStage::Upload => "upload",
            SubmissionStage::Ledger => "ledger",
        }
    }
}

impl Display for SubmissionStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one submission
///
/// `Received → ContainerCreated → FilesUploaded → Notified → Committed`, with
/// `Received → Notified` for submissions without files. `Failed` absorbs a
/// failure at any point before `Committed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum SubmissionStatus {
    Received,
    ContainerCreated,
    FilesUploaded,
    Notified,
    Committed,
    Failed(SubmissionStage),
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Committed | SubmissionStatus::Failed(_))
    }

    fn allows(&self, next: SubmissionStatus) -> bool {
        use SubmissionStatus::*;
        match (self, next) {
            (Committed, _) | (Failed(_), _) => false,
            (_, Failed(_)) => true,
            (Received, ContainerCreated) | (Received, Notified) => true,
            (ContainerCreated, FilesUploaded) => true,
            (FilesUploaded, Notified) => true,
            (Notified, Committed) => true,
            _ => false,
        }
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubmissionStatus::Received => write!(f, "received"),
            SubmissionStatus::ContainerCreated => write!(f, "container_created"),
            SubmissionStatus::FilesUploaded => write!(f, "files_uploaded"),
            SubmissionStatus::Notified => write!(f, "notified"),
            SubmissionStatus::Committed => write!(f, "committed"),
            SubmissionStatus::Failed(stage) => write!(f, "failed({})", stage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid submission transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
}

/// One guest's submission as it moves through the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct GuestSubmission {
    /// Correlation id for logs; not part of the ledger entry
    pub id: Uuid,
    pub guest: GuestContact,
    pub submitted_at: DateTime<Utc>,
    pub files: Vec<StagedFile>,
    container_id: Option<String>,
    status: SubmissionStatus,
}

impl GuestSubmission {
    pub fn new(guest: GuestContact, files: Vec<StagedFile>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            guest,
            submitted_at,
            files,
            container_id: None,
            status: SubmissionStatus::Received,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    /// Container name: `name_surname_birthDate`.
    ///
    /// Guests with identical name, surname and birth date get the same name;
    /// backends keep such containers apart by id.
    pub fn container_name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.guest.name, self.guest.surname, self.guest.birth_date
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    ///
    /// Skipping straight from `Received` to `Notified` is only valid for a
    /// submission without files.
    pub fn transition(&mut self, next: SubmissionStatus) -> Result<(), InvalidTransition> {
        let skips_storage =
            self.status == SubmissionStatus::Received && next == SubmissionStatus::Notified;
        if !self.status.allows(next) || (skips_storage && !self.files.is_empty()) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Record the created container and enter `ContainerCreated`.
    pub fn attach_container(&mut self, container_id: String) -> Result<(), InvalidTransition> {
        self.transition(SubmissionStatus::ContainerCreated)?;
        self.container_id = Some(container_id);
        Ok(())
    }

    pub fn fail(&mut self, stage: SubmissionStage) {
        if !self.status.is_terminal() {
            self.status = SubmissionStatus::Failed(stage);
        }
    }
}
