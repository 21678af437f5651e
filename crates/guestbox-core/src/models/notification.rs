use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Why a recipient is being notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientRole {
    /// The guest who made the submission
    Submitter,
    /// The person the event is about
    Subject,
    /// The event organizer
    Organizer,
}

impl Display for RecipientRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RecipientRole::Submitter => write!(f, "submitter"),
            RecipientRole::Subject => write!(f, "subject"),
            RecipientRole::Organizer => write!(f, "organizer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTarget {
    pub recipient: String,
    pub role: RecipientRole,
}

impl NotificationTarget {
    pub fn new(recipient: impl Into<String>, role: RecipientRole) -> Self {
        Self {
            recipient: recipient.into(),
            role,
        }
    }
}

/// Fixed fan-out recipients, resolved once from configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecipients {
    subject: String,
    organizer: String,
}

impl NotificationRecipients {
    pub fn new(subject: impl Into<String>, organizer: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            organizer: organizer.into(),
        }
    }

    /// Targets of the "submission arrived" notice, subject first.
    pub fn fan_out_targets(&self) -> Vec<NotificationTarget> {
        vec![
            NotificationTarget::new(self.subject.clone(), RecipientRole::Subject),
            NotificationTarget::new(self.organizer.clone(), RecipientRole::Organizer),
        ]
    }
}
