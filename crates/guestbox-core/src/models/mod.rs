pub mod ledger_entry;
pub mod notification;
pub mod staged_file;
pub mod submission;

pub use ledger_entry::LedgerEntry;
pub use notification::{NotificationRecipients, NotificationTarget, RecipientRole};
pub use staged_file::{ContentKind, StagedFile};
pub use submission::{
    GuestContact, GuestSubmission, InvalidTransition, SubmissionRequest, SubmissionStage,
    SubmissionStatus,
};
