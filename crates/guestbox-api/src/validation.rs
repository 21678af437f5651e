//! Request validation for intake handlers

use guestbox_core::{AppError, GuestContact, SubmissionRequest};
use validator::Validate;

/// Check the four identity/contact fields and return the trimmed contact.
pub fn validate_submission(request: SubmissionRequest) -> Result<GuestContact, AppError> {
    request.validate()?;
    Ok(request.into_contact())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestbox_core::ErrorMetadata;

    fn request(nome: &str, sobrenome: &str, whatsapp: &str, nascimento: &str) -> SubmissionRequest {
        SubmissionRequest {
            nome: nome.to_string(),
            sobrenome: sobrenome.to_string(),
            whatsapp: whatsapp.to_string(),
            nascimento: nascimento.to_string(),
        }
    }

    #[test]
    fn complete_request_is_trimmed() {
        let contact =
            validate_submission(request(" Ana ", "Silva", "5511900000000 ", "2010-05-01")).unwrap();
        assert_eq!(contact.name, "Ana");
        assert_eq!(contact.phone, "5511900000000");
    }

    #[test]
    fn blank_fields_are_listed() {
        let err = validate_submission(request("Ana", "  ", "", "2010-05-01")).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(
            err.client_message(),
            "Missing or blank fields: sobrenome, whatsapp"
        );
    }
}
