//! Message texts sent by the pipeline.

use chrono::{DateTime, TimeZone};
use guestbox_core::GuestContact;
use std::fmt::Display;

/// "Submission arrived" notice sent to every fan-out target.
///
/// `container_name` is present only on the file-sharing path.
pub fn fan_out_notice<Tz>(
    guest: &GuestContact,
    submitted_at: &DateTime<Tz>,
    container_name: Option<&str>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut text = format!(
        "*CONVIDADO COMPARTILHOU*\n\
         Nome: {} {}\n\
         WhatsApp: {}\n\
         Data de Nascimento: {}\n\
         Data e horário do envio: {}",
        guest.name,
        guest.surname,
        guest.phone,
        guest.birth_date,
        submitted_at.format("%d/%m/%Y, %H:%M:%S"),
    );
    if let Some(name) = container_name {
        text.push_str("\nArquivos enviados para a pasta: ");
        text.push_str(name);
    }
    text
}

/// Thank-you message sent to the guest after their files are stored.
pub fn thank_you(guest: &GuestContact) -> String {
    format!("Obrigado por compartilhar suas fotos e vídeos, {}!", guest.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn guest() -> GuestContact {
        GuestContact {
            name: "Ana".to_string(),
            surname: "Silva".to_string(),
            phone: "5511900000000".to_string(),
            birth_date: "2010-05-01".to_string(),
        }
    }

    #[test]
    fn data_only_notice_has_no_folder_line() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 9, 5, 7).unwrap();
        assert_eq!(
            fan_out_notice(&guest(), &at, None),
            "*CONVIDADO COMPARTILHOU*\n\
             Nome: Ana Silva\n\
             WhatsApp: 5511900000000\n\
             Data de Nascimento: 2010-05-01\n\
             Data e horário do envio: 19/10/2026, 09:05:07"
        );
    }

    #[test]
    fn sharing_notice_names_the_folder() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2026, 10, 19, 21, 0, 0).unwrap();
        let text = fan_out_notice(&guest(), &at, Some("Ana_Silva_2010-05-01"));
        assert!(text.contains("Data e horário do envio: 19/10/2026, 21:00:00"));
        assert!(text.ends_with("\nArquivos enviados para a pasta: Ana_Silva_2010-05-01"));
    }

    #[test]
    fn thank_you_uses_first_name() {
        assert_eq!(
            thank_you(&guest()),
            "Obrigado por compartilhar suas fotos e vídeos, Ana!"
        );
    }
}
