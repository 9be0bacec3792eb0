use super::EmailMessage;

const SIGNATURE: &str = "FAITH CommUNITY";

fn link(base_url: &str, path: &str, token: &str) -> String {
    format!("{}{}?token={}", base_url.trim_end_matches('/'), path, token)
}

pub fn subscription_confirmation(to: &str, base_url: &str, token: &str, unsubscribe_token: &str, ttl_hours: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Confirm your FAITH CommUNITY subscription".to_string(),
        body: format!(
            "Thank you for subscribing to FAITH CommUNITY updates.\n\n\
             Confirm your subscription within {} hours by opening this link:\n{}\n\n\
             If you did not sign up, ignore this message or unsubscribe here:\n{}\n\n{}",
            ttl_hours,
            link(base_url, "/subscribe/confirm", token),
            link(base_url, "/subscribe/unsubscribe", unsubscribe_token),
            SIGNATURE
        ),
    }
}

/// Re-sent confirmation for a pending address; the unsubscribe link went out with the first message
pub fn subscription_reminder(to: &str, base_url: &str, token: &str, ttl_hours: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Confirm your FAITH CommUNITY subscription".to_string(),
        body: format!(
            "You asked us to send a new confirmation link.\n\n\
             Confirm your subscription within {} hours by opening this link:\n{}\n\n\
             Earlier links no longer work.\n\n{}",
            ttl_hours,
            link(base_url, "/subscribe/confirm", token),
            SIGNATURE
        ),
    }
}

pub fn email_change_otp(to: &str, otp: &str, ttl_minutes: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your email change verification code".to_string(),
        body: format!(
            "Use this code to confirm your new email address: {}\n\n\
             The code expires in {} minutes. If you did not request this change, \
             you can ignore this message.\n\n{}",
            otp, ttl_minutes, SIGNATURE
        ),
    }
}

pub fn password_reset(to: &str, base_url: &str, token: &str, ttl_minutes: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your FAITH CommUNITY password".to_string(),
        body: format!(
            "A password reset was requested for this account.\n\n\
             Open this link within {} minutes to choose a new password:\n{}\n\n\
             If you did not request a reset, no action is needed.\n\n{}",
            ttl_minutes,
            link(base_url, "/reset-password", token),
            SIGNATURE
        ),
    }
}

pub fn submission_approved(to: &str, section: &str, submission_id: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Submission #{} approved", submission_id),
        body: format!(
            "Your {} submission #{} has been approved and is now live.\n\n{}",
            section, submission_id, SIGNATURE
        ),
    }
}

pub fn submission_rejected(to: &str, section: &str, submission_id: i64, remarks: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Submission #{} was not approved", submission_id),
        body: format!(
            "Your {} submission #{} was rejected.\n\nRemarks from the reviewer:\n{}\n\n{}",
            section, submission_id, remarks, SIGNATURE
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_links_carry_tokens() {
        let message = subscription_confirmation("a@b.org", "https://faith.example/", "abc", "def", 24);
        assert!(message.body.contains("https://faith.example/subscribe/confirm?token=abc"));
        assert!(message.body.contains("https://faith.example/subscribe/unsubscribe?token=def"));
        assert!(message.body.contains("24 hours"));
    }

    #[test]
    fn otp_message_contains_code() {
        let message = email_change_otp("new@b.org", "123456", 10);
        assert_eq!(message.to, "new@b.org");
        assert!(message.body.contains("123456"));
    }

    #[test]
    fn rejection_includes_remarks() {
        let message = submission_rejected("a@b.org", "program", 9, "Missing event date");
        assert!(message.subject.contains("#9"));
        assert!(message.body.contains("Missing event date"));
    }
}
