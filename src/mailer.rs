//! Transactional email delivery via SMTP.
//!
//! The mailer never fails a request: send errors are logged and reported to
//! the caller as a boolean so endpoints can answer with `email_sent: false`
//! and a warning instead of a 5xx. When SMTP is not configured, development
//! environments log the full message body as a stand-in for a real send.

use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{AppConfig, SmtpConfig};
use crate::entities::user;

#[derive(Debug, Clone)]
pub struct Mailer {
    smtp: SmtpConfig,
    frontend_url: String,
    dev_fallback: bool,
}

impl Mailer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            smtp: config.smtp.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            dev_fallback: config.is_development(),
        }
    }

    /// SMTP is considered configured once a host is set.
    pub fn is_configured(&self) -> bool {
        !self.smtp.host.is_empty()
    }

    pub fn verification_url(&self, token: Uuid) -> String {
        format!("{}/verify-email/{}/", self.frontend_url, token)
    }

    pub fn password_reset_url(&self, token: Uuid) -> String {
        format!("{}/reset-password/{}/", self.frontend_url, token)
    }

    /// Email the verification link to a freshly registered user.
    ///
    /// Returns whether the email counts as sent.
    pub async fn send_verification_email(&self, user: &user::Model, token: Uuid) -> bool {
        let url = self.verification_url(token);
        let body = format!(
            "Welcome to Timber!\n\n\
             Hi {},\n\n\
             Thank you for registering with Timber. Please visit the following link to verify \
             your email address:\n\n\
             {}\n\n\
             This link will expire in 24 hours. If you didn't create an account with Timber, \
             please ignore this email.\n",
            greeting_name(user),
            url
        );

        self.send_with_fallback(&user.email, "Verify your email address - Timber", body)
            .await
    }

    /// Email the password reset link to a user who requested one.
    pub async fn send_password_reset_email(&self, user: &user::Model, token: Uuid) -> bool {
        let url = self.password_reset_url(token);
        let body = format!(
            "Password Reset Request\n\n\
             Hi {},\n\n\
             We received a request to reset your password for your Timber account. Please visit \
             the following link to reset your password:\n\n\
             {}\n\n\
             This link will expire in 24 hours. If you didn't request a password reset, please \
             ignore this email or contact support if you have concerns.\n",
            greeting_name(user),
            url
        );

        self.send_with_fallback(&user.email, "Reset your password - Timber", body)
            .await
    }

    async fn send_with_fallback(&self, to: &str, subject: &str, body: String) -> bool {
        if !self.is_configured() {
            return self.log_fallback(to, subject, &body, "SMTP not configured");
        }

        match self.deliver(to, subject, body.clone()).await {
            Ok(()) => {
                info!(to = to, subject = subject, "Email sent");
                true
            }
            Err(e) => {
                error!(to = to, subject = subject, error = %e, "Failed to send email");
                self.log_fallback(to, subject, &body, "SMTP send failed")
            }
        }
    }

    fn log_fallback(&self, to: &str, subject: &str, body: &str, reason: &str) -> bool {
        if self.dev_fallback {
            info!(
                to = to,
                subject = subject,
                body = body,
                "{reason}, logging email instead"
            );
            true
        } else {
            false
        }
    }

    async fn deliver(&self, to: &str, subject: &str, body: String) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.smtp.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.host)?
                .port(self.smtp.port);

        if let (Some(user), Some(pass)) = (&self.smtp.username, &self.smtp.password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        transport_builder.build().send(email).await?;
        Ok(())
    }
}

/// Django-style greeting: first name when present and non-empty, else username.
fn greeting_name(user: &user::Model) -> &str {
    match user.first_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => &user.username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(first_name: Option<&str>) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            username: "joiner".into(),
            email: "joiner@example.com".into(),
            password_hash: "x".into(),
            first_name: first_name.map(Into::into),
            last_name: None,
            phone_number: None,
            is_active: true,
            is_email_verified: false,
            email_verification_token: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn test_mailer() -> Mailer {
        Mailer {
            smtp: SmtpConfig {
                host: String::new(),
                port: 587,
                from_address: "noreply@timber.local".into(),
                username: None,
                password: None,
            },
            frontend_url: "http://localhost:3000".into(),
            dev_fallback: true,
        }
    }

    #[test]
    fn verification_url_has_trailing_slash() {
        let mailer = test_mailer();
        let token = Uuid::new_v4();
        assert_eq!(
            mailer.verification_url(token),
            format!("http://localhost:3000/verify-email/{token}/")
        );
    }

    #[test]
    fn reset_url_has_trailing_slash() {
        let mailer = test_mailer();
        let token = Uuid::new_v4();
        assert_eq!(
            mailer.password_reset_url(token),
            format!("http://localhost:3000/reset-password/{token}/")
        );
    }

    #[test]
    fn greeting_prefers_first_name() {
        assert_eq!(greeting_name(&test_user(Some("Ada"))), "Ada");
        assert_eq!(greeting_name(&test_user(Some(""))), "joiner");
        assert_eq!(greeting_name(&test_user(None)), "joiner");
    }

    #[tokio::test]
    async fn unconfigured_mailer_falls_back_in_development() {
        let mailer = test_mailer();
        let sent = mailer
            .send_verification_email(&test_user(None), Uuid::new_v4())
            .await;
        assert!(sent);
    }

    #[tokio::test]
    async fn unconfigured_mailer_reports_unsent_outside_development() {
        let mut mailer = test_mailer();
        mailer.dev_fallback = false;
        let sent = mailer
            .send_password_reset_email(&test_user(None), Uuid::new_v4())
            .await;
        assert!(!sent);
    }
}
