/// Email delivery for password reset links
use crate::config::EmailSettings;
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

/// Outbound notification seam, mockable in service tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_password_reset(&self, recipient: &str, name: &str, token: &str) -> Result<()>;
}

/// Async email transport wrapper (SMTP or no-op)
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    password_reset_base_url: Option<String>,
}

impl SmtpNotifier {
    /// Build the notifier from configuration
    ///
    /// If SMTP host is empty, operates in no-op mode (logs only).
    /// Useful for development and testing without email infrastructure.
    pub fn new(config: &EmailSettings) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AuthError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; password reset emails will operate in no-op mode");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| {
                AuthError::Internal(format!("Failed to configure SMTP transport: {}", e))
            })?
            .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.to_string(), password.to_string()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            password_reset_base_url: config.password_reset_base_url.clone(),
        })
    }

    /// Check if SMTP transport is enabled
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    fn build_reset_link(&self, token: &str) -> String {
        match &self.password_reset_base_url {
            Some(base) if !base.is_empty() => format!("{base}?token={token}"),
            _ => format!("https://app.campus.dev/reset-password?token={token}"),
        }
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if let Some(transport) = &self.transport {
            let to = recipient
                .parse::<Mailbox>()
                .map_err(|e| AuthError::Internal(format!("Invalid recipient address: {}", e)))?;

            let email = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(subject)
                .header(header::ContentType::TEXT_PLAIN)
                .body(body.to_string())
                .map_err(|e| {
                    AuthError::Internal(format!("Failed to build email message: {}", e))
                })?;

            transport.send(email).await?;
            info!(subject, "email sent successfully");
        } else {
            info!(
                subject,
                recipient, "Email running in no-op mode; skipping actual send"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_password_reset(&self, recipient: &str, name: &str, token: &str) -> Result<()> {
        let link = self.build_reset_link(token);
        let subject = "Campus password reset";
        let body = format!(
            "Hello {},\n\nWe received your password reset request.\n\n\
            Please click the following link to choose a new password:\n{}\n\n\
            This link expires in 10 minutes.\n\
            If you did not request this, please ignore this email.",
            name, link
        );
        self.send_mail(recipient, subject, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(host: &str, base_url: Option<&str>) -> EmailSettings {
        EmailSettings {
            smtp_host: host.to_string(),
            smtp_port: 1025,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "noreply@campus.dev".to_string(),
            use_starttls: false,
            password_reset_base_url: base_url.map(str::to_string),
        }
    }

    #[test]
    fn empty_host_disables_transport() {
        let notifier = SmtpNotifier::new(&settings("", None)).unwrap();
        assert!(!notifier.is_enabled());
    }

    #[actix_web::test]
    async fn noop_mode_send_succeeds() {
        let notifier = SmtpNotifier::new(&settings("", None)).unwrap();
        notifier
            .send_password_reset("student@school.edu", "Student", "tok")
            .await
            .unwrap();
    }

    #[test]
    fn reset_link_uses_configured_base() {
        let notifier =
            SmtpNotifier::new(&settings("", Some("https://portal.school.edu/reset"))).unwrap();
        assert_eq!(
            notifier.build_reset_link("abc"),
            "https://portal.school.edu/reset?token=abc"
        );
    }

    #[test]
    fn invalid_from_address_is_rejected() {
        let mut cfg = settings("", None);
        cfg.smtp_from = "not-an-address".to_string();
        assert!(SmtpNotifier::new(&cfg).is_err());
    }
}
