use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::warn;

use crate::config::MailConfig;

/// Account-notification emails. Delivery is best-effort: callers report a
/// boolean back to the client and never fail the request on a send error.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_deactivation(&self, to: &str, name: &str, reason: &str) -> bool;
    async fn send_reactivation(&self, to: &str, name: &str) -> bool;
}

pub struct SmtpMailer {
    config: MailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(creds)
            .build();
        Ok(Self { config, transport })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> bool {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_address);
        let message = match Message::builder()
            .from(match from.parse() {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, "invalid from address");
                    return false;
                }
            })
            .to(match to.parse() {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, to, "invalid recipient address");
                    return false;
                }
            })
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
        {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "build mail message failed");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, to, "smtp send failed");
                false
            }
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_deactivation(&self, to: &str, name: &str, reason: &str) -> bool {
        let body = format!(
            "Hello {name},\n\n\
             Your Durian App account has been deactivated.\n\n\
             Reason: {reason}\n\n\
             If you believe this is a mistake, please contact support.\n\n\
             Durian App Support"
        );
        self.send(to, "Your account has been deactivated", body).await
    }

    async fn send_reactivation(&self, to: &str, name: &str) -> bool {
        let body = format!(
            "Hello {name},\n\n\
             Good news: your Durian App account has been reactivated.\n\
             You can log in again.\n\n\
             Durian App Support"
        );
        self.send(to, "Your account has been reactivated", body).await
    }
}

/// Used when MAIL_HOST is not set. Notifications are skipped with a warning.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_deactivation(&self, to: &str, _name: &str, _reason: &str) -> bool {
        warn!(to, "mail not configured, skipping deactivation notice");
        false
    }

    async fn send_reactivation(&self, to: &str, _name: &str) -> bool {
        warn!(to, "mail not configured, skipping reactivation notice");
        false
    }
}
