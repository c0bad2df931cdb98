use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use super::{Notification, Notifier};
use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};

pub struct SmtpNotifier {
    from: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            from: config.from.clone(),
            transport,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> AppResult<()> {
        let email = Message::builder()
            .from(self.from.parse().map_err(|e| AppError::dependency(format!("invalid sender: {e}")))?)
            .to(notification
                .to
                .parse()
                .map_err(|e| AppError::dependency(format!("invalid recipient: {e}")))?)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(AppError::dependency)?;

        self.transport
            .send(email)
            .await
            .map_err(AppError::dependency)?;
        Ok(())
    }
}
