use crate::config::toml_config::{EmailBackend, EmailConfig};
use crate::domain::model::EmailMessage;
use crate::domain::ports::MailTransport;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for Box<T> {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        (**self).send(message).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Writes messages to stdout instead of sending them. Handy in development.
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransport;

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        println!("From: {}", message.from);
        println!("To: {}", message.to.join(", "));
        println!("Subject: {}", message.subject);
        println!();
        println!("{}", message.body);
        println!("{}", "-".repeat(79));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Collects messages in an outbox. Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.outbox.lock().await.push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(SiteError::mail)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (config.username(), config.password()) {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        } else {
            tracing::debug!("No SMTP credentials configured for {}", config.host);
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

/// Build a lettre message from ours.
pub fn to_lettre_message(message: &EmailMessage) -> Result<Message> {
    let from: Mailbox = message.from.parse().map_err(SiteError::mail)?;
    let mut builder = Message::builder()
        .from(from)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    for to in &message.to {
        let mailbox: Mailbox = to.parse().map_err(SiteError::mail)?;
        builder = builder.to(mailbox);
    }
    builder.body(message.body.clone()).map_err(SiteError::mail)
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = to_lettre_message(message)?;
        self.transport.send(email).await.map_err(SiteError::mail)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Pick the transport named in the configuration.
pub fn transport_from_config(config: &EmailConfig) -> Result<Box<dyn MailTransport>> {
    let transport: Box<dyn MailTransport> = match config.backend {
        EmailBackend::Console => Box::new(ConsoleTransport),
        EmailBackend::Memory => Box::new(MemoryTransport::new()),
        EmailBackend::Smtp => Box::new(SmtpTransport::from_config(config)?),
    };
    tracing::debug!("Using {} email backend", transport.name());
    Ok(transport)
}
