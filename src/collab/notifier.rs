//! Batch notifications: mail over SMTP, a webhook relay, or the log.

use anyhow::{Context, Result, anyhow};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Serialize;

use super::Notifier;
use crate::SmtpSettings;
use crate::utils::config::HttpConsts;

/// `[clipbatch] Video Ready: a.mp4` / `[clipbatch] 3 Videos Ready`.
pub fn notification_subject(names: &[String]) -> String {
    let pkg = env!("CARGO_PKG_NAME");
    match names {
        [one] => format!("[{pkg}] Video Ready: {one}"),
        many => format!("[{pkg}] {} Videos Ready", many.len()),
    }
}

/// Plain-text body listing every clip and the link(s).
pub fn notification_body(names: &[String], urls: &[String]) -> String {
    let mut body = String::from("The following videos have been processed and are now available:\n\n");
    for name in names {
        body.push_str(&format!("  - {name}\n"));
    }
    body.push('\n');
    for url in urls {
        body.push_str(&format!("Link: {url}\n"));
    }
    body.push_str("\nThank you.\n");
    body
}

/// Sends the message by mail: STARTTLS to the configured relay, login when a username and
/// password are both set.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Builds the transport without connecting. Fails when no server is set, when the sender
    /// or recipient address does not parse, or when TLS setup fails.
    pub fn new(smtp: &SmtpSettings, recipient: &str) -> Result<Self> {
        let server = smtp
            .server
            .as_deref()
            .ok_or_else(|| anyhow!("no SMTP server configured"))?;
        let from = smtp
            .from
            .as_deref()
            .or(smtp.username.as_deref())
            .ok_or_else(|| anyhow!("no sender address (set from or username)"))?;
        let from: Mailbox = from
            .parse()
            .with_context(|| format!("sender address {from:?}"))?;
        let to: Mailbox = recipient
            .parse()
            .with_context(|| format!("recipient address {recipient:?}"))?;

        let mut builder = SmtpTransport::starttls_relay(server)
            .with_context(|| format!("SMTP relay {server}"))?
            .port(smtp.port)
            .timeout(Some(HttpConsts::NOTIFY_TIMEOUT));
        if let (Some(user), Some(pass)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    /// The mail that [`Notifier::notify`] sends for this batch.
    pub fn build_message(&self, names: &[String], urls: &[String]) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification_subject(names))
            .header(ContentType::TEXT_PLAIN)
            .body(notification_body(names, urls))
            .context("build notification mail")
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, names: &[String], urls: &[String]) -> Result<()> {
        let message = self.build_message(names, urls)?;
        self.transport
            .send(&message)
            .with_context(|| format!("send notification mail to {}", self.to))?;
        debug!("notification mailed to {}", self.to);
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    recipient: &'a str,
    subject: String,
    body: String,
    names: &'a [String],
    urls: &'a [String],
}

/// POSTs `{recipient, subject, body, names, urls}` to a mail/chat relay.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    recipient: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, recipient: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(HttpConsts::NOTIFY_TIMEOUT)
            .build()
            .context("build notifier HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
            recipient: recipient.into(),
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, names: &[String], urls: &[String]) -> Result<()> {
        let msg = WebhookMessage {
            recipient: &self.recipient,
            subject: notification_subject(names),
            body: notification_body(names, urls),
            names,
            urls,
        };
        self.client
            .post(&self.url)
            .json(&msg)
            .send()
            .context("send notification")?
            .error_for_status()
            .context("notification relay returned an error status")?;
        Ok(())
    }
}

/// Writes the message to the log.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier {
    pub recipient: String,
}

impl Notifier for LogNotifier {
    fn notify(&self, names: &[String], urls: &[String]) -> Result<()> {
        info!(
            "{} -> {}: {}",
            notification_subject(names),
            if self.recipient.is_empty() {
                "(no recipient)"
            } else {
                self.recipient.as_str()
            },
            urls.join(", ")
        );
        Ok(())
    }
}
