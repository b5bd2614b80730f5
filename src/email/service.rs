use std::sync::Arc;

use lettre::{
  message::{Mailbox, MultiPart},
  Message,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::email::{
  template::{self, TemplateRenderer},
  transport::{MailTransport, SmtpMailTransport},
  types::{MailBody, MailMessage, MailerConfig, VerificationStatus},
};
use crate::utils::error::{MailerError, TemplateError};

/// Sends plain and templated mail through one shared transport.
///
/// The transport is built once and never reconfigured. A verification probe is
/// spawned on construction; its outcome is exposed through
/// [`Mailer::verification_status`] and never blocks sending.
pub struct Mailer<T: MailTransport = SmtpMailTransport> {
  transport: Arc<T>,
  sender: String,
  templates: TemplateRenderer,
  verbose: bool,
  verification: watch::Receiver<VerificationStatus>,
}

impl Mailer<SmtpMailTransport> {
  /// Build the pooled SMTP mailer.
  ///
  /// Must be called from within a Tokio runtime: lettre's pool spawns its idle
  /// connection reaper when the transport is built. Use [`Mailer::with_transport`]
  /// where no runtime is available yet.
  pub fn new(config: MailerConfig) -> Self {
    let transport = SmtpMailTransport::new(&config.smtp);
    Mailer::with_transport(transport, config)
  }

  /// See [`template::get_mail_template`].
  pub fn get_mail_template(replace: &[(&str, &str)], template: &str) -> std::io::Result<String> {
    template::get_mail_template(replace, template)
  }
}

impl<T: MailTransport> Mailer<T> {
  pub fn with_transport(transport: T, config: MailerConfig) -> Self {
    let transport = Arc::new(transport);
    let verification = spawn_verification(transport.clone());

    Mailer {
      transport,
      sender: config.smtp.from_email,
      templates: TemplateRenderer::new(config.template_dir),
      verbose: config.verbose,
      verification,
    }
  }

  pub fn sender(&self) -> &str {
    &self.sender
  }

  pub fn verification_status(&self) -> VerificationStatus {
    self.verification.borrow().clone()
  }

  /// Wait until the startup probe has finished and return its outcome.
  pub async fn wait_for_verification(&self) -> VerificationStatus {
    let mut rx = self.verification.clone();
    if let Ok(status) = rx.wait_for(|status| !status.is_pending()).await {
      return status.clone();
    }
    // Probe task went away without reporting.
    let status = rx.borrow().clone();
    status
  }

  pub async fn send_simple_mail(
    &self,
    recipient: &str,
    subject: &str,
    text: &str,
    html: &str,
  ) -> Result<(), MailerError<T::Error>> {
    let mail = MailMessage::new(
      self.sender.clone(),
      recipient.to_string(),
      subject.to_string(),
      text.to_string(),
      MailBody::Html(html.to_string()),
    );
    self.deliver(mail).await
  }

  /// Render `<template_dir>/<template_name>.html` with `context` and send it as the HTML body.
  pub async fn send_mail<C: Serialize>(
    &self,
    recipient: &str,
    subject: &str,
    text: &str,
    template_name: &str,
    context: C,
  ) -> Result<(), MailerError<T::Error>> {
    let context = serde_json::to_value(context).map_err(TemplateError::from)?;
    let mail = MailMessage::new(
      self.sender.clone(),
      recipient.to_string(),
      subject.to_string(),
      text.to_string(),
      MailBody::Template {
        name: template_name.to_string(),
        context,
      },
    );
    self.deliver(mail).await
  }

  async fn deliver(&self, mail: MailMessage) -> Result<(), MailerError<T::Error>> {
    let html = match &mail.body {
      MailBody::Html(html) => html.clone(),
      MailBody::Template { name, context } => self.templates.render(name, context).await?,
    };

    let message = Message::builder()
      .from(mail.from.parse::<Mailbox>()?)
      .to(mail.to.parse::<Mailbox>()?)
      .subject(mail.subject.as_str())
      .multipart(MultiPart::alternative_plain_html(mail.text.clone(), html))?;
    debug!(to = %mail.to, "Built mail message");

    self.transport.send(message).await.map_err(MailerError::Transport)?;

    if self.verbose {
      info!("Sent mail {}", mail.subject);
    }
    Ok(())
  }
}

fn spawn_verification<T: MailTransport>(transport: Arc<T>) -> watch::Receiver<VerificationStatus> {
  let (tx, rx) = watch::channel(VerificationStatus::Pending);

  let handle = match tokio::runtime::Handle::try_current() {
    Ok(handle) => handle,
    Err(err) => {
      error!(error = %err, "Cannot verify SMTP configuration outside a Tokio runtime");
      tx.send_replace(VerificationStatus::Failed(err.to_string()));
      return rx;
    }
  };

  handle.spawn(async move {
    let status = match transport.verify().await {
      Ok(true) => {
        info!("Verified SMTP configuration!");
        VerificationStatus::Verified
      }
      Ok(false) => {
        error!("SMTP server rejected the verification connection");
        VerificationStatus::Failed("server rejected the connection".to_string())
      }
      Err(err) => {
        error!(error = %err, "Failed to verify SMTP configuration");
        VerificationStatus::Failed(err.to_string())
      }
    };
    tx.send_replace(status);
  });

  rx
}
