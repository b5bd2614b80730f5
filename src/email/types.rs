use std::{env, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::utils::parse_flag;

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
  pub host: String,
  pub port: u16,
  pub username: String,
  pub password: String,
  pub from_email: String,
}

impl Default for SmtpConfig {
  fn default() -> Self {
    SmtpConfig {
      host: "smtp.gmail.com".to_string(),
      port: 587,
      username: "".to_string(),
      password: "".to_string(),
      from_email: "".to_string(),
    }
  }
}

impl SmtpConfig {
  /// Hosts used for local development get a plaintext connection with no STARTTLS attempt.
  pub fn is_local(&self) -> bool {
    self.host == "localhost" || self.host == "mailhog"
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
  pub smtp: SmtpConfig,
  #[serde(default = "default_template_dir")]
  pub template_dir: PathBuf,
  /// Log the subject of every mail that was handed to the transport.
  #[serde(default)]
  pub verbose: bool,
}

fn default_template_dir() -> PathBuf {
  PathBuf::from("./templates")
}

impl Default for MailerConfig {
  fn default() -> Self {
    MailerConfig {
      smtp: SmtpConfig::default(),
      template_dir: default_template_dir(),
      verbose: false,
    }
  }
}

impl MailerConfig {
  /// Load `SMTP_*`, `MAIL_TEMPLATE_DIR` and `MAIL_VERBOSE` from the environment.
  pub fn from_env() -> anyhow::Result<Self> {
    let defaults = SmtpConfig::default();

    let port = match env::var("SMTP_PORT") {
      Ok(port) => port.parse().with_context(|| format!("SMTP_PORT is not a valid port: {}", port))?,
      Err(_) => defaults.port,
    };

    let smtp = SmtpConfig {
      host: env::var("SMTP_HOST").unwrap_or(defaults.host),
      port,
      username: env::var("SMTP_USERNAME").context("SMTP_USERNAME environment variable must be set.")?,
      password: env::var("SMTP_PASSWORD").context("SMTP_PASSWORD environment variable must be set.")?,
      from_email: env::var("SMTP_FROM_EMAIL").context("SMTP_FROM_EMAIL environment variable must be set.")?,
    };

    Ok(MailerConfig {
      smtp,
      template_dir: env::var("MAIL_TEMPLATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_template_dir()),
      verbose: env::var("MAIL_VERBOSE").map(|v| parse_flag(&v)).unwrap_or(false),
    })
  }
}

#[derive(Debug, Clone)]
pub enum MailBody {
  Html(String),
  Template { name: String, context: serde_json::Value },
}

/// One outgoing mail, built per send call and dropped once the transport returns.
#[derive(Debug, Clone)]
pub struct MailMessage {
  pub from: String,
  pub to: String,
  pub subject: String,
  pub text: String,
  pub body: MailBody,
}

impl MailMessage {
  pub fn new(from: String, to: String, subject: String, text: String, body: MailBody) -> Self {
    MailMessage {
      from,
      to,
      subject,
      text,
      body,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
  Pending,
  Verified,
  Failed(String),
}

impl VerificationStatus {
  pub fn is_pending(&self) -> bool {
    matches!(self, VerificationStatus::Pending)
  }

  pub fn is_verified(&self) -> bool {
    matches!(self, VerificationStatus::Verified)
  }
}
