use crate::email::{Mailer, MailerConfig};

pub mod error;

/// `true`, `1`, `yes` and `on` (any case) enable a flag; everything else disables it.
pub fn parse_flag(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

pub fn init_mailer() -> anyhow::Result<Mailer> {
  let config = MailerConfig::from_env()?;
  tracing::info!(
    host = %config.smtp.host,
    port = config.smtp.port,
    template_dir = %config.template_dir.display(),
    "Configuring mailer"
  );

  Ok(Mailer::new(config))
}
