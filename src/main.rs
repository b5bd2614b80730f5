use std::env;

use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use mailer::utils::init_mailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let mailer = init_mailer()?;

  let status = mailer.wait_for_verification().await;
  println!("SMTP verification: {:?}", status);

  let args: Vec<String> = env::args().skip(1).collect();
  let (recipient, subject, template) = match args.as_slice() {
    [recipient, subject, template, ..] => (recipient, subject, template),
    [] => return Ok(()),
    _ => anyhow::bail!("usage: mailer <recipient> <subject> <template> [json-context]"),
  };

  let context: serde_json::Value = match args.get(3) {
    Some(raw) => serde_json::from_str(raw).context("context must be a JSON object")?,
    None => serde_json::json!({}),
  };

  mailer
    .send_mail(recipient, subject, subject, template, &context)
    .await
    .with_context(|| format!("Failed to send {} to {}", template, recipient))?;

  println!("Sent {} to {}", template, recipient);
  Ok(())
}
