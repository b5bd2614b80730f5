use std::{
  collections::HashMap,
  fmt,
  path::Path,
  sync::{Arc, Mutex},
  time::Duration,
};

use async_trait::async_trait;
use lettre::Message;

use crate::email::{MailTransport, MailerConfig, SmtpConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError {
  pub code: u16,
  pub message: String,
}

impl MockError {
  pub fn new(code: u16, message: &str) -> Self {
    MockError {
      code,
      message: message.to_string(),
    }
  }
}

impl fmt::Display for MockError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "mock error {}: {}", self.code, self.message)
  }
}

impl std::error::Error for MockError {}

/// In-memory transport recording every delivered message.
#[derive(Clone, Default)]
pub struct MockTransport {
  sent: Arc<Mutex<Vec<Message>>>,
  failures: Arc<Mutex<HashMap<String, MockError>>>,
  verify: Arc<Mutex<Option<Result<bool, MockError>>>>,
  delay: Option<Duration>,
}

impl MockTransport {
  pub fn new() -> Self {
    MockTransport::default()
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn with_verify_result(self, accepted: bool) -> Self {
    *self.verify.lock().unwrap() = Some(Ok(accepted));
    self
  }

  pub fn with_verify_error(self, err: MockError) -> Self {
    *self.verify.lock().unwrap() = Some(Err(err));
    self
  }

  /// Reject every message addressed to `recipient` with `err`.
  pub fn fail_for(&self, recipient: &str, err: MockError) {
    self.failures.lock().unwrap().insert(recipient.to_string(), err);
  }

  pub fn sent(&self) -> Vec<Message> {
    self.sent.lock().unwrap().clone()
  }
}

#[async_trait]
impl MailTransport for MockTransport {
  type Error = MockError;

  async fn send(&self, message: Message) -> Result<(), Self::Error> {
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    let failure = {
      let failures = self.failures.lock().unwrap();
      message
        .envelope()
        .to()
        .iter()
        .find_map(|address| failures.get(&address.to_string()).cloned())
    };
    if let Some(err) = failure {
      return Err(err);
    }

    self.sent.lock().unwrap().push(message);
    Ok(())
  }

  async fn verify(&self) -> Result<bool, Self::Error> {
    self.verify.lock().unwrap().clone().unwrap_or(Ok(true))
  }
}

pub fn fixture_template_dir() -> std::path::PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/templates")
}

pub fn mock_config() -> MailerConfig {
  MailerConfig {
    smtp: SmtpConfig {
      host: "localhost".to_string(),
      port: 1025,
      username: "test_user".to_string(),
      password: "test_password".to_string(),
      from_email: "noreply@example.com".to_string(),
    },
    template_dir: fixture_template_dir(),
    verbose: true,
  }
}
