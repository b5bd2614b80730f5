use async_trait::async_trait;
use lettre::{
  transport::smtp::{
    authentication::Credentials,
    client::{Tls, TlsParameters},
    PoolConfig,
  },
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::warn;

use crate::email::types::SmtpConfig;

/// Delivery backend shared by every send of a `Mailer`.
///
/// Implementations are expected to handle their own pooling; the mailer calls
/// `send` concurrently without any locking.
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  async fn send(&self, message: Message) -> Result<(), Self::Error>;

  /// Open a connection and check the server accepts it.
  async fn verify(&self) -> Result<bool, Self::Error>;
}

pub struct SmtpMailTransport {
  inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
  pub fn new(smtp_config: &SmtpConfig) -> Self {
    let creds = Credentials::new(smtp_config.username.clone(), smtp_config.password.clone());

    // Plaintext at connect; upgrade with STARTTLS when the server offers it.
    let tls = if smtp_config.is_local() {
      Tls::None
    } else {
      match TlsParameters::new(smtp_config.host.clone()) {
        Ok(params) => Tls::Opportunistic(params),
        Err(err) => {
          warn!(host = %smtp_config.host, error = %err, "Failed to build TLS parameters, falling back to plaintext");
          Tls::None
        }
      }
    };

    let inner = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp_config.host)
      .port(smtp_config.port)
      .credentials(creds)
      .tls(tls)
      .pool_config(PoolConfig::new())
      .build();

    SmtpMailTransport { inner }
  }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
  type Error = lettre::transport::smtp::Error;

  async fn send(&self, message: Message) -> Result<(), Self::Error> {
    self.inner.send(message).await.map(|_| ())
  }

  async fn verify(&self) -> Result<bool, Self::Error> {
    self.inner.test_connection().await
  }
}
