pub mod email;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use email::{Mailer, MailerConfig, SmtpConfig, VerificationStatus};
pub use utils::error::{MailerError, TemplateError};
