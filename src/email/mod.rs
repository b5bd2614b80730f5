//! Email sending functionality module
//!
//! A thin façade over lettre's pooled SMTP transport with handlebars-rendered
//! HTML templates.

mod service;
mod template;
mod transport;
mod types;

pub use service::Mailer;
pub use template::{get_mail_template, get_mail_template_in, sanitize_html, TemplateRenderer, TEMPLATE_EXTENSION};
pub use transport::{MailTransport, SmtpMailTransport};
pub use types::{MailBody, MailMessage, MailerConfig, SmtpConfig, VerificationStatus};
