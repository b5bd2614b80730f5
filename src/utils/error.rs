use std::{error::Error, fmt};

use lettre::address::AddressError;

#[derive(Debug)]
pub enum TemplateError {
  Io(std::io::Error),
  Context(serde_json::Error),
  Render(handlebars::RenderError),
}

impl Error for TemplateError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      TemplateError::Io(err) => Some(err),
      TemplateError::Context(err) => Some(err),
      TemplateError::Render(err) => Some(err),
    }
  }
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TemplateError::Io(err) => write!(f, "Template Read Error: {}", err),
      TemplateError::Context(err) => write!(f, "Template Context Error: {}", err),
      TemplateError::Render(err) => write!(f, "Template Render Error: {}", err),
    }
  }
}

impl From<std::io::Error> for TemplateError {
  fn from(err: std::io::Error) -> Self {
    TemplateError::Io(err)
  }
}

impl From<serde_json::Error> for TemplateError {
  fn from(err: serde_json::Error) -> Self {
    TemplateError::Context(err)
  }
}

impl From<handlebars::RenderError> for TemplateError {
  fn from(err: handlebars::RenderError) -> Self {
    TemplateError::Render(err)
  }
}

/// Failure of a send call. `E` is the transport's own error type, handed back untouched.
#[derive(Debug)]
pub enum MailerError<E> {
  Address(AddressError),
  Message(lettre::error::Error),
  Template(TemplateError),
  Transport(E),
}

impl<E> MailerError<E> {
  pub fn transport(&self) -> Option<&E> {
    match self {
      MailerError::Transport(err) => Some(err),
      _ => None,
    }
  }

  pub fn into_transport(self) -> Option<E> {
    match self {
      MailerError::Transport(err) => Some(err),
      _ => None,
    }
  }
}

impl<E: Error + 'static> Error for MailerError<E> {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      MailerError::Address(err) => Some(err),
      MailerError::Message(err) => Some(err),
      MailerError::Template(err) => Some(err),
      MailerError::Transport(err) => Some(err),
    }
  }
}

impl<E: fmt::Display> fmt::Display for MailerError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MailerError::Address(err) => write!(f, "Invalid Address: {}", err),
      MailerError::Message(err) => write!(f, "Invalid Message: {}", err),
      MailerError::Template(err) => write!(f, "{}", err),
      MailerError::Transport(err) => write!(f, "Transport Error: {}", err),
    }
  }
}

impl<E> From<AddressError> for MailerError<E> {
  fn from(err: AddressError) -> Self {
    MailerError::Address(err)
  }
}

impl<E> From<lettre::error::Error> for MailerError<E> {
  fn from(err: lettre::error::Error) -> Self {
    MailerError::Message(err)
  }
}

impl<E> From<TemplateError> for MailerError<E> {
  fn from(err: TemplateError) -> Self {
    MailerError::Template(err)
  }
}
