use std::{
  io,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use handlebars::Handlebars;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::utils::error::TemplateError;

pub const TEMPLATE_EXTENSION: &str = "html";

/// Renders `<dir>/<name>.html` handlebars templates. Files are read and
/// compiled on every render; values are HTML-escaped.
pub struct TemplateRenderer {
  dir: PathBuf,
  handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    TemplateRenderer {
      dir: dir.into(),
      handlebars: Handlebars::new(),
    }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub async fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String, TemplateError> {
    let file_name = format!("{}.{}", name, TEMPLATE_EXTENSION);
    let source = tokio::fs::read_to_string(self.dir.join(&file_name)).await?;

    let html = self.handlebars.render_template(&source, context)?;
    Ok(html)
  }
}

// Matches a whole tag, skipping over `>` inside quoted attribute values.
const TAG_BODY: &str = r#"(?:[^>"']|"[^"]*"|'[^']*')*"#;

static NON_TEXT_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
  let pattern = ["script", "style", "textarea", "option", "noscript"]
    .iter()
    .map(|tag| format!(r"<{tag}\b{body}>.*?</{tag}\s*>", tag = tag, body = TAG_BODY))
    .collect::<Vec<_>>()
    .join("|");
  Regex::new(&format!("(?is){}", pattern)).unwrap()
});

static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!(r"</?[a-zA-Z!]{}>", TAG_BODY)).unwrap());

static AMPERSANDS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[a-zA-Z][a-zA-Z0-9]*;)?").unwrap());

/// Strip every tag and attribute from `value`, leaving escaped text only.
///
/// Contents of script-like elements are dropped along with the tags. Existing
/// entities are kept, stray `&`, `<`, `>` and `"` are escaped.
pub fn sanitize_html(value: &str) -> String {
  let text = NON_TEXT_ELEMENTS.replace_all(value, "");
  let text = COMMENTS.replace_all(&text, "");
  let text = TAGS.replace_all(&text, "");
  let text = AMPERSANDS.replace_all(&text, |caps: &Captures| match caps.get(1) {
    Some(_) => caps[0].to_string(),
    None => "&amp;".to_string(),
  });

  text.replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Directory holding the templates used by [`get_mail_template`].
///
/// Resolved from `CARGO_MANIFEST_DIR` at compile time, so it only exists on the
/// machine that built the crate. Deployed binaries should call
/// [`get_mail_template_in`] with a runtime directory instead.
pub fn bundled_template_dir() -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR")).join("src/email/templates")
}

/// Read `templates/<template>.html` next to this module and substitute `${token}` placeholders.
pub fn get_mail_template(replace: &[(&str, &str)], template: &str) -> io::Result<String> {
  get_mail_template_in(bundled_template_dir(), replace, template)
}

/// Same as [`get_mail_template`] against an explicit directory.
///
/// Every occurrence of `${token}` is replaced by the sanitized value. Tokens
/// match literally.
pub fn get_mail_template_in(dir: impl AsRef<Path>, replace: &[(&str, &str)], template: &str) -> io::Result<String> {
  let path = dir.as_ref().join(format!("{}.{}", template, TEMPLATE_EXTENSION));
  let mut content = std::fs::read_to_string(path)?;

  for (token, value) in replace {
    let placeholder = format!("${{{}}}", token);
    content = content.replace(&placeholder, &sanitize_html(value));
  }

  Ok(content)
}
