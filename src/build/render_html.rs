//! Render HTML templates.
//!
//! This module uses [`minijinja`] under the hood.

use std::path::{Component, Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind};
use serde::Serialize;
use thiserror::Error;

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum RenderHtmlError {
    /// Minijinja error.
    #[error(transparent)]
    Minijinja(#[from] minijinja::Error),
}

/// HTML template renderer.
///
/// Templates are loaded from a root directory and referenced by their
/// `/`-separated path relative to it, so that a page can `include`, `import`
/// or `extend` any other file of the site. Interpolated values are
/// HTML-escaped.
///
/// Pages are rendered from their source and are not kept in the
/// environment; only the templates they reference are loaded and cached.
#[derive(Debug)]
pub struct HtmlRenderer {
    /// Minijinja environment.
    env: Environment<'static>,
}

impl HtmlRenderer {
    /// Create a renderer loading templates from `root_dir`.
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        let root_dir = root_dir.as_ref().to_path_buf();

        let mut env = Environment::new();

        env.set_loader(move |name| load_template(&root_dir, name));
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_keep_trailing_newline(true);

        Self { env }
    }

    /// Render the template `source` named `name` with the given context.
    pub fn render(
        &self,
        name: &str,
        source: &str,
        context: impl Serialize,
    ) -> Result<String, RenderHtmlError> {
        Ok(self.env.render_named_str(name, source, context)?)
    }
}

/// Read the template `name` from `root_dir`.
///
/// Hidden files and directories are allowed. Names with empty, `.`, `..` or
/// absolute segments are not found.
fn load_template(root_dir: &Path, name: &str) -> Result<Option<String>, minijinja::Error> {
    let Some(path) = template_path(root_dir, name) else {
        return Ok(None);
    };

    match std::fs::read_to_string(path) {
        Ok(source) => Ok(Some(source)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template {name:?}"),
        )
        .with_source(error)),
    }
}

/// Join a `/`-separated template name to `root_dir`.
fn template_path(root_dir: &Path, name: &str) -> Option<PathBuf> {
    let mut path = root_dir.to_path_buf();

    for segment in name.split('/') {
        let mut components = Path::new(segment).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(segment)), None) => path.push(segment),
            _ => return None,
        }
    }

    Some(path)
}
