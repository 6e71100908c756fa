//! Minify HTML code.
//!
//! This module uses [`minify_html`] and [`lol_html`] under the hood.

use std::string::FromUtf8Error;

use minify_html::{minify, Cfg};
use thiserror::Error;
use tracing::warn;

use crate::build::{minify_css::minify_css, minify_js::minify_js};

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum MinifyHtmlError {
    /// Error converting a string in UTF-8.
    #[error(transparent)]
    FromUtf8(#[from] FromUtf8Error),
}

/// HTML minifier.
///
/// Whitespace is collapsed conservatively and comments are removed.
/// Malformed markup is minified on a best-effort basis.
pub struct HtmlMinifier {
    /// Configuration.
    cfg: Cfg,
}

impl HtmlMinifier {
    /// Create a HTML minifier.
    pub fn new() -> Self {
        Self {
            cfg: Cfg {
                keep_comments: false,
                ..Cfg::spec_compliant()
            },
        }
    }

    /// Minify a HTML string, including inline CSS and JavaScript code.
    ///
    /// Inline code that fails to minify is kept as is. The `name` is only
    /// used in log messages.
    pub fn minify(&self, input: impl AsRef<str>, name: &str) -> Result<String, MinifyHtmlError> {
        let output = self.minify_html_only(input)?;

        match minify_inline(&output, name) {
            Ok(result) => Ok(result),
            Err(error) => {
                warn!("In {name:?}, skipping inline code minification: {error}");
                Ok(output)
            },
        }
    }

    /// Minify a HTML string, excluding inline CSS and JavaScript code.
    pub fn minify_html_only(&self, input: impl AsRef<str>) -> Result<String, MinifyHtmlError> {
        let input = input.as_ref();
        let output = minify(input.as_bytes(), &self.cfg);
        Ok(String::from_utf8(output)?)
    }
}

impl Default for HtmlMinifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Minify inline CSS and JavaScript in a HTML code.
///
/// This function minifies code inside `<script>` and `<style>` elements, as
/// well as `style` attributes. The rest of the HTML code is not minified.
/// Code that does not parse (e.g. a JSON `<script>`) is left untouched.
pub fn minify_inline(
    input: impl AsRef<str>,
    name: &str,
) -> Result<String, lol_html::errors::RewritingError> {
    let input = input.as_ref();
    let mut script_buffer = String::new();
    let mut style_buffer = String::new();

    lol_html::rewrite_str(
        input,
        lol_html::RewriteStrSettings {
            element_content_handlers: vec![
                lol_html::text!("script", |element| {
                    // Minify `<script>` elements
                    script_buffer.push_str(element.as_str());

                    if element.last_in_text_node() {
                        let content = minify_js(&script_buffer).unwrap_or_else(|error| {
                            warn!("In {name:?}, keeping `<script>` as is: {error}");
                            script_buffer.clone()
                        });

                        element.set_str(content);
                        script_buffer.clear();
                    } else {
                        element.remove();
                    }

                    Ok(())
                }),
                lol_html::text!("style", |element| {
                    // Minify `<style>` elements
                    style_buffer.push_str(element.as_str());

                    if element.last_in_text_node() {
                        let content = minify_css(&style_buffer, name).unwrap_or_else(|error| {
                            warn!("In {name:?}, keeping `<style>` as is: {error}");
                            style_buffer.clone()
                        });

                        element.set_str(content);
                        style_buffer.clear();
                    } else {
                        element.remove();
                    }

                    Ok(())
                }),
                lol_html::element!("*[style]", |element| {
                    // Minify `style` attributes
                    let Some(content) = element.get_attribute("style") else {
                        return Ok(());
                    };

                    const PREFIX: &str = "_{";
                    const SUFFIX: &str = "}";

                    // Wrap CSS rules in a fake selector to make a valid CSS stylesheet
                    let wrapped = format!("{PREFIX}{content}{SUFFIX}");

                    let minified = minify_css(wrapped, name)
                        .ok()
                        .and_then(|result| {
                            result
                                .strip_prefix(PREFIX)
                                .and_then(|result| result.strip_suffix(SUFFIX))
                                .map(str::to_string)
                        });

                    if let Some(minified) = minified {
                        element.set_attribute("style", &minified)?;
                    }

                    Ok(())
                }),
            ],
            ..lol_html::RewriteStrSettings::default()
        },
    )
}
