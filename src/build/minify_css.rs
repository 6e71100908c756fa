//! Minify CSS code.
//!
//! This module uses [`lightningcss`] under the hood.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use thiserror::Error;

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum MinifyCssError {
    /// Minifier error.
    #[error("{0}")]
    Minify(String),
    /// Parser error.
    #[error("{0}")]
    Parser(String),
    /// Printer error.
    #[error("{0}")]
    Printer(String),
}

/// Minify a CSS string.
///
/// The `filename` only appears in error locations. URLs are left untouched
/// and no source map is produced.
pub fn minify_css(
    input: impl AsRef<str>,
    filename: impl Into<String>,
) -> Result<String, MinifyCssError> {
    let input = input.as_ref();

    let parser_options = ParserOptions {
        filename: filename.into(),
        ..Default::default()
    };

    let mut style_sheet = StyleSheet::parse(input, parser_options)
        .map_err(|source| MinifyCssError::Parser(source.to_string()))?;

    style_sheet
        .minify(MinifyOptions::default())
        .map_err(|source| MinifyCssError::Minify(source.to_string()))?;

    let printer_options = PrinterOptions {
        minify: true,
        ..Default::default()
    };

    let result = style_sheet
        .to_css(printer_options)
        .map_err(|source| MinifyCssError::Printer(source.to_string()))?;

    Ok(result.code)
}
