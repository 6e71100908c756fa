//! Minify JavaScript code.
//!
//! This module uses [`oxc`] under the hood.

use oxc::{
    allocator::Allocator,
    ast::ast::Program,
    codegen::{Codegen, CodegenOptions, CommentOptions},
    mangler::MangleOptions,
    minifier::{CompressOptions, Minifier, MinifierOptions},
    parser::Parser,
    span::SourceType,
};
use thiserror::Error;

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum MinifyJsError {
    /// JavaScript syntax error.
    #[error("{0}")]
    Syntax(String),
}

/// Minify a string of JavaScript code.
///
/// The code is parsed as a classic script, so that top-level declarations
/// stay global and keep their names. Code using `import` or `export` is not
/// a valid script and is parsed again as an ES module.
///
/// Unreachable code and unused local bindings are removed, local identifiers
/// are shortened.
pub fn minify_js(input: impl AsRef<str>) -> Result<String, MinifyJsError> {
    let input = input.as_ref();

    let allocator = Allocator::default();

    let mut program = parse(&allocator, input, SourceType::mjs().with_module(false))
        .or_else(|_| parse(&allocator, input, SourceType::mjs()))?;

    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };

    let ret = Minifier::new(options).minify(&allocator, &mut program);

    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;

    Ok(code)
}

/// Parse a program, failing on the first syntax error.
fn parse<'a>(
    allocator: &'a Allocator,
    input: &'a str,
    source_type: SourceType,
) -> Result<Program<'a>, MinifyJsError> {
    let ret = Parser::new(allocator, input, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(MinifyJsError::Syntax(message));
    }

    Ok(ret.program)
}

#[cfg(test)]
mod tests {
    use super::{minify_js, MinifyJsError};

    #[test]
    fn minify() {
        const INPUT: &str = concat!(
            "function foo() {\n",        //
            "  console.log(\"bar\");\n", //
            "}\n"
        );

        let result = minify_js(INPUT).unwrap();

        assert!(result.contains("foo"));
        assert!(result.contains("bar"));
        assert!(result.len() < INPUT.len());
    }

    #[test]
    fn shorten_local_identifiers() {
        const INPUT: &str = concat!(
            "// Greet the user\n",                         //
            "function greet(userName) {\n",                //
            "  const message = \"Hello, \" + userName;\n", //
            "  return message;\n",                         //
            "}\n"
        );

        let result = minify_js(INPUT).unwrap();

        assert!(result.contains("greet"));
        assert!(!result.contains("userName"));
        assert!(!result.contains("Greet the user"));
        assert!(result.len() < INPUT.len());
    }

    #[test]
    fn remove_dead_code() {
        const INPUT: &str = concat!(
            "function main() {\n",                   //
            "  const unusedValue = 42;\n",           //
            "  if (false) {\n",                      //
            "    console.log(\"never\");\n",         //
            "  }\n",                                 //
            "  console.log(\"always\");\n",          //
            "}\n",                                   //
            "main();\n"
        );

        let result = minify_js(INPUT).unwrap();

        assert!(result.contains("always"));
        assert!(!result.contains("never"));
        assert!(!result.contains("unusedValue"));
        assert!(!result.contains("42"));
    }

    #[test]
    fn es_module() {
        const INPUT: &str = concat!(
            "import { format } from \"./format.js\";\n",      //
            "export function greet(userName) {\n",            //
            "  return format(\"Hello, \" + userName);\n",     //
            "}\n"
        );

        let result = minify_js(INPUT).unwrap();

        assert!(result.contains("import"));
        assert!(result.contains("./format.js"));
        assert!(result.contains("export"));
        assert!(result.contains("greet"));
        assert!(!result.contains("userName"));
    }

    #[test]
    fn syntax_error() {
        let result = minify_js("function (");

        assert!(matches!(result, Err(MinifyJsError::Syntax(_))));
    }
}
