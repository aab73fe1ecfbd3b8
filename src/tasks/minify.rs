// src/tasks/minify.rs

//! Minifiers for bundled assets, chosen by the bundle's file extension.

use std::path::Path;

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::errors::PipelineError;

/// How a bundle is post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Stylesheet,
    /// Anything else passes through untouched.
    Other,
}

impl AssetKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("js") => AssetKind::Script,
            Some(ext) if ext.eq_ignore_ascii_case("css") => AssetKind::Stylesheet,
            _ => AssetKind::Other,
        }
    }
}

/// Minify `source` according to the extension of `path`.
pub fn minify_asset(path: &Path, source: &str) -> Result<String, PipelineError> {
    let result = match AssetKind::from_path(path) {
        AssetKind::Script => minify_js(source),
        AssetKind::Stylesheet => minify_css(source),
        AssetKind::Other => Ok(source.to_string()),
    };
    result.map_err(|message| PipelineError::Minify {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse, compress and print a classic script.
pub fn minify_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

    if parsed.panicked || !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        if messages.is_empty() {
            return Err("parser aborted".to_string());
        }
        return Err(messages.join("; "));
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).build(&allocator, &mut program);

    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Parse, optimise and print a stylesheet.
pub fn minify_css(source: &str) -> Result<String, String> {
    let mut sheet = StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| e.to_string())?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(printed.code)
}
