pub mod ast;
pub mod cursor;
pub mod diagnostic;
pub mod emit;
pub mod parser;
pub mod rules;
pub mod span;

use diagnostic::{render_diagnostics, Diagnostic};
use emit::Emitter;
use parser::Parser;

/// Parse a source file into a forest, rendering diagnostics to stderr
/// on failure.
pub fn parse_source(source: &str, filename: &str) -> Result<Vec<ast::Node>, Vec<Diagnostic>> {
    match Parser::new(source).parse_forest() {
        Ok(forest) => Ok(forest),
        Err(errors) => {
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

/// Parse and transpile a source file to C output lines, rendering
/// diagnostics to stderr on failure. No lines are produced when any
/// error occurred.
pub fn transpile_source(source: &str, filename: &str) -> Result<Vec<String>, Vec<Diagnostic>> {
    let forest = match Parser::new(source).parse_forest() {
        Ok(forest) => forest,
        Err(errors) => {
            render_diagnostics(&errors, filename, source);
            return Err(errors);
        }
    };

    match Emitter::new().emit_forest(&forest) {
        Ok(lines) => Ok(lines),
        Err(error) => {
            let errors = vec![error];
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

/// Like [`transpile_source`] but without rendering; used by tests and
/// embedding callers that handle diagnostics themselves.
pub fn transpile_source_silent(source: &str) -> Result<Vec<String>, Vec<Diagnostic>> {
    let forest = Parser::new(source).parse_forest()?;
    Emitter::new().emit_forest(&forest).map_err(|e| vec![e])
}
