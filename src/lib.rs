pub mod ast;
pub mod diagnostic;
pub mod exec;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod span;

use diagnostic::{render_diagnostics, Diagnostic};
use lexer::Lexer;
use parser::Parser;

/// Parse directive source, rendering any diagnostics to stderr.
/// Warnings do not fail the parse.
pub fn parse_source(source: &str, filename: &str) -> Result<ast::File, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        render_diagnostics(&lex_errors, filename, source);
        return Err(lex_errors);
    }

    match Parser::new(tokens).parse_file() {
        Ok((file, warnings)) => {
            render_diagnostics(&warnings, filename, source);
            Ok(file)
        }
        Err(errors) => {
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

/// Parse directive source without rendering anything.
pub fn parse_source_silent(source: &str) -> Result<ast::File, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    Parser::new(tokens).parse_file().map(|(file, _)| file)
}

/// Parse and evaluate directive source in one step.
pub fn evaluate_source(source: &str) -> Result<Vec<exec::CountResult>, Vec<Diagnostic>> {
    let file = parse_source_silent(source)?;
    Ok(exec::evaluate_file(&file))
}
