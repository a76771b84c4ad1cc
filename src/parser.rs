use crate::ast::*;
use crate::diagnostic::{has_errors, Diagnostic};
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

const MAX_NESTING_DEPTH: u32 = 256;
const MAX_COUNT_EXTENT: u64 = 1 << 16;

pub struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    depth: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Parse a whole file. On success the returned diagnostics are
    /// warnings only (e.g. duplicate clauses); any error fails the parse.
    pub fn parse_file(mut self) -> Result<(File, Vec<Diagnostic>), Vec<Diagnostic>> {
        let mut regions = Vec::new();

        while !self.at(&Lexeme::Eof) {
            if self.at(&Lexeme::Kernels) {
                let start = self.current_span();
                let region = self.parse_region();
                let span = start.merge(self.prev_span());
                regions.push(Spanned::new(region, span));
            } else if self.at(&Lexeme::Count) {
                self.error_with_help(
                    "'count' outside any kernels region",
                    "observation points need an enclosing region; wrap this in `kernels { ... }`",
                );
                self.skip_count();
            } else {
                self.error_with_help(
                    &format!(
                        "expected 'kernels' at top level, found {}",
                        self.peek().description()
                    ),
                    "a directive file is a sequence of `kernels ... { ... }` constructs",
                );
                self.advance();
            }
        }

        if has_errors(&self.diagnostics) {
            return Err(self.diagnostics);
        }
        Ok((File { regions }, self.diagnostics))
    }

    fn parse_region(&mut self) -> Region {
        self.expect(&Lexeme::Kernels);
        let clauses = self.parse_clauses();

        if !self.enter_nesting() {
            return Region {
                clauses,
                body: Vec::new(),
            };
        }

        self.expect(&Lexeme::LBrace);
        let mut body = Vec::new();
        while !self.at(&Lexeme::RBrace) && !self.at(&Lexeme::Eof) {
            let start = self.current_span();
            if self.at(&Lexeme::Kernels) {
                let region = self.parse_region();
                let span = start.merge(self.prev_span());
                body.push(Spanned::new(Node::Region(region), span));
            } else if self.at(&Lexeme::Count) {
                let stmt = self.parse_count();
                let span = start.merge(self.prev_span());
                body.push(Spanned::new(Node::Count(stmt), span));
            } else {
                self.error_at_current(&format!(
                    "expected 'kernels', 'count', or '}}', found {}",
                    self.peek().description()
                ));
                self.advance(); // error recovery
            }
        }
        self.expect(&Lexeme::RBrace);
        self.exit_nesting();

        Region { clauses, body }
    }

    /// Parse zero or more shape clauses after `kernels`.
    fn parse_clauses(&mut self) -> ClauseList {
        let mut clauses = ClauseList::default();

        loop {
            if self.peek().is_clause_name() {
                let name_span = self.current_span();
                let name = self.advance().node.clone();
                let value = self.parse_clause_argument(&name);
                self.record_clause(&mut clauses, &name, value, name_span);
            } else if let Lexeme::Ident(name) = self.peek().clone() {
                // An identifier right before '(' is an unknown clause name
                if self.tokens.get(self.pos + 1).map(|t| &t.node) == Some(&Lexeme::LParen) {
                    self.error_with_help(
                        &format!("unknown clause '{}'", name),
                        "known clauses are num_gangs, num_workers, and vector_length",
                    );
                    self.advance(); // clause name
                    self.parse_clause_argument(&Lexeme::Ident(name));
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        clauses
    }

    /// Parse `( <positive integer> )` after a clause name.
    fn parse_clause_argument(&mut self, name: &Lexeme) -> Option<Spanned<u64>> {
        self.expect(&Lexeme::LParen);
        let span = self.current_span();
        let value = self.expect_integer();
        self.expect(&Lexeme::RParen);

        if value == 0 {
            self.diagnostics.push(
                Diagnostic::error(
                    format!("{} argument must be a positive integer", name.description()),
                    span,
                )
                .with_help("leave the clause off entirely to use the implementation default".to_string()),
            );
            return None;
        }
        Some(Spanned::new(value, span))
    }

    fn record_clause(
        &mut self,
        clauses: &mut ClauseList,
        name: &Lexeme,
        value: Option<Spanned<u64>>,
        name_span: Span,
    ) {
        let slot = match name {
            Lexeme::NumGangs => &mut clauses.num_gangs,
            Lexeme::NumWorkers => &mut clauses.num_workers,
            Lexeme::VectorLength => &mut clauses.vector_length,
            _ => return,
        };
        if slot.is_some() {
            self.diagnostics.push(
                Diagnostic::warning(
                    format!("duplicate {} clause on this directive", name.description()),
                    name_span,
                )
                .with_note("the last value is used".to_string()),
            );
        }
        if value.is_some() {
            *slot = value;
        }
    }

    /// Parse `count N [where i ==|!= j]`.
    fn parse_count(&mut self) -> CountStmt {
        self.expect(&Lexeme::Count);
        let extent_span = self.current_span();
        let extent = self.expect_integer();
        if extent == 0 {
            self.diagnostics.push(
                Diagnostic::error("count extent must be a positive integer".to_string(), extent_span)
                    .with_help("the extent is the trip count of each nested loop".to_string()),
            );
        } else if extent > MAX_COUNT_EXTENT {
            self.diagnostics.push(
                Diagnostic::error(
                    format!("count extent {} exceeds the maximum of {}", extent, MAX_COUNT_EXTENT),
                    extent_span,
                )
                .with_note("evaluation iterates the full extent-squared grid".to_string()),
            );
        }

        let predicate = if self.eat(&Lexeme::Where) {
            self.parse_predicate()
        } else {
            Predicate::Diagonal
        };

        CountStmt { extent, predicate }
    }

    fn parse_predicate(&mut self) -> Predicate {
        let lhs = self.expect_ident();
        if lhs.node != "i" {
            self.error_with_help(
                &format!("expected loop index 'i', found '{}'", lhs.node),
                "predicates compare the two loop indices: `i == j` or `i != j`",
            );
        }

        let predicate = if self.eat(&Lexeme::EqEq) {
            Predicate::Diagonal
        } else if self.eat(&Lexeme::BangEq) {
            Predicate::OffDiagonal
        } else {
            self.error_at_current(&format!(
                "expected '==' or '!=', found {}",
                self.peek().description()
            ));
            Predicate::Diagonal // error recovery
        };

        let rhs = self.expect_ident();
        if rhs.node != "j" {
            self.error_with_help(
                &format!("expected loop index 'j', found '{}'", rhs.node),
                "predicates compare the two loop indices: `i == j` or `i != j`",
            );
        }

        predicate
    }

    /// Skip past a stray `count` statement during recovery.
    fn skip_count(&mut self) {
        self.advance(); // 'count'
        if self.at(&Lexeme::Integer(0)) {
            self.advance();
        }
        if self.eat(&Lexeme::Where) {
            self.try_ident();
            if self.at(&Lexeme::EqEq) || self.at(&Lexeme::BangEq) {
                self.advance();
            }
            self.try_ident();
        }
    }

    fn enter_nesting(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_with_help(
                "nesting depth exceeded (maximum 256 levels)",
                "flatten the region structure; clause resolution only sees the nearest explicit value anyway",
            );
            return false;
        }
        true
    }

    fn exit_nesting(&mut self) {
        self.depth -= 1;
    }

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) -> &Spanned<Lexeme> {
        let tok = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) -> Span {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            span
        } else {
            self.error_at_current(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            ));
            self.current_span()
        }
    }

    fn expect_ident(&mut self) -> Spanned<String> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Spanned::new(name, span)
        } else {
            self.error_at_current(&format!(
                "expected identifier, found {}",
                self.peek().description()
            ));
            Spanned::new("_error_".to_string(), self.current_span())
        }
    }

    fn try_ident(&mut self) -> Option<Spanned<String>> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Some(Spanned::new(name, span))
        } else {
            None
        }
    }

    fn expect_integer(&mut self) -> u64 {
        if let Lexeme::Integer(n) = self.peek() {
            let n = *n;
            self.advance();
            n
        } else {
            self.error_at_current(&format!(
                "expected integer literal, found {}",
                self.peek().description()
            ));
            0
        }
    }

    fn error_at_current(&mut self, msg: &str) {
        self.diagnostics
            .push(Diagnostic::error(msg.to_string(), self.current_span()));
    }

    fn error_with_help(&mut self, msg: &str, help: &str) {
        self.diagnostics.push(
            Diagnostic::error(msg.to_string(), self.current_span()).with_help(help.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> (File, Vec<Diagnostic>) {
        let (tokens, lex_errors) = Lexer::new(source).tokenize();
        assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
        Parser::new(tokens).parse_file().expect("parse should succeed")
    }

    fn parse_err(source: &str) -> Vec<Diagnostic> {
        let (tokens, _) = Lexer::new(source).tokenize();
        Parser::new(tokens)
            .parse_file()
            .err()
            .expect("parse should fail")
    }

    #[test]
    fn test_region_without_clauses() {
        let (file, warnings) = parse("kernels {\n    count 10\n}\n");
        assert!(warnings.is_empty());
        assert_eq!(file.regions.len(), 1);
        let region = &file.regions[0].node;
        assert!(region.clauses.num_gangs.is_none());
        assert!(region.clauses.num_workers.is_none());
        assert!(region.clauses.vector_length.is_none());
        assert_eq!(region.body.len(), 1);
        match &region.body[0].node {
            Node::Count(c) => {
                assert_eq!(c.extent, 10);
                assert_eq!(c.predicate, Predicate::Diagonal);
            }
            other => panic!("expected count, got {:?}", other),
        }
    }

    #[test]
    fn test_all_three_clauses() {
        let (file, _) = parse("kernels num_gangs(2) num_workers(8) vector_length(4) {}\n");
        let clauses = &file.regions[0].node.clauses;
        assert_eq!(clauses.num_gangs.as_ref().map(|v| v.node), Some(2));
        assert_eq!(clauses.num_workers.as_ref().map(|v| v.node), Some(8));
        assert_eq!(clauses.vector_length.as_ref().map(|v| v.node), Some(4));
    }

    #[test]
    fn test_nested_regions() {
        let (file, _) = parse(
            "kernels num_gangs(2) {\n    kernels num_gangs(4) {\n        count 10 where i != j\n    }\n}\n",
        );
        let outer = &file.regions[0].node;
        assert_eq!(outer.clauses.num_gangs.as_ref().map(|v| v.node), Some(2));
        match &outer.body[0].node {
            Node::Region(inner) => {
                assert_eq!(inner.clauses.num_gangs.as_ref().map(|v| v.node), Some(4));
                match &inner.body[0].node {
                    Node::Count(c) => assert_eq!(c.predicate, Predicate::OffDiagonal),
                    other => panic!("expected count, got {:?}", other),
                }
            }
            other => panic!("expected nested region, got {:?}", other),
        }
    }

    #[test]
    fn test_where_clause_diagonal() {
        let (file, _) = parse("kernels {\n    count 10 where i == j\n}\n");
        match &file.regions[0].node.body[0].node {
            Node::Count(c) => assert_eq!(c.predicate, Predicate::Diagonal),
            other => panic!("expected count, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_clause_warns_last_wins() {
        let (file, warnings) = parse("kernels num_gangs(2) num_gangs(4) {}\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("duplicate 'num_gangs' clause"));
        let clauses = &file.regions[0].node.clauses;
        assert_eq!(clauses.num_gangs.as_ref().map(|v| v.node), Some(4));
    }

    #[test]
    fn test_zero_clause_argument_is_error() {
        let diagnostics = parse_err("kernels num_gangs(0) {}\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("must be a positive integer")));
    }

    #[test]
    fn test_unknown_clause_is_error() {
        let diagnostics = parse_err("kernels gangs(2) {}\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("unknown clause 'gangs'")));
        let help = diagnostics.iter().find_map(|d| d.help.as_deref());
        assert_eq!(
            help,
            Some("known clauses are num_gangs, num_workers, and vector_length")
        );
    }

    #[test]
    fn test_count_outside_region_is_error() {
        let diagnostics = parse_err("count 10\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("'count' outside any kernels region")));
    }

    #[test]
    fn test_oversized_extent_is_error() {
        let diagnostics = parse_err("kernels {\n    count 4000000000\n}\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("exceeds the maximum")));
    }

    #[test]
    fn test_zero_extent_is_error() {
        let diagnostics = parse_err("kernels {\n    count 0\n}\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("count extent must be a positive integer")));
    }

    #[test]
    fn test_missing_rparen_is_error() {
        let diagnostics = parse_err("kernels num_gangs(2 {}\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("expected ')'")));
    }

    #[test]
    fn test_bad_predicate_index() {
        let diagnostics = parse_err("kernels {\n    count 10 where k == j\n}\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("expected loop index 'i'")));
    }

    #[test]
    fn test_unterminated_region_is_error() {
        let diagnostics = parse_err("kernels {\n    count 10\n");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("expected '}'")));
    }

    #[test]
    fn test_multiple_top_level_regions() {
        let (file, _) = parse("kernels { count 3 }\nkernels { count 4 }\n");
        assert_eq!(file.regions.len(), 2);
    }
}
