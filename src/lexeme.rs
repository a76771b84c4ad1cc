/// All lexemes in the directive language.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    // Keywords
    Kernels,
    Count,
    Where,

    // Clause names
    NumGangs,
    NumWorkers,
    VectorLength,

    // Symbols
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    EqEq,   // ==
    BangEq, // !=

    // Literals
    Integer(u64),
    Ident(String),

    // End of file
    Eof,
}

impl Lexeme {
    /// Try to match an identifier string to a keyword or clause-name lexeme.
    pub fn from_keyword(s: &str) -> Option<Lexeme> {
        match s {
            "kernels" => Some(Lexeme::Kernels),
            "count" => Some(Lexeme::Count),
            "where" => Some(Lexeme::Where),
            "num_gangs" => Some(Lexeme::NumGangs),
            "num_workers" => Some(Lexeme::NumWorkers),
            "vector_length" => Some(Lexeme::VectorLength),
            _ => None,
        }
    }

    /// True for the three execution-shape clause names.
    pub fn is_clause_name(&self) -> bool {
        matches!(
            self,
            Lexeme::NumGangs | Lexeme::NumWorkers | Lexeme::VectorLength
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Lexeme::Kernels => "'kernels'",
            Lexeme::Count => "'count'",
            Lexeme::Where => "'where'",
            Lexeme::NumGangs => "'num_gangs'",
            Lexeme::NumWorkers => "'num_workers'",
            Lexeme::VectorLength => "'vector_length'",
            Lexeme::LParen => "'('",
            Lexeme::RParen => "')'",
            Lexeme::LBrace => "'{'",
            Lexeme::RBrace => "'}'",
            Lexeme::EqEq => "'=='",
            Lexeme::BangEq => "'!='",
            Lexeme::Integer(_) => "integer literal",
            Lexeme::Ident(_) => "identifier",
            Lexeme::Eof => "end of file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip() {
        assert_eq!(Lexeme::from_keyword("kernels"), Some(Lexeme::Kernels));
        assert_eq!(Lexeme::from_keyword("count"), Some(Lexeme::Count));
        assert_eq!(Lexeme::from_keyword("where"), Some(Lexeme::Where));
        assert_eq!(Lexeme::from_keyword("num_gangs"), Some(Lexeme::NumGangs));
        assert_eq!(Lexeme::from_keyword("num_workers"), Some(Lexeme::NumWorkers));
        assert_eq!(
            Lexeme::from_keyword("vector_length"),
            Some(Lexeme::VectorLength)
        );
        assert_eq!(Lexeme::from_keyword("gang"), None);
    }

    #[test]
    fn test_clause_name_predicate() {
        assert!(Lexeme::NumGangs.is_clause_name());
        assert!(Lexeme::NumWorkers.is_clause_name());
        assert!(Lexeme::VectorLength.is_clause_name());
        assert!(!Lexeme::Kernels.is_clause_name());
        assert!(!Lexeme::Ident("num_gang".to_string()).is_clause_name());
    }
}
