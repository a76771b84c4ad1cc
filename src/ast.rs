use crate::span::Spanned;

/// A parsed `.acc` file: a sequence of top-level parallel-region constructs.
#[derive(Clone, Debug)]
pub struct File {
    pub regions: Vec<Spanned<Region>>,
}

/// A `kernels` construct: its clause list and lexically nested body.
#[derive(Clone, Debug)]
pub struct Region {
    pub clauses: ClauseList,
    pub body: Vec<Spanned<Node>>,
}

/// The clause list attached to one `kernels` directive.
///
/// Absent clauses stay `None`; the resolver turns them into the
/// `Unspecified` sentinel. Spans point at the clause argument so
/// duplicate-clause warnings can label the overridden value.
#[derive(Clone, Debug, Default)]
pub struct ClauseList {
    pub num_gangs: Option<Spanned<u64>>,
    pub num_workers: Option<Spanned<u64>>,
    pub vector_length: Option<Spanned<u64>>,
}

/// A body element: a nested region or an observation point.
#[derive(Clone, Debug)]
pub enum Node {
    Region(Region),
    Count(CountStmt),
}

/// `count N [where <pred>]` — counts predicate matches over an N×N
/// nested loop under the shape in effect at this point.
#[derive(Clone, Debug)]
pub struct CountStmt {
    pub extent: u64,
    pub predicate: Predicate,
}

/// The match predicate over the loop index pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// `i == j`
    Diagonal,
    /// `i != j`
    OffDiagonal,
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Diagonal => write!(f, "i == j"),
            Predicate::OffDiagonal => write!(f, "i != j"),
        }
    }
}
