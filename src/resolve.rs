//! Clause resolution for nested parallel-region annotations.
//!
//! Each `kernels` construct carries up to three execution-shape
//! clauses. The shape visible at an observation point is resolved per
//! parameter, innermost region first: the nearest enclosing region
//! that specifies a parameter wins, and a parameter left unspecified
//! everywhere stays `Unspecified` for the runtime to interpret.

use crate::ast::ClauseList;

/// An execution-shape parameter: explicitly specified, or left to the
/// implementation default. A tagged value rather than a magic number,
/// so a legitimate value can never collide with "absent".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClauseValue {
    Specified(u64),
    #[default]
    Unspecified,
}

impl ClauseValue {
    pub fn is_specified(&self) -> bool {
        matches!(self, ClauseValue::Specified(_))
    }

    /// This value if specified, otherwise the fallback.
    pub fn or(self, fallback: ClauseValue) -> ClauseValue {
        match self {
            ClauseValue::Specified(_) => self,
            ClauseValue::Unspecified => fallback,
        }
    }
}

impl std::fmt::Display for ClauseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClauseValue::Specified(n) => write!(f, "{}", n),
            ClauseValue::Unspecified => write!(f, "default"),
        }
    }
}

/// The clause set of one region, fixed at region entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionAnnotation {
    pub num_gangs: ClauseValue,
    pub num_workers: ClauseValue,
    pub vector_length: ClauseValue,
}

impl RegionAnnotation {
    pub fn from_clauses(clauses: &ClauseList) -> Self {
        let lift = |slot: &Option<crate::span::Spanned<u64>>| match slot {
            Some(v) => ClauseValue::Specified(v.node),
            None => ClauseValue::Unspecified,
        };
        Self {
            num_gangs: lift(&clauses.num_gangs),
            num_workers: lift(&clauses.num_workers),
            vector_length: lift(&clauses.vector_length),
        }
    }
}

/// The lexical nesting of regions: outermost first, innermost last.
/// Grows on region entry, shrinks on region exit; owned by a single
/// resolution pass.
#[derive(Clone, Debug, Default)]
pub struct RegionStack {
    frames: Vec<RegionAnnotation>,
}

impl RegionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: RegionAnnotation) {
        self.frames.push(annotation);
    }

    pub fn pop(&mut self) -> Option<RegionAnnotation> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// The resolved shape triple visible at one point in the nesting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectiveShape {
    pub num_gangs: ClauseValue,
    pub num_workers: ClauseValue,
    pub vector_length: ClauseValue,
}

impl std::fmt::Display for EffectiveShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gangs={} workers={} vector={}",
            self.num_gangs, self.num_workers, self.vector_length
        )
    }
}

/// Resolve the shape visible to the innermost region.
///
/// Each parameter is searched independently from innermost to
/// outermost, so one parameter may be inherited from a different
/// ancestor than another. Pure over the stack snapshot; cannot fail.
pub fn resolve(stack: &RegionStack) -> EffectiveShape {
    let mut shape = EffectiveShape::default();
    for frame in stack.frames.iter().rev() {
        shape.num_gangs = shape.num_gangs.or(frame.num_gangs);
        shape.num_workers = shape.num_workers.or(frame.num_workers);
        shape.vector_length = shape.vector_length.or(frame.vector_length);
    }
    shape
}
