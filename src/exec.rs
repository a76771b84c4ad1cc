//! Evaluation of observation points under the resolved shape.
//!
//! Walks the region tree with an explicit `RegionStack` (push on
//! region entry, pop on exit), resolves the effective shape at each
//! `count` site, and computes the match count under the reference
//! grouping model.
//!
//! The grouping model is the implementation-defined part. Rules:
//!
//! - workers only distribute rows; they never change which
//!   iterations observe a match;
//! - an effective gang count greater than 1 schedules rows across
//!   gangs so that an iteration `(i, j)` is observed as a match when
//!   the column is owned at-or-before the row: `j < i`, with the tie
//!   `j == i` matching only under an equality predicate;
//! - an effective vector length greater than the loop extent masks
//!   the trailing lane of each loop and coalesces the remaining lane
//!   pairs into matches;
//! - the gang rule takes precedence when both trigger;
//! - with neither triggered the predicate is evaluated literally.

use crate::ast::{File, Node, Predicate, Region};
use crate::resolve::{resolve, ClauseValue, EffectiveShape, RegionAnnotation, RegionStack};
use crate::span::Span;

/// The outcome at one `count` site.
#[derive(Clone, Debug)]
pub struct CountResult {
    pub span: Span,
    pub extent: u64,
    pub predicate: Predicate,
    pub shape: EffectiveShape,
    pub matches: u64,
}

/// Evaluate every observation point in the file, in source order.
pub fn evaluate_file(file: &File) -> Vec<CountResult> {
    let mut stack = RegionStack::new();
    let mut results = Vec::new();
    for region in &file.regions {
        evaluate_region(&region.node, &mut stack, &mut results);
    }
    debug_assert!(stack.is_empty());
    results
}

fn evaluate_region(region: &Region, stack: &mut RegionStack, results: &mut Vec<CountResult>) {
    stack.push(RegionAnnotation::from_clauses(&region.clauses));
    for node in &region.body {
        match &node.node {
            Node::Region(inner) => evaluate_region(inner, stack, results),
            Node::Count(stmt) => {
                let shape = resolve(stack);
                results.push(CountResult {
                    span: node.span,
                    extent: stmt.extent,
                    predicate: stmt.predicate,
                    shape,
                    matches: match_count(&shape, stmt.extent, stmt.predicate),
                });
            }
        }
    }
    stack.pop();
}

/// Count observed matches of `predicate` over an `extent`×`extent`
/// nested loop executed under `shape`.
pub fn match_count(shape: &EffectiveShape, extent: u64, predicate: Predicate) -> u64 {
    let mut matches = 0;
    for i in 0..extent {
        for j in 0..extent {
            if observes_match(shape, extent, predicate, i, j) {
                matches += 1;
            }
        }
    }
    matches
}

/// Whether iteration `(i, j)` observes a match under the grouping model.
fn observes_match(shape: &EffectiveShape, extent: u64, predicate: Predicate, i: u64, j: u64) -> bool {
    if gang_scheduled(shape) {
        // Column owned strictly before the row always matches; the
        // tie matches only for the equality predicate.
        return j < i || (j == i && predicate == Predicate::Diagonal);
    }

    if oversized_vector(shape, extent) {
        // Trailing lane of each loop is masked; surviving lane pairs
        // coalesce to matches.
        return i + 1 < extent && j + 1 < extent;
    }

    match predicate {
        Predicate::Diagonal => i == j,
        Predicate::OffDiagonal => i != j,
    }
}

fn gang_scheduled(shape: &EffectiveShape) -> bool {
    matches!(shape.num_gangs, ClauseValue::Specified(g) if g > 1)
}

fn oversized_vector(shape: &EffectiveShape, extent: u64) -> bool {
    matches!(shape.vector_length, ClauseValue::Specified(v) if v > extent)
}
