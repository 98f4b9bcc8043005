//! Beam search: position-by-position frontier expansion with top-K pruning.

use std::time::Instant;

use super::{Error, Optimized, PartialSolution, SearchContext, SearchParams};

pub(super) fn run(
    context: &mut SearchContext<'_>,
    params: &SearchParams,
    started: Instant,
) -> Result<Optimized, Error> {
    let mut beam = vec![PartialSolution::root()];

    for pos in 0..context.len() {
        let mut next = Vec::with_capacity(beam.len() * 4);
        for parent in &beam {
            for &codon_index in context.candidates_at(pos) {
                if let Some(solution) = context.try_extend(parent, pos, codon_index) {
                    next.push(solution);
                }
            }
        }
        if next.is_empty() {
            return Err(Error::OverConstrained { position: pos });
        }
        // Stable sort: equal scores keep enumeration order.
        next.sort_by(|a, b| b.score.cmp(&a.score));
        next.truncate(params.beam_width);
        beam = next;
    }

    let winner = beam.into_iter().next().expect("beam is non-empty");
    context.finish(winner, started)
}
