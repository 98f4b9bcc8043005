//! DP optimizer: partial solutions bucketed by their last two codons.
//!
//! The 12-bit state key `(prev_codon << 6) | cur_codon` captures everything a
//! future 9-mer window can see of a prefix, so many distinct prefixes survive
//! behind the same tail without competing against each other.  Pruning happens
//! in two stages: within each bucket (keep the best `paths_per_state`) and
//! globally over buckets (keep the `beam_width` buckets with the best leader).

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use super::{Error, Optimized, PartialSolution, SearchContext, SearchParams};

type StateKey = u16;

#[inline]
fn state_key(prev: u8, cur: u8) -> StateKey {
    (StateKey::from(prev) << 6) | StateKey::from(cur)
}

pub(super) fn run(
    context: &mut SearchContext<'_>,
    params: &SearchParams,
    started: Instant,
) -> Result<Optimized, Error> {
    // Seed with every admissible first codon, then every admissible pair.
    let root = PartialSolution::root();
    let mut firsts = Vec::new();
    for &first_codon in context.candidates_at(0) {
        if let Some(solution) = context.try_extend(&root, 0, first_codon) {
            firsts.push((first_codon, solution));
        }
    }
    if firsts.is_empty() {
        return Err(Error::OverConstrained { position: 0 });
    }

    let mut buckets: BTreeMap<StateKey, Vec<PartialSolution>> = BTreeMap::new();
    for (first_codon, prefix) in &firsts {
        for &second_codon in context.candidates_at(1) {
            if let Some(solution) = context.try_extend(prefix, 1, second_codon) {
                buckets
                    .entry(state_key(*first_codon, second_codon))
                    .or_default()
                    .push(solution);
            }
        }
    }
    if buckets.is_empty() {
        return Err(Error::OverConstrained { position: 1 });
    }
    prune(&mut buckets, params);

    for pos in 2..context.len() {
        let mut next: BTreeMap<StateKey, Vec<PartialSolution>> = BTreeMap::new();
        for (&key, parents) in &buckets {
            let cur = (key & 0x3f) as u8;
            for parent in parents {
                for &codon_index in context.candidates_at(pos) {
                    if let Some(solution) = context.try_extend(parent, pos, codon_index) {
                        next.entry(state_key(cur, codon_index))
                            .or_default()
                            .push(solution);
                    }
                }
            }
        }
        if next.is_empty() {
            return Err(Error::OverConstrained { position: pos });
        }
        prune(&mut next, params);
        buckets = next;
    }

    let mut winner: Option<PartialSolution> = None;
    for solution in buckets.into_values().flatten() {
        let better = match &winner {
            Some(best) => solution.score > best.score,
            None => true,
        };
        if better {
            winner = Some(solution);
        }
    }
    context.finish(winner.expect("buckets are non-empty"), started)
}

fn prune(buckets: &mut BTreeMap<StateKey, Vec<PartialSolution>>, params: &SearchParams) {
    for paths in buckets.values_mut() {
        // Stable sort: equal scores keep enumeration order.
        paths.sort_by(|a, b| b.score.cmp(&a.score));
        paths.truncate(params.paths_per_state);
    }

    if buckets.len() > params.beam_width {
        let mut ranked: Vec<(i64, StateKey)> = buckets
            .iter()
            .map(|(&key, paths)| (paths[0].score, key))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.truncate(params.beam_width);
        let keep: BTreeSet<StateKey> = ranked.into_iter().map(|(_, key)| key).collect();
        buckets.retain(|key, _| keep.contains(key));
    }
}
