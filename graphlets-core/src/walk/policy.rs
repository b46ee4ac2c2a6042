//! Transition rules deciding which vertex swaps a walk may take.

use std::{collections::BTreeMap, fmt::Debug};

use crate::{graphlet::Graphlet, host::HostGraph};

/// One possible transition: `remove` leaves the graphlet, `insert` joins it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchCandidate {
    /// Member that leaves.
    pub remove: usize,
    /// Non-member that joins.
    pub insert: usize,
    /// Unnormalized transition weight.
    pub weight: f64,
}

/// Lists the weighted transitions out of a walk state.
///
/// The sum of all weights must not exceed `(k - 1) * k * max_degree`, the
/// bound the walk uses to virtualize self-loops.
pub trait TransitionPolicy: Clone + Debug + Default + Send + Sync {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Every transition out of `graphlet`, ordered by `(remove, insert)`.
    fn candidates<G: HostGraph>(&self, graphlet: &Graphlet<G>) -> Vec<SwitchCandidate>;
}

/// Uniform over every connected swap, cut vertices included.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullPolicy;

impl TransitionPolicy for FullPolicy {
    const NAME: &'static str = "full";

    fn candidates<G: HostGraph>(&self, graphlet: &Graphlet<G>) -> Vec<SwitchCandidate> {
        graphlet
            .vertices()
            .flat_map(|remove| {
                graphlet
                    .replacements_for(remove)
                    .into_iter()
                    .map(move |insert| SwitchCandidate {
                        remove,
                        insert,
                        weight: 1.0,
                    })
            })
            .collect()
    }
}

/// Down-weights swaps into crowded neighbourhoods.
///
/// For a removed member `u` and a replacement `w`, each remaining member `v`
/// adjacent to `w` has `c_v` neighbours that could replace `u`; the swap
/// weighs `min_v 1 / c_v`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmartPolicy;

impl TransitionPolicy for SmartPolicy {
    const NAME: &'static str = "smart";

    fn candidates<G: HostGraph>(&self, graphlet: &Graphlet<G>) -> Vec<SwitchCandidate> {
        let graph = graphlet.graph();
        let mut candidates = Vec::new();
        for remove in graphlet.vertices() {
            let replacements = graphlet.replacements_for(remove);
            if replacements.is_empty() {
                continue;
            }
            let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
            for member in graphlet.vertices().filter(|&member| member != remove) {
                let reachable: Vec<usize> = graph
                    .successors(member)
                    .filter(|succ| replacements.contains(succ))
                    .collect();
                let share = 1.0 / reachable.len().max(1) as f64;
                for insert in reachable {
                    weights
                        .entry(insert)
                        .and_modify(|weight| *weight = weight.min(share))
                        .or_insert(share);
                }
            }
            candidates.extend(weights.into_iter().map(|(insert, weight)| SwitchCandidate {
                remove,
                insert,
                weight,
            }));
        }
        candidates
    }
}

/// Only swaps out members whose removal keeps the rest connected.
#[derive(Clone, Copy, Debug, Default)]
pub struct CowardPolicy;

impl TransitionPolicy for CowardPolicy {
    const NAME: &'static str = "coward";

    fn candidates<G: HostGraph>(&self, graphlet: &Graphlet<G>) -> Vec<SwitchCandidate> {
        graphlet
            .switchable_vertices()
            .into_iter()
            .flat_map(|(remove, replacements)| {
                replacements.into_iter().map(move |insert| SwitchCandidate {
                    remove,
                    insert,
                    weight: 1.0,
                })
            })
            .collect()
    }
}
