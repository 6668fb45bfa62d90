//! C7: branching seed generator.
//!
//! Grows a binary tree of instance specialisations by adding one disjunctive
//! edge pair at a time, selecting each split by minimum sum of lower bounds,
//! and yields a fixed-size set of diverse starting permutations.

use crate::bounds::lower_bound_of_makespan;
use crate::evaluator::Schedule;
use crate::graph::{level_order_initial_permutation, sorted_union, swap_feasible};
use crate::ids::{activities, ActivityId};
use crate::instance::Instance;
use crate::shaking::shake_down;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One seed permutation handed to the external metaheuristic, together with
/// the augmented instance it was built against (`addedEdges` records the
/// branching decisions that produced it).
pub struct Seed {
    pub instance: Instance,
    pub order: Vec<ActivityId>,
    pub schedule: Schedule,
}

/// Builds the `(i, j)` augmented child of `parent`: adds the direct edge
/// `i -> j` and recomputes only the rows/columns of `succ*`, `pred*`, and
/// `disj` that the new edge can affect, per spec section 4.7 step 3.
pub fn add_edge_branch(parent: &Instance, i: ActivityId, j: ActivityId) -> Instance {
    let mut child = parent.clone();

    child.succ[i].push(j);
    child.pred[j].push(i);
    child.succ_mat.set(i, j, true);
    child.added_edges.push((i, j));

    let i_part = sorted_union(&parent.pred_star[i], &[i]);
    let j_part = sorted_union(&parent.succ_star[j], &[j]);

    for &x in &i_part {
        child.succ_star[x] = sorted_union(&parent.succ_star[x], &j_part);
    }
    for &x in &j_part {
        child.pred_star[x] = sorted_union(&parent.pred_star[x], &i_part);
    }

    for x in activities(child.num_activities) {
        for &c in &[i, j] {
            if x == c {
                continue;
            }
            if !child.disj.get(x, c) {
                let now_related = child.succ_star[x].binary_search(&c).is_ok() || child.pred_star[x].binary_search(&c).is_ok();
                if now_related {
                    child.disj.set(x, c, true);
                    child.disj.set(c, x, true);
                }
            }
        }
    }

    child.rl_longest_path = crate::graph::longest_path_to_sink(&child.succ, &child.dur);
    child.cp_bound = child.rl_longest_path[child.source()];

    child
}

/// All unordered pairs `(i, j)` that are disjunctive purely by resource
/// conflict (`disj[i][j]` is true) but not yet ordered by precedence in
/// either direction — the candidates the branching step can still split on.
fn branchable_pairs(inst: &Instance) -> Vec<(ActivityId, ActivityId)> {
    let n = inst.num_activities;
    activities(n)
        .tuple_combinations()
        .filter(|&(i, j)| {
            inst.disj.get(i, j) && inst.succ_star[i].binary_search(&j).is_err() && inst.succ_star[j].binary_search(&i).is_err()
        })
        .collect()
}

struct BranchWinner {
    sum: u32,
    accepted: bool,
    child1: Instance,
    child2: Instance,
}

/// Splits `parent` by adding one disjunctive edge, chosen by best-first
/// minimum sum of children's lower bounds (spec section 4.7 steps 1-4).
/// Returns `None` if `parent` has no branchable pair left.
fn branch_once(parent: &Instance, rng: &mut impl Rng) -> Option<(Instance, Instance)> {
    let mut candidates = branchable_pairs(parent);
    if candidates.is_empty() {
        return None;
    }
    candidates.shuffle(rng);

    let parent_lb = lower_bound_of_makespan(parent);
    let stop = AtomicBool::new(false);
    let best: Mutex<Option<BranchWinner>> = Mutex::new(None);

    let workers = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).min(candidates.len()).max(1);
    let chunks: Vec<&[(ActivityId, ActivityId)]> = candidates.chunks(candidates.len().div_ceil(workers).max(1)).collect();

    std::thread::scope(|scope| {
        for chunk in chunks {
            scope.spawn(|| {
                for &(i, j) in chunk {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let child1 = add_edge_branch(parent, i, j);
                    let child2 = add_edge_branch(parent, j, i);
                    let lb1 = lower_bound_of_makespan(&child1);
                    let lb2 = lower_bound_of_makespan(&child2);
                    let sum = lb1 + lb2;

                    let mut guard = best.lock().unwrap();
                    if sum <= 2 * parent_lb {
                        *guard = Some(BranchWinner {
                            sum,
                            accepted: true,
                            child1,
                            child2,
                        });
                        stop.store(true, Ordering::Relaxed);
                    } else {
                        let already_accepted = matches!(guard.as_ref(), Some(w) if w.accepted);
                        let is_better = match guard.as_ref() {
                            Some(w) => sum < w.sum,
                            None => true,
                        };
                        if !already_accepted && is_better {
                            *guard = Some(BranchWinner {
                                sum,
                                accepted: false,
                                child1,
                                child2,
                            });
                        }
                    }
                }
            });
        }
    });

    best.into_inner().unwrap().map(|w| (w.child1, w.child2))
}

/// Converts a schedule's start times into an activity order by a stable sort
/// on start time, per spec section 4.7's closing paragraph. Ties (equal
/// start times) keep activity id order, matching `io::BinaryPayload`'s
/// `order_by_start_time`.
fn order_from_schedule(inst: &Instance, schedule: &Schedule) -> Vec<ActivityId> {
    let mut order: Vec<ActivityId> = activities(inst.num_activities).collect();
    order.sort_by_key(|&a| schedule.start[a]);
    order
}

/// Repeatedly applies `count` random precedence-safe swaps (C4) to `order`,
/// keeping whichever permutation found so far gives the lowest forward
/// makespan. Used as the fallback when the branching FIFO never reaches its
/// target size; its whole purpose is to explore distinct permutations, so it
/// must never collapse every step back onto `shake_down`'s locally-optimal
/// attractor.
fn diversify(inst: &Instance, mut order: Vec<ActivityId>, count: u32, rng: &mut impl Rng) -> Vec<ActivityId> {
    let n = order.len();
    if n < 2 {
        return order;
    }
    let mut best_order = order.clone();
    let mut best_makespan = crate::evaluator::evaluate(inst, &inst.dur, &inst.cap, &order, true).makespan;
    for _ in 0..count {
        let mut i = rng.random_range(0..n - 1);
        let mut j = rng.random_range(i + 1..n);
        if i > j {
            std::mem::swap(&mut i, &mut j);
        }
        if swap_feasible(&order, i, j, &inst.succ_mat) {
            order.swap(i, j);
        }
        let makespan = crate::evaluator::evaluate(inst, &inst.dur, &inst.cap, &order, true).makespan;
        if makespan < best_makespan {
            best_makespan = makespan;
            best_order = order.clone();
        }
    }
    best_order
}

/// Generates `n` seed permutations for the external metaheuristic, per spec
/// section 4.7.
pub fn generate_seeds(root: &Instance, n: usize, diversification_swaps: u32, rng: &mut impl Rng) -> Vec<Seed> {
    let mut open: Vec<Instance> = vec![root.clone()];
    let mut leaves: Vec<Instance> = Vec::new();

    while open.len() + leaves.len() < n && !open.is_empty() {
        let parent = open.remove(0);
        match branch_once(&parent, rng) {
            Some((c1, c2)) => {
                open.push(c1);
                open.push(c2);
            }
            None => leaves.push(parent),
        }
    }

    leaves.append(&mut open);

    if leaves.len() < n {
        // no viable branching: diversification fallback.
        let base_order = level_order_initial_permutation(&root.succ);
        while leaves.len() < n {
            leaves.push(root.clone());
        }
        return leaves
            .into_iter()
            .map(|inst| {
                let order = diversify(&inst, base_order.clone(), diversification_swaps, rng);
                let result = shake_down(&inst, order);
                let order = order_from_schedule(&inst, &result.schedule);
                Seed {
                    instance: inst,
                    order,
                    schedule: result.schedule,
                }
            })
            .collect();
    }

    leaves
        .into_iter()
        .take(n)
        .map(|inst| {
            let initial = level_order_initial_permutation(&inst.succ);
            let result = shake_down(&inst, initial);
            let order = order_from_schedule(&inst, &result.schedule);
            Seed {
                instance: inst,
                order,
                schedule: result.schedule,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn five_activity_instance() -> Instance {
        // scenario 4 from spec
        Instance::new(
            vec![0, 3, 2, 4, 0],
            vec![1],
            vec![vec![0], vec![1], vec![1], vec![1], vec![0]],
            vec![
                vec![ActivityId::from(1usize), ActivityId::from(2usize), ActivityId::from(3usize)],
                vec![ActivityId::from(4usize)],
                vec![ActivityId::from(4usize)],
                vec![ActivityId::from(4usize)],
                vec![],
            ],
        )
        .unwrap()
    }

    #[test]
    fn generates_requested_seed_count_with_topological_orders() {
        let inst = five_activity_instance();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
        let seeds = generate_seeds(&inst, 4, 20, &mut rng);
        assert_eq!(seeds.len(), 4);
        for seed in &seeds {
            // P1: every edge (u, v) in succ has pos(u) < pos(v)
            let pos: std::collections::HashMap<ActivityId, usize> =
                seed.order.iter().enumerate().map(|(p, &a)| (a, p)).collect();
            for a in activities(seed.instance.num_activities) {
                for &b in &seed.instance.succ[a] {
                    assert!(pos[&a] < pos[&b]);
                }
            }
            assert!(seed.schedule.makespan >= 9);
        }
    }

    /// Independent activities, generous capacity: no pair is disjunctive, so
    /// `branch_once` never finds a split and `generate_seeds` must fall back
    /// to `diversify`.
    fn no_branchable_pairs_instance() -> Instance {
        Instance::new(
            vec![0, 2, 2, 0],
            vec![5],
            vec![vec![0], vec![1], vec![1], vec![0]],
            vec![
                vec![ActivityId::from(1usize), ActivityId::from(2usize)],
                vec![ActivityId::from(3usize)],
                vec![ActivityId::from(3usize)],
                vec![],
            ],
        )
        .unwrap()
    }

    #[test]
    fn falls_back_to_diversification_when_no_pair_is_branchable() {
        let inst = no_branchable_pairs_instance();
        assert!(branchable_pairs(&inst).is_empty());

        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let seeds = generate_seeds(&inst, 3, 20, &mut rng);
        assert_eq!(seeds.len(), 3);
        for seed in &seeds {
            let pos: std::collections::HashMap<ActivityId, usize> = seed.order.iter().enumerate().map(|(p, &a)| (a, p)).collect();
            for a in activities(seed.instance.num_activities) {
                for &b in &seed.instance.succ[a] {
                    assert!(pos[&a] < pos[&b]);
                }
            }
            assert_eq!(seed.schedule.makespan, seed.schedule.start.iter().zip(&seed.instance.dur).map(|(&s, &d)| s + d).max().unwrap());
        }
    }

    #[test]
    fn diversify_keeps_the_best_permutation_found_rather_than_the_last() {
        let inst = no_branchable_pairs_instance();
        let base_order = level_order_initial_permutation(&inst.succ);
        let base_makespan = crate::evaluator::evaluate(&inst, &inst.dur, &inst.cap, &base_order, true).makespan;

        let mut rng = rand::rngs::SmallRng::seed_from_u64(99);
        let result_order = diversify(&inst, base_order, 20, &mut rng);
        let result_makespan = crate::evaluator::evaluate(&inst, &inst.dur, &inst.cap, &result_order, true).makespan;

        // diversify must never hand back a permutation worse than the one it started from.
        assert!(result_makespan <= base_makespan);
    }
}
