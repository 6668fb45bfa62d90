//! C5: lower-bound engines — resource-augmented longest path (with optional
//! energy reasoning) and the concurrency-sort makespan bound.

use crate::graph::{sorted_intersection, DirectedView, ReverseView};
use crate::ids::{activities, resources, ActivityId};
use crate::instance::Instance;
use std::collections::{HashMap, VecDeque};

/// Resource-augmented longest path from `start`, following `g`'s own
/// `succ`/`pred` orientation. `durations` is supplied explicitly (rather
/// than read off `g`) so that callers such as [`lower_bound_of_makespan`]
/// can feed in a partially-consumed local copy without mutating the
/// instance itself.
///
/// Returns, for every activity, a lower bound on the earliest instant it can
/// start under precedence and (if `energy_reasoning`) resource-energy
/// constraints.
pub fn compute_bound<G: DirectedView>(g: &G, durations: &[u32], start: ActivityId, energy_reasoning: bool) -> Vec<u32> {
    let n = g.num_activities();
    let mut dist = vec![0u32; n];
    let mut closed = vec![false; n];
    let mut queued = vec![false; n];
    let mut branch: Vec<HashMap<ActivityId, i32>> = vec![HashMap::new(); n];
    let mut worklist: VecDeque<ActivityId> = VecDeque::new();
    worklist.push_back(start);
    queued[start] = true;

    while !worklist.is_empty() {
        let pos = worklist
            .iter()
            .position(|&a| !closed[a] && g.pred(a).iter().all(|&p| closed[p]));
        let Some(pos) = pos else {
            // All remaining queued activities still await a predecessor that
            // is unreachable from `start`; nothing more to close.
            break;
        };
        let a = worklist.remove(pos).unwrap();
        if closed[a] {
            continue;
        }
        let preds = g.pred(a).to_vec();
        if !preds.is_empty() {
            dist[a] = preds.iter().map(|&p| dist[p] + durations[usize::from(p)]).max().unwrap();
        }
        closed[a] = true;

        if energy_reasoning {
            if preds.len() >= 2 {
                let mut merged: HashMap<ActivityId, i32> = HashMap::new();
                let mut conflicted: Vec<ActivityId> = Vec::new();
                for &p in &preds {
                    let mut local = branch[p].clone();
                    let edge_idx = g.succ(p).iter().position(|&x| x == a).unwrap() as i32;
                    local.insert(p, edge_idx);
                    for (x, v) in local {
                        match merged.get(&x).copied() {
                            None => {
                                merged.insert(x, v);
                            }
                            Some(existing) if existing != v => {
                                conflicted.push(x);
                            }
                            _ => {}
                        }
                    }
                }
                for x in &conflicted {
                    merged.insert(*x, -1);
                }
                for (&s, &v) in merged.iter() {
                    if v == -1 {
                        let inter = sorted_intersection(g.pred_star(a), g.succ_star(s));
                        let mut interval = 0u32;
                        for k in resources(g.num_resources()) {
                            let sum: u64 = inter
                                .iter()
                                .map(|&x| durations[usize::from(x)] as u64 * g.req(x, k) as u64)
                                .sum();
                            let cap = g.cap(k) as u64;
                            if cap > 0 {
                                let needed = sum.div_ceil(cap) as u32;
                                interval = interval.max(needed);
                            }
                        }
                        dist[a] = dist[a].max(dist[s] + durations[usize::from(s)] + interval);
                    }
                }
                branch[a] = merged;
            } else if let Some(&p) = preds.first() {
                let mut local = branch[p].clone();
                let edge_idx = g.succ(p).iter().position(|&x| x == a).unwrap() as i32;
                local.insert(p, edge_idx);
                branch[a] = local;
            }
        }

        for &s in g.succ(a) {
            if !queued[s] {
                queued[s] = true;
                worklist.push_back(s);
            }
        }
    }

    dist
}

/// Concurrency-sort relaxation for the overall makespan lower bound.
pub fn lower_bound_of_makespan(inst: &Instance) -> u32 {
    let n = inst.num_activities;
    let mut concurrency_level = vec![0usize; n];
    for i in activities(n) {
        for j in activities(n) {
            if i != j && !inst.disj.get(i, j) {
                concurrency_level[i] += 1;
            }
        }
    }

    let mut sorted: Vec<ActivityId> = activities(n).collect();
    sorted.sort_by_key(|&a| (concurrency_level[a], inst.dur[a]));

    let reverse = ReverseView::new(inst, inst.sink());
    let mut remaining = inst.dur.clone();
    let mut lb: u32 = 0;
    let mut envelope_max: u32 = 0;

    for &a in &sorted {
        let d_a = remaining[a];
        if d_a == 0 {
            continue;
        }
        let fwd = compute_bound(inst, &remaining, inst.source(), true);
        let bwd = compute_bound(&reverse, &remaining, inst.sink(), true);
        let envelope = lb + fwd[inst.sink()].max(bwd[inst.source()]);
        envelope_max = envelope_max.max(envelope);

        for j in activities(n) {
            if j != a && !inst.disj.get(a, j) && remaining[j] > 0 {
                remaining[j] = remaining[j].saturating_sub(d_a);
            }
        }
        remaining[a] = 0;
        lb += d_a;
    }

    lb.max(envelope_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ActivityId;

    #[test]
    fn plain_longest_path_matches_chain_length() {
        let inst = Instance::new(
            vec![0, 3, 2, 0],
            vec![10],
            vec![vec![0], vec![1], vec![1], vec![0]],
            vec![
                vec![ActivityId::from(1usize)],
                vec![ActivityId::from(2usize)],
                vec![ActivityId::from(3usize)],
                vec![],
            ],
        )
        .unwrap();
        let dist = compute_bound(&inst, &inst.dur, inst.source(), false);
        assert_eq!(dist[ActivityId::from(3usize)], 5);
    }

    #[test]
    fn lower_bound_never_exceeds_a_feasible_schedule_p5() {
        use crate::evaluator::evaluate;
        use crate::graph::level_order_initial_permutation;

        let inst = Instance::new(
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
        .unwrap();
        let lb = lower_bound_of_makespan(&inst);
        let order = level_order_initial_permutation(&inst.succ);
        let sched = evaluate(&inst, &inst.dur, &inst.cap, &order, true);
        assert!(lb <= sched.makespan);
        assert!(lb >= inst.cp_bound);
    }
}
