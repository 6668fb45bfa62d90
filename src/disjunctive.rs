//! C6: disjunctive-pair analyser.
//!
//! For every unordered pair of activities, decides whether they can run
//! concurrently: they must share no precedence relation (in either
//! direction) and their combined resource requirement must fit under every
//! capacity.

use crate::graph::SuccMatrix;
use crate::ids::{activities, resources, ActivityId};

/// Computes the symmetric `disj` matrix (true = cannot run concurrently).
pub fn compute_disjunctive_matrix(
    n: usize,
    req: &[Vec<u32>],
    cap: &[u32],
    succ_star: &[Vec<ActivityId>],
    pred_star: &[Vec<ActivityId>],
) -> SuccMatrix {
    let mut disj = SuccMatrix::empty(n);
    for i in activities(n) {
        for j in activities(n) {
            if i == j {
                continue;
            }
            let related = succ_star[i].binary_search(&j).is_ok() || pred_star[i].binary_search(&j).is_ok();
            let over_capacity = resources(cap.len()).any(|k| req[i][usize::from(k)] + req[j][usize::from(k)] > cap[usize::from(k)]);
            if related || over_capacity {
                disj.set(i, j, true);
                disj.set(j, i, true);
            }
        }
    }
    disj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::transitive_closure;

    #[test]
    fn parallel_independent_pair_is_not_disjunctive() {
        // scenario 2 from spec: A=4, cap=[2], dur=[0,2,2,0], req=[[0],[1],[1],[0]]
        let succ = vec![
            vec![ActivityId::from(1usize), ActivityId::from(2usize)],
            vec![ActivityId::from(3usize)],
            vec![ActivityId::from(3usize)],
            vec![],
        ];
        let (succ_star, pred_star) = transitive_closure(&succ);
        let req = vec![vec![0u32], vec![1], vec![1], vec![0]];
        let cap = vec![2u32];
        let disj = compute_disjunctive_matrix(4, &req, &cap, &succ_star, &pred_star);
        assert!(!disj.get(ActivityId::from(1usize), ActivityId::from(2usize)));
    }

    #[test]
    fn capacity_forced_serialisation_is_disjunctive() {
        // scenario 3: same graph, cap=[1]
        let succ = vec![
            vec![ActivityId::from(1usize), ActivityId::from(2usize)],
            vec![ActivityId::from(3usize)],
            vec![ActivityId::from(3usize)],
            vec![],
        ];
        let (succ_star, pred_star) = transitive_closure(&succ);
        let req = vec![vec![0u32], vec![1], vec![1], vec![0]];
        let cap = vec![1u32];
        let disj = compute_disjunctive_matrix(4, &req, &cap, &succ_star, &pred_star);
        assert!(disj.get(ActivityId::from(1usize), ActivityId::from(2usize)));
    }
}
