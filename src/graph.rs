//! C4: graph utilities — transitive closure, edge-reversed views, level-based
//! initial permutations, and swap-precedence feasibility.
//!
//! Preprocessing here is expressed as pure functions over owned arrays rather
//! than the "stride-then-rewind" pointer walking of the original
//! implementation: every function below takes borrowed slices and returns
//! freshly allocated `Vec`s.

use crate::ids::{activities, ActivityId, ResourceId};
use std::collections::VecDeque;

/// Read-only access to a directed graph over activities, in either its
/// original orientation (`Instance`) or transposed (`ReverseView`). Bound
/// engines and the evaluator's backward mode are written once against this
/// trait instead of duplicating forward/backward code paths.
pub trait DirectedView {
    fn num_activities(&self) -> usize;
    fn num_resources(&self) -> usize;
    fn succ(&self, a: ActivityId) -> &[ActivityId];
    fn pred(&self, a: ActivityId) -> &[ActivityId];
    fn succ_star(&self, a: ActivityId) -> &[ActivityId];
    fn pred_star(&self, a: ActivityId) -> &[ActivityId];
    fn req(&self, a: ActivityId, k: ResourceId) -> u32;
    fn cap(&self, k: ResourceId) -> u32;

    /// `a` as seen from this view's own orientation: for `Instance` this is
    /// activity 0 (the project start); for `ReverseView` it is the original
    /// sink, since walking `succ` from there reaches every activity.
    fn root(&self) -> ActivityId {
        ActivityId::from(0usize)
    }

    fn is_successor(&self, i: ActivityId, j: ActivityId) -> bool {
        self.succ_star(i).binary_search(&j).is_ok()
    }
}

/// A read-only transposition of an `Instance`: `succ`/`pred` and
/// `succ_star`/`pred_star` are swapped without mutating or cloning the
/// underlying arrays, per the design note preferring a `reverse_view`
/// abstraction over in-place field swapping.
pub struct ReverseView<'a, G: DirectedView> {
    inner: &'a G,
    root: ActivityId,
}

impl<'a, G: DirectedView> ReverseView<'a, G> {
    pub fn new(inner: &'a G, root: ActivityId) -> Self {
        ReverseView { inner, root }
    }
}

impl<'a, G: DirectedView> DirectedView for ReverseView<'a, G> {
    fn num_activities(&self) -> usize {
        self.inner.num_activities()
    }
    fn num_resources(&self) -> usize {
        self.inner.num_resources()
    }
    fn succ(&self, a: ActivityId) -> &[ActivityId] {
        self.inner.pred(a)
    }
    fn pred(&self, a: ActivityId) -> &[ActivityId] {
        self.inner.succ(a)
    }
    fn succ_star(&self, a: ActivityId) -> &[ActivityId] {
        self.inner.pred_star(a)
    }
    fn pred_star(&self, a: ActivityId) -> &[ActivityId] {
        self.inner.succ_star(a)
    }
    fn req(&self, a: ActivityId, k: ResourceId) -> u32 {
        self.inner.req(a, k)
    }
    fn cap(&self, k: ResourceId) -> u32 {
        self.inner.cap(k)
    }
    fn root(&self) -> ActivityId {
        self.root
    }
}

/// Depth-first enumeration of reachable ids from each activity, returned
/// sorted ascending (I4): `succ_star[a]` and `pred_star[a]` exclude `a`
/// itself.
pub fn transitive_closure(
    succ: &[Vec<ActivityId>],
) -> (Vec<Vec<ActivityId>>, Vec<Vec<ActivityId>>) {
    let n = succ.len();
    let mut succ_star = vec![Vec::new(); n];
    for a in activities(n) {
        let mut seen = vec![false; n];
        let mut stack = succ[a].clone();
        let mut reached = Vec::new();
        while let Some(x) = stack.pop() {
            if !seen[x] {
                seen[x] = true;
                reached.push(x);
                stack.extend(succ[x].iter().copied());
            }
        }
        reached.sort();
        succ_star[a] = reached;
    }
    let mut pred_star = vec![Vec::new(); n];
    for a in activities(n) {
        for &s in &succ_star[a] {
            pred_star[s].push(a);
        }
    }
    for p in pred_star.iter_mut() {
        p.sort();
        p.dedup();
    }
    (succ_star, pred_star)
}

/// Longest path (in total duration) from each activity to the sink, using
/// the original DAG only (no resources, no added edges). `rlLongestPath[a]`.
pub fn longest_path_to_sink(succ: &[Vec<ActivityId>], dur: &[u32]) -> Vec<u32> {
    let n = succ.len();
    let mut memo: Vec<Option<u32>> = vec![None; n];

    fn rec(a: ActivityId, succ: &[Vec<ActivityId>], dur: &[u32], memo: &mut Vec<Option<u32>>) -> u32 {
        if let Some(v) = memo[a] {
            return v;
        }
        let best = succ[a]
            .iter()
            .map(|&s| dur[s] + rec(s, succ, dur, memo))
            .max()
            .unwrap_or(0);
        memo[a] = Some(best);
        best
    }

    for a in activities(n) {
        rec(a, succ, dur, &mut memo);
    }
    memo.into_iter().map(|v| v.unwrap_or(0)).collect()
}

/// Repeated successor-frontier expansion from the source: activities appear
/// in non-decreasing edge-count distance from the source, ties broken by
/// ascending id.
pub fn level_order_initial_permutation(succ: &[Vec<ActivityId>]) -> Vec<ActivityId> {
    let n = succ.len();
    let source = ActivityId::from(0usize);
    let mut level = vec![u32::MAX; n];
    let mut queue = VecDeque::new();
    level[source] = 0;
    queue.push_back(source);
    while let Some(a) = queue.pop_front() {
        for &s in &succ[a] {
            if level[s] == u32::MAX {
                level[s] = level[a] + 1;
                queue.push_back(s);
            }
        }
    }
    let mut order: Vec<ActivityId> = activities(n).collect();
    order.sort_by_key(|&a| (level[a], a.get()));
    order
}

/// Does swapping positions `i < j` of `order` preserve a valid topological
/// extension of `succ_mat`?
///
/// Two conditions must hold:
/// - no activity at a position in `[i, j)` has a direct edge to `order[j]`
/// - no activity at a position in `(i, j]` receives a direct edge from `order[i]`
pub fn swap_feasible(order: &[ActivityId], i: usize, j: usize, succ_mat: &SuccMatrix) -> bool {
    debug_assert!(i < j);
    let oi = order[i];
    let oj = order[j];
    for &ok in &order[i..j] {
        if succ_mat.get(ok, oj) {
            return false;
        }
    }
    for &ok in &order[i + 1..=j] {
        if succ_mat.get(oi, ok) {
            return false;
        }
    }
    true
}

/// Dense row-major `n x n` boolean matrix, used for both `succMat` and `disj`.
#[derive(Clone, Debug)]
pub struct SuccMatrix {
    n: usize,
    bits: Vec<bool>,
}

impl SuccMatrix {
    pub fn empty(n: usize) -> Self {
        SuccMatrix {
            n,
            bits: vec![false; n * n],
        }
    }

    pub fn from_edges(n: usize, succ: &[Vec<ActivityId>]) -> Self {
        let mut bits = vec![false; n * n];
        for a in activities(n) {
            for &s in &succ[a] {
                bits[usize::from(a) * n + usize::from(s)] = true;
            }
        }
        SuccMatrix { n, bits }
    }

    pub fn get(&self, i: ActivityId, j: ActivityId) -> bool {
        self.bits[usize::from(i) * self.n + usize::from(j)]
    }

    pub fn set(&mut self, i: ActivityId, j: ActivityId, v: bool) {
        self.bits[usize::from(i) * self.n + usize::from(j)] = v;
    }

    pub fn n(&self) -> usize {
        self.n
    }
}

/// Union of two sorted, deduplicated id slices into a fresh sorted vec.
pub fn sorted_union(a: &[ActivityId], b: &[ActivityId]) -> Vec<ActivityId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out.sort();
    out.dedup();
    out
}

/// Intersection of two sorted id slices into a fresh sorted vec.
pub fn sorted_intersection(a: &[ActivityId], b: &[ActivityId]) -> Vec<ActivityId> {
    let mut out = Vec::new();
    let (mut x, mut y) = (0, 0);
    while x < a.len() && y < b.len() {
        match a[x].cmp(&b[y]) {
            std::cmp::Ordering::Less => x += 1,
            std::cmp::Ordering::Greater => y += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[x]);
                x += 1;
                y += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Vec<Vec<ActivityId>> {
        (0..n)
            .map(|a| {
                if a + 1 < n {
                    vec![ActivityId::from(a + 1)]
                } else {
                    vec![]
                }
            })
            .collect()
    }

    #[test]
    fn transitive_closure_on_chain_is_full_suffix() {
        let succ = chain(4);
        let (succ_star, pred_star) = transitive_closure(&succ);
        assert_eq!(
            succ_star[0],
            vec![ActivityId::from(1usize), ActivityId::from(2usize), ActivityId::from(3usize)]
        );
        assert_eq!(pred_star[3], vec![ActivityId::from(0usize), ActivityId::from(1usize), ActivityId::from(2usize)]);
    }

    #[test]
    fn closure_consistency_p6() {
        let succ = vec![
            vec![ActivityId::from(1usize), ActivityId::from(2usize)],
            vec![ActivityId::from(3usize)],
            vec![ActivityId::from(3usize)],
            vec![],
        ];
        let (succ_star, pred_star) = transitive_closure(&succ);
        for i in activities(4) {
            for j in activities(4) {
                let i_succ_j = succ_star[i].binary_search(&j).is_ok();
                let j_pred_i = pred_star[j].binary_search(&i).is_ok();
                assert_eq!(i_succ_j, j_pred_i, "P6 violated for ({i:?}, {j:?})");
            }
        }
    }

    #[test]
    fn level_order_respects_source_first() {
        let succ = vec![
            vec![ActivityId::from(1usize), ActivityId::from(2usize)],
            vec![ActivityId::from(3usize)],
            vec![ActivityId::from(3usize)],
            vec![],
        ];
        let order = level_order_initial_permutation(&succ);
        assert_eq!(order[0], ActivityId::from(0usize));
        assert_eq!(order[3], ActivityId::from(3usize));
    }

    #[test]
    fn swap_feasible_blocks_direct_edge() {
        let succ = chain(3);
        let mat = SuccMatrix::from_edges(3, &succ);
        let order = vec![ActivityId::from(0usize), ActivityId::from(1usize), ActivityId::from(2usize)];
        assert!(!swap_feasible(&order, 0, 1, &mat));
    }
}
