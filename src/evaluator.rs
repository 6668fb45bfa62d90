//! C2: schedule evaluator — the serial schedule-generation scheme.

use crate::graph::DirectedView;
use crate::ids::ActivityId;
use crate::resource_tracker::ResourceTracker;
use smallvec::SmallVec;

/// Result of evaluating a permutation: start time per activity and the
/// resulting makespan.
#[derive(Clone, Debug)]
pub struct Schedule {
    pub start: Vec<u32>,
    pub makespan: u32,
}

impl Schedule {
    pub fn finish(&self, a: ActivityId, dur: &[u32]) -> u32 {
        self.start[a] + dur[a]
    }
}

/// Evaluates `order` (a topological linear extension, I1) against `g`,
/// scanning forward (`forward = true`) or backward (`forward = false`).
///
/// Backward mode is only meaningful when `g` is a [`crate::graph::ReverseView`]
/// of the instance: scanning the permutation right-to-left over the
/// transposed graph reuses exactly the same code path as the forward pass.
pub fn evaluate<G: DirectedView>(g: &G, dur: &[u32], cap: &[u32], order: &[ActivityId], forward: bool) -> Schedule {
    let n = order.len();
    let horizon: u32 = dur.iter().sum::<u32>().max(1);
    let mut tracker = ResourceTracker::new(cap, horizon);
    let mut start = vec![0u32; n];

    let indices: Box<dyn Iterator<Item = usize>> = if forward {
        Box::new(0..n)
    } else {
        Box::new((0..n).rev())
    };

    // I1 guarantees `order` is a topological extension of `g`, so by the
    // time activity `a` is reached every predecessor in `g.pred(a)` has
    // already been assigned a start time.
    for i in indices {
        let a = order[i];
        let earliest = g.pred(a).iter().map(|&p| start[p] + dur[p]).max().unwrap_or(0);
        let req_buf: SmallVec<[u32; 4]> = (0..g.num_resources()).map(|k| g.req(a, crate::ids::ResourceId::from(k))).collect();
        let t = tracker.earliest_start(&req_buf, earliest, dur[a]);
        tracker.add(t, t + dur[a], &req_buf).expect("well-formed instance cannot violate I2");
        start[a] = t;
    }

    let makespan = (0..n).map(|i| start[order[i]] + dur[order[i]]).max().unwrap_or(0);
    Schedule { start, makespan }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;

    #[test]
    fn trivial_chain_makespan_is_chain_length() {
        let inst = Instance::new(
            vec![0, 3, 0],
            vec![1],
            vec![vec![0], vec![1], vec![0]],
            vec![vec![ActivityId::from(1usize)], vec![ActivityId::from(2usize)], vec![]],
        )
        .unwrap();
        let order = vec![ActivityId::from(0usize), ActivityId::from(1usize), ActivityId::from(2usize)];
        let sched = evaluate(&inst, &inst.dur, &inst.cap, &order, true);
        assert_eq!(sched.makespan, 3);
        assert_eq!(sched.start, vec![0, 0, 3]);
    }

    #[test]
    fn parallel_pair_fits_under_capacity_two() {
        // scenario 2
        let inst = Instance::new(
            vec![0, 2, 2, 0],
            vec![2],
            vec![vec![0], vec![1], vec![1], vec![0]],
            vec![
                vec![ActivityId::from(1usize), ActivityId::from(2usize)],
                vec![ActivityId::from(3usize)],
                vec![ActivityId::from(3usize)],
                vec![],
            ],
        )
        .unwrap();
        let order = vec![
            ActivityId::from(0usize),
            ActivityId::from(1usize),
            ActivityId::from(2usize),
            ActivityId::from(3usize),
        ];
        let sched = evaluate(&inst, &inst.dur, &inst.cap, &order, true);
        assert_eq!(sched.makespan, 2);
    }

    #[test]
    fn capacity_one_forces_serialisation() {
        // scenario 3
        let inst = Instance::new(
            vec![0, 2, 2, 0],
            vec![1],
            vec![vec![0], vec![1], vec![1], vec![0]],
            vec![
                vec![ActivityId::from(1usize), ActivityId::from(2usize)],
                vec![ActivityId::from(3usize)],
                vec![ActivityId::from(3usize)],
                vec![],
            ],
        )
        .unwrap();
        let order = vec![
            ActivityId::from(0usize),
            ActivityId::from(1usize),
            ActivityId::from(2usize),
            ActivityId::from(3usize),
        ];
        let sched = evaluate(&inst, &inst.dur, &inst.cap, &order, true);
        assert_eq!(sched.makespan, 4);
    }
}
