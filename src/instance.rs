//! The RCPSP instance: activities, resources, and the derived caches
//! (transitive closures, disjunctive matrix, longest-path bounds) described
//! in spec section 3.

use crate::error::{RcpspError, Result};
use crate::graph::{transitive_closure, DirectedView, SuccMatrix};
use crate::ids::{activities, resources, ActivityId, ResourceId};

#[derive(Clone)]
pub struct Instance {
    pub num_activities: usize,
    pub num_resources: usize,
    pub dur: Vec<u32>,
    pub cap: Vec<u32>,
    pub req: Vec<Vec<u32>>,
    pub succ: Vec<Vec<ActivityId>>,
    pub pred: Vec<Vec<ActivityId>>,
    pub succ_star: Vec<Vec<ActivityId>>,
    pub pred_star: Vec<Vec<ActivityId>>,
    pub succ_mat: SuccMatrix,
    pub disj: SuccMatrix,
    pub rl_longest_path: Vec<u32>,
    pub cp_bound: u32,
    pub ub_makespan: u32,
    pub added_edges: Vec<(ActivityId, ActivityId)>,
}

impl Instance {
    /// Builds an instance from the parser's plain numeric arrays (§6).
    /// Activity 0 is the source, activity `A - 1` the sink.
    pub fn new(dur: Vec<u32>, cap: Vec<u32>, req: Vec<Vec<u32>>, succ: Vec<Vec<ActivityId>>) -> Result<Self> {
        let n = dur.len();
        let r = cap.len();

        for a in activities(n) {
            for k in resources(r) {
                let required = req[a][usize::from(k)];
                let capacity = cap[usize::from(k)];
                if required > capacity {
                    return Err(RcpspError::InstanceInfeasible {
                        activity: a,
                        resource: k,
                        required,
                        capacity,
                    });
                }
            }
        }

        let mut pred = vec![Vec::new(); n];
        for a in activities(n) {
            for &s in &succ[a] {
                pred[s].push(a);
            }
        }

        let succ_mat = SuccMatrix::from_edges(n, &succ);
        let (succ_star, pred_star) = transitive_closure(&succ);
        let disj = crate::disjunctive::compute_disjunctive_matrix(n, &req, &cap, &succ_star, &pred_star);
        let rl_longest_path = crate::graph::longest_path_to_sink(&succ, &dur);
        let cp_bound = rl_longest_path[ActivityId::from(0usize)];
        let ub_makespan = dur.iter().sum();

        Ok(Instance {
            num_activities: n,
            num_resources: r,
            dur,
            cap,
            req,
            succ,
            pred,
            succ_star,
            pred_star,
            succ_mat,
            disj,
            rl_longest_path,
            cp_bound,
            ub_makespan,
            added_edges: Vec::new(),
        })
    }

    pub fn source(&self) -> ActivityId {
        ActivityId::from(0usize)
    }

    pub fn sink(&self) -> ActivityId {
        ActivityId::from(self.num_activities - 1)
    }
}

impl DirectedView for Instance {
    fn num_activities(&self) -> usize {
        self.num_activities
    }
    fn num_resources(&self) -> usize {
        self.num_resources
    }
    fn succ(&self, a: ActivityId) -> &[ActivityId] {
        &self.succ[a]
    }
    fn pred(&self, a: ActivityId) -> &[ActivityId] {
        &self.pred[a]
    }
    fn succ_star(&self, a: ActivityId) -> &[ActivityId] {
        &self.succ_star[a]
    }
    fn pred_star(&self, a: ActivityId) -> &[ActivityId] {
        &self.pred_star[a]
    }
    fn req(&self, a: ActivityId, k: ResourceId) -> u32 {
        self.req[a][usize::from(k)]
    }
    fn cap(&self, k: ResourceId) -> u32 {
        self.cap[usize::from(k)]
    }
    fn root(&self) -> ActivityId {
        self.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trivial_chain() -> Instance {
        // scenario 1: A=3, R=1, cap=[1], dur=[0,3,0], req=[[0],[1],[0]]
        Instance::new(
            vec![0, 3, 0],
            vec![1],
            vec![vec![0], vec![1], vec![0]],
            vec![vec![ActivityId::from(1usize)], vec![ActivityId::from(2usize)], vec![]],
        )
        .unwrap()
    }

    #[test]
    fn cp_bound_matches_chain_length() {
        let inst = trivial_chain();
        assert_eq!(inst.cp_bound, 3);
        assert_eq!(inst.ub_makespan, 3);
    }

    #[test]
    fn infeasible_instance_is_rejected() {
        let err = Instance::new(vec![0, 1], vec![1], vec![vec![0], vec![2]], vec![vec![ActivityId::from(1usize)], vec![]]);
        assert!(matches!(err, Err(RcpspError::InstanceInfeasible { .. })));
    }
}
