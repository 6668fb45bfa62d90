//! C14: the boundary with the external (GPU-resident, in production) tabu
//! search kernel. Spec section 1 treats the real device as an external
//! collaborator; this module defines only the data crossing that boundary
//! and the single suspension point the facade calls through.

use crate::config::Config;
use crate::error::RcpspError;
use crate::graph::SuccMatrix;
use crate::ids::ActivityId;

/// One seed permutation as handed across the device boundary: flat arrays
/// only, no borrowed state.
#[derive(Clone, Debug)]
pub struct SeedPayload {
    pub order: Vec<u32>,
    pub cost: u32,
    pub added_edges: Vec<(u32, u32)>,
}

/// Everything the external metaheuristic needs: the consolidated instance
/// data, the seed batch, and the opaque config knobs.
#[derive(Clone, Debug)]
pub struct MetaheuristicPayload {
    pub num_activities: u32,
    pub num_resources: u32,
    pub dur: Vec<u32>,
    pub cap: Vec<u32>,
    pub req: Vec<u32>, // row-major, num_activities x num_resources
    pub rl_longest_path: Vec<u32>,
    /// Bit-packed successor matrix, row-major, one bit per edge (spec section 9).
    pub succ_mat_bits: Vec<u8>,
    pub seeds: Vec<SeedPayload>,
    pub config: Config,
}

impl MetaheuristicPayload {
    pub fn pack_succ_mat(mat: &SuccMatrix) -> Vec<u8> {
        let n = mat.n();
        let mut bits = vec![0u8; n * n.div_ceil(8)];
        let row_bytes = n.div_ceil(8);
        for i in 0..n {
            for j in 0..n {
                if mat.get(ActivityId::from(i), ActivityId::from(j)) {
                    bits[i * row_bytes + j / 8] |= 1 << (j % 8);
                }
            }
        }
        bits
    }
}

/// Result read back from the device: the best permutation found and how
/// many candidate schedules it evaluated to find it.
#[derive(Clone, Debug)]
pub struct MetaheuristicResult {
    pub best_order: Vec<u32>,
    pub best_cost: u32,
    pub evaluated_schedules: u64,
}

/// The external collaborator's interface. Implementations own whatever
/// device resources they need; the facade calls `optimize` exactly once per
/// `solve()` invocation, the single suspension point of spec section 5.
pub trait Metaheuristic {
    fn optimize(&self, payload: &MetaheuristicPayload) -> Result<MetaheuristicResult, RcpspError>;
}

/// A minimal [`crate::graph::DirectedView`] built directly from the flat
/// payload arrays, so the reference device can reuse the same evaluator
/// code path as the rest of the crate instead of reimplementing it.
struct FlatGraph {
    succ: Vec<Vec<ActivityId>>,
    pred: Vec<Vec<ActivityId>>,
    succ_star: Vec<Vec<ActivityId>>,
    pred_star: Vec<Vec<ActivityId>>,
    req: Vec<Vec<u32>>,
    cap: Vec<u32>,
}

impl FlatGraph {
    fn new(succ: Vec<Vec<ActivityId>>, req: Vec<Vec<u32>>, cap: Vec<u32>) -> Self {
        let n = succ.len();
        let mut pred = vec![Vec::new(); n];
        for a in 0..n {
            for &s in &succ[a] {
                pred[s].push(ActivityId::from(a));
            }
        }
        let (succ_star, pred_star) = crate::graph::transitive_closure(&succ);
        FlatGraph {
            succ,
            pred,
            succ_star,
            pred_star,
            req,
            cap,
        }
    }
}

impl crate::graph::DirectedView for FlatGraph {
    fn num_activities(&self) -> usize {
        self.succ.len()
    }
    fn num_resources(&self) -> usize {
        self.cap.len()
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
    fn req(&self, a: ActivityId, k: crate::ids::ResourceId) -> u32 {
        self.req[a][usize::from(k)]
    }
    fn cap(&self, k: crate::ids::ResourceId) -> u32 {
        self.cap[usize::from(k)]
    }
}

/// A conforming, CPU-only stand-in for the real GPU kernel: a small bounded
/// local search over swap moves, seeded from the best incoming permutation.
/// It exists so the facade is exercisable without real device hardware; it
/// is not a claim about the real kernel's search strategy.
pub struct ReferenceLocalSearch;

impl Metaheuristic for ReferenceLocalSearch {
    fn optimize(&self, payload: &MetaheuristicPayload) -> Result<MetaheuristicResult, RcpspError> {
        let best_seed = payload
            .seeds
            .iter()
            .min_by_key(|s| s.cost)
            .ok_or_else(|| RcpspError::DeviceUnavailable {
                reason: "no seed permutations supplied".to_string(),
            })?;

        let n = payload.num_activities as usize;
        let r = payload.num_resources as usize;
        let row_bytes = n.div_ceil(8);
        let succ: Vec<Vec<ActivityId>> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| (payload.succ_mat_bits[i * row_bytes + j / 8] >> (j % 8)) & 1 == 1)
                    .map(ActivityId::from)
                    .collect()
            })
            .collect();
        let succ_mat = SuccMatrix::from_edges(n, &succ);
        let req: Vec<Vec<u32>> = (0..n).map(|a| payload.req[a * r..(a + 1) * r].to_vec()).collect();
        let graph = FlatGraph::new(succ, req, payload.cap.clone());

        let mut order: Vec<ActivityId> = best_seed.order.iter().map(|&i| ActivityId::from(i as usize)).collect();
        let mut best_cost = best_seed.cost;
        let mut evaluated = 0u64;
        let mut since_best = 0u64;
        let mut rng = {
            use rand::SeedableRng;
            rand::rngs::SmallRng::seed_from_u64(payload.config.rng_seed)
        };
        use rand::Rng;

        let max_iter = payload.config.max_iter;
        let max_since_best = payload.config.max_iter_since_best;

        for _ in 0..max_iter {
            if since_best >= max_since_best || n < 2 {
                break;
            }
            let span = (payload.config.swap_range as usize).clamp(1, n - 1);
            let i = rng.random_range(0..n - 1);
            let j = (i + 1 + rng.random_range(0..span)).min(n - 1);
            if i >= j || !crate::graph::swap_feasible(&order, i, j, &succ_mat) {
                since_best += 1;
                continue;
            }
            order.swap(i, j);
            let schedule = crate::evaluator::evaluate(&graph, &payload.dur, &payload.cap, &order, true);
            evaluated += 1;
            if schedule.makespan < best_cost {
                best_cost = schedule.makespan;
                since_best = 0;
            } else {
                order.swap(i, j);
                since_best += 1;
            }
        }

        Ok(MetaheuristicResult {
            best_order: order.iter().map(|&a| a.get()).collect(),
            best_cost,
            evaluated_schedules: evaluated,
        })
    }
}
