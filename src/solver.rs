//! C8: the facade. Owns the phase ordering spec section 5 describes —
//! preprocessing, seed generation, the single metaheuristic suspension
//! point, and the final justified schedule — and is the only module that
//! emits [`tracing`] spans for the run as a whole.

use crate::branching::generate_seeds;
use crate::config::Config;
use crate::error::Result;
use crate::ids::ActivityId;
use crate::instance::Instance;
use crate::metaheuristic::{Metaheuristic, MetaheuristicPayload, SeedPayload};
use crate::shaking::shake_down;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

/// Everything a caller needs out of a finished run: the best schedule found,
/// its precedence penalty (always zero for schedules the evaluator itself
/// produced, per P3), and the bookkeeping the textual reports want.
pub struct Solution {
    pub instance: Instance,
    pub start_time_by_id: Vec<u32>,
    pub makespan: u32,
    pub evaluated_schedules: u64,
    pub runtime: std::time::Duration,
}

/// Constructs an instance from the parser's raw arrays and runs it to
/// completion against `device`. This is the single call site through which
/// the external metaheuristic is invoked (spec section 5's suspension
/// point): exactly once per `solve`.
pub fn solve(dur: Vec<u32>, cap: Vec<u32>, req: Vec<Vec<u32>>, succ: Vec<Vec<ActivityId>>, config: Config, device: &dyn Metaheuristic) -> Result<Solution> {
    let started = Instant::now();
    let span = tracing::info_span!("solve", activities = dur.len(), resources = cap.len());
    let _guard = span.enter();

    let instance = Instance::new(dur, cap, req, succ)?;
    tracing::debug!(cp_bound = instance.cp_bound, ub_makespan = instance.ub_makespan, "preprocessing complete");

    let mut rng = SmallRng::seed_from_u64(config.rng_seed);
    let seeds = {
        let _span = tracing::info_span!("branching").entered();
        generate_seeds(&instance, config.number_of_set_solutions as usize, config.diversification_swaps, &mut rng)
    };
    tracing::debug!(seed_count = seeds.len(), "seed generation complete");

    let row_major_req: Vec<u32> = (0..instance.num_activities)
        .flat_map(|a| (0..instance.num_resources).map(move |k| (a, k)))
        .map(|(a, k)| instance.req[a][k])
        .collect();

    let payload = MetaheuristicPayload {
        num_activities: instance.num_activities as u32,
        num_resources: instance.num_resources as u32,
        dur: instance.dur.clone(),
        cap: instance.cap.clone(),
        req: row_major_req,
        rl_longest_path: instance.rl_longest_path.clone(),
        succ_mat_bits: MetaheuristicPayload::pack_succ_mat(&instance.succ_mat),
        seeds: seeds
            .iter()
            .map(|s| SeedPayload {
                order: s.order.iter().map(|a| a.get()).collect(),
                cost: s.schedule.makespan,
                added_edges: s.instance.added_edges.iter().map(|&(i, j)| (i.get(), j.get())).collect(),
            })
            .collect(),
        config: config.clone(),
    };

    let result = {
        let _span = tracing::info_span!("metaheuristic").entered();
        device.optimize(&payload)?
    };
    tracing::debug!(best_cost = result.best_cost, evaluated = result.evaluated_schedules, "metaheuristic complete");

    let best_order: Vec<ActivityId> = result.best_order.iter().map(|&i| ActivityId::from(i as usize)).collect();
    let shaken = shake_down(&instance, best_order);

    Ok(Solution {
        instance,
        start_time_by_id: shaken.schedule.start,
        makespan: shaken.schedule.makespan,
        evaluated_schedules: result.evaluated_schedules,
        runtime: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metaheuristic::ReferenceLocalSearch;

    #[test]
    fn end_to_end_produces_a_precedence_feasible_schedule() {
        // scenario 4's instance, run through the full facade.
        let dur = vec![0, 3, 2, 4, 0];
        let cap = vec![1];
        let req = vec![vec![0], vec![1], vec![1], vec![1], vec![0]];
        let succ = vec![
            vec![ActivityId::from(1usize), ActivityId::from(2usize), ActivityId::from(3usize)],
            vec![ActivityId::from(4usize)],
            vec![ActivityId::from(4usize)],
            vec![ActivityId::from(4usize)],
            vec![],
        ];
        let mut config = Config::default();
        config.number_of_set_solutions = 4;
        config.max_iter = 200;
        config.max_iter_since_best = 50;

        let solution = solve(dur, cap, req, succ, config, &ReferenceLocalSearch).unwrap();

        assert_eq!(crate::io::precedence_penalty(&solution.instance, &solution.start_time_by_id), 0);
        assert!(solution.makespan >= solution.instance.cp_bound);
        assert!(solution.makespan >= 9);
    }
}
