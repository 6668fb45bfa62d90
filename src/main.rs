//! C12: CLI binary. Loads a plain-text instance (spec.md section 6's demo
//! format), runs it through [`aries_rcpsp::solve`] against the in-process
//! reference metaheuristic, and prints the textual report.

use aries_rcpsp::ids::ActivityId;
use aries_rcpsp::metaheuristic::ReferenceLocalSearch;
use aries_rcpsp::{io, solve, Config};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rcpsp", about = "Resource-constrained project scheduling solver")]
struct Cli {
    /// Plain-text instance file; reads stdin when omitted.
    instance: Option<PathBuf>,

    /// Print the per-timestep activity table in addition to the summary line.
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    config: Config,
}

/// Hand-rolled whitespace tokenizer for the demo instance format, in the
/// spirit of the teacher's `examples/scheduling/src/parser.rs`: one instance
/// per file, `A R` then `dur`, `cap`, `req[a][0..R)` per activity, then a
/// `nSucc succ...` line per activity.
struct InstanceParser<'a> {
    tokens: std::str::SplitAsciiWhitespace<'a>,
}

impl<'a> InstanceParser<'a> {
    fn new(text: &'a str) -> Self {
        InstanceParser { tokens: text.split_ascii_whitespace() }
    }

    fn next_u32(&mut self) -> anyhow::Result<u32> {
        self.tokens
            .next()
            .ok_or_else(|| anyhow::anyhow!("unexpected end of input"))?
            .parse()
            .map_err(|e| anyhow::anyhow!("malformed integer: {e}"))
    }

    fn parse(mut self) -> anyhow::Result<(Vec<u32>, Vec<u32>, Vec<Vec<u32>>, Vec<Vec<ActivityId>>)> {
        let num_activities = self.next_u32()? as usize;
        let num_resources = self.next_u32()? as usize;

        let dur = (0..num_activities).map(|_| self.next_u32()).collect::<anyhow::Result<Vec<_>>>()?;
        let cap = (0..num_resources).map(|_| self.next_u32()).collect::<anyhow::Result<Vec<_>>>()?;
        let req = (0..num_activities)
            .map(|_| (0..num_resources).map(|_| self.next_u32()).collect::<anyhow::Result<Vec<_>>>())
            .collect::<anyhow::Result<Vec<_>>>()?;

        let succ = (0..num_activities)
            .map(|_| {
                let n_succ = self.next_u32()? as usize;
                (0..n_succ).map(|_| self.next_u32().map(|s| ActivityId::from(s as usize))).collect::<anyhow::Result<Vec<_>>>()
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok((dur, cap, req, succ))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let text = match &cli.instance {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let (dur, cap, req, succ) = InstanceParser::new(&text).parse()?;

    let solution = solve(dur, cap, req, succ, cli.config, &ReferenceLocalSearch)?;
    let penalty = io::precedence_penalty(&solution.instance, &solution.start_time_by_id);

    if cli.verbose {
        print!(
            "{}",
            io::format_verbose(
                &solution.instance,
                &solution.start_time_by_id,
                solution.makespan,
                penalty,
                solution.runtime.as_secs_f64(),
                solution.evaluated_schedules,
            )
        );
    } else {
        println!(
            "{}",
            io::format_compact(solution.makespan, penalty, solution.instance.cp_bound, solution.runtime.as_secs_f64(), solution.evaluated_schedules)
        );
    }

    Ok(())
}
