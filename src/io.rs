//! C13: the §6 binary output format and the §6 textual report formats.
//!
//! The binary layout is a flat sequence of little-endian 32-bit words; it is
//! intentionally decoupled from the in-memory `Instance` representation so
//! that round-tripping it (scenario 6) only depends on this module.

use crate::error::{RcpspError, Result};
use crate::ids::ActivityId;
use crate::instance::Instance;
use std::io::{Read, Write};

/// Everything the §6 binary format carries: the instance's raw arrays plus
/// the best schedule found for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryPayload {
    pub num_activities: u32,
    pub num_resources: u32,
    pub dur: Vec<u32>,
    pub cap: Vec<u32>,
    pub req: Vec<Vec<u32>>,
    pub succ: Vec<Vec<u32>>,
    pub pred: Vec<Vec<u32>>,
    pub schedule_length: u32,
    pub order_by_start_time: Vec<u32>,
    pub start_time_by_id: Vec<u32>,
}

impl BinaryPayload {
    pub fn from_instance(inst: &Instance, schedule_length: u32, start_time_by_id: &[u32]) -> Self {
        let mut order_by_start_time: Vec<ActivityId> = (0..inst.num_activities).map(ActivityId::from).collect();
        order_by_start_time.sort_by_key(|&a| start_time_by_id[usize::from(a)]);

        BinaryPayload {
            num_activities: inst.num_activities as u32,
            num_resources: inst.num_resources as u32,
            dur: inst.dur.clone(),
            cap: inst.cap.clone(),
            req: inst.req.clone(),
            succ: inst.succ.iter().map(|row| row.iter().map(|&a| a.get()).collect()).collect(),
            pred: inst.pred.iter().map(|row| row.iter().map(|&a| a.get()).collect()).collect(),
            schedule_length,
            order_by_start_time: order_by_start_time.iter().map(|a| a.get()).collect(),
            start_time_by_id: start_time_by_id.to_vec(),
        }
    }
}

fn write_u32(w: &mut impl Write, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes()).map_err(RcpspError::from)
}

fn read_u32(r: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn write_binary(payload: &BinaryPayload, w: &mut impl Write) -> Result<()> {
    write_u32(w, payload.num_activities)?;
    write_u32(w, payload.num_resources)?;
    for &d in &payload.dur {
        write_u32(w, d)?;
    }
    for &c in &payload.cap {
        write_u32(w, c)?;
    }
    for row in &payload.req {
        for &v in row {
            write_u32(w, v)?;
        }
    }
    for row in &payload.succ {
        write_u32(w, row.len() as u32)?;
    }
    for row in &payload.succ {
        for &s in row {
            write_u32(w, s)?;
        }
    }
    for row in &payload.pred {
        write_u32(w, row.len() as u32)?;
    }
    for row in &payload.pred {
        for &p in row {
            write_u32(w, p)?;
        }
    }
    write_u32(w, payload.schedule_length)?;
    for &a in &payload.order_by_start_time {
        write_u32(w, a)?;
    }
    for &t in &payload.start_time_by_id {
        write_u32(w, t)?;
    }
    Ok(())
}

pub fn read_binary(r: &mut impl Read) -> Result<BinaryPayload> {
    let num_activities = read_u32(r)?;
    let num_resources = read_u32(r)?;
    let a = num_activities as usize;
    let rr = num_resources as usize;

    let dur = (0..a).map(|_| read_u32(r)).collect::<Result<Vec<_>>>()?;
    let cap = (0..rr).map(|_| read_u32(r)).collect::<Result<Vec<_>>>()?;
    let req = (0..a)
        .map(|_| (0..rr).map(|_| read_u32(r)).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    let n_succ = (0..a).map(|_| read_u32(r)).collect::<Result<Vec<_>>>()?;
    let succ = n_succ
        .iter()
        .map(|&n| (0..n).map(|_| read_u32(r)).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    let n_pred = (0..a).map(|_| read_u32(r)).collect::<Result<Vec<_>>>()?;
    let pred = n_pred
        .iter()
        .map(|&n| (0..n).map(|_| read_u32(r)).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    let schedule_length = read_u32(r)?;
    let order_by_start_time = (0..a).map(|_| read_u32(r)).collect::<Result<Vec<_>>>()?;
    let start_time_by_id = (0..a).map(|_| read_u32(r)).collect::<Result<Vec<_>>>()?;

    Ok(BinaryPayload {
        num_activities,
        num_resources,
        dur,
        cap,
        req,
        succ,
        pred,
        schedule_length,
        order_by_start_time,
        start_time_by_id,
    })
}

/// Verbose schedule print: `start\tactivities` header, then `t:\t<ids>` rows,
/// then summary lines.
pub fn format_verbose(inst: &Instance, start_time_by_id: &[u32], makespan: u32, precedence_penalty: u32, runtime_secs: f64, evaluated_schedules: u64) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    writeln!(out, "start\tactivities").unwrap();

    let mut by_time: std::collections::BTreeMap<u32, Vec<u32>> = std::collections::BTreeMap::new();
    for a in 0..inst.num_activities {
        by_time.entry(start_time_by_id[a]).or_default().push(a as u32);
    }
    for (t, mut acts) in by_time {
        acts.sort_unstable();
        let ids = acts.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ");
        writeln!(out, "{t}:\t{ids}").unwrap();
    }

    writeln!(out, "schedule length: {makespan}").unwrap();
    writeln!(out, "precedence penalty: {precedence_penalty}").unwrap();
    writeln!(out, "critical path makespan: {}", inst.cp_bound).unwrap();
    writeln!(out, "runtime: {runtime_secs:.6} s").unwrap();
    writeln!(out, "evaluated schedules: {evaluated_schedules}").unwrap();
    out
}

/// Non-verbose form: `<L>+<penalty> <cpBound>\t[<sec> s]\t<evaluatedSchedules>`.
pub fn format_compact(makespan: u32, precedence_penalty: u32, cp_bound: u32, runtime_secs: f64, evaluated_schedules: u64) -> String {
    format!("{makespan}+{precedence_penalty} {cp_bound}\t[{runtime_secs:.3} s]\t{evaluated_schedules}")
}

/// Sum over every precedence edge of `max(0, end[u] - start[v])`; zero for
/// any schedule the evaluator emits (P3).
pub fn precedence_penalty(inst: &Instance, start_time_by_id: &[u32]) -> u32 {
    let mut penalty = 0i64;
    for a in 0..inst.num_activities {
        let end_u = start_time_by_id[a] as i64 + inst.dur[a] as i64;
        for &v in &inst.succ[ActivityId::from(a)] {
            let start_v = start_time_by_id[usize::from(v)] as i64;
            penalty += (end_u - start_v).max(0);
        }
    }
    penalty as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bitwise() {
        let inst = Instance::new(
            vec![0, 3, 0],
            vec![1],
            vec![vec![0], vec![1], vec![0]],
            vec![vec![ActivityId::from(1usize)], vec![ActivityId::from(2usize)], vec![]],
        )
        .unwrap();
        let start = vec![0u32, 0, 3];
        let payload = BinaryPayload::from_instance(&inst, 3, &start);

        let mut buf = Vec::new();
        write_binary(&payload, &mut buf).unwrap();
        let read_back = read_binary(&mut buf.as_slice()).unwrap();
        assert_eq!(payload, read_back);
    }

    #[test]
    fn precedence_penalty_is_zero_for_a_feasible_schedule() {
        let inst = Instance::new(
            vec![0, 3, 0],
            vec![1],
            vec![vec![0], vec![1], vec![0]],
            vec![vec![ActivityId::from(1usize)], vec![ActivityId::from(2usize)], vec![]],
        )
        .unwrap();
        let start = vec![0u32, 0, 3];
        assert_eq!(precedence_penalty(&inst, &start), 0);
    }
}
