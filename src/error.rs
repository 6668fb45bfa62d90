//! Error kinds for the solver core, per spec section 7.

use crate::ids::{ActivityId, ResourceId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RcpspError {
    /// An activity requires more of some resource than the resource's own capacity (I2).
    /// Surfaced at `Instance` construction; fatal.
    #[error("activity {activity} requires {required} of resource {resource}, whose capacity is only {capacity}")]
    InstanceInfeasible {
        activity: ActivityId,
        resource: ResourceId,
        required: u32,
        capacity: u32,
    },

    /// The external metaheuristic device refused to start or reported failure.
    #[error("metaheuristic device unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    /// Internal invariant violation in the resource-load tracker: `add` would have driven
    /// free capacity negative. Should never happen on a well-formed instance; treated as a bug.
    #[error("invalid load on resource {resource}: free capacity would become negative in [{start}, {end})")]
    InvalidLoad {
        resource: ResourceId,
        start: u32,
        end: u32,
    },

    /// Serialisation target could not be written to or read from.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RcpspError>;
