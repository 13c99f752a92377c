//! Error types for network mutation and evaluation

use thiserror::Error;

use crate::netlist::GateId;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetError>;

/// Errors reported by network mutation and evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NetError {
    /// Gate id is stale or was never allocated
    #[error("gate {0} is not present in the network")]
    InvalidGate(GateId),

    /// Input slot index is past the gate's arity
    #[error("input slot {slot} out of range for gate {gate} with arity {arity}")]
    SlotOutOfRange {
        gate: GateId,
        slot: usize,
        arity: usize,
    },

    /// Consumer index is past the gate's fan-out
    #[error("output index {index} out of range for gate {gate} with fan-out {fan_out}")]
    OutputOutOfRange {
        gate: GateId,
        index: usize,
        fan_out: usize,
    },

    /// Batch evaluation was given no gates
    #[error("evaluation batch is empty")]
    EmptyBatch,

    /// Memory could not be reserved during creation or connection
    #[error("failed to reserve memory for the network")]
    Alloc,

    /// Evaluation revisited a gate already on its own active path
    #[error("combinational cycle detected at gate {0}")]
    Cycle(GateId),
}
