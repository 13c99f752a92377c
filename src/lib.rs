//! nandnet - mutable networks of multi-input NAND gates
//!
//! Models a logic network as a directed graph of NAND gates. Callers build
//! gates, wire gate outputs into other gates' input slots (or bind slots to
//! caller-owned constant booleans), then evaluate any gate for its boolean
//! output and critical-path depth. The graph is bidirectional: every gate
//! knows both the sources feeding its slots and the consumers reading its
//! output, so rewiring and removal stay consistent in both directions.
//!
//! The library is single-threaded and synchronous; it assumes exclusive
//! access during any mutation or evaluation.
//!
//! # Example
//!
//! ```
//! use nandnet::NandNetwork;
//!
//! let mut net = NandNetwork::new();
//! let a = net.add_gate(2)?;
//! let b = net.add_gate(1)?;
//! net.connect_gate(a, b, 0)?;
//!
//! // A has no gate-bound inputs, so it reads as true; B inverts it.
//! let eval = net.evaluate(b)?;
//! assert!(!eval.value);
//! assert_eq!(eval.depth, 2);
//! # Ok::<(), nandnet::NetError>(())
//! ```

pub mod error;
pub mod eval;
pub mod netlist;

pub use error::{NetError, Result};
pub use eval::{BatchEvaluation, Evaluation};
pub use netlist::{GateId, InputSource, NandNetwork};
