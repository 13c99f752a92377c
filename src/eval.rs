//! Recursive network evaluation
//!
//! Computes a gate's boolean output together with its critical-path depth,
//! the length of the longest gate-to-gate dependency chain feeding it.
//! Evaluation walks producers depth-first, marking each gate while it is on
//! the active path; revisiting a marked gate is a combinational cycle and
//! aborts the call. Marks are transient: they are cleared on every return
//! path, so a failed evaluation leaves the network ready for the next call.
//!
//! Only gate-bound slots participate: slots that are unbound or bound to a
//! constant contribute neither to the boolean result nor to the depth. A
//! caller must not rely on a constant-bound slot influencing the output.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{NetError, Result};
use crate::netlist::{GateId, NandNetwork, SlotBinding};

/// Result of evaluating a single gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Boolean output of the gate
    pub value: bool,
    /// Length of the longest gate-to-gate dependency chain used
    pub depth: usize,
}

/// Result of evaluating a batch of gates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEvaluation {
    /// Boolean output per requested gate, in request order
    pub values: Vec<bool>,
    /// Maximum depth observed across the batch
    pub max_depth: usize,
}

impl<'sig> NandNetwork<'sig> {
    /// Evaluate a single gate.
    ///
    /// A gate with arity 0 is `false` at depth 0. Otherwise the output is
    /// NAND across the gate-bound inputs: `false` exactly when every
    /// gate-bound input evaluated `true`, and `true` when there are no
    /// gate-bound inputs at all. Reports [`NetError::Cycle`] if the
    /// dependency walk revisits a gate already on the active path.
    pub fn evaluate(&mut self, gate: GateId) -> Result<Evaluation> {
        self.gate(gate)?;
        let (value, depth) = self.evaluate_gate(gate)?;
        Ok(Evaluation { value, depth })
    }

    /// Evaluate several gates independently, returning their outputs in
    /// request order and the maximum depth observed.
    ///
    /// No results are shared between gates in the batch; overlapping
    /// subgraphs are recomputed per gate. The call is all-or-nothing: an
    /// empty batch, a stale id, or a cycle in any gate's dependency walk
    /// fails the whole call with no partial results.
    pub fn evaluate_many(&mut self, gates: &[GateId]) -> Result<BatchEvaluation> {
        if gates.is_empty() {
            return Err(NetError::EmptyBatch);
        }
        for &g in gates {
            self.gate(g)?;
        }

        let mut values = Vec::with_capacity(gates.len());
        let mut max_depth = 0;
        for &g in gates {
            let (value, depth) = self.evaluate_gate(g)?;
            values.push(value);
            max_depth = max_depth.max(depth);
        }
        Ok(BatchEvaluation { values, max_depth })
    }

    fn evaluate_gate(&mut self, id: GateId) -> Result<(bool, usize)> {
        let gate = self.gate_mut(id)?;
        let arity = gate.inputs.len();
        if arity == 0 {
            return Ok((false, 0));
        }
        if gate.on_path {
            // Back on a gate still being evaluated: combinational cycle.
            gate.on_path = false;
            trace!(gate = %id, "combinational cycle");
            return Err(NetError::Cycle(id));
        }
        gate.on_path = true;

        let mut gate_bound = 0usize;
        let mut all_true = true;
        let mut depth = 0usize;
        for k in 0..arity {
            let producer = match self.gate(id)?.inputs[k] {
                SlotBinding::Gate(p) => p,
                SlotBinding::Unbound | SlotBinding::Constant(_) => continue,
            };
            match self.evaluate_gate(producer) {
                Ok((value, d)) => {
                    gate_bound += 1;
                    depth = depth.max(d);
                    if !value {
                        all_true = false;
                    }
                }
                Err(err) => {
                    self.gate_mut(id)?.on_path = false;
                    return Err(err);
                }
            }
        }

        self.gate_mut(id)?.on_path = false;
        let value = if gate_bound == 0 { true } else { !all_true };
        Ok((value, depth + 1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_zero_is_false_at_depth_zero() {
        let mut net = NandNetwork::new();
        let g = net.add_gate(0).unwrap();
        assert_eq!(
            net.evaluate(g),
            Ok(Evaluation {
                value: false,
                depth: 0
            })
        );
    }

    #[test]
    fn unbound_inputs_are_vacuously_true() {
        let mut net = NandNetwork::new();
        let g = net.add_gate(2).unwrap();
        assert_eq!(
            net.evaluate(g),
            Ok(Evaluation {
                value: true,
                depth: 1
            })
        );
    }

    #[test]
    fn single_producer_example() {
        // A has arity 2 with both slots unbound, B reads A.
        let mut net = NandNetwork::new();
        let a = net.add_gate(2).unwrap();
        let b = net.add_gate(1).unwrap();
        net.connect_gate(a, b, 0).unwrap();
        // A is vacuously true, so B = NAND(true) = false, two levels deep.
        assert_eq!(
            net.evaluate(b),
            Ok(Evaluation {
                value: false,
                depth: 2
            })
        );
    }

    #[test]
    fn nand_truth_table() {
        let mut net = NandNetwork::new();
        // Arity-0 gates are constant false; feed them through single-input
        // gates to get both polarities.
        let low = net.add_gate(0).unwrap();
        let high = net.add_gate(1).unwrap();
        net.connect_gate(low, high, 0).unwrap();

        let cases = [
            (low, low, true),
            (low, high, true),
            (high, low, true),
            (high, high, false),
        ];
        for (x, y, expected) in cases {
            let g = net.add_gate(2).unwrap();
            net.connect_gate(x, g, 0).unwrap();
            net.connect_gate(y, g, 1).unwrap();
            assert_eq!(net.evaluate(g).unwrap().value, expected);
        }
    }

    #[test]
    fn inverter_chain_alternates_with_depth() {
        let n = 6;
        let mut net = NandNetwork::new();
        let mut gates = vec![net.add_gate(0).unwrap()];
        for i in 1..n {
            let g = net.add_gate(1).unwrap();
            net.connect_gate(gates[i - 1], g, 0).unwrap();
            gates.push(g);
        }
        for (i, &g) in gates.iter().enumerate() {
            let eval = net.evaluate(g).unwrap();
            assert_eq!(eval.value, i % 2 == 1);
            assert_eq!(eval.depth, i);
        }
    }

    #[test]
    fn diamond_sharing_recomputes() {
        let mut net = NandNetwork::new();
        let a = net.add_gate(0).unwrap();
        let b = net.add_gate(1).unwrap();
        let c = net.add_gate(1).unwrap();
        let d = net.add_gate(2).unwrap();
        net.connect_gate(a, b, 0).unwrap();
        net.connect_gate(a, c, 0).unwrap();
        net.connect_gate(b, d, 0).unwrap();
        net.connect_gate(c, d, 1).unwrap();
        assert_eq!(
            net.evaluate(d),
            Ok(Evaluation {
                value: false,
                depth: 2
            })
        );
    }

    #[test]
    fn constant_bound_slots_do_not_participate() {
        let low = false;
        let mut net = NandNetwork::new();
        let a = net.add_gate(0).unwrap();
        let inv = net.add_gate(1).unwrap();
        net.connect_gate(a, inv, 0).unwrap();

        let g = net.add_gate(2).unwrap();
        net.connect_signal(&low, g, 0).unwrap();
        net.connect_gate(inv, g, 1).unwrap();
        // Only the gate-bound slot counts: NAND(true) = false, and the
        // constant adds nothing to the depth.
        assert_eq!(
            net.evaluate(g),
            Ok(Evaluation {
                value: false,
                depth: 2
            })
        );
    }

    #[test]
    fn direct_self_loop_is_a_cycle() {
        let mut net = NandNetwork::new();
        let g = net.add_gate(1).unwrap();
        net.connect_gate(g, g, 0).unwrap();
        assert_eq!(net.evaluate(g), Err(NetError::Cycle(g)));
        // Marks were restored, so the same failure reproduces.
        assert_eq!(net.evaluate(g), Err(NetError::Cycle(g)));
    }

    #[test]
    fn two_gate_cycle_is_detected() {
        let mut net = NandNetwork::new();
        let a = net.add_gate(1).unwrap();
        let b = net.add_gate(1).unwrap();
        net.connect_gate(a, b, 0).unwrap();
        net.connect_gate(b, a, 0).unwrap();
        assert!(matches!(net.evaluate(a), Err(NetError::Cycle(_))));
    }

    #[test]
    fn failed_evaluation_leaves_no_marks() {
        let mut net = NandNetwork::new();
        let looped = net.add_gate(1).unwrap();
        net.connect_gate(looped, looped, 0).unwrap();
        let a = net.add_gate(0).unwrap();
        let b = net.add_gate(1).unwrap();
        net.connect_gate(a, b, 0).unwrap();

        assert!(net.evaluate(looped).is_err());
        // An unrelated acyclic gate still evaluates cleanly afterwards.
        assert_eq!(
            net.evaluate(b),
            Ok(Evaluation {
                value: true,
                depth: 1
            })
        );
    }

    #[test]
    fn breaking_a_cycle_restores_evaluation() {
        let mut net = NandNetwork::new();
        let g = net.add_gate(1).unwrap();
        net.connect_gate(g, g, 0).unwrap();
        assert!(net.evaluate(g).is_err());

        net.clear_input(g, 0).unwrap();
        assert_eq!(
            net.evaluate(g),
            Ok(Evaluation {
                value: true,
                depth: 1
            })
        );
    }

    #[test]
    fn evaluate_stale_id_is_invalid() {
        let mut net = NandNetwork::new();
        let g = net.add_gate(1).unwrap();
        net.remove_gate(g);
        assert_eq!(net.evaluate(g), Err(NetError::InvalidGate(g)));
    }

    #[test]
    fn batch_returns_max_depth_and_positional_values() {
        let mut net = NandNetwork::new();
        let a = net.add_gate(0).unwrap();
        let b = net.add_gate(1).unwrap();
        let c = net.add_gate(1).unwrap();
        net.connect_gate(a, b, 0).unwrap();
        net.connect_gate(b, c, 0).unwrap();

        let batch = net.evaluate_many(&[a, b, c]).unwrap();
        assert_eq!(batch.values, vec![false, true, false]);
        assert_eq!(batch.max_depth, 2);
    }

    #[test]
    fn batch_rejects_empty_input() {
        let mut net = NandNetwork::new();
        assert_eq!(net.evaluate_many(&[]), Err(NetError::EmptyBatch));
    }

    #[test]
    fn batch_fails_as_a_whole_on_cycle() {
        let mut net = NandNetwork::new();
        let ok = net.add_gate(0).unwrap();
        let looped = net.add_gate(1).unwrap();
        net.connect_gate(looped, looped, 0).unwrap();
        assert_eq!(
            net.evaluate_many(&[ok, looped]),
            Err(NetError::Cycle(looped))
        );
    }

    #[test]
    fn batch_fails_as_a_whole_on_stale_id() {
        let mut net = NandNetwork::new();
        let a = net.add_gate(0).unwrap();
        let gone = net.add_gate(0).unwrap();
        net.remove_gate(gone);
        assert_eq!(net.evaluate_many(&[a, gone]), Err(NetError::InvalidGate(gone)));
    }

    #[test]
    fn batch_may_repeat_gates() {
        let mut net = NandNetwork::new();
        let g = net.add_gate(2).unwrap();
        let batch = net.evaluate_many(&[g, g, g]).unwrap();
        assert_eq!(batch.values, vec![true, true, true]);
        assert_eq!(batch.max_depth, 1);
    }
}
