//! Mutable NAND gate network
//!
//! A network is an arena of gates indexed by [`GateId`]. Each gate has a fixed
//! number of input slots and a single output. A slot is bound to another
//! gate's output, to a caller-owned constant boolean, or to nothing. The
//! network also tracks, per gate, the multiset of gates consuming its output,
//! so that rewiring and deletion can walk both directions.
//!
//! Key types:
//! - `NandNetwork` - the arena plus all lifecycle and wiring operations
//! - `GateId` - stable numeric id for a gate (never reused after removal)
//! - `InputSource` - what a bound slot points at, as seen by callers
//!
//! Constant signals are borrowed, never owned: the `'sig` lifetime on the
//! network ties every bound `&bool` to storage the caller keeps alive for at
//! least as long as the network.

use std::fmt;
use std::mem;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{NetError, Result};

/// Unique identifier for a gate in the network.
///
/// Ids are handed out in creation order and never reused; after
/// [`NandNetwork::remove_gate`] the id permanently names nothing and every
/// operation taking it reports [`NetError::InvalidGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateId(pub u32);

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Binding state of one input slot. A slot is in exactly one state at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SlotBinding<'sig> {
    Unbound,
    Gate(GateId),
    Constant(&'sig bool),
}

/// What a bound input slot points at, as returned by [`NandNetwork::input`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputSource<'sig> {
    /// Slot reads the output of another gate
    Gate(GateId),
    /// Slot reads a caller-owned constant
    Constant(&'sig bool),
}

/// A single NAND gate
#[derive(Debug, Clone)]
pub(crate) struct Gate<'sig> {
    /// Input slots, length fixed at creation
    pub(crate) inputs: Vec<SlotBinding<'sig>>,
    /// Gates consuming this gate's output, one entry per bound slot,
    /// oldest first (callers see the reverse order)
    pub(crate) consumers: Vec<GateId>,
    /// Transient depth-first mark, false outside an evaluation call
    pub(crate) on_path: bool,
}

/// Remove the most recently added consumer entry matching `id`, if any.
fn release_consumer(consumers: &mut Vec<GateId>, id: GateId) {
    if let Some(pos) = consumers.iter().rposition(|&c| c == id) {
        consumers.remove(pos);
    }
}

/// A mutable network of NAND gates.
///
/// `'sig` is the lifetime of every constant signal bound into the network;
/// the borrow checker enforces the contract that constants outlive both the
/// bindings and any evaluation that could read them.
#[derive(Debug, Clone, Default)]
pub struct NandNetwork<'sig> {
    /// Gate arena; removed gates leave a `None` tombstone so ids stay stable
    gates: Vec<Option<Gate<'sig>>>,
}

impl<'sig> NandNetwork<'sig> {
    /// Create an empty network
    pub fn new() -> Self {
        Self { gates: Vec::new() }
    }

    /// Number of live gates in the network
    pub fn gate_count(&self) -> usize {
        self.gates.iter().filter(|g| g.is_some()).count()
    }

    /// True if the network holds no live gates
    pub fn is_empty(&self) -> bool {
        self.gate_count() == 0
    }

    /// True if `id` names a live gate
    pub fn contains(&self, id: GateId) -> bool {
        self.slot(id).is_some()
    }

    fn slot(&self, id: GateId) -> Option<&Gate<'sig>> {
        self.gates.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: GateId) -> Option<&mut Gate<'sig>> {
        self.gates.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub(crate) fn gate(&self, id: GateId) -> Result<&Gate<'sig>> {
        self.slot(id).ok_or(NetError::InvalidGate(id))
    }

    pub(crate) fn gate_mut(&mut self, id: GateId) -> Result<&mut Gate<'sig>> {
        self.slot_mut(id).ok_or(NetError::InvalidGate(id))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Add a gate with `arity` input slots, all unbound.
    ///
    /// Reports [`NetError::Alloc`] if memory cannot be reserved; on failure
    /// no partial gate is left in the network.
    pub fn add_gate(&mut self, arity: usize) -> Result<GateId> {
        let raw = u32::try_from(self.gates.len()).map_err(|_| NetError::Alloc)?;
        self.gates.try_reserve(1).map_err(|_| NetError::Alloc)?;
        let mut inputs = Vec::new();
        inputs
            .try_reserve_exact(arity)
            .map_err(|_| NetError::Alloc)?;
        inputs.resize(arity, SlotBinding::Unbound);
        self.gates.push(Some(Gate {
            inputs,
            consumers: Vec::new(),
            on_path: false,
        }));
        let id = GateId(raw);
        trace!(gate = %id, arity, "added gate");
        Ok(id)
    }

    /// Remove a gate, severing every relationship it participates in.
    ///
    /// Each slot bound to a producer releases exactly one entry from that
    /// producer's consumer multiset, and each entry in this gate's own
    /// consumer multiset clears the first slot of that consumer still bound
    /// here, so a consumer bound on several slots has all of them cleared.
    /// Removing an id that no longer names a live gate is a no-op.
    pub fn remove_gate(&mut self, id: GateId) {
        let Some(gate) = self.gates.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };

        for binding in &gate.inputs {
            if let SlotBinding::Gate(p) = *binding {
                if let Some(producer) = self.slot_mut(p) {
                    release_consumer(&mut producer.consumers, id);
                }
            }
        }

        for &c in &gate.consumers {
            if let Some(consumer) = self.slot_mut(c) {
                let bound_here = consumer
                    .inputs
                    .iter()
                    .position(|s| matches!(s, SlotBinding::Gate(p) if *p == id));
                if let Some(k) = bound_here {
                    consumer.inputs[k] = SlotBinding::Unbound;
                }
            }
        }

        trace!(gate = %id, "removed gate");
    }

    // ========================================================================
    // Connectivity
    // ========================================================================

    /// Bind input slot `slot` of `consumer` to the output of `producer`.
    ///
    /// A previous gate binding on the slot releases one matching entry from
    /// the old producer's consumer multiset; a previous constant binding is
    /// simply dropped. Self-loops and parallel edges between the same pair
    /// of gates are permitted. On [`NetError::Alloc`] the graph is left in
    /// its prior state.
    pub fn connect_gate(&mut self, producer: GateId, consumer: GateId, slot: usize) -> Result<()> {
        self.gate(producer)?;
        let arity = self.gate(consumer)?.inputs.len();
        if slot >= arity {
            return Err(NetError::SlotOutOfRange {
                gate: consumer,
                slot,
                arity,
            });
        }

        // Reserve before any mutation so the operation is all-or-nothing.
        let source = self.gate_mut(producer)?;
        source.consumers.try_reserve(1).map_err(|_| NetError::Alloc)?;
        source.consumers.push(consumer);

        let prev = mem::replace(
            &mut self.gate_mut(consumer)?.inputs[slot],
            SlotBinding::Gate(producer),
        );
        if let SlotBinding::Gate(old) = prev {
            if let Some(gate) = self.slot_mut(old) {
                release_consumer(&mut gate.consumers, consumer);
            }
        }
        Ok(())
    }

    /// Bind input slot `slot` of `gate` to a caller-owned constant.
    ///
    /// Constants are not tracked in consumer multisets; a previous gate
    /// binding on the slot releases one matching entry from its producer.
    pub fn connect_signal(&mut self, signal: &'sig bool, gate: GateId, slot: usize) -> Result<()> {
        let arity = self.gate(gate)?.inputs.len();
        if slot >= arity {
            return Err(NetError::SlotOutOfRange { gate, slot, arity });
        }

        let prev = mem::replace(
            &mut self.gate_mut(gate)?.inputs[slot],
            SlotBinding::Constant(signal),
        );
        if let SlotBinding::Gate(p) = prev {
            if let Some(producer) = self.slot_mut(p) {
                release_consumer(&mut producer.consumers, gate);
            }
        }
        Ok(())
    }

    /// Reset input slot `slot` of `gate` to unbound, releasing one matching
    /// producer consumer entry if the slot held a gate binding.
    pub fn clear_input(&mut self, gate: GateId, slot: usize) -> Result<()> {
        let arity = self.gate(gate)?.inputs.len();
        if slot >= arity {
            return Err(NetError::SlotOutOfRange { gate, slot, arity });
        }

        let prev = mem::replace(&mut self.gate_mut(gate)?.inputs[slot], SlotBinding::Unbound);
        if let SlotBinding::Gate(p) = prev {
            if let Some(producer) = self.slot_mut(p) {
                release_consumer(&mut producer.consumers, gate);
            }
        }
        Ok(())
    }

    /// Number of input slots on `gate`
    pub fn arity(&self, gate: GateId) -> Result<usize> {
        Ok(self.gate(gate)?.inputs.len())
    }

    /// What input slot `slot` of `gate` is bound to, or `None` if unbound
    pub fn input(&self, gate: GateId, slot: usize) -> Result<Option<InputSource<'sig>>> {
        let g = self.gate(gate)?;
        match g.inputs.get(slot) {
            Some(SlotBinding::Unbound) => Ok(None),
            Some(SlotBinding::Gate(p)) => Ok(Some(InputSource::Gate(*p))),
            Some(SlotBinding::Constant(s)) => Ok(Some(InputSource::Constant(s))),
            None => Err(NetError::SlotOutOfRange {
                gate,
                slot,
                arity: g.inputs.len(),
            }),
        }
    }

    /// Size of `gate`'s consumer multiset (one entry per bound slot)
    pub fn fan_out(&self, gate: GateId) -> Result<usize> {
        Ok(self.gate(gate)?.consumers.len())
    }

    /// The `index`-th consumer of `gate`, most recently added first
    pub fn output(&self, gate: GateId, index: usize) -> Result<GateId> {
        let consumers = &self.gate(gate)?.consumers;
        let fan_out = consumers.len();
        if index >= fan_out {
            return Err(NetError::OutputOutOfRange {
                gate,
                index,
                fan_out,
            });
        }
        Ok(consumers[fan_out - 1 - index])
    }
}

// ============================================================================
// Tests
// ============================================================================
