use std::{collections::HashMap, ops::Range};

use log::trace;

use crate::{
    CircuitError, SimConfig,
    core::{
        gate::{Gate, GateId, GateKind, GateType, ProbeSample},
        name::GateName,
    },
};

struct Entry {
    name: GateName,
    gate: Gate,
}

/// Sole owner of every primitive gate of one simulation run.
///
/// Gates are only ever appended; a [`GateId`] is the index of its entry and
/// stays valid until the arena is dropped. Ticking mutates gate state, never
/// the set of gates.
pub struct Arena {
    gates: Vec<Entry>,
    pub(super) samples: Vec<ProbeSample>,
    pub(super) ticks: u64,
    config: SimConfig,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            gates: Vec::new(),
            samples: Vec::new(),
            ticks: 0,
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Takes ownership of `gate` and returns the handle it is known by.
    pub fn allocate(&mut self, name: GateName, gate: Gate) -> GateId {
        let id = GateId(self.gates.len());
        trace!("allocate gate {id}: {name}");
        self.gates.push(Entry { name, gate });
        id
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id.0].gate
    }

    pub(crate) fn gate_mut(&mut self, id: GateId) -> &mut Gate {
        &mut self.gates[id.0].gate
    }

    pub(super) fn gates_mut(&mut self) -> impl Iterator<Item = &mut Gate> {
        self.gates.iter_mut().map(|entry| &mut entry.gate)
    }

    pub fn name(&self, id: GateId) -> &GateName {
        &self.gates[id.0].name
    }

    pub fn gate_type(&self, id: GateId) -> GateType {
        self.gate(id).gate_type()
    }

    /// Diagnostic names of all gates, in creation order.
    pub fn dump(&self) -> Vec<String> {
        self.gates
            .iter()
            .map(|entry| entry.name.to_string())
            .collect()
    }

    /// Current observable output of a gate.
    ///
    /// Combinational gates are evaluated recursively from their inputs'
    /// current values, registers return their committed value.
    ///
    /// # Panics
    /// Panics if an input on the evaluation path is not linked, or if `id`
    /// names a probe (probes have no output).
    pub fn value(&self, id: GateId) -> bool {
        match self.gate(id).kind() {
            GateKind::Low => false,
            GateKind::Nand => !(self.input_value(id, 0) && self.input_value(id, 1)),
            GateKind::Register { value, .. } => *value,
            GateKind::Input { value } => *value,
            GateKind::Probe { label, .. } => {
                panic!("probe `{label}` ({}) has no output", self.name(id))
            }
        }
    }

    pub(super) fn input_value(&self, id: GateId, i: usize) -> bool {
        let input = self
            .gate(id)
            .input(i)
            .unwrap_or_else(|| panic!("gate `{}` input {i} is not linked", self.name(id)));
        self.value(input)
    }

    /// Drives a user input gate. Takes effect for every read from now on.
    ///
    /// # Panics
    /// Panics if `id` is not an input gate.
    pub fn set_input(&mut self, id: GateId, new_value: bool) {
        let name = self.name(id).to_string();
        match self.gate_mut(id).kind_mut() {
            GateKind::Input { value } => *value = new_value,
            other => panic!("gate `{name}` is a {} gate, not an input", other.gate_type()),
        }
    }

    /// Probe reports recorded so far, oldest first.
    ///
    /// The buffer is only emptied by [`drain_samples`](Self::drain_samples).
    pub fn samples(&self) -> &[ProbeSample] {
        &self.samples
    }

    pub fn drain_samples(&mut self) -> Vec<ProbeSample> {
        std::mem::take(&mut self.samples)
    }

    /// Finds a gate lying on a cycle made only of combinational gates.
    ///
    /// Only NAND gates pull their inputs when read, so every other gate type
    /// terminates a path. Unlinked inputs are ignored.
    pub fn find_combinational_loop(&self) -> Option<GateId> {
        self.find_combinational_loop_from((0..self.gates.len()).map(GateId))
    }

    /// Same search, started only from `starts`. Any cycle through one of
    /// them is found; the walk may leave the start set.
    pub fn find_combinational_loop_from(
        &self,
        starts: impl IntoIterator<Item = GateId>,
    ) -> Option<GateId> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Open,
            Done,
        }

        let mut marks: HashMap<usize, Mark> = HashMap::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in starts {
            if marks.contains_key(&start.0) {
                continue;
            }
            marks.insert(start.0, Mark::Open);
            stack.push((start.0, 0));

            while let Some(top) = stack.last_mut() {
                let (node, slot) = *top;
                let inputs = self.pulled_inputs(node);

                if slot == inputs.len() {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                    continue;
                }
                top.1 += 1;

                let Some(child) = inputs[slot] else {
                    continue;
                };
                match marks.get(&child.0) {
                    Some(Mark::Open) => return Some(child),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(child.0, Mark::Open);
                        stack.push((child.0, 0));
                    }
                }
            }
        }

        None
    }

    fn pulled_inputs(&self, index: usize) -> &[Option<GateId>] {
        let gate = &self.gates[index].gate;
        match gate.kind() {
            GateKind::Nand => gate.inputs(),
            _ => &[],
        }
    }

    /// Loop check over the cycles reachable from the gates in `range`.
    pub(crate) fn check_combinational_loops(
        &self,
        range: Range<usize>,
    ) -> Result<(), CircuitError> {
        match self.find_combinational_loop_from(range.map(GateId)) {
            None => Ok(()),
            Some(id) => Err(CircuitError::CombinationalLoop {
                gate: self.name(id).to_string(),
            }),
        }
    }
}
