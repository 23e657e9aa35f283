//! Instantiation and linking of prototypes.
//!
//! Building a circuit is a two-pass protocol:
//!
//! 1. [`Prototype::instantiate`] walks the blueprint, allocates every primitive
//!    gate in the arena and records, per composite scope, which gate drives
//!    each produced net. No gate input is wired yet.
//! 2. [`Circuit::link`] binds the outer input ports into each scope and wires
//!    every placement's inputs by name.
//!
//! Because a scope knows all of its produced nets before anything is linked,
//! a placement may consume a net produced by a placement declared after it.
//! That is how feedback through a register is expressed.

use std::{ops::Range, sync::Arc};

use log::debug;

use crate::{
    Arena, CircuitError,
    circuit::{
        prototype::{Composite, Prototype},
        scope::Scope,
    },
    core::{gate::GateId, name::GateName},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Constructed,
    Linked,
}

/// Live result of instantiating a prototype.
///
/// Only meaningful while the circuit is being built; once linked, the gates
/// in the arena carry all the wiring and the circuit is just a way to look up
/// the handles of its outputs and internal nets.
#[derive(Debug)]
pub struct Circuit {
    state: LinkState,
    /// Arena indices allocated for this circuit and everything below it.
    gates: Range<usize>,
    body: Body,
}

#[derive(Debug)]
enum Body {
    Gate {
        id: GateId,
        inputs: usize,
        outputs: usize,
    },
    Composite {
        blueprint: Arc<Composite>,
        scope: Scope,
        children: Vec<Circuit>,
    },
}

impl Prototype {
    /// Allocates all gates of this prototype in `arena`.
    pub fn instantiate(&self, arena: &mut Arena) -> Result<Circuit, CircuitError> {
        self.instantiate_with_prefix(arena, &GateName::root())
    }

    /// Like [`instantiate`](Self::instantiate), prefixing every gate name.
    pub fn instantiate_with_prefix(
        &self,
        arena: &mut Arena,
        prefix: &GateName,
    ) -> Result<Circuit, CircuitError> {
        let before = arena.len();
        let circuit = self.build(arena, prefix)?;
        debug!(
            "instantiated `{}`: {} gates allocated",
            self.type_name(),
            arena.len() - before
        );
        Ok(circuit)
    }

    fn build(&self, arena: &mut Arena, prefix: &GateName) -> Result<Circuit, CircuitError> {
        let first = arena.len();
        let body = match self {
            Prototype::Primitive(primitive) => {
                let gate_type = primitive.gate_type();
                let id = arena.allocate(prefix.with_type(gate_type.as_str()), primitive.build());
                Body::Gate {
                    id,
                    inputs: gate_type.arity(),
                    outputs: gate_type.outputs(),
                }
            }
            Prototype::Composite(blueprint) => {
                let prefix = prefix.with_type(&blueprint.type_name);
                let mut scope = Scope::new(blueprint.type_name.as_str());
                let mut children = Vec::with_capacity(blueprint.placements.len());

                for placement in &blueprint.placements {
                    let child_prefix = match &placement.label {
                        Some(label) => prefix.with_child(label),
                        None => prefix.clone(),
                    };
                    let child = placement.child.build(arena, &child_prefix)?;

                    for (i, net) in placement.outputs.iter().enumerate() {
                        scope.bind(net, child.output(i)?)?;
                    }
                    children.push(child);
                }

                Body::Composite {
                    blueprint: blueprint.clone(),
                    scope,
                    children,
                }
            }
        };

        Ok(Circuit {
            state: LinkState::Constructed,
            gates: first..arena.len(),
            body,
        })
    }
}

impl Circuit {
    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_linked(&self) -> bool {
        self.state == LinkState::Linked
    }

    pub fn num_inputs(&self) -> usize {
        match &self.body {
            Body::Gate { inputs, .. } => *inputs,
            Body::Composite { blueprint, .. } => blueprint.inputs.len(),
        }
    }

    pub fn num_outputs(&self) -> usize {
        match &self.body {
            Body::Gate { outputs, .. } => *outputs,
            Body::Composite { blueprint, .. } => blueprint.outputs.len(),
        }
    }

    fn scope_name(&self) -> String {
        match &self.body {
            Body::Gate { .. } => "gate".to_string(),
            Body::Composite { scope, .. } => scope.name().to_string(),
        }
    }

    /// Handle of the gate driving the `i`-th declared output port.
    pub fn output(&self, i: usize) -> Result<GateId, CircuitError> {
        if i >= self.num_outputs() {
            return Err(CircuitError::OutputIndex {
                scope: self.scope_name(),
                index: i,
                outputs: self.num_outputs(),
            });
        }

        match &self.body {
            Body::Gate { id, .. } => Ok(*id),
            Body::Composite {
                blueprint, scope, ..
            } => {
                let net = &blueprint.outputs[i];
                scope.get(net).ok_or_else(|| CircuitError::OutputNotReady {
                    scope: scope.name().to_string(),
                    net: net.clone(),
                })
            }
        }
    }

    pub fn outputs(&self) -> Result<Vec<GateId>, CircuitError> {
        (0..self.num_outputs()).map(|i| self.output(i)).collect()
    }

    /// Gate driving a named net of this circuit's own scope, e.g. the handle
    /// of a user input gate placed inside it.
    pub fn net(&self, name: &str) -> Option<GateId> {
        match &self.body {
            Body::Gate { .. } => None,
            Body::Composite { scope, .. } => scope.get(name),
        }
    }

    /// Wires the circuit to `inputs`, one handle per declared input port.
    ///
    /// A wrong number of inputs is rejected before any gate is touched. When
    /// the arena's loop check is enabled, a gate-only cycle through this
    /// circuit's gates is reported as [`CircuitError::CombinationalLoop`].
    /// Only cycles reachable from those gates are searched.
    pub fn link(&mut self, arena: &mut Arena, inputs: &[GateId]) -> Result<(), CircuitError> {
        self.link_inner(arena, inputs)?;
        debug!("linked `{}` with {} inputs", self.scope_name(), inputs.len());

        if arena.config().loop_check {
            arena.check_combinational_loops(self.gates.clone())?;
        }
        Ok(())
    }

    fn link_inner(&mut self, arena: &mut Arena, inputs: &[GateId]) -> Result<(), CircuitError> {
        if self.is_linked() {
            return Err(CircuitError::AlreadyLinked {
                scope: self.scope_name(),
            });
        }
        if inputs.len() != self.num_inputs() {
            return Err(CircuitError::InputCount {
                scope: self.scope_name(),
                expected: self.num_inputs(),
                actual: inputs.len(),
            });
        }

        match &mut self.body {
            Body::Gate { id, .. } => {
                let gate = arena.gate_mut(*id);
                for (i, &input) in inputs.iter().enumerate() {
                    gate.set_input(i, input);
                }
            }
            Body::Composite {
                blueprint,
                scope,
                children,
            } => {
                // Ports are written into the scope last, so a failed link
                // leaves it as instantiate built it.
                let resolve = |net: &String| {
                    match blueprint.inputs.iter().position(|port| port == net) {
                        Some(port) => Ok(inputs[port]),
                        None => scope.resolve(net),
                    }
                };
                let resolved = blueprint
                    .placements
                    .iter()
                    .map(|placement| {
                        placement
                            .inputs
                            .iter()
                            .map(resolve)
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                for (child, child_inputs) in children.iter_mut().zip(resolved) {
                    child.link_inner(arena, &child_inputs)?;
                }
                for (port, &input) in blueprint.inputs.iter().zip(inputs) {
                    scope.bind(port, input)?;
                }
            }
        }

        self.state = LinkState::Linked;
        Ok(())
    }
}
