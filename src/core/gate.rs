use std::{fmt, ops::Deref, sync::Arc};

use serde::Serialize;

/// Largest input arity among the primitive gates.
pub const MAX_ARITY: usize = 2;

/// Non-owning handle to a gate owned by an [`Arena`](crate::Arena).
///
/// Handles are plain indices: copying one aliases the same gate (fan-out), and
/// they stay valid for the lifetime of the arena that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GateId(pub(crate) usize);

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for GateId {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateType {
    Low,
    Nand,
    Register,
    Probe,
    Input,
}

impl GateType {
    pub const fn arity(self) -> usize {
        match self {
            GateType::Low | GateType::Input => 0,
            GateType::Register | GateType::Probe => 1,
            GateType::Nand => 2,
        }
    }

    /// Number of outputs a placement of this gate exposes.
    pub const fn outputs(self) -> usize {
        match self {
            GateType::Probe => 0,
            _ => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            GateType::Low => "low",
            GateType::Nand => "nand",
            GateType::Register => "register",
            GateType::Probe => "tick - outputonly",
            GateType::Input => "user-input",
        }
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-variant state of a primitive gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateKind {
    Low,
    Nand,
    Register { value: bool, next: bool },
    Probe { label: Arc<str>, ticks: u64 },
    Input { value: bool },
}

impl GateKind {
    pub fn gate_type(&self) -> GateType {
        match self {
            GateKind::Low => GateType::Low,
            GateKind::Nand => GateType::Nand,
            GateKind::Register { .. } => GateType::Register,
            GateKind::Probe { .. } => GateType::Probe,
            GateKind::Input { .. } => GateType::Input,
        }
    }
}

/// One report of a probe, taken during phase 1 of a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProbeSample {
    pub label: String,
    /// Per-probe counter, starting at 1 on the first tick.
    pub tick: u64,
    pub value: bool,
}

impl fmt::Display for ProbeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.value { 'H' } else { 'L' };
        write!(f, "{}: tick{}: {level}", self.label, self.tick)
    }
}

/// A primitive gate: one of the closed set of kinds plus its input wiring.
///
/// Input slots start unresolved and are filled in by `Circuit::link`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate {
    kind: GateKind,
    inputs: [Option<GateId>; MAX_ARITY],
}

impl Gate {
    pub fn new(kind: GateKind) -> Self {
        Self {
            kind,
            inputs: [None; MAX_ARITY],
        }
    }

    pub fn low() -> Self {
        Self::new(GateKind::Low)
    }

    pub fn nand() -> Self {
        Self::new(GateKind::Nand)
    }

    pub fn register() -> Self {
        Self::new(GateKind::Register {
            value: false,
            next: false,
        })
    }

    pub fn probe(label: Arc<str>) -> Self {
        Self::new(GateKind::Probe { label, ticks: 0 })
    }

    pub fn user_input() -> Self {
        Self::new(GateKind::Input { value: false })
    }

    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut GateKind {
        &mut self.kind
    }

    pub fn gate_type(&self) -> GateType {
        self.kind.gate_type()
    }

    pub fn arity(&self) -> usize {
        self.gate_type().arity()
    }

    /// # Panics
    /// Panics if `i` is not below the gate's arity.
    pub fn input(&self, i: usize) -> Option<GateId> {
        self.check_index(i);
        self.inputs[i]
    }

    /// # Panics
    /// Panics if `i` is not below the gate's arity.
    pub fn set_input(&mut self, i: usize, gate: GateId) {
        self.check_index(i);
        self.inputs[i] = Some(gate);
    }

    pub fn inputs(&self) -> &[Option<GateId>] {
        &self.inputs[..self.arity()]
    }

    /// Whether phase 1 needs the current value of input 0.
    pub fn samples_input(&self) -> bool {
        matches!(self.kind, GateKind::Register { .. } | GateKind::Probe { .. })
    }

    /// Sample step of a tick. `input` is the current value of input 0 for
    /// gates that sample it; a probe returns the report it produced.
    pub fn phase1(&mut self, input: bool) -> Option<ProbeSample> {
        match &mut self.kind {
            GateKind::Register { next, .. } => {
                *next = input;
                None
            }
            GateKind::Probe { label, ticks } => {
                *ticks += 1;
                Some(ProbeSample {
                    label: label.to_string(),
                    tick: *ticks,
                    value: input,
                })
            }
            GateKind::Low | GateKind::Nand | GateKind::Input { .. } => None,
        }
    }

    /// Commit step of a tick.
    pub fn phase2(&mut self) {
        if let GateKind::Register { value, next } = &mut self.kind {
            *value = *next;
        }
    }

    #[inline(always)]
    fn check_index(&self, i: usize) {
        let arity = self.arity();
        if i >= arity {
            panic!(
                "input index {i} out of range for {} gate with {arity} inputs",
                self.gate_type()
            );
        }
    }
}
