use std::sync::Arc;

use itertools::Itertools;
use log::debug;

use crate::{
    CircuitError,
    core::gate::{Gate, GateType},
};

/// Reusable, immutable blueprint of a primitive gate or a composite subcircuit.
///
/// Cloning is cheap: composites are shared behind an `Arc`, so one prototype
/// can be placed any number of times and instantiated any number of times.
#[derive(Clone, Debug)]
pub enum Prototype {
    Primitive(Primitive),
    Composite(Arc<Composite>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    Low,
    Nand,
    Register,
    Input,
    Probe(Arc<str>),
}

impl Primitive {
    pub fn gate_type(&self) -> GateType {
        match self {
            Primitive::Low => GateType::Low,
            Primitive::Nand => GateType::Nand,
            Primitive::Register => GateType::Register,
            Primitive::Input => GateType::Input,
            Primitive::Probe(_) => GateType::Probe,
        }
    }

    pub(crate) fn build(&self) -> Gate {
        match self {
            Primitive::Low => Gate::low(),
            Primitive::Nand => Gate::nand(),
            Primitive::Register => Gate::register(),
            Primitive::Input => Gate::user_input(),
            Primitive::Probe(label) => Gate::probe(label.clone()),
        }
    }
}

/// One child of a composite: which prototype, which nets feed its inputs and
/// which nets its outputs drive.
#[derive(Clone, Debug)]
pub struct Placement {
    pub child: Prototype,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// Optional diagnostic label, shown as `{label}: ` in gate names.
    pub label: Option<String>,
}

#[derive(Debug)]
pub struct Composite {
    pub type_name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub placements: Vec<Placement>,
    num_nodes: usize,
}

impl Composite {
    /// Output ports that name one of the composite's own input ports.
    fn pass_through(&self) -> impl Iterator<Item = &String> {
        self.outputs
            .iter()
            .filter(|port| self.inputs.contains(*port))
    }
}

impl Prototype {
    pub fn low() -> Self {
        Self::Primitive(Primitive::Low)
    }

    pub fn nand() -> Self {
        Self::Primitive(Primitive::Nand)
    }

    pub fn register() -> Self {
        Self::Primitive(Primitive::Register)
    }

    /// A gate whose value the host sets through [`Arena::set_input`](crate::Arena::set_input).
    pub fn input() -> Self {
        Self::Primitive(Primitive::Input)
    }

    /// A sink that reports its input once per tick under `label`.
    pub fn probe(label: impl Into<Arc<str>>) -> Self {
        Self::Primitive(Primitive::Probe(label.into()))
    }

    /// Starts a composite with the given external input and output port names.
    pub fn composite(
        type_name: impl Into<String>,
        inputs: &[&str],
        outputs: &[&str],
    ) -> CompositeBuilder {
        CompositeBuilder {
            type_name: type_name.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            placements: Vec::new(),
        }
    }

    pub fn num_inputs(&self) -> usize {
        match self {
            Prototype::Primitive(primitive) => primitive.gate_type().arity(),
            Prototype::Composite(composite) => composite.inputs.len(),
        }
    }

    pub fn num_outputs(&self) -> usize {
        match self {
            Prototype::Primitive(primitive) => primitive.gate_type().outputs(),
            Prototype::Composite(composite) => composite.outputs.len(),
        }
    }

    /// Declared input ports plus every net produced inside.
    pub fn num_nodes(&self) -> usize {
        match self {
            Prototype::Primitive(_) => self.num_inputs() + self.num_outputs(),
            Prototype::Composite(composite) => composite.num_nodes,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Prototype::Primitive(primitive) => primitive.gate_type().as_str(),
            Prototype::Composite(composite) => &composite.type_name,
        }
    }
}

/// Mutable stage of a composite prototype. Only [`finalize`](Self::finalize)
/// turns it into a [`Prototype`] that can be placed or instantiated.
#[derive(Debug)]
pub struct CompositeBuilder {
    type_name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    placements: Vec<Placement>,
}

impl CompositeBuilder {
    pub fn add(
        &mut self,
        child: &Prototype,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<&mut Self, CircuitError> {
        self.place(child, inputs, outputs, None)
    }

    /// Same as [`add`](Self::add), tagging every gate of the child with `label`.
    pub fn add_labeled(
        &mut self,
        label: &str,
        child: &Prototype,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<&mut Self, CircuitError> {
        self.place(child, inputs, outputs, Some(label.to_string()))
    }

    fn place(
        &mut self,
        child: &Prototype,
        inputs: &[&str],
        outputs: &[&str],
        label: Option<String>,
    ) -> Result<&mut Self, CircuitError> {
        for (port, expected, actual) in [
            ("input", child.num_inputs(), inputs.len()),
            ("output", child.num_outputs(), outputs.len()),
        ] {
            if expected != actual {
                return Err(CircuitError::ArityMismatch {
                    child: format!("{}/{}", self.type_name, child.type_name()),
                    port,
                    expected,
                    actual,
                });
            }
        }

        if let Prototype::Composite(composite) = child {
            if let Some(net) = composite.pass_through().next() {
                return Err(CircuitError::PassThroughChild {
                    child: format!("{}/{}", self.type_name, child.type_name()),
                    net: net.clone(),
                });
            }
        }

        self.placements.push(Placement {
            child: child.clone(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            label,
        });
        Ok(self)
    }

    /// Freezes the blueprint.
    ///
    /// Every net may have only one producer in the scope: the outer input
    /// ports and all placement outputs must be pairwise distinct. Every outer
    /// output port and every placement input must name one of them.
    pub fn finalize(self) -> Result<Prototype, CircuitError> {
        let produced = || {
            self.inputs
                .iter()
                .chain(self.placements.iter().flat_map(|p| p.outputs.iter()))
        };

        if let Some(net) = produced().duplicates().next() {
            return Err(CircuitError::DuplicateNet {
                scope: self.type_name.clone(),
                net: net.clone(),
            });
        }

        if let Some(net) = self
            .outputs
            .iter()
            .find(|port| !produced().contains(port))
        {
            return Err(CircuitError::UndrivenOutput {
                scope: self.type_name.clone(),
                net: net.clone(),
            });
        }

        if let Some(net) = self
            .placements
            .iter()
            .flat_map(|p| p.inputs.iter())
            .find(|net| !produced().contains(net))
        {
            return Err(CircuitError::UnknownNet {
                scope: self.type_name.clone(),
                net: net.clone(),
            });
        }

        let num_nodes = produced().count();
        debug!(
            "finalized `{}`: {} inputs, {} outputs, {} placements, {num_nodes} nodes",
            self.type_name,
            self.inputs.len(),
            self.outputs.len(),
            self.placements.len(),
        );

        Ok(Prototype::Composite(Arc::new(Composite {
            type_name: self.type_name,
            inputs: self.inputs,
            outputs: self.outputs,
            placements: self.placements,
            num_nodes,
        })))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn not() -> Prototype {
        let mut not = Prototype::composite("not", &["in"], &["not"]);
        not.add(&Prototype::nand(), &["in", "in"], &["not"]).unwrap();
        not.finalize().unwrap()
    }

    #[test]
    fn primitive_ports() {
        assert_eq!(Prototype::low().num_inputs(), 0);
        assert_eq!(Prototype::nand().num_inputs(), 2);
        assert_eq!(Prototype::register().num_outputs(), 1);
        assert_eq!(Prototype::probe("p").num_outputs(), 0);
        assert_eq!(Prototype::nand().type_name(), "nand");
    }

    #[test]
    fn composite_ports_and_nodes() {
        let mut and = Prototype::composite("and", &["in1", "in2"], &["and"]);
        and.add(&Prototype::nand(), &["in1", "in2"], &["nand"])
            .unwrap()
            .add(&not(), &["nand"], &["and"])
            .unwrap();
        let and = and.finalize().unwrap();

        assert_eq!(and.num_inputs(), 2);
        assert_eq!(and.num_outputs(), 1);
        assert_eq!(and.num_nodes(), 4);
        assert_eq!(and.type_name(), "and");
    }

    #[test]
    fn rejects_input_arity_mismatch() {
        let mut proto = Prototype::composite("bad", &["a"], &[]);
        let err = proto
            .add(&Prototype::nand(), &["a"], &["x"])
            .unwrap_err();

        assert_eq!(
            err,
            CircuitError::ArityMismatch {
                child: "bad/nand".to_string(),
                port: "input",
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn rejects_output_arity_mismatch() {
        let mut proto = Prototype::composite("bad", &[], &[]);
        let err = proto.add(&Prototype::probe("p"), &["x"], &["y"]).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::ArityMismatch { port: "output", expected: 0, actual: 1, .. }
        ));
    }

    #[test]
    fn rejects_duplicate_produced_net() {
        let mut proto = Prototype::composite("dup", &[], &["x"]);
        proto
            .add(&Prototype::low(), &[], &["x"])
            .unwrap()
            .add(&Prototype::low(), &[], &["x"])
            .unwrap();

        assert_eq!(
            proto.finalize().unwrap_err(),
            CircuitError::DuplicateNet {
                scope: "dup".to_string(),
                net: "x".to_string(),
            }
        );
    }

    #[test]
    fn rejects_output_shadowing_input_port() {
        let mut proto = Prototype::composite("shadow", &["a"], &["a"]);
        proto.add(&Prototype::low(), &[], &["a"]).unwrap();

        assert!(matches!(
            proto.finalize(),
            Err(CircuitError::DuplicateNet { .. })
        ));
    }

    #[test]
    fn rejects_undriven_output_port() {
        let mut proto = Prototype::composite("open", &[], &["out"]);
        proto.add(&Prototype::low(), &[], &["low"]).unwrap();

        assert_eq!(
            proto.finalize().unwrap_err(),
            CircuitError::UndrivenOutput {
                scope: "open".to_string(),
                net: "out".to_string(),
            }
        );
    }

    #[test]
    fn one_prototype_many_placements() {
        let not = not();
        let mut double = Prototype::composite("double not", &["in"], &["out"]);
        double
            .add(&not, &["in"], &["mid"])
            .unwrap()
            .add(&not, &["mid"], &["out"])
            .unwrap();
        let double = double.finalize().unwrap();

        let Prototype::Composite(composite) = &double else {
            panic!("expected composite");
        };
        assert_eq!(composite.placements.len(), 2);
        assert_eq!(double.num_nodes(), 3);
    }

    #[test]
    fn rejects_unproduced_placement_input() {
        let mut proto = Prototype::composite("typo", &["a"], &["out"]);
        proto.add(&not(), &["b"], &["out"]).unwrap();

        assert_eq!(
            proto.finalize().unwrap_err(),
            CircuitError::UnknownNet {
                scope: "typo".to_string(),
                net: "b".to_string(),
            }
        );
    }

    #[test]
    fn later_placement_output_counts_as_produced() {
        let mut proto = Prototype::composite("feedback", &[], &["q"]);
        proto
            .add(&Prototype::register(), &["d"], &["q"])
            .unwrap()
            .add(&not(), &["q"], &["d"])
            .unwrap();

        assert!(proto.finalize().is_ok());
    }

    #[test]
    fn rejects_nesting_pass_through_composite() {
        let wire = Prototype::composite("wire", &["in"], &["in"])
            .finalize()
            .unwrap();

        let mut outer = Prototype::composite("outer", &["a"], &["b"]);
        assert_eq!(
            outer.add(&wire, &["a"], &["b"]).unwrap_err(),
            CircuitError::PassThroughChild {
                child: "outer/wire".to_string(),
                net: "in".to_string(),
            }
        );
    }
}
