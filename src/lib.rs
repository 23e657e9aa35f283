pub mod circuit;
mod config;
mod core;
pub mod library;

pub use crate::core::{
    arena::Arena,
    gate::{Gate, GateId, GateKind, GateType, ProbeSample},
    name::GateName,
};

pub use circuit::{Circuit, CircuitError, CompositeBuilder, LinkState, Prototype};
pub use config::SimConfig;
pub use library::Library;
