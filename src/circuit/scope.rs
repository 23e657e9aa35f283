use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use log::trace;

use crate::{CircuitError, GateId};

/// Net-name symbol table of one composite instantiation.
///
/// Filled with every placement output while instantiating and with the outer
/// input ports once linking has succeeded.
#[derive(Debug)]
pub struct Scope {
    name: Arc<str>,
    nets: HashMap<String, GateId>,
}

impl Scope {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            nets: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bind(&mut self, net: &str, gate: GateId) -> Result<(), CircuitError> {
        match self.nets.entry(net.to_string()) {
            Entry::Occupied(_) => Err(CircuitError::DuplicateNet {
                scope: self.name.to_string(),
                net: net.to_string(),
            }),
            Entry::Vacant(vacant) => {
                trace!("[{}] bind `{net}` -> gate {gate}", self.name);
                vacant.insert(gate);
                Ok(())
            }
        }
    }

    pub fn get(&self, net: &str) -> Option<GateId> {
        self.nets.get(net).copied()
    }

    pub fn resolve(&self, net: &str) -> Result<GateId, CircuitError> {
        self.get(net).ok_or_else(|| CircuitError::UnknownNet {
            scope: self.name.to_string(),
            net: net.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }
}
