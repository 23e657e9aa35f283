//! Synchronous two-phase tick.
//!
//! Phase 1 lets every sampling gate read the *committed* state of the graph and
//! stage its next value; phase 2 commits all staged values at once. Nothing
//! staged in phase 1 is visible through [`Arena::value`] until phase 2, so the
//! order gates are visited within a phase does not affect the result.

use log::info;

use super::{arena::Arena, gate::GateId};

impl Arena {
    /// Advances every gate by one clock tick.
    ///
    /// # Panics
    /// Panics if a register or probe in the arena has an unlinked input, or a
    /// gate read while sampling does. Gates of a circuit whose `link` failed
    /// stay in the arena unlinked, so an arena holding one can no longer tick.
    pub fn tick(&mut self) {
        for index in 0..self.len() {
            let id = GateId(index);
            if !self.gate(id).samples_input() {
                continue;
            }

            let input = self.input_value(id, 0);
            if let Some(sample) = self.gate_mut(id).phase1(input) {
                info!(target: "nandsim::probe", "{sample}");
                if self.config().record_probes {
                    self.samples.push(sample);
                }
            }
        }

        for gate in self.gates_mut() {
            gate.phase2();
        }

        self.ticks += 1;
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}
