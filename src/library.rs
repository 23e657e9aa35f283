//! Standard subcircuits built from the three primitives.
//!
//! These are ordinary client prototypes; nothing in the simulator depends on
//! them.

use crate::{CircuitError, Prototype};

/// A set of commonly used prototypes, each built once and shared.
#[derive(Clone, Debug)]
pub struct Library {
    pub low: Prototype,
    pub nand: Prototype,
    pub register: Prototype,
    pub not: Prototype,
    pub and: Prototype,
    pub or: Prototype,
    pub xor: Prototype,
    /// `value' = (data | set) & !reset`, registered.
    pub sr_flip_flop: Prototype,
    /// Loads `data` when `enable` is high, holds otherwise.
    pub d_flip_flop: Prototype,
    /// Single-bit adder of three inputs: outputs `value`, `carry`.
    pub adder: Prototype,
    /// Ripple adder; inputs `a8..a1, b8..b1`, outputs `c8..c1, carry`.
    pub adder8: Prototype,
    /// Register fed by its own inverse; toggles every tick.
    pub clock: Prototype,
    /// High for one tick after the input falls.
    pub falling_edge_detector: Prototype,
    /// Toggles on every falling edge of `clk`.
    pub halver: Prototype,
}

impl Library {
    pub fn build() -> Result<Self, CircuitError> {
        let low = Prototype::low();
        let nand = Prototype::nand();
        let register = Prototype::register();

        let mut not = Prototype::composite("not", &["in"], &["not"]);
        not.add(&nand, &["in", "in"], &["not"])?;
        let not = not.finalize()?;

        let mut and = Prototype::composite("and", &["in1", "in2"], &["and"]);
        and.add(&nand, &["in1", "in2"], &["nand"])?
            .add(&not, &["nand"], &["and"])?;
        let and = and.finalize()?;

        let mut or = Prototype::composite("or", &["in1", "in2"], &["or"]);
        or.add(&not, &["in1"], &["nin1"])?
            .add(&not, &["in2"], &["nin2"])?
            .add(&nand, &["nin1", "nin2"], &["or"])?;
        let or = or.finalize()?;

        let mut xor = Prototype::composite("xor", &["in1", "in2"], &["xor"]);
        xor.add(&or, &["in1", "in2"], &["or"])?
            .add(&nand, &["in1", "in2"], &["nand"])?
            .add(&and, &["or", "nand"], &["xor"])?;
        let xor = xor.finalize()?;

        let mut sr = Prototype::composite("SR flip-flop", &["data", "set", "reset"], &["value"]);
        sr.add(&or, &["data", "set"], &["settable"])?
            .add(&not, &["reset"], &["nreset"])?
            .add(&and, &["nreset", "settable"], &["register"])?
            .add(&register, &["register"], &["value"])?;
        let sr_flip_flop = sr.finalize()?;

        // (data nand enable) nand ((not data nand enable) nand value)
        let mut d = Prototype::composite("D flip-flop", &["data", "enable"], &["value"]);
        d.add(&nand, &["data", "enable"], &["force high"])?
            .add(&not, &["data"], &["not data"])?
            .add(&nand, &["not data", "enable"], &["force low"])?
            .add(&nand, &["force low", "value"], &["value with forced low"])?
            .add(&nand, &["force high", "value with forced low"], &["new value"])?
            .add(&register, &["new value"], &["value"])?;
        let d_flip_flop = d.finalize()?;

        let mut adder = Prototype::composite("3-bit adder", &["1", "2", "3"], &["value", "carry"]);
        adder
            .add(&xor, &["1", "2"], &["1x2"])?
            .add(&xor, &["1x2", "3"], &["value"])?
            .add(&and, &["1", "2"], &["12"])?
            .add(&and, &["1", "3"], &["13"])?
            .add(&and, &["3", "2"], &["32"])?
            .add(&or, &["12", "13"], &["12+13"])?
            .add(&or, &["12+13", "32"], &["carry"])?;
        let adder = adder.finalize()?;

        let adder8 = ripple_adder(&low, &adder)?;

        let mut clock = Prototype::composite("clock", &[], &["out"]);
        clock
            .add(&register, &["in"], &["out"])?
            .add(&not, &["out"], &["in"])?;
        let clock = clock.finalize()?;

        let mut down = Prototype::composite("falling edge detector", &["clk"], &["down"]);
        down.add(&register, &["clk"], &["old clk"])?
            .add(&not, &["clk"], &["not clk"])?
            .add(&and, &["old clk", "not clk"], &["down"])?;
        let falling_edge_detector = down.finalize()?;

        let mut halver = Prototype::composite("clock halver", &["clk"], &["new current"]);
        halver
            .add_labeled("down detector", &falling_edge_detector, &["clk"], &["down"])?
            .add(&register, &["new current"], &["current"])?
            .add_labeled("change on down", &xor, &["current", "down"], &["new current"])?;
        let halver = halver.finalize()?;

        Ok(Self {
            low,
            nand,
            register,
            not,
            and,
            or,
            xor,
            sr_flip_flop,
            d_flip_flop,
            adder,
            adder8,
            clock,
            falling_edge_detector,
            halver,
        })
    }
}

fn ripple_adder(low: &Prototype, adder: &Prototype) -> Result<Prototype, CircuitError> {
    const BITS: usize = 8;

    let a: Vec<String> = (1..=BITS).rev().map(|i| format!("a{i}")).collect();
    let b: Vec<String> = (1..=BITS).rev().map(|i| format!("b{i}")).collect();
    let c: Vec<String> = (1..=BITS).rev().map(|i| format!("c{i}")).collect();

    let inputs: Vec<&str> = a.iter().chain(&b).map(String::as_str).collect();
    let outputs: Vec<&str> = c.iter().map(String::as_str).chain(["carry"]).collect();

    let mut proto = Prototype::composite("8+8 bit adder", &inputs, &outputs);
    proto.add(low, &[], &["carry0"])?;

    for bit in 1..=BITS {
        let carry_in = format!("carry{}", bit - 1);
        let carry_out = if bit == BITS {
            "carry".to_string()
        } else {
            format!("carry{bit}")
        };
        let (a, b, c) = (format!("a{bit}"), format!("b{bit}"), format!("c{bit}"));
        proto.add(adder, &[&a, &b, &carry_in], &[&c, &carry_out])?;
    }

    proto.finalize()
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use test_log::test;

    use super::*;
    use crate::{Arena, GateId, test_utils::trng};

    /// Places `proto` behind one user input per port and links it.
    fn bench(arena: &mut Arena, proto: &Prototype) -> (Vec<GateId>, Vec<GateId>) {
        let inputs: Vec<GateId> = (0..proto.num_inputs())
            .map(|_| {
                Prototype::input()
                    .instantiate(arena)
                    .and_then(|c| c.output(0))
                    .unwrap()
            })
            .collect();
        let mut circuit = proto.instantiate(arena).unwrap();
        circuit.link(arena, &inputs).unwrap();
        (inputs, circuit.outputs().unwrap())
    }

    fn truth_table(proto: &Prototype, f: fn(bool, bool) -> bool) {
        let mut arena = Arena::new();
        let (inputs, outputs) = bench(&mut arena, proto);

        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            arena.set_input(inputs[0], a);
            arena.set_input(inputs[1], b);
            assert_eq!(
                arena.value(outputs[0]),
                f(a, b),
                "{}({a}, {b})",
                proto.type_name()
            );
        }
    }

    #[test]
    fn builds() {
        Library::build().unwrap();
    }

    #[test]
    fn two_input_gates() {
        let lib = Library::build().unwrap();
        truth_table(&lib.and, |a, b| a && b);
        truth_table(&lib.or, |a, b| a || b);
        truth_table(&lib.xor, |a, b| a ^ b);
        truth_table(&lib.nand, |a, b| !(a && b));
    }

    #[test]
    fn adder_truth_table() {
        let lib = Library::build().unwrap();
        let mut arena = Arena::new();
        let (inputs, outputs) = bench(&mut arena, &lib.adder);

        for bits in 0u8..8 {
            let values = [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0];
            for (&input, &value) in inputs.iter().zip(&values) {
                arena.set_input(input, value);
            }
            let ones = values.iter().filter(|&&v| v).count();
            assert_eq!(arena.value(outputs[0]), ones % 2 == 1, "value for {values:?}");
            assert_eq!(arena.value(outputs[1]), ones >= 2, "carry for {values:?}");
        }
    }

    #[test]
    fn ripple_adder_adds_bytes() {
        let lib = Library::build().unwrap();
        let mut arena = Arena::new();
        let (inputs, outputs) = bench(&mut arena, &lib.adder8);

        let mut rng = trng();
        let random = (0..32).map(|_| {
            let (x, y): (u8, u8) = (rng.random(), rng.random());
            (u16::from(x), u16::from(y))
        });
        for (x, y) in [(0u16, 0u16), (1, 1), (255, 255)].into_iter().chain(random) {
            // inputs are a8..a1 then b8..b1, most significant first
            for bit in 0..8 {
                arena.set_input(inputs[7 - bit], x >> bit & 1 == 1);
                arena.set_input(inputs[15 - bit], y >> bit & 1 == 1);
            }
            let mut sum = 0u16;
            for bit in 0..8 {
                if arena.value(outputs[7 - bit]) {
                    sum |= 1 << bit;
                }
            }
            if arena.value(outputs[8]) {
                sum |= 1 << 8;
            }
            assert_eq!(sum, x + y, "{x} + {y}");
        }
    }

    #[test]
    fn sr_flip_flop_sets_and_resets() {
        let lib = Library::build().unwrap();
        let mut arena = Arena::new();
        let (inputs, outputs) = bench(&mut arena, &lib.sr_flip_flop);
        let [data, set, reset] = [inputs[0], inputs[1], inputs[2]];
        let value = outputs[0];

        arena.set_input(set, true);
        arena.tick();
        assert!(arena.value(value));

        arena.set_input(set, false);
        arena.set_input(data, true);
        arena.tick();
        assert!(arena.value(value));

        arena.set_input(reset, true);
        arena.tick();
        assert!(!arena.value(value));
    }

    #[test]
    fn d_flip_flop_loads_when_enabled() {
        let lib = Library::build().unwrap();
        let mut arena = Arena::new();
        let (inputs, outputs) = bench(&mut arena, &lib.d_flip_flop);
        let (data, enable, value) = (inputs[0], inputs[1], outputs[0]);

        arena.set_input(data, true);
        arena.tick();
        assert!(!arena.value(value), "holds while disabled");

        arena.set_input(enable, true);
        arena.tick();
        assert!(arena.value(value));

        arena.set_input(enable, false);
        arena.set_input(data, false);
        arena.run(3);
        assert!(arena.value(value), "keeps the loaded bit");

        arena.set_input(enable, true);
        arena.tick();
        assert!(!arena.value(value));
    }

    #[test]
    fn falling_edge_detector_pulses_once() {
        let lib = Library::build().unwrap();
        let mut arena = Arena::new();
        let (inputs, outputs) = bench(&mut arena, &lib.falling_edge_detector);
        let (clk, down) = (inputs[0], outputs[0]);

        arena.set_input(clk, true);
        arena.tick();
        assert!(!arena.value(down));

        arena.set_input(clk, false);
        assert!(arena.value(down));
        arena.tick();
        assert!(!arena.value(down));
    }
}
