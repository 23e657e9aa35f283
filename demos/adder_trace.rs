// 8+8 bit adder demo.
// - feeds random byte pairs into the ripple adder, one pair per tick
// - checks every sum against integer addition
// - TICKS sets how many pairs are tried

use log::{info, warn};
use nandsim::{Arena, GateId, Library, Prototype, SimConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let ticks = std::env::var("TICKS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(24);

    let lib = Library::build().expect("library");
    let mut arena = Arena::with_config(SimConfig::from_env());

    let inputs: Vec<GateId> = (0..lib.adder8.num_inputs())
        .map(|_| {
            Prototype::input()
                .instantiate(&mut arena)
                .and_then(|c| c.output(0))
                .expect("input")
        })
        .collect();
    let mut adder = lib.adder8.instantiate(&mut arena).expect("instantiate");
    adder.link(&mut arena, &inputs).expect("link");
    let outputs = adder.outputs().expect("outputs");

    let mut carry_probe = Prototype::probe("carry")
        .instantiate(&mut arena)
        .expect("probe");
    carry_probe
        .link(&mut arena, &[outputs[8]])
        .expect("probe link");

    info!("adder: {} gates", arena.len());

    let mut rng = ChaCha20Rng::seed_from_u64(12345);
    let mut mismatches = 0usize;
    for _ in 0..ticks {
        let (x, y): (u8, u8) = (rng.random(), rng.random());
        for bit in 0..8 {
            arena.set_input(inputs[7 - bit], x >> bit & 1 == 1);
            arena.set_input(inputs[15 - bit], y >> bit & 1 == 1);
        }

        let sum = (0..8)
            .filter(|&bit| arena.value(outputs[7 - bit]))
            .fold(0u16, |acc, bit| acc | 1 << bit)
            | u16::from(arena.value(outputs[8])) << 8;

        if sum == u16::from(x) + u16::from(y) {
            info!("tick{}: {x} + {y} = {sum}", arena.ticks() + 1);
        } else {
            warn!("tick{}: {x} + {y} gave {sum}", arena.ticks() + 1);
            mismatches += 1;
        }
        arena.tick();
    }

    println!(
        "{}",
        serde_json::to_string(&arena.drain_samples()).expect("serialize samples")
    );
    info!("{ticks} sums, {mismatches} mismatches");
}
