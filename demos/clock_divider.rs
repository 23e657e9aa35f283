// Clock divider demo.
// - a free-running clock drives a chain of clock halvers
// - every stage is probed; probe lines are logged under `nandsim::probe`
// - the recorded samples are printed as JSON at the end

use log::info;
use nandsim::{Arena, Library, Prototype, SimConfig};

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let ticks = std::env::var("TICKS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(24);

    let lib = Library::build().expect("library");

    let mut divider = Prototype::composite("divider", &[], &[]);
    divider
        .add_labeled("osc", &lib.clock, &[], &["clk"])
        .expect("clock")
        .add_labeled("half", &lib.halver, &["clk"], &["clk/2"])
        .expect("halver")
        .add_labeled("quarter", &lib.halver, &["clk/2"], &["clk/4"])
        .expect("halver")
        .add(&Prototype::probe("clk"), &["clk"], &[])
        .expect("probe")
        .add(&Prototype::probe("clk/2"), &["clk/2"], &[])
        .expect("probe")
        .add(&Prototype::probe("clk/4"), &["clk/4"], &[])
        .expect("probe");
    let divider = divider.finalize().expect("finalize");

    let mut arena = Arena::with_config(SimConfig::from_env());
    let mut circuit = divider.instantiate(&mut arena).expect("instantiate");
    circuit.link(&mut arena, &[]).expect("link");

    info!("divider: {} gates, running {ticks} ticks", arena.len());
    for name in arena.dump() {
        log::debug!("{name}");
    }

    arena.run(ticks);

    let samples = arena.drain_samples();
    println!(
        "{}",
        serde_json::to_string_pretty(&samples).expect("serialize samples")
    );
}
