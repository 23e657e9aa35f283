use std::env;

use log::warn;

pub const LOOP_CHECK_ENV: &str = "NANDSIM_LOOP_CHECK";
pub const RECORD_PROBES_ENV: &str = "NANDSIM_RECORD_PROBES";

/// Runtime knobs of an [`Arena`](crate::Arena).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Reject purely combinational cycles when a circuit is linked.
    pub loop_check: bool,
    /// Keep probe reports in the arena so the host can drain them.
    ///
    /// The buffer grows by one entry per probe per tick until
    /// [`Arena::drain_samples`](crate::Arena::drain_samples) is called. Turn
    /// this off for long runs that only need the `nandsim::probe` log lines.
    pub record_probes: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            loop_check: true,
            record_probes: true,
        }
    }
}

impl SimConfig {
    /// Defaults overridden by `NANDSIM_LOOP_CHECK` / `NANDSIM_RECORD_PROBES`.
    pub fn from_env() -> Self {
        let default = Self::default();
        let config = Self {
            loop_check: flag(LOOP_CHECK_ENV).unwrap_or(default.loop_check),
            record_probes: flag(RECORD_PROBES_ENV).unwrap_or(default.record_probes),
        };

        if !config.loop_check {
            warn!("combinational loop check disabled, a gate-only cycle will overflow the stack");
        }

        config
    }
}

fn flag(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn default_checks_and_records() {
        let config = SimConfig::default();
        assert!(config.loop_check);
        assert!(config.record_probes);
    }
}
