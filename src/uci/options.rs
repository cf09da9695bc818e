//! UCI options and how they map onto the engine configuration.

use thiserror::Error;

use crate::engine::{EngineController, EngineError};

/// Largest hash size accepted from the GUI, in MB
pub const MAX_HASH_MB: usize = 65_536;

/// Largest thread count accepted from the GUI
pub const MAX_THREADS: usize = 256;

/// Largest move overhead accepted from the GUI, in ms
pub const MAX_MOVE_OVERHEAD_MS: u64 = 5000;

/// `option` lines sent in reply to `uci`.
#[must_use]
pub fn option_lines(engine: &EngineController) -> Vec<String> {
    let config = engine.config();
    vec![
        format!(
            "option name Hash type spin default {} min 1 max {MAX_HASH_MB}",
            config.hash_mb
        ),
        format!(
            "option name Threads type spin default {} min 1 max {MAX_THREADS}",
            config.threads
        ),
        format!(
            "option name Move Overhead type spin default {} min 0 max {MAX_MOVE_OVERHEAD_MS}",
            config.move_overhead_ms
        ),
        "option name Clear Hash type button".to_string(),
    ]
}

/// Outcome of a `setoption` the engine did not apply.
#[derive(Debug, Error)]
pub enum OptionRejected {
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("bad value {value:?} for option '{name}'")]
    BadValue { name: String, value: Option<String> },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Apply `setoption name <name> value <value>` to the engine.
pub fn apply_setoption(
    engine: &mut EngineController,
    name: &str,
    value: Option<&str>,
) -> Result<(), OptionRejected> {
    let bad_value = || OptionRejected::BadValue {
        name: name.to_string(),
        value: value.map(str::to_string),
    };
    let normalized = name.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "hash" => {
            let mb = value
                .and_then(|v| v.trim().parse::<usize>().ok())
                .ok_or_else(bad_value)?;
            engine
                .set_hash_mb(mb.clamp(1, MAX_HASH_MB))
                .map_err(OptionRejected::from)
        }
        "threads" => {
            let threads = value
                .and_then(|v| v.trim().parse::<usize>().ok())
                .ok_or_else(bad_value)?;
            engine
                .set_threads(threads.clamp(1, MAX_THREADS))
                .map_err(OptionRejected::from)
        }
        "move overhead" => {
            let ms = value
                .and_then(|v| v.trim().parse::<u64>().ok())
                .ok_or_else(bad_value)?;
            engine.set_move_overhead_ms(ms.min(MAX_MOVE_OVERHEAD_MS));
            Ok(())
        }
        "clear hash" => {
            engine.tt().clear();
            Ok(())
        }
        _ => Err(OptionRejected::UnknownOption(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;

    fn engine() -> EngineController {
        EngineController::new(EngineConfig::default().hash_mb(1))
    }

    #[test]
    fn hash_and_threads_applied() {
        let mut engine = engine();
        apply_setoption(&mut engine, "Hash", Some("8")).unwrap();
        apply_setoption(&mut engine, "threads", Some("4")).unwrap();
        apply_setoption(&mut engine, "Move Overhead", Some("100")).unwrap();
        assert_eq!(engine.config().hash_mb, 8);
        assert_eq!(engine.config().threads, 4);
        assert_eq!(engine.config().move_overhead_ms, 100);
    }

    #[test]
    fn rejected_options() {
        let mut engine = engine();
        assert!(matches!(
            apply_setoption(&mut engine, "Hash", Some("lots")),
            Err(OptionRejected::BadValue { .. })
        ));
        assert!(matches!(
            apply_setoption(&mut engine, "Ponder", Some("true")),
            Err(OptionRejected::UnknownOption(_))
        ));
        assert_eq!(engine.config().hash_mb, 1);
    }

    #[test]
    fn option_lines_reflect_config() {
        let lines = option_lines(&engine());
        assert!(lines[0].starts_with("option name Hash type spin default 1 "));
        assert!(lines[1].contains("Threads"));
    }
}
