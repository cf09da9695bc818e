//! Universal Chess Interface (UCI) protocol implementation.
//!
//! Handles communication with chess GUIs over the UCI protocol.
//! Protocol lines go to stdout; diagnostics go through `log`.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Instant;

use crate::board::{SearchInfoCallback, SearchIterationInfo};
use crate::engine::{EngineConfig, EngineController};

pub mod command;
pub mod options;
pub mod report;

pub use command::{parse_go, parse_position, parse_uci_command, UciCommand, UciError};
pub use report::{format_bestmove, format_info};

const ENGINE_NAME: &str = concat!("chess_search ", env!("CARGO_PKG_VERSION"));
const ENGINE_AUTHOR: &str = "the chess_search developers";

/// Whether the loop keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Read commands from stdin until `quit` or end of input.
pub fn run_uci_loop() {
    run_uci(io::stdin().lock());
}

/// Drive the engine from any line source.
///
/// At end of input a running search is allowed to finish so its `bestmove`
/// is still printed.
pub fn run_uci<R: BufRead>(input: R) {
    let mut engine = EngineController::new(EngineConfig::default());
    let info: SearchInfoCallback =
        Arc::new(|info: &SearchIterationInfo| println!("{}", format_info(info)));
    engine.set_info_callback(Some(info));

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::warn!("failed to read input: {err}");
                break;
            }
        };
        let command = match parse_uci_command(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(err)) => {
                log::warn!("ignoring '{}': {err}", line.trim());
                continue;
            }
        };
        if handle_command(&mut engine, command) == Flow::Quit {
            engine.stop();
            return;
        }
    }

    engine.wait();
}

fn handle_command(engine: &mut EngineController, command: UciCommand) -> Flow {
    match command {
        UciCommand::Uci => {
            println!("id name {ENGINE_NAME}");
            println!("id author {ENGINE_AUTHOR}");
            for line in options::option_lines(engine) {
                println!("{line}");
            }
            println!("uciok");
        }
        UciCommand::IsReady => println!("readyok"),
        UciCommand::UciNewGame => engine.new_game(),
        UciCommand::Position(request) => {
            if let Err(err) = engine.set_position(&request) {
                log::warn!("position rejected: {err}");
            }
        }
        UciCommand::Go(request) => {
            let started = engine.go(&request, |result| {
                println!("{}", format_bestmove(result.best_move));
            });
            if let Err(err) = started {
                log::warn!("go rejected: {err}");
            }
        }
        UciCommand::Stop => engine.stop(),
        UciCommand::SetOption { name, value } => {
            if let Err(err) = options::apply_setoption(engine, &name, value.as_deref()) {
                log::warn!("setoption rejected: {err}");
            }
        }
        UciCommand::Perft(depth) => run_perft(engine, depth),
        UciCommand::Display => println!("{}", engine.position()),
        UciCommand::Quit => return Flow::Quit,
        UciCommand::Unknown(text) => log::warn!("unknown command: {text}"),
    }
    Flow::Continue
}

/// `perft N`: per-move counts, then the total.
fn run_perft(engine: &EngineController, depth: u32) {
    if engine.is_searching() {
        log::warn!("perft ignored while searching");
        return;
    }
    let mut pos = engine.position().clone();
    let start = Instant::now();
    let divide = pos.perft_divide(depth);
    let total: u64 = divide.iter().map(|(_, count)| count).sum();
    for (mv, count) in divide {
        println!("{mv}: {count}");
    }
    println!();
    println!("Nodes searched: {total}");
    log::debug!("perft {depth} took {} ms", start.elapsed().as_millis());
}
