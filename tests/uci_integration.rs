use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chess_search::engine::PositionRequest;
use chess_search::uci::parse_position;

fn spawn_engine() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_chess_search");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn engine binary");
    let stdin = child.stdin.take().unwrap();
    let stdout = BufReader::new(child.stdout.take().unwrap());
    (child, stdin, stdout)
}

/// Read lines until one starts with `prefix`; returns everything read.
fn read_until(reader: &mut BufReader<ChildStdout>, prefix: &str) -> (String, Option<String>) {
    let mut output = String::new();
    loop {
        let mut line = String::new();
        let bytes = reader.read_line(&mut line).expect("read failed");
        if bytes == 0 {
            return (output, None);
        }
        output.push_str(&line);
        if line.starts_with(prefix) {
            return (output, Some(line));
        }
    }
}

fn assert_legal(position_args: &[&str], bestmove: &str) {
    let parts: Vec<&str> = bestmove.split_whitespace().collect();
    assert!(parts.len() >= 2, "bestmove missing move: {bestmove}");
    let mv = parts[1];
    assert_ne!(mv, "0000", "engine returned null move");

    let request: PositionRequest = parse_position(position_args).unwrap();
    let pos = request.resolve().unwrap();
    assert!(pos.parse_move(mv).is_ok(), "bestmove not legal in position: {mv}");
}

#[test]
fn uci_smoke_test_returns_legal_move() {
    let (mut child, mut stdin, mut reader) = spawn_engine();

    stdin
        .write_all(b"uci\nisready\nposition startpos moves e2e4\ngo movetime 100\n")
        .unwrap();

    let (output, bestmove) = read_until(&mut reader, "bestmove");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert!(output.contains("id name chess_search"));
    assert!(output.contains("uciok"));
    assert!(output.contains("readyok"));
    assert!(output.contains("info depth 1 "));
    assert!(output.contains("hashfull"));

    assert_legal(&["startpos", "moves", "e2e4"], &bestmove.expect("no bestmove found"));
}

#[test]
fn uci_options_listed() {
    let exe = env!("CARGO_BIN_EXE_chess_search");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn engine binary");

    let input = b"uci\nsetoption name Hash value 4\nsetoption name Threads value 2\nsetoption name Move Overhead value 0\nsetoption name Bogus value 1\nisready\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("option name Hash type spin"));
    assert!(stdout.contains("option name Threads type spin"));
    assert!(stdout.contains("option name Move Overhead"));
    assert!(stdout.contains("uciok"));
    assert!(stdout.contains("readyok"));
}

#[test]
fn uci_go_depth_returns_legal_move() {
    let (mut child, mut stdin, mut reader) = spawn_engine();

    stdin
        .write_all(b"setoption name Threads value 2\nposition fen r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1\ngo depth 3\n")
        .unwrap();

    let (output, bestmove) = read_until(&mut reader, "bestmove");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert!(output.contains("info depth "));
    assert_legal(
        &["fen", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R", "w", "KQkq", "-", "0", "1"],
        &bestmove.expect("no bestmove found"),
    );
}

#[test]
fn uci_reports_mate_score() {
    let (mut child, mut stdin, mut reader) = spawn_engine();

    stdin
        .write_all(b"position fen 6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1\ngo depth 4\n")
        .unwrap();

    let (output, bestmove) = read_until(&mut reader, "bestmove");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert!(output.contains("score mate 1"));
    assert_eq!(bestmove.unwrap().trim(), "bestmove e1e8");
}

#[test]
fn uci_perft_command_outputs_nodes() {
    let (mut child, mut stdin, mut reader) = spawn_engine();

    stdin.write_all(b"position startpos\nperft 2\n").unwrap();

    let (output, total) = read_until(&mut reader, "Nodes searched");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert!(output.contains("e2e4: 20"));
    assert_eq!(total.unwrap().trim(), "Nodes searched: 400");
}

#[test]
fn uci_bad_input_is_ignored() {
    let (mut child, mut stdin, mut reader) = spawn_engine();

    stdin
        .write_all(b"position startpos moves e2e5\nfoo bar\nposition fen nonsense\nd\n")
        .unwrap();

    // The illegal move left the start position in place
    let (output, fen) = read_until(&mut reader, "Fen:");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert!(!output.contains("bestmove"));
    assert_eq!(
        fen.unwrap().trim(),
        "Fen: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    );
}

#[test]
fn uci_stop_interrupts_search() {
    let (mut child, stdin, mut reader) = spawn_engine();
    let stdin = Arc::new(Mutex::new(stdin));

    stdin
        .lock()
        .unwrap()
        .write_all(b"isready\nposition startpos\ngo infinite\n")
        .unwrap();

    let stdin_clone = Arc::clone(&stdin);
    let stop_thread = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        let _ = stdin_clone.lock().unwrap().write_all(b"stop\n");
    });

    let (_, bestmove) = read_until(&mut reader, "bestmove");
    stop_thread.join().unwrap();

    let _ = stdin.lock().unwrap().write_all(b"quit\n");
    let _ = child.wait();

    assert_legal(&["startpos"], &bestmove.expect("no bestmove after stop"));
}
