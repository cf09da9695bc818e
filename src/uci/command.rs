//! Parsing of UCI input lines into typed commands.

use thiserror::Error;

use crate::engine::{GoRequest, PositionRequest};

/// Error type for UCI command parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UciError {
    /// `position` without `startpos` or `fen`
    #[error("position command needs 'startpos' or 'fen'")]
    MissingPosition,
    /// `position fen` with no FEN fields
    #[error("position fen needs a FEN string")]
    MissingFen,
    /// Something other than `moves` after the position
    #[error("unexpected token '{0}' in position command")]
    UnexpectedToken(String),
    /// `setoption` without a name
    #[error("setoption needs a name")]
    MissingOptionName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(PositionRequest),
    Go(GoRequest),
    Stop,
    SetOption { name: String, value: Option<String> },
    Perft(u32),
    /// `d`: print the current position
    Display,
    Quit,
    Unknown(String),
}

/// Parse one input line. Empty lines give `None`.
///
/// A malformed `position` or `setoption` is an error; unknown commands are
/// returned as [`UciCommand::Unknown`] so the caller can ignore them.
pub fn parse_uci_command(line: &str) -> Option<Result<UciCommand, UciError>> {
    let trimmed = line.trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *parts.first()?;

    let cmd = match first {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => return Some(parse_position(&parts[1..]).map(UciCommand::Position)),
        "go" => UciCommand::Go(parse_go(&parts[1..])),
        "stop" => UciCommand::Stop,
        "setoption" => {
            return Some(
                parse_setoption(&parts[1..]).map(|(name, value)| UciCommand::SetOption { name, value }),
            )
        }
        "perft" => {
            let depth = parts.get(1).and_then(|v| v.parse::<u32>().ok()).unwrap_or(1);
            UciCommand::Perft(depth)
        }
        "d" => UciCommand::Display,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    };

    Some(Ok(cmd))
}

/// Parse the arguments of `position` (everything after the keyword).
pub fn parse_position(parts: &[&str]) -> Result<PositionRequest, UciError> {
    let (request, rest) = match parts.first() {
        Some(&"startpos") => (PositionRequest::startpos(), &parts[1..]),
        Some(&"fen") => {
            let fen_len = parts[1..]
                .iter()
                .position(|p| *p == "moves")
                .unwrap_or(parts.len() - 1);
            if fen_len == 0 {
                return Err(UciError::MissingFen);
            }
            let fen = parts[1..=fen_len].join(" ");
            (PositionRequest::fen(fen), &parts[1 + fen_len..])
        }
        _ => return Err(UciError::MissingPosition),
    };

    match rest.split_first() {
        None => Ok(request),
        Some((&"moves", moves)) => Ok(request.with_moves(moves.iter().copied())),
        Some((other, _)) => Err(UciError::UnexpectedToken((*other).to_string())),
    }
}

/// Parse the arguments of `go`. Unknown or malformed tokens are skipped.
#[must_use]
pub fn parse_go(parts: &[&str]) -> GoRequest {
    let mut request = GoRequest::default();
    let mut i = 0;
    while i < parts.len() {
        let value = parts.get(i + 1).and_then(|v| v.parse::<u64>().ok());
        let consumed = match parts[i] {
            "infinite" => {
                request.infinite = true;
                1
            }
            "wtime" => {
                request.wtime_ms = value;
                2
            }
            "btime" => {
                request.btime_ms = value;
                2
            }
            "winc" => {
                request.winc_ms = value;
                2
            }
            "binc" => {
                request.binc_ms = value;
                2
            }
            "movestogo" => {
                request.movestogo = value;
                2
            }
            "movetime" => {
                request.movetime_ms = value;
                2
            }
            "depth" => {
                request.depth = value.and_then(|d| u32::try_from(d).ok());
                2
            }
            "nodes" => {
                request.nodes = value;
                2
            }
            _ => 1,
        };
        i += consumed;
    }
    request
}

/// Split `name <words..> [value <words..>]`.
fn parse_setoption(parts: &[&str]) -> Result<(String, Option<String>), UciError> {
    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut in_value = false;
    let mut seen_name = false;

    for part in parts {
        match *part {
            "name" if !seen_name => seen_name = true,
            "value" if seen_name && !in_value => in_value = true,
            _ if in_value => value_parts.push(part),
            _ if seen_name => name_parts.push(part),
            _ => {}
        }
    }

    if name_parts.is_empty() {
        return Err(UciError::MissingOptionName);
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> UciCommand {
        parse_uci_command(line).unwrap().unwrap()
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("uci"), UciCommand::Uci);
        assert_eq!(parse("  isready \n"), UciCommand::IsReady);
        assert_eq!(parse("ucinewgame"), UciCommand::UciNewGame);
        assert_eq!(parse("stop"), UciCommand::Stop);
        assert_eq!(parse("d"), UciCommand::Display);
        assert_eq!(parse("quit"), UciCommand::Quit);
        assert_eq!(parse("perft 4"), UciCommand::Perft(4));
        assert_eq!(parse("perft"), UciCommand::Perft(1));
        assert_eq!(parse("xyzzy 1"), UciCommand::Unknown("xyzzy 1".to_string()));
        assert!(parse_uci_command("   ").is_none());
    }

    #[test]
    fn position_startpos_with_moves() {
        assert_eq!(
            parse("position startpos moves e2e4 e7e5"),
            UciCommand::Position(PositionRequest::startpos().with_moves(["e2e4", "e7e5"]))
        );
        assert_eq!(
            parse("position startpos"),
            UciCommand::Position(PositionRequest::startpos())
        );
    }

    #[test]
    fn position_fen_with_and_without_counters() {
        let full = "8/8/8/8/8/8/8/K6k w - - 3 40";
        assert_eq!(
            parse(&format!("position fen {full} moves a1a2")),
            UciCommand::Position(PositionRequest::fen(full).with_moves(["a1a2"]))
        );
        let short = "8/8/8/8/8/8/8/K6k b - -";
        assert_eq!(
            parse(&format!("position fen {short}")),
            UciCommand::Position(PositionRequest::fen(short))
        );
    }

    #[test]
    fn malformed_position() {
        assert_eq!(parse_position(&[]), Err(UciError::MissingPosition));
        assert_eq!(parse_position(&["fen"]), Err(UciError::MissingFen));
        assert_eq!(parse_position(&["fen", "moves", "e2e4"]), Err(UciError::MissingFen));
        assert_eq!(
            parse_position(&["startpos", "e2e4"]),
            Err(UciError::UnexpectedToken("e2e4".to_string()))
        );
    }

    #[test]
    fn go_with_clock() {
        let go = parse_go(&["wtime", "60000", "btime", "55000", "winc", "1000", "binc", "900", "movestogo", "20"]);
        assert_eq!(go.wtime_ms, Some(60_000));
        assert_eq!(go.btime_ms, Some(55_000));
        assert_eq!(go.winc_ms, Some(1000));
        assert_eq!(go.binc_ms, Some(900));
        assert_eq!(go.movestogo, Some(20));
        assert!(!go.infinite);
    }

    #[test]
    fn go_limits_and_junk() {
        let go = parse_go(&["depth", "7", "nodes", "5000", "ponder", "movetime", "abc"]);
        assert_eq!(go.depth, Some(7));
        assert_eq!(go.nodes, Some(5000));
        assert_eq!(go.movetime_ms, None);
        assert!(parse_go(&["infinite"]).infinite);
    }

    #[test]
    fn setoption_multi_word() {
        assert_eq!(
            parse("setoption name Hash value 64"),
            UciCommand::SetOption {
                name: "Hash".to_string(),
                value: Some("64".to_string())
            }
        );
        assert_eq!(
            parse("setoption name Clear Hash"),
            UciCommand::SetOption {
                name: "Clear Hash".to_string(),
                value: None
            }
        );
        assert_eq!(
            parse_uci_command("setoption value 3"),
            Some(Err(UciError::MissingOptionName))
        );
    }
}
