//! Formatting of the lines the engine sends back to the GUI.

use std::fmt::Write as _;

use crate::board::{Move, SearchIterationInfo};

/// `info ...` line for one completed iteration.
#[must_use]
pub fn format_info(info: &SearchIterationInfo) -> String {
    let score = match info.mate_in() {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {}", info.score),
    };
    let mut line = format!(
        "info depth {} seldepth {} score {} nodes {} nps {} time {} hashfull {}",
        info.depth, info.seldepth, score, info.nodes, info.nps, info.time_ms, info.hashfull
    );
    if !info.pv.is_empty() {
        line.push_str(" pv");
        for mv in &info.pv {
            let _ = write!(line, " {mv}");
        }
    }
    line
}

#[must_use]
pub fn format_bestmove(best_move: Option<Move>) -> String {
    match best_move {
        Some(mv) => format!("bestmove {mv}"),
        None => "bestmove 0000".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, MATE_SCORE};

    fn info(score: i32, pv: Vec<Move>) -> SearchIterationInfo {
        SearchIterationInfo {
            depth: 5,
            seldepth: 9,
            score,
            nodes: 12_345,
            nps: 600_000,
            time_ms: 20,
            hashfull: 3,
            pv,
        }
    }

    #[test]
    fn centipawn_info_line() {
        let pos = Position::startpos();
        let pv = vec![pos.parse_move("e2e4").unwrap()];
        assert_eq!(
            format_info(&info(31, pv)),
            "info depth 5 seldepth 9 score cp 31 nodes 12345 nps 600000 time 20 hashfull 3 pv e2e4"
        );
    }

    #[test]
    fn mate_info_line() {
        let line = format_info(&info(MATE_SCORE - 1, Vec::new()));
        assert!(line.contains("score mate 1 "));
        assert!(!line.contains(" pv"));
        let line = format_info(&info(-(MATE_SCORE - 2), Vec::new()));
        assert!(line.contains("score mate -1 "));
    }

    #[test]
    fn bestmove_line() {
        assert_eq!(format_bestmove(None), "bestmove 0000");
        let mv = Position::startpos().parse_move("g1f3").unwrap();
        assert_eq!(format_bestmove(Some(mv)), "bestmove g1f3");
    }
}
