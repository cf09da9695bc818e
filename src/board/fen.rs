use std::str::FromStr;

use super::error::FenError;
use super::state::Position;
use super::types::{CastlingRights, Color, Piece, Square};

impl Position {
    /// Parse a position from FEN notation.
    ///
    /// The half-move clock and full-move number are optional and default to
    /// `0 1`. Each side must have exactly one king.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }
        if parts.len() > 6 {
            return Err(FenError::TooManyParts { found: parts.len() });
        }

        let mut pos = Position::empty();

        // Parse piece placement
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    if file > 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank + 1,
                            files: file,
                        });
                    }
                    continue;
                }
                let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let sq = Square::new(rank, file).ok_or(FenError::TooManyFiles {
                    rank: rank + 1,
                    files: file + 1,
                })?;
                pos.add_piece(color, piece, sq);
                file += 1;
            }
        }

        for (color, name) in [(Color::White, "White"), (Color::Black, "Black")] {
            if pos.pieces(color, Piece::King).popcount() != 1 {
                return Err(FenError::BadKingCount { color: name });
            }
        }

        // Parse side to move
        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };
        pos.start_side = pos.side_to_move;

        // Parse castling rights
        let mut rights = CastlingRights::none();
        for c in parts[2].chars() {
            match c {
                'K' => rights.set(Color::White, true),
                'Q' => rights.set(Color::White, false),
                'k' => rights.set(Color::Black, true),
                'q' => rights.set(Color::Black, false),
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }
        pos.state.castling = rights;

        // Parse en passant target; only the file is kept
        if parts[3] != "-" {
            let bad_ep = || FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            };
            let sq: Square = parts[3].parse().map_err(|_| bad_ep())?;
            let expected_rank = match pos.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if sq.rank() != expected_rank {
                return Err(bad_ep());
            }
            pos.state.ep_file = Some(sq.file() as u8);
        }

        let parse_counter = |field: Option<&&str>, default: u32| -> Result<u32, FenError> {
            match field {
                None => Ok(default),
                Some(text) => text.parse().map_err(|_| FenError::InvalidCounter {
                    found: (*text).to_string(),
                }),
            }
        };
        pos.state.halfmove_clock = parse_counter(parts.get(4), 0)?;
        pos.start_fullmove = parse_counter(parts.get(5), 1)?.max(1);

        pos.refresh_keys();
        Ok(pos)
    }

    /// Convert the position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                match Square::new(rank, file).and_then(|sq| self.piece_at(sq)) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let rights = self.state.castling;
        let mut castling = String::new();
        for (color, kingside, c) in [
            (Color::White, true, 'K'),
            (Color::White, false, 'Q'),
            (Color::Black, true, 'k'),
            (Color::Black, false, 'q'),
        ] {
            if rights.has(color, kingside) {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let ep = self
            .ep_square()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            castling,
            ep,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}
