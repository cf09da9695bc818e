//! Error types for board operations.

use thiserror::Error;

/// Error type for FEN parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    /// FEN string has too few parts (needs at least 4)
    #[error("FEN must have at least 4 parts, found {found}")]
    TooFewParts { found: usize },
    /// FEN string has more than the six standard fields
    #[error("FEN must have at most 6 parts, found {found}")]
    TooManyParts { found: usize },
    /// Invalid piece character in position string
    #[error("Invalid piece character '{char}' in FEN")]
    InvalidPiece { char: char },
    /// Invalid castling character
    #[error("Invalid castling character '{char}' in FEN")]
    InvalidCastling { char: char },
    /// Invalid side to move (must be 'w' or 'b')
    #[error("Invalid side to move '{found}', expected 'w' or 'b'")]
    InvalidSideToMove { found: String },
    /// Invalid en passant square
    #[error("Invalid en passant square '{found}'")]
    InvalidEnPassant { found: String },
    /// Wrong number of ranks in the placement field
    #[error("Expected 8 ranks in FEN, found {found}")]
    WrongRankCount { found: usize },
    /// Too many files in a rank
    #[error("Too many files ({files}) in rank {rank}")]
    TooManyFiles { rank: usize, files: usize },
    /// Half-move clock or full-move number is not a number
    #[error("Invalid move counter '{found}'")]
    InvalidCounter { found: String },
    /// A side has no king, or more than one
    #[error("{color} must have exactly one king")]
    BadKingCount { color: &'static str },
}

/// Error type for move parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    /// Move string has invalid length (must be 4-5 characters)
    #[error("Move must be 4-5 characters, found {len}")]
    InvalidLength { len: usize },
    /// Invalid square notation in move
    #[error("Invalid square notation in '{notation}'")]
    InvalidSquare { notation: String },
    /// Invalid promotion piece
    #[error("Invalid promotion piece '{char}'")]
    InvalidPromotion { char: char },
    /// Move is not legal in the current position
    #[error("Illegal move '{notation}'")]
    IllegalMove { notation: String },
}

/// Error type for square parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquareError {
    /// Rank out of bounds (must be 0-7)
    #[error("Rank {rank} out of bounds (must be 0-7)")]
    RankOutOfBounds { rank: usize },
    /// File out of bounds (must be 0-7)
    #[error("File {file} out of bounds (must be 0-7)")]
    FileOutOfBounds { file: usize },
    /// Invalid algebraic notation
    #[error("Invalid square notation '{notation}'")]
    InvalidNotation { notation: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_error_messages() {
        let e = FenError::TooFewParts { found: 2 };
        assert!(e.to_string().contains("at least 4 parts"));
        let e = FenError::InvalidPiece { char: 'x' };
        assert!(e.to_string().contains("'x'"));
        let e = FenError::BadKingCount { color: "White" };
        assert_eq!(e.to_string(), "White must have exactly one king");
    }

    #[test]
    fn move_parse_error_messages() {
        let e = MoveParseError::InvalidLength { len: 3 };
        assert!(e.to_string().contains("found 3"));
        let e = MoveParseError::IllegalMove {
            notation: "e2e5".to_string(),
        };
        assert_eq!(e.to_string(), "Illegal move 'e2e5'");
    }

    #[test]
    fn square_error_messages() {
        let e = SquareError::InvalidNotation {
            notation: "z9".to_string(),
        };
        assert!(e.to_string().contains("z9"));
        assert!(SquareError::RankOutOfBounds { rank: 9 }
            .to_string()
            .contains("Rank 9"));
    }
}
