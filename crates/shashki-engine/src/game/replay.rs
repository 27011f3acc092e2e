//! The persisted move-history format consumed by scripted players.
//!
//! A replay log is line-oriented: one `(side, cell)` tuple per line in turn
//! order, e.g. `w 40` or `b 23`. Blank lines and `#` comments are skipped.

use std::str::FromStr;

use crate::core::{CellId, PieceColor};

/// One click of a recorded game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayEntry {
    pub side: PieceColor,
    pub cell: CellId,
}

/// A parsed replay log.
#[derive(Debug, Clone, Default)]
pub struct ReplayLog {
    entries: Vec<ReplayEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ReplayParseError {
    #[display("line {line}: expected `<side> <cell>`, got {text:?}")]
    MalformedLine { line: usize, text: String },
    #[display("line {line}: unknown side {side:?} (expected `w` or `b`)")]
    UnknownSide { line: usize, side: String },
    #[display("line {line}: invalid cell id {cell:?}")]
    InvalidCell { line: usize, cell: String },
}

impl FromStr for ReplayLog {
    type Err = ReplayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for (index, text) in s.lines().enumerate() {
            let line = index + 1;
            let text = text.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let mut fields = text.split_whitespace();
            let (Some(side), Some(cell), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(ReplayParseError::MalformedLine {
                    line,
                    text: text.to_owned(),
                });
            };
            let side = match side {
                "w" => PieceColor::White,
                "b" => PieceColor::Black,
                _ => {
                    return Err(ReplayParseError::UnknownSide {
                        line,
                        side: side.to_owned(),
                    });
                }
            };
            let cell = cell.parse().map(CellId).map_err(|_| {
                ReplayParseError::InvalidCell {
                    line,
                    cell: cell.to_owned(),
                }
            })?;
            entries.push(ReplayEntry { side, cell });
        }
        Ok(Self { entries })
    }
}

impl ReplayLog {
    #[must_use]
    pub fn entries(&self) -> &[ReplayEntry] {
        &self.entries
    }

    /// The clicks recorded for one side, in order.
    pub fn cells_for(&self, side: PieceColor) -> impl Iterator<Item = CellId> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.side == side)
            .map(|e| e.cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_with_comments() {
        let log: ReplayLog = "# opening\nw 40\nw 33\n\nb 23\n".parse().unwrap();
        assert_eq!(log.entries().len(), 3);
        assert_eq!(
            log.cells_for(PieceColor::White).collect::<Vec<_>>(),
            [CellId(40), CellId(33)]
        );
        assert_eq!(
            log.cells_for(PieceColor::Black).collect::<Vec<_>>(),
            [CellId(23)]
        );
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = "w 40\nx 3\n".parse::<ReplayLog>().unwrap_err();
        assert_eq!(
            err,
            ReplayParseError::UnknownSide {
                line: 2,
                side: "x".to_owned()
            }
        );
        let err = "w forty\n".parse::<ReplayLog>().unwrap_err();
        assert!(matches!(err, ReplayParseError::InvalidCell { line: 1, .. }));
        let err = "w 40 extra\n".parse::<ReplayLog>().unwrap_err();
        assert!(matches!(err, ReplayParseError::MalformedLine { line: 1, .. }));
    }
}
