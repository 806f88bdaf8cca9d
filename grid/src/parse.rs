//! Loader for comma-separated maze descriptions.

use std::str::FromStr;

use maze_solver_core::{OPEN, WALL};
use thiserror::Error;

use crate::Grid;

const RECORD_DELIMITER: char = ',';

/// Errors raised while reading a maze description.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The description did not contain a single row.
    #[error("maze description is empty")]
    Empty,
    /// A row held a different number of cells than the first row.
    #[error("line {line} has {found} cells but the first row has {expected}")]
    RaggedRow {
        /// One-based line number of the offending row.
        line: usize,
        /// Cell count of the first row.
        expected: usize,
        /// Cell count of the offending row.
        found: usize,
    },
    /// A record was not an integer status.
    #[error("line {line}, cell {column}: '{value}' is not a valid cell status")]
    InvalidCell {
        /// One-based line number of the offending record.
        line: usize,
        /// One-based position of the record within its row.
        column: usize,
        /// Record text as found in the description.
        value: String,
    },
    /// The description has more rows or columns than a grid can address.
    #[error("maze description exceeds the addressable grid size")]
    TooLarge,
}

/// Parses a maze description: one line per row, comma-separated records,
/// `-1` for walls and `0` for open cells.
///
/// Blank lines are skipped and whitespace around records is ignored.
/// Positive records load as open cells. No partial grid is produced on
/// error.
pub fn parse(text: &str) -> Result<Grid, ParseError> {
    let mut rows = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row = trimmed
            .split(RECORD_DELIMITER)
            .enumerate()
            .map(|(column, record)| {
                let record = record.trim();
                record.parse::<i32>().map_err(|_| ParseError::InvalidCell {
                    line: line_number,
                    column: column + 1,
                    value: record.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((line_number, row));
    }

    assemble(rows)
}

impl FromStr for Grid {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text)
    }
}

/// Validates numbered rows and builds the grid they describe.
pub(crate) fn assemble<I>(rows: I) -> Result<Grid, ParseError>
where
    I: IntoIterator<Item = (usize, Vec<i32>)>,
{
    let mut expected = None;
    let mut height = 0_usize;
    let mut cells = Vec::new();

    for (line, row) in rows {
        let width = *expected.get_or_insert(row.len());
        if row.len() != width {
            return Err(ParseError::RaggedRow {
                line,
                expected: width,
                found: row.len(),
            });
        }

        for (column, value) in row.into_iter().enumerate() {
            let status = match value {
                WALL => WALL,
                value if value >= OPEN => OPEN,
                value => {
                    return Err(ParseError::InvalidCell {
                        line,
                        column: column + 1,
                        value: value.to_string(),
                    })
                }
            };
            cells.push(status);
        }
        height += 1;
    }

    let width = match expected {
        None | Some(0) => return Err(ParseError::Empty),
        Some(width) => width,
    };
    let height = u32::try_from(height).map_err(|_| ParseError::TooLarge)?;
    let width = u32::try_from(width).map_err(|_| ParseError::TooLarge)?;

    Ok(Grid::from_raw_cells(height, width, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_solver_core::{CellStatus, Position};

    #[test]
    fn parses_rows_into_grid() {
        let grid = parse("-1,-1,-1\n-1,0,-1\n-1,-1,-1\n").expect("valid maze");

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.status_of(Position::new(1, 1)), Some(CellStatus::Open));
        assert_eq!(grid.status_of(Position::new(0, 1)), Some(CellStatus::Wall));
    }

    #[test]
    fn tolerates_whitespace_and_blank_lines() {
        let grid: Grid = " -1, 0 ,-1\n\n-1,0,-1\n\n".parse().expect("valid maze");
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.open_cells().len(), 2);
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = parse("-1,0,-1\n-1,0\n").expect_err("ragged rows");
        assert_eq!(
            error,
            ParseError::RaggedRow {
                line: 2,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn rejects_non_integer_cells() {
        let error = parse("-1,x,-1\n").expect_err("invalid cell");
        assert_eq!(
            error,
            ParseError::InvalidCell {
                line: 1,
                column: 2,
                value: "x".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_unknown_negative_statuses() {
        let error = parse("-1,-3\n").expect_err("invalid status");
        assert!(matches!(error, ParseError::InvalidCell { column: 2, .. }));
    }

    #[test]
    fn rejects_empty_descriptions() {
        assert_eq!(parse("").expect_err("empty"), ParseError::Empty);
        assert_eq!(parse("\n  \n").expect_err("blank"), ParseError::Empty);
    }
}
