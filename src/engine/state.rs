use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::tables::{self, get_line_entry, LineShift};
use crate::error::{BoardError, ParseMoveError};

// Internal type aliases for the packed representation
pub(crate) type BoardRaw = u64;
pub(crate) type Line = u16;
pub(crate) type Exponent = u8;

/// Largest exponent a nibble can hold.
pub(crate) const MAX_EXPONENT: Exponent = 15;

/// Largest tile value a [`Board`] can store (`2^15`).
pub const MAX_TILE: u32 = 1 << MAX_EXPONENT;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        })
    }
}

/// Parses direction words, WASD, vi keys and browser arrow-key names.
impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" | "k" | "arrowup" => Ok(Move::Up),
            "down" | "s" | "j" | "arrowdown" => Ok(Move::Down),
            "left" | "a" | "h" | "arrowleft" => Ok(Move::Left),
            "right" | "d" | "l" | "arrowright" => Ok(Move::Right),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

/// Packed 4x4 board as 16 4-bit exponents in a `u64`, row-major with cell 0
/// in the most significant nibble.
///
/// A nibble `e > 0` holds the tile `2^e` and `0` is an empty cell, so every
/// `Board` satisfies the power-of-two invariant by construction. Boards
/// coming from outside go through [`Board::from_rows`] or the `TryFrom`
/// impl, which reject anything that does not fit.
///
/// With serde a board travels as a 4x4 array of tile values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<u32>>")]
pub struct Board(pub(crate) BoardRaw);

/// Result of sliding a board in one direction, before any tile is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub board: Board,
    /// Sum of the tiles produced by merges.
    pub score_delta: u64,
    pub merges: u32,
    merged: u16,
}

impl Shift {
    /// True if some merge in this shift produced `tile`.
    pub fn produced(&self, tile: u32) -> bool {
        tile.is_power_of_two() && tile > 1 && tile <= MAX_TILE && self.merged & (1 << tile.trailing_zeros()) != 0
    }
}

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Board(raw)
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Build a board from tile values, validating every cell.
    ///
    /// ```
    /// use slide_2048::engine::Board;
    /// let b = Board::from_rows([[2, 0, 0, 0], [0, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 2048]]).unwrap();
    /// assert_eq!(b.tile_value(15), 2048);
    /// assert!(Board::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: [[u32; 4]; 4]) -> Result<Self, BoardError> {
        let mut raw: BoardRaw = 0;
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let exponent = value_to_exponent(value).ok_or(if value > MAX_TILE && value.is_power_of_two() {
                    BoardError::TooLarge { row, col, value: value as i64, max: MAX_TILE }
                } else {
                    BoardError::NotPowerOfTwo { row, col, value: value as i64 }
                })?;
                raw |= (exponent as BoardRaw) << (60 - 4 * (row * 4 + col));
            }
        }
        Ok(Board(raw))
    }

    /// Tile values, row by row.
    pub fn rows(self) -> [[u32; 4]; 4] {
        let mut rows = [[0; 4]; 4];
        for (idx, cell) in rows.iter_mut().flatten().enumerate() {
            *cell = self.tile_value(idx);
        }
        rows
    }

    /// Tile values in row-major order.
    pub fn to_vec(self) -> Vec<u32> {
        (0..16).map(|idx| self.tile_value(idx)).collect()
    }

    /// Get the actual value at index (0 if empty).
    ///
    /// Index runs 0..16 row-major.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        match self.exponent(idx) {
            0 => 0,
            e => 1 << e,
        }
    }

    #[inline]
    pub(crate) fn exponent(self, idx: usize) -> Exponent {
        ((self.0 >> (60 - 4 * idx)) & 0xf) as Exponent
    }

    // https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u32 {
        let mut x = self.0;
        x |= x >> 1;
        x |= x >> 2;
        x &= 0x1111_1111_1111_1111;
        16 - x.count_ones()
    }

    /// Return the highest tile value present on the board (0 when empty).
    pub fn highest_tile(self) -> u32 {
        (0..16).map(|idx| self.tile_value(idx)).max().unwrap_or(0)
    }

    /// Sum of all tile values.
    pub fn tile_sum(self) -> u64 {
        (0..16).map(|idx| self.tile_value(idx) as u64).sum()
    }

    /// True if two horizontally or vertically adjacent tiles hold the same
    /// value and could merge. A pair of [`MAX_TILE`]s does not count.
    pub fn has_adjacent_pair(self) -> bool {
        (0..16).any(|idx| {
            let e = self.exponent(idx);
            e != 0
                && e < MAX_EXPONENT
                && ((idx % 4 < 3 && self.exponent(idx + 1) == e)
                    || (idx < 12 && self.exponent(idx + 4) == e))
        })
    }

    /// Slide/merge tiles in `dir`. No randomness.
    ///
    /// ```
    /// use slide_2048::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let s = b.shift(Move::Left);
    /// assert_eq!(s.board.rows()[0], [4, 2, 0, 0]);
    /// assert_eq!(s.score_delta, 4);
    /// ```
    pub fn shift(self, dir: Move) -> Shift {
        let s = tables::stores();
        match dir {
            Move::Left => shift_rows(self.0, &s.left),
            Move::Right => shift_rows(self.0, &s.right),
            Move::Up => shift_cols(self.0, &s.left),
            Move::Down => shift_cols(self.0, &s.right),
        }
    }

    /// Place a 2 (or a 4 with `four_probability`) into a uniformly chosen
    /// empty cell. A full board comes back unchanged.
    pub(crate) fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R, four_probability: f64) -> Self {
        let empty = self.count_empty();
        if empty == 0 {
            return self;
        }
        let mut index = rng.gen_range(0..empty);
        let mut tmp = self.0;
        let mut tile: BoardRaw = if rng.gen_bool(four_probability) { 2 } else { 1 };
        loop {
            while (tmp & 0xf) != 0 {
                tmp >>= 4;
                tile <<= 4;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            tmp >>= 4;
            tile <<= 4;
        }
        Board(self.0 | tile)
    }
}

fn value_to_exponent(value: u32) -> Option<Exponent> {
    match value {
        0 => Some(0),
        v if v >= 2 && v <= MAX_TILE && v.is_power_of_two() => Some(v.trailing_zeros() as Exponent),
        _ => None,
    }
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

pub(crate) fn extract_line(board: BoardRaw, line_idx: usize) -> Line {
    ((board >> ((3 - line_idx) * 16)) & 0xffff) as Line
}

fn shift_rows(board: BoardRaw, table: &[LineShift]) -> Shift {
    (0..4).fold(
        Shift { board: Board::EMPTY, score_delta: 0, merges: 0, merged: 0 },
        |mut acc, row_idx| {
            let entry = get_line_entry(table, extract_line(board, row_idx));
            acc.board.0 |= (entry.line as BoardRaw) << (48 - 16 * row_idx);
            acc.score_delta += entry.score as u64;
            acc.merges += entry.merges as u32;
            acc.merged |= entry.merged;
            acc
        },
    )
}

fn shift_cols(board: BoardRaw, table: &[LineShift]) -> Shift {
    let mut shift = shift_rows(transpose(board), table);
    shift.board = Board(transpose(shift.board.0));
    shift
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: u32) -> String {
    match val {
        0 => " ".repeat(7),
        v => format!("{:^7}", v),
    }
}

impl TryFrom<Vec<Vec<i64>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        if rows.len() != 4 {
            return Err(BoardError::RowCount(rows.len()));
        }
        let mut values = [[0u32; 4]; 4];
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != 4 {
                return Err(BoardError::ColumnCount { row, len: cells.len() });
            }
            for (col, &value) in cells.iter().enumerate() {
                if value < 0 {
                    return Err(BoardError::Negative { row, col, value });
                }
                values[row][col] = u32::try_from(value)
                    .map_err(|_| BoardError::TooLarge { row, col, value, max: MAX_TILE })?;
            }
        }
        Board::from_rows(values)
    }
}

impl From<Board> for Vec<Vec<u32>> {
    fn from(board: Board) -> Self {
        board.rows().iter().map(|row| row.to_vec()).collect()
    }
}
