use std::sync::OnceLock;

use super::state::{Exponent, Line, MAX_EXPONENT};

/// Precomputed result of sliding one 16-bit line towards its first cell.
///
/// `merged` is a bitmask of the exponents produced by merges (bit `e` set
/// means a `2^e` tile was created), which is how the caller learns that the
/// winning tile appeared without rescanning the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LineShift {
    pub(crate) line: Line,
    pub(crate) score: u32,
    pub(crate) merged: u16,
    pub(crate) merges: u8,
}

/// Lookup tables for every possible 4-tile line.
///
/// Both tables come from [`merge_line_left`]; the right-hand table is the
/// same routine applied to the reversed line. Columns reuse the row tables
/// through a transpose, so there is exactly one merge algorithm.
pub(crate) struct Stores {
    pub(crate) left: Box<[LineShift]>,
    pub(crate) right: Box<[LineShift]>,
}

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

static STORES: OnceLock<Stores> = OnceLock::new();

/// Ensure lookup tables are initialized.
pub fn init() {
    let _ = stores();
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

#[inline(always)]
pub(crate) fn get_line_entry(table: &[LineShift], idx: Line) -> LineShift {
    debug_assert!((idx as usize) < LINE_TABLE_SIZE);
    table[idx as usize]
}

fn create_stores() -> Stores {
    // Allocate on the heap to keep stack frames small during init.
    let mut left = vec![LineShift::default(); LINE_TABLE_SIZE];
    let mut right = vec![LineShift::default(); LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let tiles = line_to_tiles(val as Line);
        left[val] = merge_line_left(tiles);
        right[val] = merge_line_right(tiles);
    }
    log::debug!("built line tables ({} entries each)", LINE_TABLE_SIZE);

    Stores {
        left: left.into_boxed_slice(),
        right: right.into_boxed_slice(),
    }
}

/// Split a packed line into its four exponents, first cell first.
pub(crate) fn line_to_tiles(line: Line) -> [Exponent; 4] {
    [
        (line >> 12 & 0xf) as Exponent,
        (line >> 8 & 0xf) as Exponent,
        (line >> 4 & 0xf) as Exponent,
        (line & 0xf) as Exponent,
    ]
}

pub(crate) fn tiles_to_line(tiles: [Exponent; 4]) -> Line {
    (tiles[0] as Line) << 12 | (tiles[1] as Line) << 8 | (tiles[2] as Line) << 4 | tiles[3] as Line
}

/// Compact, merge and pad a line towards index 0.
///
/// Each tile takes part in at most one merge; when three equal tiles are
/// adjacent the first two merge and the third only slides. Tiles already at
/// [`MAX_EXPONENT`] cannot merge because the result would not fit a nibble.
pub(crate) fn merge_line_left(tiles: [Exponent; 4]) -> LineShift {
    let mut packed = [0; 4];
    let mut len = 0;
    for &tile in tiles.iter().filter(|&&t| t != 0) {
        packed[len] = tile;
        len += 1;
    }

    let mut out = [0; 4];
    let mut shift = LineShift::default();
    let (mut read, mut write) = (0, 0);
    while read < len {
        let tile = packed[read];
        if read + 1 < len && packed[read + 1] == tile && tile < MAX_EXPONENT {
            let merged = tile + 1;
            out[write] = merged;
            shift.score += 1u32 << merged;
            shift.merged |= 1u16 << merged;
            shift.merges += 1;
            read += 2;
        } else {
            out[write] = tile;
            read += 1;
        }
        write += 1;
    }
    shift.line = tiles_to_line(out);
    shift
}

/// [`merge_line_left`] applied to the reversed line, reversed back.
pub(crate) fn merge_line_right(mut tiles: [Exponent; 4]) -> LineShift {
    tiles.reverse();
    let mut shift = merge_line_left(tiles);
    let mut out = line_to_tiles(shift.line);
    out.reverse();
    shift.line = tiles_to_line(out);
    shift
}
