use std::io;

/// A board handed in from outside that does not describe a valid 4x4 grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have 4 rows, got {0}")]
    RowCount(usize),
    #[error("row {row} must have 4 cells, got {len}")]
    ColumnCount { row: usize, len: usize },
    #[error("cell ({row}, {col}) holds negative value {value}")]
    Negative { row: usize, col: usize, value: i64 },
    #[error("cell ({row}, {col}) holds {value}, which is neither 0 nor a power of two >= 2")]
    NotPowerOfTwo { row: usize, col: usize, value: i64 },
    #[error("cell ({row}, {col}) holds {value}, above the largest supported tile {max}")]
    TooLarge { row: usize, col: usize, value: i64, max: u32 },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("win tile must be a power of two between 4 and {max}, got {value}")]
    WinTile { value: u32, max: u32 },
    #[error("four-tile probability must be within [0, 1], got {0}")]
    FourProbability(f64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized direction {0:?}")]
pub struct ParseMoveError(pub String);
