//! Errors raised while building a city's mesh and spring network.
//!
//! Everything here is a configuration error: it surfaces when a city is
//! loaded, never while stepping the simulation.

/// Errors related to malformed grid data.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Grids need at least two rows and columns to be triangulated.
    #[error("grid size {0} is degenerate (need at least 2)")]
    Degenerate(usize),
    /// The grid's point count does not fit in memory addressing.
    #[error("grid size {0} is too large")]
    TooLarge(usize),
    /// The number of rows does not match the declared size.
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    /// A row has the wrong number of entries.
    #[error("row {row} has {found} entries, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// An entry's linear index does not match its place in the grid.
    #[error("entry at ({x}, {y}) has index {found}, expected {expected}")]
    IndexMismatch {
        x: usize,
        y: usize,
        expected: usize,
        found: usize,
    },
    /// An entry has a NaN or infinite coordinate.
    #[error("entry {0} has a non-finite coordinate")]
    NonFinite(usize),
    /// The travel-time matrix is not square.
    #[error("travel-time row {row} has {found} columns, expected {expected}")]
    MatrixNotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The travel-time matrix dimension does not match the number of grid points.
    #[error("travel-time matrix is {found}x{found}, grid has {expected} points")]
    MatrixDimension { expected: usize, found: usize },
    /// A route references a grid point that does not exist.
    #[error("route {origin} -> {destination} is out of range for {count} points")]
    RouteOutOfRange {
        origin: usize,
        destination: usize,
        count: usize,
    },
}

/// Errors related to building the spring network.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// The grid the network is built over is malformed.
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
    /// A spring connects a vertex to itself.
    #[error("spring {0} connects vertex {1} to itself")]
    SelfLoop(usize, u32),
    /// A spring references a vertex outside the vertex array.
    #[error("spring {spring} references vertex {index}, only {count} vertices exist")]
    IndexOutOfRange { spring: usize, index: u32, count: usize },
    /// A spring carries a NaN, infinite or negative rest length or strength.
    #[error("spring {0} has an invalid rest length or strength")]
    InvalidSpring(usize),
    /// A spring has no movable endpoint; it could never move anything.
    #[error("spring {0} only connects pinned vertices")]
    PinnedOnly(usize),
    /// A tuning parameter is outside its allowed range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

/// Errors related to loading a city's grid data from JSON.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// Wrapper for standard I/O errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid grid data JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The document parsed but describes an invalid grid.
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
}
