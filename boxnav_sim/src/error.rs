// Recoverable errors for the navigation crate.
//
// Broken invariants inside the search (a box acquiring two predecessors, a
// waypoint outside its box) are programming errors and panic via `assert!`.
// Everything that can go wrong because of *input* (a malformed level file,
// a save that names boxes the level does not have, an unreadable config)
// is reported through `NavError` so callers can propagate it with `?`.
//
// See also: `world.rs` for level validation, `sim.rs` for save/load.

use crate::types::{BoxId, Position};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{box_id}: {axis} interval is inverted ({min} > {max})")]
    InvertedInterval {
        box_id: BoxId,
        axis: char,
        min: i32,
        max: i32,
    },

    #[error("{box_id} lists unknown overlap {overlap}")]
    UnknownOverlap { box_id: BoxId, overlap: BoxId },

    #[error("sector ({sx}, {sz}) references unknown {box_id}")]
    UnknownSectorBox { sx: u32, sz: u32, box_id: BoxId },

    #[error("sector ({sx}, {sz}) does not touch its {box_id}")]
    SectorOutsideBox { sx: u32, sz: u32, box_id: BoxId },

    #[error("sector grid is {width}x{depth} but holds {len} sectors")]
    SectorGridSize { width: u32, depth: u32, len: usize },

    #[error("saved state references unknown {0}")]
    UnknownBox(BoxId),

    #[error("no box at position {0}")]
    PositionInvalid(Position),

    #[error("unknown actor kind `{0}`")]
    UnknownKind(String),
}
