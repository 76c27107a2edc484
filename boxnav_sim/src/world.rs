// Box arena plus dense sector grid: the world as the navigation core sees it.
//
// `NavWorld` is the read-only interface the pathfinder and the motion
// integrator query: the ordered box arena, the room-swap toggle, and
// position lookups (containing box, floor height, ceiling height).
// `SectorWorld` is the concrete implementation used by the simulation, the
// CLI and the tests.
//
// The sector grid is stored as a flat `Vec<Sector>` indexed by
// `sx + sz * width`, where `sx`/`sz` are sector coordinates
// (`floor(x / SECTOR_SIZE)`). Positions off the grid, or over a sector
// with no box, have no box. A sector's box is only reported for positions
// inside that box's intervals, so `box_at()` never returns a box that does
// not contain the queried point.
//
// `SectorWorld` doubles as the JSON level format. `from_json()` validates
// the data before handing it out; a level that breaks an invariant is a
// `NavError`, not a panic. The world is not part of a save: `NavSim` skips
// it during serialization and re-attaches it on load.
//
// See also: `nav_box.rs` for `NavBox` and zones, `pathfinder.rs` and
// `motion.rs` for the consumers, `sim.rs` which owns the `SectorWorld`.
//
// **Critical constraint: determinism.** The world is immutable during a
// tick apart from the room-swap toggle, which only changes through a
// scheduled command.

use crate::error::NavError;
use crate::nav_box::{Interval, NavBox};
use crate::types::{BoxId, Position, SECTOR_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read-only world queries used by the navigation core.
pub trait NavWorld {
    /// The box arena, in stable index order.
    fn boxes(&self) -> &[NavBox];

    /// Look up a box by id. Ids come from the arena itself, so an unknown
    /// id is a logic error and panics.
    fn nav_box(&self, id: BoxId) -> &NavBox {
        &self.boxes()[id.index()]
    }

    fn rooms_swapped(&self) -> bool;

    /// The box containing the horizontal position, if any.
    fn box_at(&self, pos: Position) -> Option<BoxId>;

    /// Floor height under the position.
    fn floor_at(&self, pos: Position) -> Option<i32>;

    /// Ceiling height over the position.
    fn ceiling_at(&self, pos: Position) -> Option<i32>;
}

/// One cell of the sector grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub box_id: Option<BoxId>,
    pub floor: i32,
    pub ceiling: i32,
}

/// Box arena plus a `width` x `depth` sector grid starting at the origin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorWorld {
    pub boxes: Vec<NavBox>,
    pub width: u32,
    pub depth: u32,
    /// Flat storage: index = sx + sz * width.
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub rooms_swapped: bool,
}

impl SectorWorld {
    /// Build a world from boxes, generating the sector grid from them.
    ///
    /// Each sector takes the first box containing the sector's center, with
    /// that box's floor and a ceiling `headroom` above it. Sectors whose
    /// center lies in no box stay empty.
    pub fn from_boxes(boxes: Vec<NavBox>, headroom: i32) -> Self {
        let extent = |f: fn(&NavBox) -> Interval| {
            boxes
                .iter()
                .map(|b| f(b).max)
                .max()
                .map_or(0, |max| (max.max(0) / SECTOR_SIZE + 1) as u32)
        };
        let width = extent(|b| b.x);
        let depth = extent(|b| b.z);

        let mut sectors = Vec::with_capacity((width * depth) as usize);
        for sz in 0..depth {
            for sx in 0..width {
                let cx = sx as i32 * SECTOR_SIZE + SECTOR_SIZE / 2;
                let cz = sz as i32 * SECTOR_SIZE + SECTOR_SIZE / 2;
                let sector = boxes
                    .iter()
                    .position(|b| b.contains_xz(cx, cz))
                    .map(|i| Sector {
                        box_id: Some(BoxId(i as u32)),
                        floor: boxes[i].floor,
                        ceiling: boxes[i].floor - headroom,
                    })
                    .unwrap_or_default();
                sectors.push(sector);
            }
        }

        Self {
            boxes,
            width,
            depth,
            sectors,
            rooms_swapped: false,
        }
    }

    /// Parse and validate a JSON level.
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        let world: Self = serde_json::from_str(json)?;
        world.validate()?;
        Ok(world)
    }

    /// Read, parse and validate a JSON level file.
    pub fn load(path: &Path) -> Result<Self, NavError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the structural invariants of the level data.
    pub fn validate(&self) -> Result<(), NavError> {
        let box_count = self.boxes.len();
        for (i, b) in self.boxes.iter().enumerate() {
            let box_id = BoxId(i as u32);
            for (axis, interval) in [('X', b.x), ('Z', b.z)] {
                if !interval.is_ordered() {
                    return Err(NavError::InvertedInterval {
                        box_id,
                        axis,
                        min: interval.min,
                        max: interval.max,
                    });
                }
            }
            if let Some(&overlap) = b.overlaps.iter().find(|o| o.index() >= box_count) {
                return Err(NavError::UnknownOverlap { box_id, overlap });
            }
        }

        let expected = self.width as usize * self.depth as usize;
        if self.sectors.len() != expected {
            return Err(NavError::SectorGridSize {
                width: self.width,
                depth: self.depth,
                len: self.sectors.len(),
            });
        }

        for (i, sector) in self.sectors.iter().enumerate() {
            let Some(box_id) = sector.box_id else {
                continue;
            };
            let sx = (i % self.width as usize) as u32;
            let sz = (i / self.width as usize) as u32;
            let Some(b) = self.boxes.get(box_id.index()) else {
                return Err(NavError::UnknownSectorBox { sx, sz, box_id });
            };
            let span = |s: u32| {
                let min = s as i32 * SECTOR_SIZE;
                Interval::new(min, min + SECTOR_SIZE - 1)
            };
            if !span(sx).intersect(b.x).is_ordered() || !span(sz).intersect(b.z).is_ordered() {
                return Err(NavError::SectorOutsideBox { sx, sz, box_id });
            }
        }
        Ok(())
    }

    pub fn set_rooms_swapped(&mut self, swapped: bool) {
        self.rooms_swapped = swapped;
    }

    /// The sector under a position. `None` off the grid.
    pub fn sector_at(&self, pos: Position) -> Option<&Sector> {
        let (sx, sz) = (pos.sector_x(), pos.sector_z());
        if sx < 0 || sz < 0 || sx as u32 >= self.width || sz as u32 >= self.depth {
            return None;
        }
        self.sectors.get(sx as usize + sz as usize * self.width as usize)
    }
}

impl NavWorld for SectorWorld {
    fn boxes(&self) -> &[NavBox] {
        &self.boxes
    }

    fn rooms_swapped(&self) -> bool {
        self.rooms_swapped
    }

    fn box_at(&self, pos: Position) -> Option<BoxId> {
        let box_id = self.sector_at(pos)?.box_id?;
        self.boxes
            .get(box_id.index())
            .filter(|b| b.contains_xz(pos.x, pos.z))
            .map(|_| box_id)
    }

    fn floor_at(&self, pos: Position) -> Option<i32> {
        self.sector_at(pos).map(|s| s.floor)
    }

    fn ceiling_at(&self, pos: Position) -> Option<i32> {
        self.sector_at(pos).map(|s| s.ceiling)
    }
}
