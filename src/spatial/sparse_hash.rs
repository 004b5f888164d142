//! Sparse hash grid for broadphase proximity queries

use ahash::AHashMap;

use crate::core::types::{EntityId, Position};

/// Widest neighbourhood a single query will walk, in cells from the centre
///
/// Radii beyond this many cells only see candidates inside the cap.
pub const MAX_QUERY_RINGS: i32 = 64;

/// Sparse hash grid over the XZ plane
///
/// Height is ignored when bucketing; exact sphere tests happen after the
/// broadphase, so tall stacks only cost a few extra candidates.
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<EntityId>>,
}

impl SparseHashGrid {
    /// Callers pass a positive, finite cell size (see `SpatialConfig`)
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_coord(&self, pos: Position) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, entity: EntityId, pos: Position) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(entity);
    }

    /// Candidates for a sphere query; callers still need an exact distance test
    pub fn query_radius(&self, center: Position, radius: f32) -> impl Iterator<Item = EntityId> + '_ {
        let rings = (radius / self.cell_size).ceil();
        let rings = if rings.is_nan() {
            1
        } else {
            rings.clamp(1.0, MAX_QUERY_RINGS as f32) as i32
        };
        let (cx, cz) = self.cell_coord(center);

        (-rings..=rings).flat_map(move |dx| {
            (-rings..=rings).flat_map(move |dz| {
                self.cells
                    .get(&(cx + dx, cz + dz))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Rebuild grid from positions
    pub fn rebuild(&mut self, entities: impl Iterator<Item = (EntityId, Position)>) {
        self.clear();
        for (entity, pos) in entities {
            self.insert(entity, pos);
        }
    }
}
