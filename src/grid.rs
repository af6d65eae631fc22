use clustering_common::{Position, DIRECTION_OFFSETS};

/// Precomputed in-bounds 8-neighbourhoods for every cell of a `width` x `length` lattice.
///
/// Neighbours of a cell are listed in the fixed direction order (N, NE, E, SE, S, SW, W, NW),
/// skipping offsets that leave the lattice. Interior cells have exactly 8 neighbours,
/// edge cells 5, corners 3.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    width: i32,
    length: i32,
    // Indexed by `cell_index`.
    neighbors: Vec<Vec<Position>>,
}

impl NeighborTable {
    /// Builds the table. Non-positive dimensions yield an empty table.
    pub fn new(width: i32, length: i32) -> Self {
        if width <= 0 || length <= 0 {
            return Self { width: width.max(0), length: length.max(0), neighbors: Vec::new() };
        }
        let mut neighbors = Vec::with_capacity(width as usize * length as usize);
        for x in 0..width {
            for y in 0..length {
                let cell = Position::new(x, y);
                let cell_neighbors = DIRECTION_OFFSETS
                    .iter()
                    .map(|&offset| cell.offset(offset))
                    .filter(|p| p.x >= 0 && p.x < width && p.y >= 0 && p.y < length)
                    .collect();
                neighbors.push(cell_neighbors);
            }
        }
        Self { width, length, neighbors }
    }

    #[inline(always)]
    pub fn width(&self) -> i32 { self.width }

    #[inline(always)]
    pub fn length(&self) -> i32 { self.length }

    /// Number of cells (keys) in the table.
    #[inline(always)]
    pub fn len(&self) -> usize { self.neighbors.len() }

    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.neighbors.is_empty() }

    #[inline(always)]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.length
    }

    /// Flat index of a cell, x-major. Callers check bounds first.
    #[inline(always)]
    pub fn cell_index(&self, pos: Position) -> usize {
        pos.x as usize * self.length as usize + pos.y as usize
    }

    /// Neighbours of `pos`, or `None` if `pos` is not a cell of the lattice.
    #[inline(always)]
    pub fn get(&self, pos: Position) -> Option<&[Position]> {
        if !self.contains(pos) { return None; }
        self.neighbors.get(self.cell_index(pos)).map(Vec::as_slice)
    }

    /// Number of in-bounds neighbours, 0 outside the lattice.
    #[inline(always)]
    pub fn neighbor_count(&self, pos: Position) -> usize {
        self.get(pos).map_or(0, <[Position]>::len)
    }

    /// All cells, x outer and y inner.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.width).flat_map(move |x| (0..self.length).map(move |y| Position::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_counts_by_location() {
        let table = NeighborTable::new(4, 3);
        assert_eq!(table.len(), 12);
        assert_eq!(table.neighbor_count(Position::new(0, 0)), 3);
        assert_eq!(table.neighbor_count(Position::new(3, 2)), 3);
        assert_eq!(table.neighbor_count(Position::new(1, 0)), 5);
        assert_eq!(table.neighbor_count(Position::new(0, 1)), 5);
        assert_eq!(table.neighbor_count(Position::new(1, 1)), 8);
        assert_eq!(table.neighbor_count(Position::new(4, 1)), 0);
    }

    #[test]
    fn interior_neighbors_follow_direction_order() {
        let table = NeighborTable::new(3, 3);
        let expected: Vec<Position> = DIRECTION_OFFSETS
            .iter()
            .map(|&o| Position::new(1, 1).offset(o))
            .collect();
        assert_eq!(table.get(Position::new(1, 1)).unwrap(), expected.as_slice());
    }

    #[test]
    fn corner_keeps_order_of_valid_offsets() {
        let table = NeighborTable::new(3, 3);
        // From (0,0) only E, SE and S stay in bounds.
        assert_eq!(
            table.get(Position::new(0, 0)).unwrap(),
            &[Position::new(1, 0), Position::new(1, 1), Position::new(0, 1)]
        );
    }

    #[test]
    fn single_cell_and_empty_grids() {
        let one = NeighborTable::new(1, 1);
        assert_eq!(one.len(), 1);
        assert_eq!(one.get(Position::new(0, 0)).unwrap().len(), 0);

        let empty = NeighborTable::new(0, 5);
        assert!(empty.is_empty());
        assert!(empty.get(Position::new(0, 0)).is_none());
    }

    #[test]
    fn every_neighbor_is_in_bounds() {
        let table = NeighborTable::new(5, 7);
        for cell in table.cells() {
            for n in table.get(cell).unwrap() {
                assert!(table.contains(*n));
                assert_ne!(*n, cell);
            }
        }
    }
}
