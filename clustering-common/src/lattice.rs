use serde::{Deserialize, Serialize};

/// Number of compass directions an ant can move in.
pub const NUM_DIRECTIONS: usize = 8;

/// Unit offsets indexed by direction: N, NE, E, SE, S, SW, W, NW.
pub const DIRECTION_OFFSETS: [(i32, i32); NUM_DIRECTIONS] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

// Integer lattice coordinate, carried by value everywhere.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline(always)]
    pub fn new(x: i32, y: i32) -> Self { Self { x, y } }

    #[inline(always)]
    pub fn offset(self, (dx, dy): (i32, i32)) -> Self { Self::new(self.x + dx, self.y + dy) }

    /// Displacement from `from` to `self`.
    #[inline(always)]
    pub fn delta_from(self, from: Position) -> (i32, i32) { (self.x - from.x, self.y - from.y) }
}

/// One of the eight compass directions. The discriminant is the direction index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; NUM_DIRECTIONS] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Direction for an index, wrapping modulo 8.
    #[inline(always)]
    pub fn from_index(index: usize) -> Self { Self::ALL[index % NUM_DIRECTIONS] }

    #[inline(always)]
    pub fn index(self) -> usize { self as usize }

    #[inline(always)]
    pub fn offset(self) -> (i32, i32) { DIRECTION_OFFSETS[self.index()] }

    /// Inverse of [`Direction::offset`]. Total over the eight unit offsets, `None` otherwise.
    pub fn from_offset(offset: (i32, i32)) -> Option<Self> {
        DIRECTION_OFFSETS
            .iter()
            .position(|&o| o == offset)
            .map(Self::from_index)
    }

    /// The direction rotated by 180 degrees.
    #[inline(always)]
    pub fn opposite(self) -> Self { Self::from_index(self.index() + NUM_DIRECTIONS / 2) }
}

/// Kind of object lying on a cell or carried by an ant. An empty cell is `None` at the use site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Food = 1,
    Waste = 2,
    Egg = 3,
}

impl ObjectType {
    pub const ALL: [ObjectType; 3] = [ObjectType::Food, ObjectType::Waste, ObjectType::Egg];

    /// Integer code used in memory dumps and output files (0 is reserved for "nothing").
    #[inline(always)]
    pub fn code(self) -> u8 { self as u8 }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ObjectType::Food),
            2 => Some(ObjectType::Waste),
            3 => Some(ObjectType::Egg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_mapping_is_bidirectional() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_offset(dir.offset()), Some(dir));
        }
        assert_eq!(Direction::from_offset((0, 0)), None);
        assert_eq!(Direction::from_offset((2, 0)), None);
    }

    #[test]
    fn opposite_turns_around() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::SouthWest.opposite(), Direction::NorthEast);
        assert_eq!(Direction::NorthWest.opposite(), Direction::SouthEast);
    }

    #[test]
    fn object_codes() {
        assert_eq!(ObjectType::Egg.code(), 3);
        for t in ObjectType::ALL {
            assert_eq!(ObjectType::from_code(t.code()), Some(t));
        }
        assert_eq!(ObjectType::from_code(0), None);
    }
}
