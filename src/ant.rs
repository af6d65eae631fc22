use crate::error::{SimError, SimResult};
use crate::grid::NeighborTable;
use clustering_common::{AntView, Direction, ObjectType, Position, NUM_DIRECTIONS};
use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use rand::seq::IndexedRandom;
use std::collections::{HashSet, VecDeque};

/// Circularly shifts `weights` right by `by` places, so that `shifted[by] == weights[0]`.
///
/// The weights are relative to the current heading (index 0 = straight on); the result is
/// indexed by absolute direction.
pub fn rotate_weights(weights: &[f64; NUM_DIRECTIONS], by: usize) -> [f64; NUM_DIRECTIONS] {
    let mut shifted = *weights;
    shifted.rotate_right(by % NUM_DIRECTIONS);
    shifted
}

/// Weighted direction draw with inertia: one distribution per previous heading.
#[derive(Debug, Clone)]
pub struct DirectionSampler {
    by_heading: Vec<WeightedIndex<f64>>,
}

impl DirectionSampler {
    pub fn new(weights: &[f64; NUM_DIRECTIONS]) -> SimResult<Self> {
        let by_heading = (0..NUM_DIRECTIONS)
            .map(|heading| {
                WeightedIndex::new(rotate_weights(weights, heading))
                    .map_err(|e| SimError::InvalidWeights(e.to_string()))
            })
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self { by_heading })
    }

    /// Draws a new absolute direction given the previous one.
    #[inline]
    pub fn choose_direction<R: Rng + ?Sized>(&self, previous: Direction, rng: &mut R) -> Direction {
        Direction::from_index(self.by_heading[previous.index()].sample(rng))
    }
}

/// A mobile agent that wanders the lattice, remembers what it sees and carries one object.
#[derive(Debug, Clone)]
pub struct Ant {
    position: Position,
    previous_direction: Direction,
    carried: Option<ObjectType>,
    memory: VecDeque<ObjectType>,
    memory_size: usize,
    cooldown: u32,
    visited: Option<HashSet<Position>>,
}

impl Ant {
    /// Creates an ant. `memory_size` is clamped to at least 1.
    pub fn new(position: Position, heading: Direction, memory_size: usize, record_path: bool) -> Self {
        let memory_size = memory_size.max(1);
        Self {
            position,
            previous_direction: heading,
            carried: None,
            memory: VecDeque::with_capacity(memory_size),
            memory_size,
            cooldown: 0,
            visited: record_path.then(HashSet::new),
        }
    }

    /// Moves one cell.
    ///
    /// On an interior cell the new heading is drawn from `sampler` (inertia); on a boundary
    /// cell a neighbour is picked uniformly and the heading follows the realised step.
    /// An ant on a cell without neighbours (1x1 grid) stays where it is.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        neighbors: &NeighborTable,
        sampler: &DirectionSampler,
        rng: &mut R,
    ) -> SimResult<()> {
        let options = neighbors.get(self.position).ok_or(SimError::PositionOutOfBounds {
            position: self.position,
            width: neighbors.width(),
            length: neighbors.length(),
        })?;

        if options.len() == NUM_DIRECTIONS {
            let direction = sampler.choose_direction(self.previous_direction, rng);
            self.position = self.position.offset(direction.offset());
            self.previous_direction = direction;
        } else if let Some(&next) = options.choose(rng) {
            let delta = next.delta_from(self.position);
            self.position = next;
            if let Some(direction) = Direction::from_offset(delta) {
                self.previous_direction = direction;
            }
        }

        if let Some(visited) = self.visited.as_mut() {
            visited.insert(self.position);
        }
        Ok(())
    }

    /// Appends an observation, evicting the oldest entry when full. Empty observations are ignored.
    pub fn update_memory(&mut self, observed: Option<ObjectType>) {
        let Some(object) = observed else { return };
        while self.memory.len() >= self.memory_size {
            self.memory.pop_front();
        }
        self.memory.push_back(object);
    }

    /// How many remembered observations are of type `object`.
    pub fn memory_count(&self, object: ObjectType) -> usize {
        self.memory.iter().filter(|&&seen| seen == object).count()
    }

    /// Remembered types, oldest first.
    pub fn memory(&self) -> impl ExactSizeIterator<Item = ObjectType> + '_ {
        self.memory.iter().copied()
    }

    pub fn memory_codes(&self) -> Vec<u8> {
        self.memory.iter().map(|t| t.code()).collect()
    }

    /// Memory as comma-separated type codes, e.g. `"2,3,1"`.
    pub fn memory_string(&self) -> String {
        self.memory
            .iter()
            .map(|t| t.code().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[inline(always)]
    pub fn memory_size(&self) -> usize { self.memory_size }

    #[inline(always)]
    pub fn position(&self) -> Position { self.position }

    #[inline(always)]
    pub fn previous_direction(&self) -> Direction { self.previous_direction }

    #[inline(always)]
    pub fn set_previous_direction(&mut self, direction: Direction) { self.previous_direction = direction; }

    #[inline(always)]
    pub fn carried(&self) -> Option<ObjectType> { self.carried }

    /// Replaces the carried object, returning what was carried before.
    #[inline(always)]
    pub fn set_carried(&mut self, object: Option<ObjectType>) -> Option<ObjectType> {
        std::mem::replace(&mut self.carried, object)
    }

    #[inline(always)]
    pub fn cooldown(&self) -> u32 { self.cooldown }

    #[inline(always)]
    pub fn set_cooldown(&mut self, cooldown: u32) { self.cooldown = cooldown; }

    /// Cells visited so far, if path recording is on.
    pub fn visited(&self) -> Option<&HashSet<Position>> { self.visited.as_ref() }

    pub fn view(&self) -> AntView {
        AntView {
            position: self.position,
            previous_direction: self.previous_direction.index() as u8,
            carried: self.carried,
            memory: self.memory_codes(),
            cooldown: self.cooldown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clustering_common::{SimParams, DEFAULT_DIRECTION_WEIGHTS, normalize_weights};
    use rand::rngs::StdRng;

    fn peaked_weights() -> [f64; NUM_DIRECTIONS] {
        normalize_weights(&DEFAULT_DIRECTION_WEIGHTS).unwrap()
    }

    #[test]
    fn rotation_moves_peak_to_heading() {
        let w = [8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        assert_eq!(rotate_weights(&w, 0), w);
        assert_eq!(rotate_weights(&w, 2), [2.0, 1.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0]);
        assert_eq!(rotate_weights(&w, 10), rotate_weights(&w, 2));
        for by in 0..NUM_DIRECTIONS {
            assert_eq!(rotate_weights(&w, by)[by], 8.0);
        }
    }

    #[test]
    fn inertia_makes_previous_heading_the_mode() {
        let sampler = DirectionSampler::new(&peaked_weights()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for heading in Direction::ALL {
            let mut counts = [0usize; NUM_DIRECTIONS];
            for _ in 0..10_000 {
                counts[sampler.choose_direction(heading, &mut rng).index()] += 1;
            }
            let mode = (0..NUM_DIRECTIONS).max_by_key(|&i| counts[i]).unwrap();
            assert_eq!(mode, heading.index(), "counts for {:?}: {:?}", heading, counts);
            // Reversing is the rarest outcome.
            let least = (0..NUM_DIRECTIONS).min_by_key(|&i| counts[i]).unwrap();
            assert_eq!(least, heading.opposite().index());
        }
    }

    #[test]
    fn sampler_rejects_zero_weights() {
        assert!(matches!(
            DirectionSampler::new(&[0.0; NUM_DIRECTIONS]),
            Err(SimError::InvalidWeights(_))
        ));
    }

    #[test]
    fn memory_is_fifo_bounded() {
        let mut ant = Ant::new(Position::new(0, 0), Direction::North, 3, false);
        ant.update_memory(Some(ObjectType::Food));
        ant.update_memory(Some(ObjectType::Waste));
        ant.update_memory(Some(ObjectType::Egg));
        ant.update_memory(Some(ObjectType::Food));
        assert_eq!(ant.memory_codes(), vec![2, 3, 1]);
        assert_eq!(
            ant.memory().collect::<Vec<_>>(),
            vec![ObjectType::Waste, ObjectType::Egg, ObjectType::Food]
        );
        assert_eq!(ant.memory_string(), "2,3,1");
    }

    #[test]
    fn empty_observation_leaves_memory_alone() {
        let mut ant = Ant::new(Position::new(0, 0), Direction::North, 3, false);
        ant.update_memory(Some(ObjectType::Food));
        ant.update_memory(None);
        assert_eq!(ant.memory_codes(), vec![1]);
        assert_eq!(ant.memory_count(ObjectType::Food), 1);
        assert_eq!(ant.memory_count(ObjectType::Egg), 0);
    }

    #[test]
    fn zero_memory_size_is_clamped() {
        let mut ant = Ant::new(Position::new(0, 0), Direction::North, 0, false);
        assert_eq!(ant.memory_size(), 1);
        ant.update_memory(Some(ObjectType::Food));
        ant.update_memory(Some(ObjectType::Egg));
        assert_eq!(ant.memory_codes(), vec![3]);
    }

    #[test]
    fn center_of_3x3_moves_to_a_neighbor() {
        let table = NeighborTable::new(3, 3);
        let sampler = DirectionSampler::new(&SimParams::uniform_weights()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let mut ant = Ant::new(Position::new(1, 1), Direction::East, 5, false);
            ant.step(&table, &sampler, &mut rng).unwrap();
            let pos = ant.position();
            assert!(table.get(Position::new(1, 1)).unwrap().contains(&pos));
            assert_eq!(Direction::from_offset(pos.delta_from(Position::new(1, 1))), Some(ant.previous_direction()));
        }
    }

    #[test]
    fn corner_walk_stays_in_bounds() {
        let table = NeighborTable::new(3, 3);
        let sampler = DirectionSampler::new(&SimParams::uniform_weights()).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let mut ant = Ant::new(Position::new(0, 0), Direction::North, 5, true);
        for _ in 0..100 {
            let before = ant.position();
            ant.step(&table, &sampler, &mut rng).unwrap();
            let pos = ant.position();
            assert!((0..3).contains(&pos.x) && (0..3).contains(&pos.y));
            assert_eq!(Direction::from_offset(pos.delta_from(before)), Some(ant.previous_direction()));
        }
        let visited = ant.visited().unwrap();
        assert!(!visited.is_empty() && visited.len() <= 9);
    }

    #[test]
    fn isolated_cell_stays_put() {
        let table = NeighborTable::new(1, 1);
        let sampler = DirectionSampler::new(&peaked_weights()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut ant = Ant::new(Position::new(0, 0), Direction::West, 5, false);
        ant.step(&table, &sampler, &mut rng).unwrap();
        assert_eq!(ant.position(), Position::new(0, 0));
        assert_eq!(ant.previous_direction(), Direction::West);
    }

    #[test]
    fn off_grid_position_is_an_error() {
        let table = NeighborTable::new(3, 3);
        let sampler = DirectionSampler::new(&peaked_weights()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut ant = Ant::new(Position::new(5, 5), Direction::West, 5, false);
        assert!(matches!(
            ant.step(&table, &sampler, &mut rng),
            Err(SimError::PositionOutOfBounds { .. })
        ));
    }
}
