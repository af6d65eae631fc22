use crate::ant::{Ant, DirectionSampler};
use crate::cluster;
use crate::error::{SimError, SimResult};
use crate::grid::NeighborTable;
use clustering_common::{Direction, ObjectDistribution, ObjectType, Position, SimParams, WorldSnapshot, NUM_DIRECTIONS};
use log::{debug, info, warn};
use rand::distr::Uniform;
use rand::prelude::*;
use rand_distr::weighted::WeightedAliasIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interaction details are logged on iterations divisible by this value.
const INTERACTION_LOG_INTERVAL: u32 = 10_000;

/// Piecewise-linear clamp of `x` onto [0, 1] between `a` and `b`.
///
/// With `a == b` the ramp degenerates to a step: 0 below, 1 above and 0.5 exactly at the step.
#[inline]
pub fn relu_ramp(x: f64, a: f64, b: f64) -> f64 {
    if x < a {
        0.0
    } else if x > b {
        1.0
    } else if b <= a {
        0.5
    } else {
        (x - a) / (b - a)
    }
}

/// Number of neighbours of `pos` holding exactly `object`.
pub fn count_same_type_neighbors(
    neighbors: &NeighborTable,
    objects: &HashMap<Position, ObjectType>,
    pos: Position,
    object: ObjectType,
) -> usize {
    neighbors
        .get(pos)
        .map_or(0, |cells| cells.iter().filter(|c| objects.get(c) == Some(&object)).count())
}

/// Fraction of the neighbourhood of `pos` holding `object`; 0 for a cell without neighbours.
fn local_density(
    neighbors: &NeighborTable,
    objects: &HashMap<Position, ObjectType>,
    pos: Position,
    object: ObjectType,
) -> f64 {
    let total = neighbors.neighbor_count(pos);
    if total == 0 {
        return 0.0;
    }
    count_same_type_neighbors(neighbors, objects, pos, object) as f64 / total as f64
}

/// Per-type object tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCounts {
    pub food: usize,
    pub waste: usize,
    pub egg: usize,
}

impl ObjectCounts {
    fn add(&mut self, object: ObjectType) {
        match object {
            ObjectType::Food => self.food += 1,
            ObjectType::Waste => self.waste += 1,
            ObjectType::Egg => self.egg += 1,
        }
    }

    pub fn total(&self) -> usize { self.food + self.waste + self.egg }
}

/// The lattice, its objects and the ants working on it. One `World` per replica.
pub struct World {
    params: SimParams,
    neighbors: NeighborTable,
    sampler: DirectionSampler,
    /// Occupied cells only; a missing key is an empty cell.
    objects: HashMap<Position, ObjectType>,
    ants: Vec<Ant>,
    /// The replica's random stream; never shared, never reseeded.
    rng: StdRng,
    unit_dist: Uniform<f64>,
    interaction_count: u64,
}

impl World {
    /// Creates an empty world (no ants, no objects).
    pub fn new(params: SimParams, rng: StdRng) -> SimResult<Self> {
        if params.width <= 0 || params.length <= 0 {
            return Err(SimError::InvalidDimensions { width: params.width, length: params.length });
        }
        let (low, high) = (params.relu_low, params.relu_high);
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
            return Err(SimError::InvalidRamp { low, high });
        }
        if params.memory_size == 0 {
            return Err(SimError::ZeroMemory);
        }

        let neighbors = NeighborTable::new(params.width, params.length);
        let sampler = DirectionSampler::new(&params.direction_weights)?;
        let unit_dist = Uniform::new(0.0f64, 1.0f64)
            .map_err(|e| SimError::InvalidDistribution(e.to_string()))?;

        debug!(
            "World created: {}x{} grid, threshold {}, cooldown {}, ramp [{}, {}]",
            params.width, params.length, params.similarity_threshold, params.interaction_cooldown, low, high
        );

        Ok(Self {
            params,
            neighbors,
            sampler,
            objects: HashMap::new(),
            ants: Vec::new(),
            rng,
            unit_dist,
            interaction_count: 0,
        })
    }

    /// Creates a world whose random stream is seeded with `seed`.
    pub fn from_seed(params: SimParams, seed: u64) -> SimResult<Self> {
        Self::new(params, StdRng::seed_from_u64(seed))
    }

    // --- Setup ---

    /// Adds an ant at a uniformly random cell with a random heading.
    /// Returns its index, or `None` (with a warning) if the lattice has no cells.
    pub fn add_ant(&mut self) -> Option<usize> {
        if self.neighbors.is_empty() {
            warn!("Cannot add ant: no valid positions available.");
            return None;
        }
        let position = Position::new(
            self.rng.random_range(0..self.params.width),
            self.rng.random_range(0..self.params.length),
        );
        let heading = Direction::from_index(self.rng.random_range(0..NUM_DIRECTIONS));
        self.ants.push(Ant::new(position, heading, self.params.memory_size, self.params.record_paths));
        Some(self.ants.len() - 1)
    }

    /// Adds `count` ants at random cells, returning how many were placed.
    pub fn add_ants(&mut self, count: u32) -> usize {
        (0..count).filter_map(|_| self.add_ant()).count()
    }

    /// Adds an ant at `position` heading North.
    pub fn add_ant_at(&mut self, position: Position) -> SimResult<usize> {
        self.check_position(position)?;
        self.ants.push(Ant::new(position, Direction::North, self.params.memory_size, self.params.record_paths));
        Ok(self.ants.len() - 1)
    }

    /// Draws one outcome per cell from `distribution`. Cells that draw "empty" are left as they are.
    /// Returns the number of objects placed.
    pub fn add_objects(&mut self, distribution: &ObjectDistribution) -> SimResult<usize> {
        let outcomes = distribution.outcomes();
        let weights: Vec<f64> = outcomes.iter().map(|(_, p)| *p).collect();
        let dist = WeightedAliasIndex::new(weights)
            .map_err(|e| SimError::InvalidDistribution(e.to_string()))?;

        let mut placed = 0;
        for x in 0..self.params.width {
            for y in 0..self.params.length {
                if let (Some(object), _) = outcomes[dist.sample(&mut self.rng)] {
                    self.objects.insert(Position::new(x, y), object);
                    placed += 1;
                }
            }
        }
        Ok(placed)
    }

    /// Puts `object` on `position`, returning whatever was there.
    pub fn place_object(&mut self, position: Position, object: ObjectType) -> SimResult<Option<ObjectType>> {
        self.check_position(position)?;
        Ok(self.objects.insert(position, object))
    }

    fn check_position(&self, position: Position) -> SimResult<()> {
        if self.neighbors.contains(position) {
            Ok(())
        } else {
            Err(SimError::PositionOutOfBounds {
                position,
                width: self.params.width,
                length: self.params.length,
            })
        }
    }

    // --- Per-iteration phases ---

    /// Runs one full iteration: movement, work assignment, interactions.
    /// Returns the number of interactions registered in this iteration.
    pub fn step(&mut self, iteration: u32) -> SimResult<u64> {
        self.move_ants()?;
        self.assign_work();
        Ok(self.handle_ant_interactions(iteration))
    }

    /// Moves every ant one cell, in index order.
    pub fn move_ants(&mut self) -> SimResult<()> {
        let Self { ants, neighbors, sampler, rng, .. } = self;
        for ant in ants.iter_mut() {
            ant.step(neighbors, sampler, rng)?;
        }
        Ok(())
    }

    /// Lets every ant observe its cell and pick up, drop or swap objects.
    ///
    /// Pick-up happens when a uniform draw exceeds the ramp of the local same-type density,
    /// so dense clusters are left alone; a drop happens when the draw is at or below it.
    /// Dropping onto an occupied cell swaps the carried and resident objects.
    pub fn assign_work(&mut self) {
        let Self { ants, neighbors, objects, rng, unit_dist, params, .. } = self;
        let (low, high) = (params.relu_low, params.relu_high);

        for ant in ants.iter_mut() {
            let pos = ant.position();
            let ground = objects.get(&pos).copied();
            ant.update_memory(ground);

            match ant.carried() {
                None => {
                    let Some(object) = ground else { continue };
                    let pick_threshold = relu_ramp(local_density(neighbors, objects, pos, object), low, high);
                    if unit_dist.sample(rng) > pick_threshold {
                        objects.remove(&pos);
                        ant.set_carried(Some(object));
                        ant.update_memory(Some(object));
                    }
                }
                Some(load) => {
                    ant.update_memory(Some(load));
                    let drop_threshold = relu_ramp(local_density(neighbors, objects, pos, load), low, high);
                    if unit_dist.sample(rng) <= drop_threshold {
                        objects.insert(pos, load);
                        ant.set_carried(ground);
                        ant.update_memory(Some(load));
                        // Swap: the resident object is now carried.
                        ant.update_memory(ground);
                    }
                }
            }
        }
    }

    /// Registers encounters between carrying ants and their neighbours.
    ///
    /// An ant off cooldown that carries an object scans its neighbour cells in direction
    /// order; the first neighbour remembering the carried type at least
    /// `similarity_threshold` times triggers an interaction: the ant turns to face away
    /// from that neighbour's heading and its cooldown restarts. At most one interaction per
    /// ant per call. Every positive cooldown then ticks down by one, fresh ones included.
    ///
    /// Returns the number of interactions registered by this call.
    pub fn handle_ant_interactions(&mut self, iteration: u32) -> u64 {
        let mut occupants: HashMap<Position, Vec<usize>> = HashMap::new();
        for (idx, ant) in self.ants.iter().enumerate() {
            occupants.entry(ant.position()).or_default().push(idx);
        }

        let threshold = self.params.similarity_threshold as usize;
        let mut registered = 0;

        for idx in 0..self.ants.len() {
            let ant = &self.ants[idx];
            if ant.cooldown() != 0 {
                continue;
            }
            let Some(load) = ant.carried() else { continue };
            let Some(cells) = self.neighbors.get(ant.position()) else { continue };

            let partner = cells
                .iter()
                .filter_map(|cell| occupants.get(cell))
                .flatten()
                .copied()
                .find(|&other| self.ants[other].memory_count(load) >= threshold);

            if let Some(other) = partner {
                let heading = self.ants[other].previous_direction().opposite();
                if iteration % INTERACTION_LOG_INTERVAL == 0 {
                    debug!(
                        "Interaction at iteration {}: ant {} carrying {} met ant {} with memory [{}]",
                        iteration, idx, load.code(), other, self.ants[other].memory_string()
                    );
                }
                let ant = &mut self.ants[idx];
                ant.set_previous_direction(heading);
                ant.set_cooldown(self.params.interaction_cooldown);
                self.interaction_count += 1;
                registered += 1;
            }
        }

        // Includes ants that interacted above: they leave this call at duration - 1.
        for ant in self.ants.iter_mut().filter(|a| a.cooldown() > 0) {
            ant.set_cooldown(ant.cooldown() - 1);
        }
        registered
    }

    // --- Read surface ---

    /// Mean size of same-type clusters on the grid, 0.0 with no objects.
    pub fn average_cluster_size(&self) -> f64 {
        cluster::average_cluster_size(&self.neighbors, &self.objects)
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        cluster::cluster_sizes(&self.neighbors, &self.objects)
    }

    pub fn count_same_type_neighbors(&self, pos: Position, object: ObjectType) -> usize {
        count_same_type_neighbors(&self.neighbors, &self.objects, pos, object)
    }

    /// Objects lying on the grid, by type.
    pub fn object_counts(&self) -> ObjectCounts {
        let mut counts = ObjectCounts::default();
        self.objects.values().for_each(|&o| counts.add(o));
        counts
    }

    /// Objects held by ants, by type.
    pub fn carried_counts(&self) -> ObjectCounts {
        let mut counts = ObjectCounts::default();
        self.ants.iter().filter_map(Ant::carried).for_each(|o| counts.add(o));
        counts
    }

    /// Objects on the grid plus objects carried.
    pub fn total_objects(&self) -> usize {
        self.objects.len() + self.ants.iter().filter(|a| a.carried().is_some()).count()
    }

    /// Logs the per-type object census.
    pub fn log_census(&self) {
        let counts = self.object_counts();
        info!(
            "Objects on grid: food={}, waste={}, egg={} | carried: {}",
            counts.food, counts.waste, counts.egg, self.carried_counts().total()
        );
    }

    pub fn object_at(&self, pos: Position) -> Option<ObjectType> {
        self.objects.get(&pos).copied()
    }

    pub fn objects(&self) -> &HashMap<Position, ObjectType> { &self.objects }

    pub fn ants(&self) -> &[Ant] { &self.ants }

    pub fn ant(&self, idx: usize) -> Option<&Ant> { self.ants.get(idx) }

    /// Mutable access for scenario setup (memory, load, heading, cooldown).
    pub fn ant_mut(&mut self, idx: usize) -> Option<&mut Ant> { self.ants.get_mut(idx) }

    pub fn interaction_count(&self) -> u64 { self.interaction_count }

    pub fn neighbors(&self) -> &NeighborTable { &self.neighbors }

    pub fn params(&self) -> &SimParams { &self.params }

    pub fn width(&self) -> i32 { self.params.width }

    pub fn length(&self) -> i32 { self.params.length }

    /// Serialisable copy of the current state.
    pub fn snapshot(&self, iteration: u32) -> WorldSnapshot {
        let objects = self
            .neighbors
            .cells()
            .filter_map(|p| self.objects.get(&p).map(|&o| (p, o)))
            .collect();
        WorldSnapshot {
            iteration,
            width: self.params.width,
            length: self.params.length,
            interaction_count: self.interaction_count,
            average_cluster_size: self.average_cluster_size(),
            ants: self.ants.iter().map(Ant::view).collect(),
            objects,
            cooldown: self.params.interaction_cooldown,
            threshold: self.params.similarity_threshold,
            run: 0,
        }
    }
}
