use ant_clustering::common::{Direction, ObjectType, Position, SimParams};
use ant_clustering::World;

const COOLDOWN: u32 = 4;

fn params(threshold: u32) -> SimParams {
    params_with_cooldown(threshold, COOLDOWN)
}

fn params_with_cooldown(threshold: u32, cooldown: u32) -> SimParams {
    SimParams {
        width: 6,
        length: 6,
        direction_weights: SimParams::uniform_weights(),
        relu_low: 0.3,
        relu_high: 0.7,
        similarity_threshold: threshold,
        interaction_cooldown: cooldown,
        memory_size: 10,
        record_paths: false,
    }
}

/// Carrier A at (2,2) holding food, sensor B at (3,2) remembering food `matches` times.
fn encounter(threshold: u32, matches: usize) -> (World, usize, usize) {
    let mut world = World::from_seed(params(threshold), 17).unwrap();
    let a = world.add_ant_at(Position::new(2, 2)).unwrap();
    let b = world.add_ant_at(Position::new(3, 2)).unwrap();
    world.ant_mut(a).unwrap().set_carried(Some(ObjectType::Food));
    let sensor = world.ant_mut(b).unwrap();
    sensor.set_previous_direction(Direction::East);
    for _ in 0..matches {
        sensor.update_memory(Some(ObjectType::Food));
    }
    // Other types never count towards similarity.
    sensor.update_memory(Some(ObjectType::Egg));
    (world, a, b)
}

#[test]
fn exactly_threshold_matches_interacts() {
    for threshold in 1..=5 {
        let (mut world, a, _) = encounter(threshold, threshold as usize);
        assert_eq!(world.handle_ant_interactions(1), 1);
        assert_eq!(world.interaction_count(), 1);
        let carrier = world.ant(a).unwrap();
        // Restarted, then ticked once at the end of the same call.
        assert_eq!(carrier.cooldown(), COOLDOWN - 1);
        assert_eq!(carrier.previous_direction(), Direction::West);
    }
}

#[test]
fn one_match_short_does_not_interact() {
    for threshold in 1..=5 {
        let (mut world, a, _) = encounter(threshold, threshold as usize - 1);
        assert_eq!(world.handle_ant_interactions(1), 0);
        assert_eq!(world.interaction_count(), 0);
        let carrier = world.ant(a).unwrap();
        assert_eq!(carrier.cooldown(), 0);
        assert_eq!(carrier.previous_direction(), Direction::North);
    }
}

#[test]
fn zero_threshold_always_interacts_when_adjacent() {
    let (mut world, a, _) = encounter(0, 0);
    assert_eq!(world.handle_ant_interactions(0), 1);
    assert_eq!(world.ant(a).unwrap().previous_direction(), Direction::West);
}

#[test]
fn non_adjacent_ants_never_interact() {
    let mut world = World::from_seed(params(0), 3).unwrap();
    let a = world.add_ant_at(Position::new(0, 0)).unwrap();
    world.add_ant_at(Position::new(2, 0)).unwrap();
    world.ant_mut(a).unwrap().set_carried(Some(ObjectType::Waste));
    assert_eq!(world.handle_ant_interactions(0), 0);
}

#[test]
fn ant_on_same_cell_is_not_a_neighbor() {
    let mut world = World::from_seed(params(0), 3).unwrap();
    let a = world.add_ant_at(Position::new(1, 1)).unwrap();
    world.add_ant_at(Position::new(1, 1)).unwrap();
    world.ant_mut(a).unwrap().set_carried(Some(ObjectType::Waste));
    assert_eq!(world.handle_ant_interactions(0), 0);
}

#[test]
fn empty_handed_ant_is_never_eligible() {
    let (mut world, a, _) = encounter(0, 3);
    world.ant_mut(a).unwrap().set_carried(None);
    assert_eq!(world.handle_ant_interactions(0), 0);
}

#[test]
fn cooldown_blocks_and_decays() {
    let (mut world, a, b) = encounter(1, 2);
    world.ant_mut(b).unwrap().set_cooldown(3);

    assert_eq!(world.handle_ant_interactions(0), 1);
    assert_eq!(world.ant(a).unwrap().cooldown(), COOLDOWN - 1);
    assert_eq!(world.ant(b).unwrap().cooldown(), 2);

    // While cooling down the carrier cannot interact again, and the counter stands still.
    for expected in (0..COOLDOWN - 1).rev() {
        assert_eq!(world.handle_ant_interactions(1), 0);
        assert_eq!(world.ant(a).unwrap().cooldown(), expected);
        assert_eq!(world.interaction_count(), 1);
    }
    assert_eq!(world.ant(b).unwrap().cooldown(), 0);

    // Off cooldown: eligible again.
    assert_eq!(world.handle_ant_interactions(2), 1);
    assert_eq!(world.interaction_count(), 2);
}

#[test]
fn fresh_cooldown_ticks_in_the_same_call() {
    let mut world = World::from_seed(params_with_cooldown(0, 3), 11).unwrap();
    let a = world.add_ant_at(Position::new(1, 1)).unwrap();
    world.add_ant_at(Position::new(1, 2)).unwrap();
    world.ant_mut(a).unwrap().set_carried(Some(ObjectType::Waste));

    assert_eq!(world.handle_ant_interactions(0), 1);
    assert_eq!(world.ant(a).unwrap().cooldown(), 2);
}

#[test]
fn short_cooldowns_allow_back_to_back_interactions() {
    for duration in [0, 1] {
        let mut world = World::from_seed(params_with_cooldown(0, duration), 11).unwrap();
        let a = world.add_ant_at(Position::new(1, 1)).unwrap();
        world.add_ant_at(Position::new(2, 2)).unwrap();
        world.ant_mut(a).unwrap().set_carried(Some(ObjectType::Egg));
        for call in 1..=3 {
            world.handle_ant_interactions(call);
            assert_eq!(world.ant(a).unwrap().cooldown(), 0);
        }
        assert_eq!(world.interaction_count(), 3);
    }
}

#[test]
fn first_matching_neighbor_in_direction_order_wins() {
    let mut world = World::from_seed(params(1), 5).unwrap();
    let a = world.add_ant_at(Position::new(2, 2)).unwrap();
    // South (index 4) is scanned after East (index 2).
    let south = world.add_ant_at(Position::new(2, 3)).unwrap();
    let east = world.add_ant_at(Position::new(3, 2)).unwrap();
    world.ant_mut(a).unwrap().set_carried(Some(ObjectType::Egg));
    for (idx, heading) in [(south, Direction::South), (east, Direction::NorthEast)] {
        let ant = world.ant_mut(idx).unwrap();
        ant.update_memory(Some(ObjectType::Egg));
        ant.set_previous_direction(heading);
    }

    assert_eq!(world.handle_ant_interactions(0), 1);
    assert_eq!(world.interaction_count(), 1);
    assert_eq!(world.ant(a).unwrap().previous_direction(), Direction::SouthWest);
}

#[test]
fn mutual_carriers_both_interact() {
    let mut world = World::from_seed(params(1), 5).unwrap();
    let a = world.add_ant_at(Position::new(2, 2)).unwrap();
    let b = world.add_ant_at(Position::new(2, 3)).unwrap();
    for idx in [a, b] {
        let ant = world.ant_mut(idx).unwrap();
        ant.set_carried(Some(ObjectType::Food));
        ant.update_memory(Some(ObjectType::Food));
    }
    world.ant_mut(b).unwrap().set_previous_direction(Direction::East);

    assert_eq!(world.handle_ant_interactions(0), 2);
    // A turned away from B's heading first; B then reacts to A's new heading.
    assert_eq!(world.ant(a).unwrap().previous_direction(), Direction::West);
    assert_eq!(world.ant(b).unwrap().previous_direction(), Direction::East);
}
