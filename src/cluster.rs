use crate::grid::NeighborTable;
use clustering_common::{ObjectType, Position};
use std::collections::{HashMap, VecDeque};

/// Sizes of the same-type components found by a row-major flood-fill scan.
///
/// Cells are scanned x outer, y inner. The fill queues every unvisited neighbour of a
/// target-type cell and marks a cell visited when it leaves the queue, whatever it holds;
/// only cells of the target type are counted and expanded. A cell of another type touching
/// a component is therefore consumed by that fill and never counted.
pub fn cluster_sizes(neighbors: &NeighborTable, objects: &HashMap<Position, ObjectType>) -> Vec<usize> {
    let mut visited = vec![false; neighbors.len()];
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    for start in neighbors.cells() {
        let start_idx = neighbors.cell_index(start);
        if visited[start_idx] {
            continue;
        }
        let Some(&target) = objects.get(&start) else {
            visited[start_idx] = true;
            continue;
        };

        let mut size = 0usize;
        queue.clear();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            let idx = neighbors.cell_index(current);
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            if objects.get(&current) != Some(&target) {
                continue;
            }
            size += 1;
            let Some(adjacent) = neighbors.get(current) else { continue };
            queue.extend(adjacent.iter().copied().filter(|&next| !visited[neighbors.cell_index(next)]));
        }
        sizes.push(size);
    }
    sizes
}

/// Mean component size, exactly 0.0 when the grid holds no objects.
pub fn average_cluster_size(neighbors: &NeighborTable, objects: &HashMap<Position, ObjectType>) -> f64 {
    let sizes = cluster_sizes(neighbors, objects);
    if sizes.is_empty() {
        return 0.0;
    }
    sizes.iter().sum::<usize>() as f64 / sizes.len() as f64
}
