//! Breadth-first route search used to guide protesters.

use std::collections::VecDeque;

use iceman_core::{CellCoord, Direction};

/// Result of a successful route search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    /// Minimum number of single-tile steps from source to target.
    pub steps: u32,
    /// Direction of the first step, or `None` when already at the target.
    pub first_step: Option<Direction>,
}

/// Finds the shortest route between two cells of a `width` × `height` grid.
///
/// Neighbors are expanded in [`Direction::SEARCH_ORDER`], so when several
/// shortest routes exist the one whose first step comes earliest in that order
/// wins. Each visited cell inherits the first-step direction of the cell that
/// discovered it. The search keeps no state between calls and never mutates
/// the grid it queries.
pub fn shortest_route<F>(
    width: u32,
    height: u32,
    source: CellCoord,
    target: CellCoord,
    mut is_open: F,
) -> Option<Route>
where
    F: FnMut(CellCoord) -> bool,
{
    if !in_bounds(source, width, height) || !in_bounds(target, width, height) {
        return None;
    }
    if source == target {
        return Some(Route {
            steps: 0,
            first_step: None,
        });
    }
    if !is_open(target) {
        return None;
    }

    let width_usize = usize::try_from(width).ok()?;
    let height_usize = usize::try_from(height).ok()?;
    let cell_count = width_usize.checked_mul(height_usize)?;

    let mut visited: Vec<Option<(u32, Option<Direction>)>> = vec![None; cell_count];
    let mut queue = VecDeque::new();

    visited[index(width_usize, source)?] = Some((0, None));
    queue.push_back(source);

    while let Some(cell) = queue.pop_front() {
        let (distance, inherited) = visited[index(width_usize, cell)?]?;

        for direction in Direction::SEARCH_ORDER {
            let Some(neighbor) = cell.step(direction) else {
                continue;
            };
            if !in_bounds(neighbor, width, height) {
                continue;
            }

            let neighbor_index = index(width_usize, neighbor)?;
            if visited[neighbor_index].is_some() {
                continue;
            }
            if !is_open(neighbor) {
                continue;
            }

            let first_step = inherited.or(Some(direction));
            visited[neighbor_index] = Some((distance + 1, first_step));

            if neighbor == target {
                return Some(Route {
                    steps: distance + 1,
                    first_step,
                });
            }
            queue.push_back(neighbor);
        }
    }

    None
}

fn in_bounds(cell: CellCoord, width: u32, height: u32) -> bool {
    cell.x() < width && cell.y() < height
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.x()).ok()?;
    let row = usize::try_from(cell.y()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
