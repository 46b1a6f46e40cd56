//! Dependency-graph analysis for task plans.

use std::collections::HashMap;

use crate::models::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Finds dependency cycles with a memoized depth-first search.
///
/// Every task is fully explored at most once, so the search is linear in the
/// number of tasks plus edges. Each returned cycle is a path of task ids that
/// starts and ends on the same task, e.g. `[1, 2, 1]`. Self-dependencies and
/// references to unknown tasks are ignored here; the validator reports them
/// separately.
pub fn find_cycles(tasks: &[Task]) -> Vec<Vec<u32>> {
    let index: HashMap<u32, usize> = tasks
        .iter()
        .enumerate()
        .map(|(position, task)| (task.id, position))
        .collect();

    let adjacency: Vec<Vec<usize>> = tasks
        .iter()
        .map(|task| {
            task.dependencies
                .iter()
                .filter(|dep| **dep != task.id)
                .filter_map(|dep| index.get(dep).copied())
                .collect()
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; tasks.len()];
    let mut stack = Vec::new();
    let mut cycles = Vec::new();

    for start in 0..tasks.len() {
        // Duplicate ids map to a single index; skip the shadowed copies
        if index.get(&tasks[start].id) != Some(&start) {
            continue;
        }
        if marks[start] == Mark::Unvisited {
            visit(start, &adjacency, &mut marks, &mut stack, &mut cycles);
        }
    }

    cycles
        .into_iter()
        .map(|path| path.into_iter().map(|node| tasks[node].id).collect())
        .collect()
}

fn visit(
    node: usize,
    adjacency: &[Vec<usize>],
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
    cycles: &mut Vec<Vec<usize>>,
) {
    marks[node] = Mark::OnStack;
    stack.push(node);

    for &next in &adjacency[node] {
        match marks[next] {
            Mark::Unvisited => visit(next, adjacency, marks, stack, cycles),
            Mark::OnStack => {
                if let Some(position) = stack.iter().position(|n| *n == next) {
                    let mut cycle = stack[position..].to_vec();
                    cycle.push(next);
                    cycles.push(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    stack.pop();
    marks[node] = Mark::Done;
}

/// Renders a cycle path as `1 -> 2 -> 1`.
pub fn format_cycle(cycle: &[u32]) -> String {
    cycle
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
