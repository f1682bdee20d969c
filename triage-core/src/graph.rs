//! Circular dependency detection over batch-index references.

use std::collections::BTreeSet;

use tracing::debug;

use crate::task::Task;

/// Indices of every task that sits on a dependency cycle or on a path leading
/// into one. Out-of-range references are ignored.
pub fn detect_circular_dependencies(tasks: &[Task]) -> BTreeSet<usize> {
    let mut walk = CycleWalk::new(tasks);
    for idx in 0..tasks.len() {
        if !walk.visited[idx] {
            walk.visit(idx);
        }
    }

    if !walk.circular.is_empty() {
        debug!(circular = ?walk.circular, "dependency cycles detected");
    }
    walk.circular
}

struct CycleWalk<'a> {
    tasks: &'a [Task],
    visited: Vec<bool>,
    on_stack: Vec<bool>,
    // Current root -> node chain; mirrors `on_stack` in order.
    path: Vec<usize>,
    circular: BTreeSet<usize>,
}

impl<'a> CycleWalk<'a> {
    fn new(tasks: &'a [Task]) -> Self {
        Self {
            tasks,
            visited: vec![false; tasks.len()],
            on_stack: vec![false; tasks.len()],
            path: Vec::new(),
            circular: BTreeSet::new(),
        }
    }

    /// Returns true when `idx` closes a cycle back onto the active chain.
    fn visit(&mut self, idx: usize) -> bool {
        if self.on_stack[idx] {
            self.circular.extend(self.path.iter().copied());
            return true;
        }
        if self.visited[idx] {
            return false;
        }

        self.visited[idx] = true;
        self.on_stack[idx] = true;
        self.path.push(idx);

        let tasks = self.tasks;
        for dep in tasks[idx].resolved_dependencies(tasks.len()) {
            if self.visit(dep) {
                self.circular.insert(idx);
            }
        }

        self.path.pop();
        self.on_stack[idx] = false;
        false
    }
}
