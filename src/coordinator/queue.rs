//! FIFO build task queue.

use crate::types::{Plan, Task};
use std::collections::VecDeque;

#[derive(Debug, Default, Clone)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand a plan: npm deps (if any), shadcn deps (if any), then one
    /// task per component in plan order.
    pub fn from_plan(plan: &Plan) -> Self {
        let mut queue = Self::new();
        if !plan.npm_dependencies.is_empty() {
            queue.push(Task::NpmDependencies(plan.npm_dependencies.clone()));
        }
        if !plan.shadcn_dependencies.is_empty() {
            queue.push(Task::ShadcnDependencies(plan.shadcn_dependencies.clone()));
        }
        for component in &plan.components {
            queue.push(Task::Component(component.clone()));
        }
        queue
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}
