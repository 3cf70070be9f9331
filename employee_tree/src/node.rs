//! Nodes of the in-memory kd tree.
//!
//! Every node owns its two children outright, so splicing a subtree up one level during delete is
//! a move of a `Box` and never a copy.

use crate::data::{Axis, Employee};

pub type Link = Option<Box<Node>>;

#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    pub record: Employee,
    pub left: Link,
    pub right: Link,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Left,
    Right,
}

impl Node {

    pub fn leaf(record: Employee) -> Box<Self> {

        return Box::new(Self {
            record,
            left: None,
            right: None,
        });
    }

    /// Side a point descends to under the insert discipline: strictly smaller keys go left, equal
    /// keys go right.
    pub fn direction_for(&self, point: &Employee, axis: Axis) -> Direction {

        match point.key(axis) < self.record.key(axis) {
            true => Direction::Left,
            false => Direction::Right,
        }
    }

    pub fn child(&self, direction: Direction) -> &Link {

        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    pub fn child_mut(&mut self, direction: Direction) -> &mut Link {

        match direction {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}
