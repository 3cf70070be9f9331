//! Employee records and the two numeric axes the tree splits on.

use std::fmt;

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// Squared euclidean distance between two records on (experience, salary).
///
/// Kept as an integer so comparisons never depend on rounding.
pub type SquaredDistance = u128;

/// Number of axes the tree alternates between
pub const K: usize = 2;

pub const MAX_RANDOM_EXPERIENCE: i32 = 40;
pub const MIN_RANDOM_SALARY: i32 = 20_000;
pub const MAX_RANDOM_SALARY: i32 = 250_000;

#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub experience: i32,
    pub salary: i32,
}

impl Employee {

    pub fn new(name: &str, experience: i32, salary: i32) -> Self {

        return Self {
            name: name.to_string(),
            experience,
            salary,
        }
    }

    /// A nameless point, used as a query target or a range corner.
    pub fn point(experience: i32, salary: i32) -> Self {

        return Self {
            name: String::new(),
            experience,
            salary,
        }
    }

    pub fn random() -> Self {

        let mut rng = rand::thread_rng();

        let name: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        let experience = rng.gen_range(0..=MAX_RANDOM_EXPERIENCE);
        let salary = rng.gen_range(MIN_RANDOM_SALARY..=MAX_RANDOM_SALARY);

        return Self {
            name,
            experience,
            salary,
        }
    }

    pub fn key(&self, axis: Axis) -> i32 {

        match axis {
            Axis::Experience => self.experience,
            Axis::Salary => self.salary,
        }
    }

    pub fn distance(&self, other: &Employee) -> SquaredDistance {

        let dx = self.experience.abs_diff(other.experience) as u128;
        let dy = self.salary.abs_diff(other.salary) as u128;

        return dx * dx + dy * dy;
    }

    /// True when this record lies in the closed rectangle spanned by `low` and `high`.
    pub fn within(&self, low: &Employee, high: &Employee) -> bool {

        return low.experience <= self.experience && self.experience <= high.experience
            && low.salary <= self.salary && self.salary <= high.salary;
    }
}

impl fmt::Display for Employee {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name: {}, Experience: {}, Salary: {}", self.name, self.experience, self.salary)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Axis {
    Experience,
    Salary,
}

impl Axis {

    ///Experience at even depths, salary at odd depths
    pub fn for_depth(depth: usize) -> Self {

        match depth % K {
            0 => Axis::Experience,
            _ => Axis::Salary,
        }
    }
}
