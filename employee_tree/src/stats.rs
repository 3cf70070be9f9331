//! Salary summaries computed from an in-order walk of the tree.
//!
//! Everything except `total_salary` fails with `Error::EmptyIndex` on an empty tree.

use crate::error::Error;
use crate::tree::Tree;

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SalaryTotals {
    pub sum: i64,
    pub count: usize,
}

/// Sum and count of every salary; `(0, 0)` for an empty tree
pub fn total_salary(tree: &Tree) -> SalaryTotals {

    let mut totals = SalaryTotals::default();

    tree.visit_in_order(|_, record| {
        totals.sum += record.salary as i64;
        totals.count += 1;
    });

    return totals;
}

/// Middle salary of the in-order sequence, which is not sorted by salary.
///
/// Odd counts take the element at `n / 2`. Even counts take the two elements around the middle
/// and average them with integer division before converting to `f64`.
pub fn median_like_salary(tree: &Tree) -> Result<f64, Error> {

    let salaries = tree.salaries();
    let n = salaries.len();

    if n == 0 {
        return Err(Error::EmptyIndex);
    }

    let value = match n % 2 {
        1 => salaries[n / 2] as i64,
        _ => (salaries[n / 2 - 1] as i64 + salaries[n / 2] as i64) / 2,
    };

    return Ok(value as f64);
}

pub fn mean_salary(tree: &Tree) -> Result<f64, Error> {

    let totals = total_salary(tree);

    if totals.count == 0 {
        return Err(Error::EmptyIndex);
    }

    return Ok(totals.sum as f64 / totals.count as f64);
}

/// Population standard deviation of salaries around a caller supplied `mean`
pub fn salary_stddev(tree: &Tree, mean: f64) -> Result<f64, Error> {

    let salaries = tree.salaries();

    if salaries.is_empty() {
        return Err(Error::EmptyIndex);
    }

    let sum_of_squares: f64 = salaries
        .iter()
        .map(|salary| (*salary as f64 - mean).powi(2))
        .sum();

    return Ok((sum_of_squares / salaries.len() as f64).sqrt());
}
