//! In-memory employee catalog indexed by a two dimensional kd tree.
//!
//! Records carry a name, years of experience and a salary. The tree splits on experience at even
//! depths and on salary at odd depths, and answers orthogonal range queries and nearest neighbor
//! queries on those two keys. Salary summaries ride on an in-order walk of the tree.
//!
//! The catalog keeps the flat list of records next to the tree and persists the list as plain
//! text; the tree itself is rebuilt on load.
//!
//! TODO
//! - [x] batch build, insert, delete
//! - [x] range and nearest neighbor search
//! - [x] salary statistics
//! - [ ] rebuild the tree after a run of deletes that left it unbalanced
//!
pub mod data;
pub mod node;
pub mod error;
pub mod tree;
pub mod stats;
pub mod io;
pub mod catalog;
