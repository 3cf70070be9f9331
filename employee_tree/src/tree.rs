//! Implementation of kd-tree creation, mutation and querying over (experience, salary)
use crate::data::{Axis, Employee, SquaredDistance, K};
use crate::node::{Direction, Link, Node};

use log::debug;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

/// Struct to represent the kd-tree
///
/// Depth 0 splits on experience, depth 1 on salary, and so on. Batch `build` places equal keys on
/// the left of a split, `insert` places them on the right; both are kept as-is and every query
/// tolerates either side.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub root: Link,
    pub k: usize,
}

///struct for keeping N- top closest records
///
///handles distance sorting and truncating to N items
#[derive(Debug)]
pub struct TopHits {
    pub max_length: usize,
    pub hits: Vec<(SquaredDistance, Employee)>,
}

impl TopHits {

    pub fn new(max_length: usize) -> Self {

        // grows with the hits actually found, `max_length` can be far larger than the tree
        return Self {
            max_length,
            hits: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        return self.hits.len() >= self.max_length;
    }

    ///# Returns
    ///
    ///the highest distance of the list, or `None` while fewer than `max_length` records are held
    pub fn get_highest_dist(&self) -> Option<SquaredDistance> {

        match self.is_full() {
            true => self.hits.last().map(|(distance, _)| *distance),
            false => None,
        }
    }

    /// Whether something at `distance` could still make it into the list
    pub fn accepts(&self, distance: SquaredDistance) -> bool {

        if self.max_length == 0 {
            return false;
        }

        match self.get_highest_dist() {
            None => true,
            Some(worst) => distance < worst,
        }
    }

    ///Public method to be called on every record for consideration as a neighbor
    ///
    ///Records tied with one already held are placed after it, so earlier finds win ties.
    pub fn try_add(&mut self, distance: SquaredDistance, record: &Employee) {

        if !self.accepts(distance) {
            return;
        }

        let insert_index = self.hits
            .iter()
            .position(|(item, _)| *item > distance)
            .unwrap_or(self.hits.len());

        self.hits.insert(insert_index, (distance, record.clone()));
        self.hits.truncate(self.max_length);
    }

    pub fn into_hits(self) -> Vec<(SquaredDistance, Employee)> {
        return self.hits;
    }
}

#[derive(Debug)]
enum NodeAction {
    Descend,
    CheckIgnoredBranch(Direction),
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {

    pub fn new() -> Self {

        return Self {
            root: None,
            k: K,
        }
    }

    /// Builds a tree by recursive median split.
    ///
    /// At each level the slice is sorted on that level's axis and the element at `len / 2` becomes
    /// the node, so equal keys end up on the left. The slice is left reordered.
    pub fn build(records: &mut [Employee]) -> Self {

        let root = build_subtree(records, 0);

        debug!("built tree over {} records", records.len());

        return Self {
            root,
            k: K,
        }
    }

    pub fn is_empty(&self) -> bool {
        return self.root.is_none();
    }

    pub fn len(&self) -> usize {

        let mut count = 0;
        self.visit_in_order(|_, _| count += 1);

        return count;
    }

    pub fn height(&self) -> usize {
        return height_of(&self.root);
    }

    /// Inserts one record without rebalancing. Strictly smaller keys go left, everything else
    /// goes right.
    pub fn insert(&mut self, record: Employee) {

        debug!("inserting {}", record.name);
        insert_at(&mut self.root, record, 0);
    }

    /// Removes the node named `name`, steering by name comparison at every level.
    ///
    /// The walk treats the tree as if it were ordered by name: smaller names go left, larger go
    /// right, until an equal name is met. A node with an empty side is replaced by its other
    /// child. Otherwise it takes the record of the leftmost node of its right subtree, and that
    /// leftmost node is unlinked. Neither the walk nor the donor choice follows the split axes,
    /// so a record can be missed and the split order can be disturbed; `delete_exact` does not
    /// have either problem.
    ///
    ///# Returns
    ///
    ///whether a node was removed
    pub fn delete_by_name(&mut self, name: &str) -> bool {

        let removed = delete_by_name_at(&mut self.root, name);
        debug!("delete_by_name {}: {}", name, removed);

        return removed;
    }

    /// Removes the first record named `name` in in-order position, keeping the split order on
    /// every axis.
    ///
    /// The node is located by a full walk. Its replacement is the minimum on the node's own axis,
    /// taken from the right subtree when there is one, else from the left subtree which then
    /// becomes the right subtree.
    pub fn delete_exact(&mut self, name: &str) -> bool {

        let removed = delete_exact_at(&mut self.root, name, 0);
        debug!("delete_exact {}: {}", name, removed);

        return removed;
    }

    ///Returns whether or not a record equal to `record` is in the tree
    pub fn contains(&self, record: &Employee) -> bool {
        return contains_at(&self.root, record, 0);
    }

    /// Every record inside the closed rectangle `[low, high]`, in visiting order: a node is
    /// reported before anything in its subtrees.
    pub fn range_search(&self, low: &Employee, high: &Employee) -> Vec<Employee> {

        let mut result = Vec::new();
        range_at(&self.root, low, high, 0, &mut result);

        return result;
    }

    /// Closest record met on the single root-to-leaf descent towards `target`.
    ///
    /// The branch not taken is never inspected, so the answer can be farther than the true
    /// nearest neighbor. Use `nearest` for the exact answer.
    pub fn approximate_nearest(&self, target: &Employee) -> Option<Employee> {

        let mut best: Option<(&Employee, SquaredDistance)> = None;
        let mut curr = self.root.as_deref();
        let mut depth = 0;

        while let Some(node) = curr {

            let distance = node.record.distance(target);

            let closer = match best {
                None => true,
                Some((_, best_distance)) => distance < best_distance,
            };

            if closer {
                best = Some((&node.record, distance));
            }

            let direction = node.direction_for(target, Axis::for_depth(depth));
            curr = node.child(direction).as_deref();
            depth += 1;
        }

        return best.map(|(record, _)| record.clone());
    }

    /// Last record on the root-to-leaf descent towards `target`
    pub fn descent_leaf(&self, target: &Employee) -> Option<Employee> {

        let mut curr = self.root.as_deref()?;
        let mut depth = 0;

        while let Some(next) = curr.child(curr.direction_for(target, Axis::for_depth(depth))).as_deref() {
            curr = next;
            depth += 1;
        }

        return Some(curr.record.clone());
    }

    /// Exact nearest neighbor by squared distance
    pub fn nearest(&self, target: &Employee) -> Option<Employee> {

        return self.nearest_n(target, 1)
            .into_iter()
            .next()
            .map(|(_, record)| record);
    }

    ///Returns the `n` nearest records to `target` with their squared distances, closest first
    ///
    ///The side of each split that the target falls on is searched first; the other side is
    ///queued and only searched if the split line is closer than the worst hit held at that point.
    pub fn nearest_n(&self, target: &Employee, n: usize) -> Vec<(SquaredDistance, Employee)> {

        let mut hits = TopHits::new(n);

        let root = match self.root.as_deref() {
            Some(root) if n > 0 => root,
            _ => return hits.into_hits(),
        };

        let mut nodes_to_check: VecDeque<(&Node, usize, NodeAction)> = VecDeque::new();
        nodes_to_check.push_front((root, 0, NodeAction::Descend));

        while let Some((node, depth, action)) = nodes_to_check.pop_front() {

            match action {

                NodeAction::Descend => {

                    hits.try_add(node.record.distance(target), &node.record);

                    let direction = node.direction_for(target, Axis::for_depth(depth));
                    let ignored = match direction {
                        Direction::Left => Direction::Right,
                        Direction::Right => Direction::Left,
                    };

                    if let Some(child) = node.child(direction).as_deref() {
                        nodes_to_check.push_front((child, depth + 1, NodeAction::Descend));
                    }

                    if node.child(ignored).is_some() {
                        nodes_to_check.push_back((node, depth, NodeAction::CheckIgnoredBranch(ignored)));
                    }
                },

                NodeAction::CheckIgnoredBranch(direction) => {

                    let axis = Axis::for_depth(depth);
                    let gap = target.key(axis).abs_diff(node.record.key(axis)) as SquaredDistance;

                    if hits.accepts(gap * gap) {
                        if let Some(child) = node.child(direction).as_deref() {
                            nodes_to_check.push_front((child, depth + 1, NodeAction::Descend));
                        }
                    }
                },
            }
        }

        return hits.into_hits();
    }

    /// Records in left-subtree, node, right-subtree order.
    ///
    /// Deterministic but not sorted on either key.
    pub fn in_order(&self) -> Vec<Employee> {

        let mut records = Vec::new();
        self.visit_in_order(|_, record| records.push(record.clone()));

        return records;
    }

    pub fn salaries(&self) -> Vec<i32> {

        let mut salaries = Vec::new();
        self.visit_in_order(|_, record| salaries.push(record.salary));

        return salaries;
    }

    /// Calls `visit` with the depth and record of every node, in order
    pub fn visit_in_order<F: FnMut(usize, &Employee)>(&self, mut visit: F) {
        visit_at(&self.root, 0, &mut visit);
    }

    pub fn depth_lines(&self) -> Vec<String> {

        let mut lines = Vec::new();
        self.visit_in_order(|depth, record| lines.push(format!("Depth {}: {}", depth, record)));

        return lines;
    }
}

impl fmt::Display for Tree {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        for line in self.depth_lines() {
            writeln!(f, "{}", line)?;
        }

        Ok(())
    }
}

impl Drop for Tree {

    // unlinks nodes one at a time so a degenerate, list-shaped tree cannot exhaust the stack
    fn drop(&mut self) {

        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();

        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

fn build_subtree(records: &mut [Employee], depth: usize) -> Link {

    if records.is_empty() {
        return None;
    }

    let axis = Axis::for_depth(depth);
    records.sort_by_key(|record| record.key(axis));

    let median = records.len() / 2;
    let (left, rest) = records.split_at_mut(median);
    let (record, right) = match rest.split_first_mut() {
        Some((record, right)) => (record.clone(), right),
        None => return None,
    };

    return Some(Box::new(Node {
        record,
        left: build_subtree(left, depth + 1),
        right: build_subtree(right, depth + 1),
    }));
}

fn height_of(link: &Link) -> usize {

    match link {
        None => 0,
        Some(node) => 1 + height_of(&node.left).max(height_of(&node.right)),
    }
}

fn insert_at(link: &mut Link, record: Employee, depth: usize) {

    match link {
        None => *link = Some(Node::leaf(record)),
        Some(node) => {
            let direction = node.direction_for(&record, Axis::for_depth(depth));
            insert_at(node.child_mut(direction), record, depth + 1);
        },
    }
}

fn delete_by_name_at(link: &mut Link, name: &str) -> bool {

    let node = match link {
        None => return false,
        Some(node) => node,
    };

    match name.cmp(node.record.name.as_str()) {
        Ordering::Less => return delete_by_name_at(&mut node.left, name),
        Ordering::Greater => return delete_by_name_at(&mut node.right, name),
        Ordering::Equal => {},
    }

    if node.left.is_none() {
        let right = node.right.take();
        *link = right;
        return true;
    }

    if node.right.is_none() {
        let left = node.left.take();
        *link = left;
        return true;
    }

    if let Some(donor) = take_leftmost(&mut node.right) {
        node.record = donor;
    }

    return true;
}

/// Unlinks the leftmost node under `link`, moving its right subtree into its place
fn take_leftmost(link: &mut Link) -> Option<Employee> {

    let has_left = match link {
        None => return None,
        Some(node) => node.left.is_some(),
    };

    if has_left {
        return match link {
            Some(node) => take_leftmost(&mut node.left),
            None => None,
        };
    }

    let mut node = link.take()?;
    *link = node.right.take();

    return Some(node.record);
}

fn delete_exact_at(link: &mut Link, name: &str, depth: usize) -> bool {

    let node = match link {
        None => return false,
        Some(node) => node,
    };

    if delete_exact_at(&mut node.left, name, depth + 1) {
        return true;
    }

    if node.record.name == name {
        remove_node(link, depth);
        return true;
    }

    return delete_exact_at(&mut node.right, name, depth + 1);
}

/// Removes the node at `link` (which sits at `depth`) and repairs the split order below it
fn remove_node(link: &mut Link, depth: usize) {

    let axis = Axis::for_depth(depth);

    let node = match link {
        None => return,
        Some(node) => node,
    };

    if node.right.is_none() && node.left.is_some() {
        node.right = node.left.take();
    }

    let replacement = match min_on_axis(&node.right, axis, depth + 1) {
        Some(record) => record.clone(),
        None => {
            *link = None;
            return;
        },
    };

    remove_record(&mut node.right, &replacement, depth + 1);
    node.record = replacement;
}

/// Record with the smallest key on `axis` under `link`
fn min_on_axis(link: &Link, axis: Axis, depth: usize) -> Option<&Employee> {

    let node = link.as_deref()?;

    let left_min = min_on_axis(&node.left, axis, depth + 1);

    // only the left side can hold smaller keys when this level splits on the same axis
    let right_min = match Axis::for_depth(depth) == axis {
        true => None,
        false => min_on_axis(&node.right, axis, depth + 1),
    };

    let mut best = &node.record;
    for candidate in [left_min, right_min].into_iter().flatten() {
        if candidate.key(axis) < best.key(axis) {
            best = candidate;
        }
    }

    return Some(best);
}

/// Removes one node equal to `record`, following the split order to find it
fn remove_record(link: &mut Link, record: &Employee, depth: usize) -> bool {

    let node = match link {
        None => return false,
        Some(node) => node,
    };

    if node.record == *record {
        remove_node(link, depth);
        return true;
    }

    let axis = Axis::for_depth(depth);

    match record.key(axis).cmp(&node.record.key(axis)) {
        Ordering::Less => remove_record(&mut node.left, record, depth + 1),
        Ordering::Greater => remove_record(&mut node.right, record, depth + 1),
        Ordering::Equal => {
            remove_record(&mut node.left, record, depth + 1)
                || remove_record(&mut node.right, record, depth + 1)
        },
    }
}

fn contains_at(link: &Link, record: &Employee, depth: usize) -> bool {

    let node = match link {
        None => return false,
        Some(node) => node,
    };

    if node.record == *record {
        return true;
    }

    let axis = Axis::for_depth(depth);

    match record.key(axis).cmp(&node.record.key(axis)) {
        Ordering::Less => contains_at(&node.left, record, depth + 1),
        Ordering::Greater => contains_at(&node.right, record, depth + 1),
        Ordering::Equal => {
            contains_at(&node.left, record, depth + 1) || contains_at(&node.right, record, depth + 1)
        },
    }
}

fn range_at(link: &Link, low: &Employee, high: &Employee, depth: usize, result: &mut Vec<Employee>) {

    let node = match link {
        None => return,
        Some(node) => node,
    };

    if node.record.within(low, high) {
        result.push(node.record.clone());
    }

    let axis = Axis::for_depth(depth);
    let split_value = node.record.key(axis);

    if low.key(axis) <= split_value {
        range_at(&node.left, low, high, depth + 1, result);
    }

    if high.key(axis) >= split_value {
        range_at(&node.right, low, high, depth + 1, result);
    }
}

fn visit_at<F: FnMut(usize, &Employee)>(link: &Link, depth: usize, visit: &mut F) {

    if let Some(node) = link {
        visit_at(&node.left, depth + 1, visit);
        visit(depth, &node.record);
        visit_at(&node.right, depth + 1, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::{thread_rng, Rng};
    use std::collections::HashSet;

    fn e(name: &str, experience: i32, salary: i32) -> Employee {
        Employee::new(name, experience, salary)
    }

    fn names(records: &[Employee]) -> HashSet<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    fn random_records(n: usize, max_key: i32) -> Vec<Employee> {

        let mut rng = thread_rng();
        (0..n)
            .map(|i| e(&format!("emp{:05}", i), rng.gen_range(0..=max_key), rng.gen_range(0..=max_key)))
            .collect()
    }

    fn brute_force_range(records: &[Employee], low: &Employee, high: &Employee) -> Vec<Employee> {
        records.iter().filter(|r| r.within(low, high)).cloned().collect()
    }

    fn sorted(mut records: Vec<Employee>) -> Vec<Employee> {
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Every descendant on the left is `<=` and every descendant on the right is `>=` the node's
    /// key on its axis; with `strict_left` the left side must be strictly smaller.
    fn check_split_order(link: &Link, depth: usize, strict_left: bool) {

        let node = match link {
            None => return,
            Some(node) => node,
        };

        let axis = Axis::for_depth(depth);
        let split_value = node.record.key(axis);

        let mut left = Vec::new();
        visit_at(&node.left, 0, &mut |_: usize, r: &Employee| left.push(r.key(axis)));
        match strict_left {
            true => assert!(left.iter().all(|v| *v < split_value), "left side not below split at depth {}", depth),
            false => assert!(left.iter().all(|v| *v <= split_value), "left side above split at depth {}", depth),
        }

        let mut right = Vec::new();
        visit_at(&node.right, 0, &mut |_: usize, r: &Employee| right.push(r.key(axis)));
        assert!(right.iter().all(|v| *v >= split_value), "right side below split at depth {}", depth);

        check_split_order(&node.left, depth + 1, strict_left);
        check_split_order(&node.right, depth + 1, strict_left);
    }

    fn leftmost(node: &Node) -> &Node {

        let mut curr = node;
        while let Some(next) = curr.left.as_deref() {
            curr = next;
        }
        curr
    }

    /// The record a plain root-to-leaf descent ends closest to
    fn descent_best(tree: &Tree, target: &Employee) -> Option<SquaredDistance> {

        let mut best: Option<SquaredDistance> = None;
        let mut curr = tree.root.as_deref();
        let mut depth = 0;
        while let Some(node) = curr {
            let d = node.record.distance(target);
            best = Some(best.map_or(d, |b| b.min(d)));
            let axis = Axis::for_depth(depth);
            curr = match target.key(axis) < node.record.key(axis) {
                true => node.left.as_deref(),
                false => node.right.as_deref(),
            };
            depth += 1;
        }
        best
    }

    #[test]
    fn empty_tree() {

        let tree = Tree::new();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.k, 2);
        assert!(tree.in_order().is_empty());
        assert!(tree.range_search(&Employee::point(0, 0), &Employee::point(100, 100)).is_empty());
        assert_eq!(tree.approximate_nearest(&Employee::point(1, 1)), None);
        assert_eq!(tree.nearest(&Employee::point(1, 1)), None);
        assert_eq!(tree.to_string(), "");

        let mut tree = tree;
        assert!(!tree.delete_by_name("nobody"));
        assert!(!tree.delete_exact("nobody"));
    }

    #[test]
    fn build_picks_median_per_axis() {

        let mut records = vec![e("P", 1, 10), e("Q", 9, 90), e("R", 5, 50)];
        let tree = Tree::build(&mut records);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.record.name, "R");
        assert_eq!(root.left.as_ref().unwrap().record.name, "P");
        assert_eq!(root.right.as_ref().unwrap().record.name, "Q");
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn build_sends_equal_keys_left() {

        let mut records = vec![e("a", 5, 1), e("b", 5, 2), e("c", 5, 3)];
        let tree = Tree::build(&mut records);

        check_split_order(&tree.root, 0, false);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn build_is_balanced() {

        let mut records = random_records(1023, 1000);
        let tree = Tree::build(&mut records);

        assert_eq!(tree.len(), 1023);
        assert_eq!(tree.height(), 10);
        check_split_order(&tree.root, 0, false);
    }

    #[test]
    fn build_then_range() {

        let mut records = vec![e("A", 2, 50), e("B", 5, 80), e("C", 7, 60), e("D", 10, 120), e("E", 3, 40)];
        let tree = Tree::build(&mut records);

        let found = tree.range_search(&Employee::point(3, 40), &Employee::point(7, 80));

        assert_eq!(found.len(), 3);
        assert_eq!(names(&found), names(&[e("B", 5, 80), e("C", 7, 60), e("E", 3, 40)]));
        assert!(found.contains(&e("B", 5, 80)));
        assert!(found.contains(&e("C", 7, 60)));
        assert!(found.contains(&e("E", 3, 40)));
    }

    #[test]
    fn range_reports_node_before_its_subtrees() {

        let mut records = vec![e("P", 1, 10), e("Q", 9, 90), e("R", 5, 50)];
        let tree = Tree::build(&mut records);

        let found = tree.range_search(&Employee::point(0, 0), &Employee::point(100, 100));
        let order: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["R", "P", "Q"]);
    }

    #[test]
    fn insert_equal_key_goes_right() {

        let mut tree = Tree::new();
        tree.insert(e("X", 5, 100));
        tree.insert(e("Y", 5, 200));

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.record.name, "X");
        assert!(root.left.is_none());
        assert_eq!(root.right.as_ref().unwrap().record.name, "Y");
    }

    #[test]
    fn insert_alternates_axes() {

        let mut tree = Tree::new();
        tree.insert(e("root", 5, 100));
        tree.insert(e("right", 8, 100));
        // depth 1 splits on salary
        tree.insert(e("right_left", 9, 50));
        tree.insert(e("right_right", 1_000, 150));

        let right = tree.root.as_ref().unwrap().right.as_ref().unwrap();
        assert_eq!(right.record.name, "right");
        assert_eq!(right.left.as_ref().unwrap().record.name, "right_left");
        assert_eq!(right.right.as_ref().unwrap().record.name, "right_right");
    }

    #[test]
    fn insert_then_find_in_singleton_rectangle() {

        let mut records = random_records(200, 50);
        let mut tree = Tree::build(&mut records);

        for i in 0..50 {
            let record = e(&format!("new{}", i), i % 7, 25);
            tree.insert(record.clone());
            let point = Employee::point(record.experience, record.salary);
            assert!(tree.range_search(&point, &point).contains(&record));
            assert!(tree.contains(&record));
        }

        assert_eq!(tree.len(), 250);
    }

    #[test]
    fn insert_grown_tree_keeps_equal_keys_right() {

        // keys in 0..=30 over 500 records, so equal keys are certain
        let mut tree = Tree::new();
        for record in random_records(500, 30) {
            tree.insert(record);
        }

        check_split_order(&tree.root, 0, true);
        assert_eq!(tree.len(), 500);
    }

    #[test]
    fn contains_finds_build_and_insert_placements() {

        let mut records = vec![e("a", 5, 1), e("b", 5, 2), e("c", 5, 3), e("d", 2, 2)];
        let mut tree = Tree::build(&mut records.clone());
        tree.insert(e("z", 5, 2));
        records.push(e("z", 5, 2));

        for record in records.iter() {
            assert!(tree.contains(record));
        }

        assert!(!tree.contains(&e("a", 5, 2)));
        assert!(!tree.contains(&e("q", 7, 7)));
    }

    #[test]
    fn delete_leaf_and_splice() {

        let mut records = vec![e("A", 1, 10), e("B", 2, 20), e("C", 3, 30)];
        let mut tree = Tree::build(&mut records);

        assert!(tree.delete_by_name("B"));

        assert_eq!(names(&tree.in_order()), names(&[e("A", 1, 10), e("C", 3, 30)]));
        assert_eq!(tree.len(), 2);

        let everything = tree.range_search(&Employee::point(0, 0), &Employee::point(100, 100));
        assert_eq!(everything.len(), 2);
        assert!(everything.contains(&e("A", 1, 10)));
        assert!(everything.contains(&e("C", 3, 30)));
    }

    #[test]
    fn delete_with_two_children_uses_leftmost_of_right_subtree() {

        let mut records = vec![e("M", 5, 50), e("L", 2, 30), e("N", 8, 80), e("K", 1, 20), e("O", 9, 90)];
        let mut tree = Tree::build(&mut records);

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.record.name, "M");
        let leftmost = leftmost(root.right.as_ref().unwrap()).record.clone();
        assert_eq!(leftmost.name, "N");

        assert!(tree.delete_by_name("M"));

        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.record, leftmost);
        assert_eq!(tree.len(), 4);
        assert_eq!(names(&tree.in_order()), names(&[e("K", 0, 0), e("L", 0, 0), e("N", 0, 0), e("O", 0, 0)]));
    }

    #[test]
    fn delete_by_name_single_child_splices() {

        let mut tree = Tree::new();
        tree.insert(e("m", 5, 5));
        tree.insert(e("z", 9, 9));
        tree.insert(e("y", 10, 1));

        // "z" only has a left child
        assert!(tree.delete_by_name("z"));
        let right = tree.root.as_ref().unwrap().right.as_ref().unwrap();
        assert_eq!(right.record.name, "y");
        assert!(right.left.is_none() && right.right.is_none());

        assert!(tree.delete_by_name("m"));
        assert_eq!(tree.root.as_ref().unwrap().record.name, "y");
        assert_eq!(tree.len(), 1);

        assert!(tree.delete_by_name("y"));
        assert!(tree.is_empty());
    }

    #[test]
    fn delete_by_name_steers_by_name() {

        // "b" sits right of the root by experience but the walk goes left because "b" < "m"
        let mut tree = Tree::new();
        tree.insert(e("m", 5, 5));
        tree.insert(e("b", 9, 9));

        assert!(!tree.delete_by_name("b"));
        assert_eq!(tree.len(), 2);
        assert!(!tree.delete_by_name("absent"));

        assert!(tree.delete_exact("b"));
        assert_eq!(tree.in_order(), vec![e("m", 5, 5)]);
    }

    #[test]
    fn delete_by_name_unlinks_donor_the_name_walk_would_miss() {

        // "zz" is the leftmost node under "y", but a walk by name from "y" would go right
        let mut tree = Tree::new();
        tree.insert(e("m", 5, 5));
        tree.insert(e("l", 1, 1));
        tree.insert(e("y", 9, 9));
        tree.insert(e("zz", 7, 1));

        assert!(tree.delete_by_name("m"));

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root.as_ref().unwrap().record, e("zz", 7, 1));
        assert_eq!(tree.in_order().iter().filter(|r| r.name == "zz").count(), 1);
        assert_eq!(sorted(tree.in_order()), vec![e("l", 1, 1), e("y", 9, 9), e("zz", 7, 1)]);

        let right = tree.root.as_ref().unwrap().right.as_ref().unwrap();
        assert!(right.left.is_none() && right.right.is_none());
    }

    #[test]
    fn delete_by_name_then_absent() {

        let mut records = random_records(300, 100);
        let mut tree = Tree::build(&mut records.clone());
        records.shuffle(&mut thread_rng());

        let mut expected = records.len();
        for record in records.iter().take(150) {

            if tree.delete_by_name(&record.name) {
                expected -= 1;
                assert!(tree.in_order().iter().all(|r| r.name != record.name));
            }

            assert_eq!(tree.len(), expected);
            assert_eq!(tree.in_order().len(), expected);
        }
    }

    #[test]
    fn delete_exact_keeps_split_order_and_range_completeness() {

        for _ in 0..10 {

            let mut records = random_records(400, 40);
            let mut tree = Tree::build(&mut records.clone());

            for extra in random_records(100, 40).into_iter() {
                let extra = e(&format!("extra_{}", extra.name), extra.experience, extra.salary);
                tree.insert(extra.clone());
                records.push(extra);
            }

            records.shuffle(&mut thread_rng());
            let (removed, kept) = records.split_at(250);

            for record in removed.iter() {
                assert!(tree.delete_exact(&record.name), "{} not removed", record.name);
            }

            check_split_order(&tree.root, 0, false);
            assert_eq!(sorted(tree.in_order()), sorted(kept.to_vec()));

            for _ in 0..20 {
                let mut rng = thread_rng();
                let a = Employee::point(rng.gen_range(0..=40), rng.gen_range(0..=40));
                let b = Employee::point(rng.gen_range(0..=40), rng.gen_range(0..=40));
                let low = Employee::point(a.experience.min(b.experience), a.salary.min(b.salary));
                let high = Employee::point(a.experience.max(b.experience), a.salary.max(b.salary));

                let found = tree.range_search(&low, &high);
                assert_eq!(sorted(found), sorted(brute_force_range(kept, &low, &high)));
            }
        }
    }

    #[test]
    fn delete_exact_removes_first_in_order_duplicate() {

        let mut tree = Tree::new();
        tree.insert(e("dup", 5, 5));
        tree.insert(e("dup", 1, 1));
        tree.insert(e("other", 7, 7));

        assert!(tree.delete_exact("dup"));
        assert_eq!(sorted(tree.in_order()), vec![e("dup", 5, 5), e("other", 7, 7)]);
    }

    #[test]
    fn fuzzed_range_matches_brute_force() {

        let mut rng = thread_rng();

        for _ in 0..20 {

            let records = random_records(rng.gen_range(1..400), 60);

            let mut built = Tree::build(&mut records.clone());
            let mut grown = Tree::new();
            for record in records.iter() {
                grown.insert(record.clone());
            }

            for _ in 0..25 {
                let low = Employee::point(rng.gen_range(-5..=60), rng.gen_range(-5..=60));
                let high = Employee::point(low.experience + rng.gen_range(0..30), low.salary + rng.gen_range(0..30));
                let expected = sorted(brute_force_range(&records, &low, &high));

                let from_built = built.range_search(&low, &high);
                assert!(from_built.iter().all(|r| r.within(&low, &high)));
                assert_eq!(sorted(from_built), expected);
                assert_eq!(sorted(grown.range_search(&low, &high)), expected);
            }

            // inverted rectangles are empty
            let high = Employee::point(0, 0);
            let low = Employee::point(10, 10);
            assert!(built.range_search(&low, &high).is_empty());

            built.insert(e("late", 1, 1));
            grown.insert(e("late", 1, 1));
            let point = Employee::point(1, 1);
            assert!(built.range_search(&point, &point).contains(&e("late", 1, 1)));
            assert!(grown.range_search(&point, &point).contains(&e("late", 1, 1)));
        }
    }

    #[test]
    fn approximate_nearest_follows_descent() {

        let mut records = vec![e("P", 1, 10), e("Q", 9, 90), e("R", 5, 50)];
        let tree = Tree::build(&mut records);

        // descent: R, then left to P since 0 < 5
        let target = Employee::point(0, 100);
        assert_eq!(tree.descent_leaf(&target), Some(e("P", 1, 10)));

        // R (2525) is closer than P (8101) and is kept; Q (181) is never visited
        assert_eq!(tree.approximate_nearest(&target), Some(e("R", 5, 50)));
        assert_eq!(tree.nearest(&target), Some(e("Q", 9, 90)));
    }

    #[test]
    fn approximate_nearest_can_miss_exact_answer() {

        let mut tree = Tree::new();
        tree.insert(e("root", 10, 0));
        tree.insert(e("far_left", 0, 0));
        tree.insert(e("close_right", 10, 1));

        // descent goes left of the root and never sees the right side
        let target = Employee::point(9, 1);
        assert_eq!(tree.approximate_nearest(&target), Some(e("root", 10, 0)));
        assert_eq!(tree.nearest(&target), Some(e("close_right", 10, 1)));
    }

    #[test]
    fn fuzzed_approximate_nearest_agrees_with_descent() {

        let mut rng = thread_rng();

        for _ in 0..20 {

            let mut records = random_records(300, 1000);
            let tree = Tree::build(&mut records);

            for _ in 0..50 {
                let target = Employee::point(rng.gen_range(0..=1000), rng.gen_range(0..=1000));
                let found = tree.approximate_nearest(&target).unwrap();
                assert_eq!(Some(found.distance(&target)), descent_best(&tree, &target));

                let exact = tree.nearest(&target).unwrap();
                assert!(exact.distance(&target) <= found.distance(&target));
            }
        }
    }

    #[test]
    fn fuzzed_nearest_matches_brute_force() {

        let mut rng = thread_rng();

        for _ in 0..20 {

            let records = random_records(rng.gen_range(1..500), 500);
            let mut tree = Tree::build(&mut records.clone());
            for extra in random_records(50, 500) {
                tree.insert(extra);
            }
            let everything = tree.in_order();

            for _ in 0..30 {
                let target = Employee::point(rng.gen_range(-50..=550), rng.gen_range(-50..=550));

                let best = everything.iter().map(|r| r.distance(&target)).min().unwrap();
                assert_eq!(tree.nearest(&target).unwrap().distance(&target), best);

                let n = rng.gen_range(1..20);
                let mut expected: Vec<_> = everything.iter().map(|r| r.distance(&target)).collect();
                expected.sort();
                expected.truncate(n);

                let hits = tree.nearest_n(&target, n);
                let distances: Vec<_> = hits.iter().map(|(d, _)| *d).collect();
                assert_eq!(distances, expected);
                assert!(hits.iter().all(|(d, r)| r.distance(&target) == *d));
            }
        }
    }

    #[test]
    fn nearest_n_edge_cases() {

        let mut records = vec![e("a", 0, 0), e("b", 3, 4), e("c", 6, 8)];
        let tree = Tree::build(&mut records);
        let target = Employee::point(0, 0);

        assert!(tree.nearest_n(&target, 0).is_empty());

        let all = tree.nearest_n(&target, 10);
        assert_eq!(all, vec![(0, e("a", 0, 0)), (25, e("b", 3, 4)), (100, e("c", 6, 8))]);

        assert_eq!(tree.nearest_n(&target, usize::MAX), all);
    }

    #[test]
    fn top_hits_keeps_earlier_ties() {

        let mut hits = TopHits::new(2);
        assert!(hits.accepts(u128::MAX));
        assert_eq!(hits.get_highest_dist(), None);

        hits.try_add(5, &e("first", 0, 0));
        hits.try_add(5, &e("second", 0, 0));
        assert!(hits.is_full());
        hits.try_add(5, &e("third", 0, 0));
        hits.try_add(1, &e("closest", 0, 0));

        let kept: Vec<_> = hits.into_hits().into_iter().map(|(d, r)| (d, r.name)).collect();
        assert_eq!(kept, vec![(1, "closest".to_string()), (5, "first".to_string())]);
    }

    #[test]
    fn in_order_visits_every_node_once() {

        let mut records = random_records(777, 100);
        let tree = Tree::build(&mut records.clone());

        let visited = tree.in_order();
        assert_eq!(visited.len(), 777);
        assert_eq!(sorted(visited), sorted(records.drain(..).collect()));
    }

    #[test]
    fn pretty_print_with_depths() {

        let mut records = vec![e("P", 1, 10), e("Q", 9, 90), e("R", 5, 50)];
        let tree = Tree::build(&mut records);

        let expected = "Depth 1: Name: P, Experience: 1, Salary: 10\n\
                        Depth 0: Name: R, Experience: 5, Salary: 50\n\
                        Depth 1: Name: Q, Experience: 9, Salary: 90\n";
        assert_eq!(tree.to_string(), expected);
    }

    #[test]
    fn deep_tree_drops_without_overflow() {

        let mut tree = Tree::new();
        for i in 0..5_000 {
            tree.insert(e(&i.to_string(), i, i));
        }

        assert_eq!(tree.height(), 5_000);
        drop(tree);
    }
}
