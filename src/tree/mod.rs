//! Category tree construction from flat parent-pointer records.
//!
//! Records whose parent is missing from the input are dropped together with
//! their descendants; they are never promoted to roots. Parent cycles and
//! duplicate ids are rejected as validation errors.
//!
//! Building and searching walk the tree with explicit stacks, so depth is
//! bounded by memory rather than the call stack. Drop and the derived
//! `Clone`/`PartialEq` of `CategoryNode` still recurse per level.

use std::collections::{HashMap, HashSet};

use crate::errors::AppError;
use crate::models::{CategoryNode, CategoryRecord};

/// Build the category forest from records in any order.
///
/// Children appear in the same relative order as in `records`, and so do
/// roots.
pub fn build_tree(records: &[CategoryRecord]) -> Result<Vec<CategoryNode>, AppError> {
    // Pass 1: id -> record index
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        if index.insert(record.id, position).is_some() {
            return Err(AppError::Validation(format!(
                "Duplicate category id {}",
                record.id
            )));
        }
    }

    detect_cycles(records, &index)?;

    // Pass 2: parent -> children, preserving input order
    let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        if record.is_root() {
            continue;
        }
        if index.contains_key(&record.parent_id) {
            children.entry(record.parent_id).or_default().push(position);
        } else {
            tracing::warn!(
                category_id = record.id,
                parent_id = record.parent_id,
                "Dropping category with unknown parent"
            );
        }
    }

    // Pass 3: roots
    let root_positions: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_root())
        .map(|(position, _)| position)
        .collect();
    let roots = assemble(records, &children, &root_positions);

    tracing::debug!(
        records = records.len(),
        roots = roots.len(),
        "Built category tree"
    );

    Ok(roots)
}

struct Frame {
    position: usize,
    level: u32,
    next_child: usize,
    built: Vec<CategoryNode>,
}

impl Frame {
    fn new(position: usize, level: u32) -> Self {
        Self {
            position,
            level,
            next_child: 0,
            built: Vec::new(),
        }
    }
}

/// Post-order assembly: a node is finished once all its children are.
fn assemble(
    records: &[CategoryRecord],
    children: &HashMap<i64, Vec<usize>>,
    root_positions: &[usize],
) -> Vec<CategoryNode> {
    let mut forest = Vec::with_capacity(root_positions.len());

    for &root in root_positions {
        let mut stack = vec![Frame::new(root, 0)];
        while let Some(frame) = stack.last_mut() {
            let id = records[frame.position].id;
            if let Some(&child) = children.get(&id).and_then(|kids| kids.get(frame.next_child)) {
                frame.next_child += 1;
                let level = frame.level + 1;
                stack.push(Frame::new(child, level));
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            let record = &records[done.position];
            let node = CategoryNode {
                id: record.id,
                name: record.name.clone(),
                level: done.level,
                children: done.built,
            };
            match stack.last_mut() {
                Some(parent) => parent.built.push(node),
                None => forest.push(node),
            }
        }
    }

    forest
}

/// Walk every parent chain once; a chain that revisits one of its own nodes
/// is a cycle.
fn detect_cycles(records: &[CategoryRecord], index: &HashMap<i64, usize>) -> Result<(), AppError> {
    let mut settled: HashSet<i64> = HashSet::with_capacity(records.len());

    for record in records {
        let mut chain: Vec<i64> = Vec::new();
        let mut on_chain: HashSet<i64> = HashSet::new();
        let mut current = Some(record);

        while let Some(node) = current {
            if settled.contains(&node.id) {
                break;
            }
            if !on_chain.insert(node.id) {
                return Err(AppError::Validation(format!(
                    "Category {} is part of a parent cycle",
                    node.id
                )));
            }
            chain.push(node.id);
            current = if node.is_root() {
                None
            } else {
                index.get(&node.parent_id).map(|&position| &records[position])
            };
        }

        settled.extend(chain);
    }

    Ok(())
}

/// Depth-first pre-order search for a node by id.
pub fn find_node(roots: &[CategoryNode], id: i64) -> Option<&CategoryNode> {
    let mut stack: Vec<&CategoryNode> = roots.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}

/// Nodes from a root down to `id`, inclusive. Empty when `id` is absent.
pub fn path_to(roots: &[CategoryNode], id: i64) -> Vec<&CategoryNode> {
    let mut path: Vec<&CategoryNode> = Vec::new();
    let mut stack: Vec<(&CategoryNode, usize)> = roots.iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        path.truncate(depth);
        path.push(node);
        if node.id == id {
            return path;
        }
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    Vec::new()
}

/// Every node in depth-first pre-order, for indented rendering.
pub fn flatten(roots: &[CategoryNode]) -> Vec<&CategoryNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&CategoryNode> = roots.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}
