//! Arena of every field in a schema with generated ids
//!
//! User-chosen keys are only unique per field list, so the index assigns each
//! field a [`FieldId`] and resolves full dotted paths to it. The index also
//! derives the condition dependency graph used for cycle detection.

use std::collections::HashMap;

use super::condition::Condition;
use super::field::Field;
use super::section::FormSchema;
use crate::path::FieldPath;

/// Generated identity of a field within one [`SchemaIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

/// One indexed field
#[derive(Debug, Clone)]
pub struct FieldNode<'a> {
    /// Generated id
    pub id:                   FieldId,
    /// Full dotted path of the field's value
    pub path:                 FieldPath,
    /// The field definition
    pub field:                &'a Field,
    /// Condition of the enclosing subsection, if any
    pub subsection_condition: Option<&'a Condition>,
}

impl FieldNode<'_> {
    /// Every condition that gates this field's visibility
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.subsection_condition
            .into_iter()
            .chain(self.field.condition.as_ref())
    }
}

/// Arena of all fields of one schema in display order
#[derive(Debug, Clone)]
pub struct SchemaIndex<'a> {
    nodes:   Vec<FieldNode<'a>>,
    by_path: HashMap<FieldPath, FieldId>,
}

impl<'a> SchemaIndex<'a> {
    /// Index every top-level and subsection field of `schema`
    pub fn build(schema: &'a FormSchema) -> Self {
        let mut nodes = Vec::new();
        for section in &schema.sections {
            for field in &section.fields {
                nodes.push(FieldNode {
                    id: FieldId(nodes.len()),
                    path: schema.field_path(&section.key, &field.key),
                    field,
                    subsection_condition: None,
                });
            }
            for sub in section.subsections() {
                let sub_path = schema.subsection_path(&section.key, &sub.key);
                for field in &sub.fields {
                    nodes.push(FieldNode {
                        id: FieldId(nodes.len()),
                        path: sub_path.join(&field.key),
                        field,
                        subsection_condition: sub.condition.as_ref(),
                    });
                }
            }
        }

        let mut by_path = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            by_path.entry(node.path.clone()).or_insert(node.id);
        }

        Self { nodes, by_path }
    }

    /// All nodes in display order
    pub fn nodes(&self) -> &[FieldNode<'a>] {
        &self.nodes
    }

    /// Node by id
    pub fn get(&self, id: FieldId) -> Option<&FieldNode<'a>> {
        self.nodes.get(id.0)
    }

    /// Id of the first field at `path`
    pub fn lookup(&self, path: &FieldPath) -> Option<FieldId> {
        self.by_path.get(path).copied()
    }

    /// Every field path, in display order; the condition-target menu
    pub fn all_field_paths(&self) -> Vec<FieldPath> {
        self.nodes.iter().map(|node| node.path.clone()).collect()
    }

    /// `(dependent, target path)` for every condition gating a field
    pub fn dependency_edges(&self) -> Vec<(FieldId, FieldPath)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                let id = node.id;
                node.conditions()
                    .map(move |condition| (id, condition.field.clone()))
            })
            .collect()
    }

    /// Cycles in the condition graph, each listed as the paths along it
    ///
    /// Edges whose target is not a field of this schema are ignored; they
    /// cannot close a cycle here.
    pub fn condition_cycles(&self) -> Vec<Vec<FieldPath>> {
        let mut adjacency: Vec<Vec<FieldId>> = vec![Vec::new(); self.nodes.len()];
        for (dependent, target) in self.dependency_edges() {
            if let Some(target_id) = self.lookup(&target) {
                adjacency[dependent.0].push(target_id);
            }
        }

        let mut state = vec![Visit::Unseen; self.nodes.len()];
        let mut stack = Vec::new();
        let mut cycles = Vec::new();
        for node in &self.nodes {
            if state[node.id.0] == Visit::Unseen {
                self.visit(node.id, &adjacency, &mut state, &mut stack, &mut cycles);
            }
        }
        cycles
    }

    fn visit(
        &self,
        id: FieldId,
        adjacency: &[Vec<FieldId>],
        state: &mut [Visit],
        stack: &mut Vec<FieldId>,
        cycles: &mut Vec<Vec<FieldPath>>,
    ) {
        state[id.0] = Visit::OnStack;
        stack.push(id);
        for &next in &adjacency[id.0] {
            match state[next.0] {
                Visit::Unseen => self.visit(next, adjacency, state, stack, cycles),
                Visit::OnStack => {
                    let start = stack.iter().position(|&s| s == next).unwrap_or(0);
                    cycles.push(
                        stack[start..]
                            .iter()
                            .map(|&member| self.nodes[member.0].path.clone())
                            .collect(),
                    );
                }
                Visit::Done => {}
            }
        }
        stack.pop();
        state[id.0] = Visit::Done;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    OnStack,
    Done,
}
