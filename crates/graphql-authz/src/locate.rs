//! Maps response paths back to the fields of the executed operation.

use async_graphql::{
    parser::types::{DocumentOperations, ExecutableDocument, Field, OperationDefinition, Selection, SelectionSet},
    PathSegment, Pos, Positioned,
};

/// One step of a response path, ordered the way the executor walks the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Step {
    /// Rank of the response key among the keys of its selection set, fragments expanded in place.
    Field(usize),
    Index(usize),
}

pub(crate) struct Located {
    /// Comparing two keys gives the depth-first, left-to-right order of the fields.
    pub key: Vec<Step>,
    pub position: Option<Pos>,
}

pub(crate) struct Operation {
    document: ExecutableDocument,
    name: Option<String>,
}

impl Operation {
    pub fn new(document: ExecutableDocument) -> Self {
        Self { document, name: None }
    }

    pub fn select(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_owned);
    }

    pub fn locate(&self, path: &[PathSegment]) -> Option<Located> {
        // Fields sharing a response key are merged, so a path may continue in several selection sets.
        let mut selection_sets = vec![&self.definition()?.selection_set.node];
        let mut key = Vec::with_capacity(path.len());
        let mut position = None;

        for segment in path {
            match segment {
                PathSegment::Index(index) => key.push(Step::Index(*index)),
                PathSegment::Field(response_key) => {
                    let mut fields = Vec::new();
                    for selection_set in selection_sets.iter().copied() {
                        self.collect_fields(selection_set, &mut fields);
                    }

                    let mut response_keys = Vec::new();
                    for field in &fields {
                        let field_key = field.node.response_key().node.as_str();
                        if !response_keys.contains(&field_key) {
                            response_keys.push(field_key);
                        }
                    }
                    let rank = response_keys.iter().position(|field_key| *field_key == response_key.as_str())?;

                    let merged = fields
                        .into_iter()
                        .filter(|field| field.node.response_key().node.as_str() == response_key.as_str())
                        .collect::<Vec<_>>();

                    key.push(Step::Field(rank));
                    position = merged.first().map(|field| field.pos);
                    selection_sets = merged.iter().map(|field| &field.node.selection_set.node).collect();
                }
            }
        }

        Some(Located { key, position })
    }

    fn definition(&self) -> Option<&OperationDefinition> {
        match &self.document.operations {
            DocumentOperations::Single(operation) => Some(&operation.node),
            DocumentOperations::Multiple(operations) => match &self.name {
                Some(name) => operations
                    .iter()
                    .find(|(operation_name, _)| operation_name.as_str() == name.as_str())
                    .map(|(_, operation)| &operation.node),
                None if operations.len() == 1 => operations.values().next().map(|operation| &operation.node),
                None => None,
            },
        }
    }

    /// Fields of a selection set in execution order, fragment spreads and inline fragments
    /// expanded where they are written.
    fn collect_fields<'a>(&'a self, selection_set: &'a SelectionSet, fields: &mut Vec<&'a Positioned<Field>>) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => fields.push(field),
                Selection::InlineFragment(fragment) => self.collect_fields(&fragment.node.selection_set.node, fields),
                Selection::FragmentSpread(spread) => {
                    if let Some(fragment) = self.document.fragments.get(&spread.node.fragment_name.node) {
                        self.collect_fields(&fragment.node.selection_set.node, fields);
                    }
                }
            }
        }
    }
}
