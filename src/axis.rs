use crate::model::{Hierarchy, Organ};
use crate::settings::ROOTS;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A presentation copy of a hierarchy node, carrying its expand/collapse state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchicalItem {
    pub id: String,
    pub label: String,
    pub children: Vec<HierarchicalItem>,
    pub expanded: bool,
}

/// Flattened, render-ready axis entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AxisLabels {
    pub labels: Vec<String>,
    pub ids: Vec<String>,
    pub expanded: Vec<bool>,
}

/// Anything a heatmap cell can hold; empty cells carry no data.
pub trait Cell {
    fn has_data(&self) -> bool;
}

impl Cell for Vec<String> {
    fn has_data(&self) -> bool {
        !self.is_empty()
    }
}

impl<V> Cell for IndexMap<String, V> {
    fn has_data(&self) -> bool {
        !self.is_empty()
    }
}

// ################################################
// ######## y axis ################################
// ################################################

fn build_item(node_id: &str, hierarchy: &Hierarchy) -> Option<HierarchicalItem> {
    let node = hierarchy.get(node_id)?;
    Some(HierarchicalItem {
        id: node_id.to_string(),
        label: node.name.clone(),
        children: node
            .children
            .iter()
            .filter_map(|child| build_item(child, hierarchy))
            .collect(),
        expanded: false,
    })
}

///Given the node table, return the collapsed presentation tree below the three roots.
pub fn get_y_axis(hierarchy: &Hierarchy) -> Vec<HierarchicalItem> {
    ROOTS
        .iter()
        .filter_map(|root| build_item(root.id, hierarchy))
        .collect()
}

///Given a node id, return the presentation tree rooted at that node.
pub fn get_y_axis_for_node(node_id: &str, hierarchy: &Hierarchy) -> Vec<HierarchicalItem> {
    build_item(node_id, hierarchy).into_iter().collect()
}

///Flatten the presentation tree in pre-order: an item contributes its own entry and,
///when expanded, the entries of its children. Child labels read `parent - child`.
pub fn generate_y_labels_and_ids(items: &[HierarchicalItem], prefix: &str) -> AxisLabels {
    let mut result = AxisLabels::default();
    for item in items {
        let full_label = if prefix.is_empty() {
            item.label.clone()
        } else {
            format!("{} - {}", prefix, item.label)
        };
        result.labels.push(full_label.clone());
        result.ids.push(item.id.clone());
        result.expanded.push(item.expanded);

        if item.expanded && !item.children.is_empty() {
            let children = generate_y_labels_and_ids(&item.children, &full_label);
            result.labels.extend(children.labels);
            result.ids.extend(children.ids);
            result.expanded.extend(children.expanded);
        }
    }
    result
}

///Return a copy of the tree in which exactly the given ids are expanded.
pub fn assign_expanded_state(
    items: &[HierarchicalItem],
    expanded_ids: &HashSet<String>,
) -> Vec<HierarchicalItem> {
    items
        .iter()
        .map(|item| HierarchicalItem {
            id: item.id.clone(),
            label: item.label.clone(),
            children: assign_expanded_state(&item.children, expanded_ids),
            expanded: expanded_ids.contains(&item.id),
        })
        .collect()
}

///Return the ids of all expanded items of the tree.
pub fn collect_expanded_ids(items: &[HierarchicalItem]) -> HashSet<String> {
    let mut ids = HashSet::new();
    for item in items {
        if item.expanded {
            ids.insert(item.id.clone());
        }
        ids.extend(collect_expanded_ids(&item.children));
    }
    ids
}

// ################################################
// ######## pruning ###############################
// ################################################

fn row_has_data<T: Cell>(row: Option<&Vec<T>>) -> bool {
    row.map_or(false, |cells| cells.iter().any(|cell| cell.has_data()))
}

///Drop the items that neither have data in their own row nor keep any child.
pub fn filter_y_axis<T: Cell>(
    items: &[HierarchicalItem],
    connections: &IndexMap<String, Vec<T>>,
) -> Vec<HierarchicalItem> {
    items
        .iter()
        .filter_map(|item| {
            let children = filter_y_axis(&item.children, connections);
            if children.is_empty() && !row_has_data(connections.get(&item.id)) {
                return None;
            }
            Some(HierarchicalItem {
                children,
                ..item.clone()
            })
        })
        .collect()
}

///Return the indexes of the columns holding data in any top-level row.
///Top-level rows are unions of their descendants, so no deeper walk is needed.
pub fn get_non_empty_columns<T: Cell>(
    items: &[HierarchicalItem],
    connections: &IndexMap<String, Vec<T>>,
) -> IndexSet<usize> {
    let mut columns = IndexSet::new();
    for item in items {
        if let Some(row) = connections.get(&item.id) {
            for (index, cell) in row.iter().enumerate() {
                if cell.has_data() {
                    columns.insert(index);
                }
            }
        }
    }
    columns.sort();
    columns
}

///Return the rows of every item in the tree restricted to the given columns.
pub fn filter_connections_map<T: Clone>(
    items: &[HierarchicalItem],
    connections: &IndexMap<String, Vec<T>>,
    columns: &IndexSet<usize>,
) -> IndexMap<String, Vec<T>> {
    let mut filtered = IndexMap::new();
    for item in items {
        if let Some(row) = connections.get(&item.id) {
            let kept: Vec<T> = row
                .iter()
                .enumerate()
                .filter(|(index, _)| columns.contains(index))
                .map(|(_, cell)| cell.clone())
                .collect();
            filtered.insert(item.id.clone(), kept);
        }
        filtered.extend(filter_connections_map(&item.children, connections, columns));
    }
    filtered
}

/// Maps the positions of a pruned row back to the columns they came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    original: Vec<usize>,
    width: usize,
}

impl ColumnMapping {
    ///`width` is the column count before pruning.
    pub fn new(columns: &IndexSet<usize>, width: usize) -> ColumnMapping {
        let mut original: Vec<usize> = columns.iter().copied().filter(|x| *x < width).collect();
        original.sort_unstable();
        ColumnMapping { original, width }
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn to_original(&self, compact_index: usize) -> Option<usize> {
        self.original.get(compact_index).copied()
    }

    pub fn to_compact(&self, original_index: usize) -> Option<usize> {
        self.original.binary_search(&original_index).ok()
    }

    ///Given a pruned row, return a row of the original width with every cell back at
    ///its original column and the pruned columns filled with empty cells.
    pub fn expand_row<T: Clone + Default>(&self, row: &[T]) -> Vec<T> {
        let mut expanded = vec![T::default(); self.width];
        for (compact_index, cell) in row.iter().enumerate() {
            if let Some(original_index) = self.to_original(compact_index) {
                expanded[original_index] = cell.clone();
            }
        }
        expanded
    }
}

///Given the organs in column order and the surviving columns,
///return the organs that remain on the x axis.
pub fn filter_x_axis<'a>(organs: &[&'a Organ], columns: &IndexSet<usize>) -> Vec<&'a Organ> {
    organs
        .iter()
        .enumerate()
        .filter(|(index, _)| columns.contains(index))
        .map(|(_, organ)| *organ)
        .collect()
}
