use crate::axis::HierarchicalItem;
use crate::filters::{filter_knowledge_statements, filter_organs, Filters};
use crate::model::{Hierarchy, OrganMap, StatementMap};
use crate::organs::get_x_axis_organs;
use crate::settings::ROOTS;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashMap;

/// node id -> one list of statement ids per organ column
pub type ConnectionsMap = IndexMap<String, Vec<Vec<String>>>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DetailedRow {
    pub label: String,
    pub id: String,
    pub data: Vec<Vec<String>>,
}

/// The rows of the primary heatmap currently on screen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeatmapData {
    pub matrix: Vec<Vec<usize>>,
    pub detailed: Vec<DetailedRow>,
}

struct Aggregation<'a> {
    hierarchy: &'a Hierarchy,
    visible_organs: OrganMap,
    statements: StatementMap,
    column_index: HashMap<String, usize>,
    width: usize,
    memo: HashMap<String, Vec<Vec<String>>>,
}

impl<'a> Aggregation<'a> {
    fn compute(&mut self, node_id: &str) -> Vec<Vec<String>> {
        if let Some(x) = self.memo.get(node_id) {
            return x.clone();
        }

        let hierarchy = self.hierarchy;
        let mut columns: Vec<IndexSet<String>> = vec![IndexSet::new(); self.width];
        if let Some(node) = hierarchy.get(node_id) {
            if !node.children.is_empty() {
                for child in node.children.iter() {
                    let child_columns = self.compute(child);
                    for (index, ids) in child_columns.into_iter().enumerate() {
                        columns[index].extend(ids);
                    }
                }
            } else if let Some(details) = &node.connection_details {
                for (target_organ, end_organs) in details {
                    let index = match self.column_index.get(target_organ) {
                        Some(x) if self.visible_organs.contains_key(target_organ) => *x,
                        _ => continue,
                    };
                    for ks_id in end_organs.values().flatten() {
                        if self.statements.contains_key(ks_id) {
                            columns[index].insert(ks_id.clone());
                        }
                    }
                }
            }
        }

        let result: Vec<Vec<String>> = columns
            .into_iter()
            .map(|ids| ids.into_iter().collect())
            .collect();
        self.memo.insert(node_id.to_string(), result.clone());
        result
    }
}

///Given the node table, all organs, all statements and the active filters,
///return the per-organ-column statement ids of every node.
///
///Columns follow the order of all organs, whatever the end organ filter; organs
///outside the filter get empty columns. Internal nodes hold the deduplicated union of
///their children's columns.
pub fn calculate_connections(
    hierarchy: &Hierarchy,
    organs: &OrganMap,
    statements: &StatementMap,
    filters: &Filters,
) -> ConnectionsMap {
    let column_index: HashMap<String, usize> = get_x_axis_organs(organs)
        .iter()
        .enumerate()
        .map(|(index, organ)| (organ.id.clone(), index))
        .collect();

    let mut aggregation = Aggregation {
        hierarchy,
        visible_organs: filter_organs(organs, &filters.end_organ),
        statements: filter_knowledge_statements(statements, hierarchy, filters, organs),
        column_index,
        width: organs.len(),
        memo: HashMap::new(),
    };

    hierarchy
        .keys()
        .map(|node_id| (node_id.clone(), aggregation.compute(node_id)))
        .collect()
}

///Given the presentation tree and the aggregation, return the heatmap rows on screen:
///every expanded item and every item whose parent is expanded (the top level always is).
pub fn get_heatmap_data(y_axis: &[HierarchicalItem], connections: &ConnectionsMap) -> HeatmapData {
    let mut data = HeatmapData::default();
    traverse_items(y_axis, true, &mut |item| {
        if let Some(row) = connections.get(&item.id) {
            data.matrix.push(row.iter().map(|ids| ids.len()).collect());
            data.detailed.push(DetailedRow {
                label: item.label.clone(),
                id: item.id.clone(),
                data: row.clone(),
            });
        }
    });
    data
}

///Visit the items on screen in display order.
pub fn traverse_items<F>(items: &[HierarchicalItem], parent_expanded: bool, visit: &mut F)
where
    F: FnMut(&HierarchicalItem),
{
    for item in items {
        if item.expanded {
            visit(item);
            traverse_items(&item.children, true, visit);
        } else if parent_expanded {
            visit(item);
        }
    }
}

///Return the smallest and largest cell counts over the rows of the three roots,
///or `None` when no root has a row.
pub fn get_min_max_connections(connections: &ConnectionsMap) -> Option<(usize, usize)> {
    let counts: Vec<usize> = ROOTS
        .iter()
        .filter_map(|root| connections.get(root.id))
        .flat_map(|row| row.iter().map(|ids| ids.len()))
        .collect();
    let min = counts.iter().min()?;
    let max = counts.iter().max()?;
    Some((*min, *max))
}

///Scale a cell count into `[0, 1]` against the largest count; the minimum is pinned to 0.
pub fn normalized_value(value: usize, max: usize) -> f64 {
    if max == 0 {
        return 0.0;
    }
    value as f64 / max as f64
}
