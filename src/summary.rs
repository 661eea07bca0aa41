use crate::axis::HierarchicalItem;
use crate::filters::{summary_filter_knowledge_statements, SummaryFilters};
use crate::heatmap::traverse_items;
use crate::model::{BaseEntity, Hierarchy, KnowledgeStatement, Organ, OrganMap, StatementMap};
use crate::settings::{DESTINATIONS_ORDER, OTHER_PHENOTYPE_LABEL, STRINGS_NUMBERS};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashMap;

/// phenotype label -> knowledge statement ids
pub type PhenotypeBuckets = IndexMap<String, Vec<String>>;

/// node id -> one phenotype bucket map per destination column
pub type SecondaryConnectionsMap = IndexMap<String, Vec<PhenotypeBuckets>>;

/// A heatmap cell selected for inspection.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConnectionSummary {
    pub node_id: String,
    pub end_organ: Organ,
    //the statements of the cell
    pub connections: StatementMap,
    //the cell's statements under the active filters, vias restricted to major nerves
    pub filtered_knowledge_statements: StatementMap,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SortedResults {
    pub data: Vec<Vec<PhenotypeBuckets>>,
    pub total: usize,
}

// ################################################
// ######## destinations ##########################
// ################################################

///Given the selected cell, return the destination columns of the secondary heatmap.
///
///A regular organ contributes its own destinations in insertion order. A virtual
///catch-all organ has no fixed destinations, so every destination entity of the
///cell's statements becomes a column.
pub fn get_destinations(summary: &ConnectionSummary) -> OrganMap {
    let mut destinations: OrganMap = IndexMap::new();

    if summary.end_organ.is_virtual_category {
        for entity in summary
            .filtered_knowledge_statements
            .values()
            .flat_map(|ks| ks.destination_entities())
        {
            if !destinations.contains_key(&entity.id) {
                let mut organ = Organ::new(&entity.id, &entity.name);
                organ.order = destinations.len();
                destinations.insert(entity.id.clone(), organ);
            }
        }
        return destinations;
    }

    for (index, child) in summary.end_organ.children.values().enumerate() {
        let mut organ = Organ::new(&child.id, &child.name);
        organ.order = index;
        destinations.insert(child.id.clone(), organ);
    }
    destinations
}

///Return the names of the organ's destinations, in column order.
pub fn get_x_axis_for_heatmap(end_organ: &Organ) -> Vec<String> {
    end_organ
        .children
        .values()
        .map(|child| child.name.clone())
        .collect()
}

// ################################################
// ######## aggregation ###########################
// ################################################

///The bucket labels a statement is counted under: its primary label (phenotype, else
///circuit type, else projection, else `other`), then its circuit type, then its
///projection. A statement with all three set is counted three times.
pub fn phenotype_labels(ks: &KnowledgeStatement) -> Vec<&str> {
    let primary = [
        ks.phenotype.as_str(),
        ks.circuit_type.as_str(),
        ks.projection.as_str(),
    ]
    .into_iter()
    .find(|x| !x.is_empty())
    .unwrap_or(OTHER_PHENOTYPE_LABEL);

    let mut labels = vec![primary];
    if !ks.circuit_type.is_empty() {
        labels.push(ks.circuit_type.as_str());
    }
    if !ks.projection.is_empty() {
        labels.push(ks.projection.as_str());
    }
    labels
}

struct SecondaryAggregation<'a> {
    hierarchy: &'a Hierarchy,
    statements: StatementMap,
    column_index: HashMap<String, usize>,
    width: usize,
    memo: SecondaryConnectionsMap,
}

impl<'a> SecondaryAggregation<'a> {
    fn compute(&mut self, node_id: &str) -> Vec<PhenotypeBuckets> {
        if let Some(x) = self.memo.get(node_id) {
            return x.clone();
        }
        let hierarchy = self.hierarchy;
        let node = match hierarchy.get(node_id) {
            Some(x) => x,
            None => return Vec::new(),
        };

        let mut result: Vec<PhenotypeBuckets> = vec![IndexMap::new(); self.width];
        if !node.children.is_empty() {
            for child in node.children.iter() {
                for (index, buckets) in self.compute(child).into_iter().enumerate() {
                    for (phenotype, ids) in buckets {
                        result[index].entry(phenotype).or_default().extend(ids);
                    }
                }
            }
        } else if let Some(details) = &node.connection_details {
            for end_organs in details.values() {
                for (end_organ, ks_ids) in end_organs {
                    let index = match self.column_index.get(end_organ) {
                        Some(x) => *x,
                        None => continue,
                    };
                    for ks_id in ks_ids {
                        if let Some(ks) = self.statements.get(ks_id) {
                            for label in phenotype_labels(ks) {
                                result[index]
                                    .entry(label.to_string())
                                    .or_default()
                                    .push(ks_id.clone());
                            }
                        }
                    }
                }
            }
        }

        self.memo.insert(node_id.to_string(), result.clone());
        result
    }
}

///Given the node table, the destination columns, the statements of the selected cell
///and the secondary filters, return the per-phenotype aggregation of every node in the
///subtree of `node_id`.
pub fn calculate_secondary_connections(
    hierarchy: &Hierarchy,
    destinations: &OrganMap,
    statements: &StatementMap,
    summary_filters: &SummaryFilters,
    node_id: &str,
) -> SecondaryConnectionsMap {
    let mut aggregation = SecondaryAggregation {
        hierarchy,
        statements: summary_filter_knowledge_statements(statements, summary_filters),
        column_index: destinations
            .keys()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect(),
        width: destinations.len(),
        memo: IndexMap::new(),
    };
    aggregation.compute(node_id);
    aggregation.memo
}

///Given the presentation tree of the selected node and the secondary aggregation,
///return the rows on screen.
pub fn get_secondary_heatmap_data(
    y_axis: &[HierarchicalItem],
    connections: &SecondaryConnectionsMap,
) -> Vec<Vec<PhenotypeBuckets>> {
    let mut rows = Vec::new();
    traverse_items(y_axis, true, &mut |item| {
        if let Some(row) = connections.get(&item.id) {
            rows.push(row.clone());
        }
    });
    rows
}

// ################################################
// ######## cell details ##########################
// ################################################

///Return every label the statements can be bucketed under, sorted.
pub fn get_all_phenotypes(statements: &StatementMap) -> Vec<String> {
    let mut names: IndexSet<String> = IndexSet::new();
    for ks in statements.values() {
        if !ks.phenotype.is_empty() {
            names.insert(ks.phenotype.clone());
        }
        if !ks.circuit_type.is_empty() {
            names.insert(ks.circuit_type.clone());
        }
        if ks.phenotype.is_empty() && ks.circuit_type.is_empty() {
            names.insert(OTHER_PHENOTYPE_LABEL.to_string());
        }
        if !ks.projection.is_empty() {
            names.insert(ks.projection.clone());
        }
    }
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    names
}

///Return via entity id -> name over all statements; later statements win on
///conflicting names.
pub fn get_all_vias_from_connections(statements: &StatementMap) -> IndexMap<String, String> {
    let mut vias = IndexMap::new();
    for entity in statements.values().flat_map(|ks| ks.via_entities()) {
        vias.insert(entity.id.clone(), entity.name.clone());
    }
    vias
}

///Keep the vias that are major nerves.
pub fn get_nerve_filters(
    vias: &IndexMap<String, String>,
    major_nerves: &IndexSet<String>,
) -> IndexMap<String, String> {
    vias.iter()
        .filter(|(id, _)| major_nerves.contains(*id))
        .map(|(id, name)| (id.clone(), name.clone()))
        .collect()
}

///`["a", "b", "c"]` reads `a, b and c`; no vias read `-`.
pub fn convert_via_to_string(vias: &[String]) -> String {
    match vias {
        [] => String::from("-"),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn push_matching(source: &[String], words: &[&str], target: &mut Vec<String>) {
    for word in words {
        let word = word.to_lowercase();
        for destination in source {
            if destination.to_lowercase().contains(&word) && !target.contains(destination) {
                target.push(destination.clone());
            }
        }
    }
    for destination in source {
        if !target.contains(destination) {
            target.push(destination.clone());
        }
    }
}

///Order destination names for display: by ordinal words ("first", "second", …),
///then by anatomical position. Names matching neither keep their relative order.
pub fn reorder_x_axis(x_axis: &[String]) -> Vec<String> {
    let mut by_number = Vec::new();
    push_matching(x_axis, &STRINGS_NUMBERS, &mut by_number);

    let mut by_anatomy = Vec::new();
    push_matching(&by_number, &DESTINATIONS_ORDER, &mut by_anatomy);
    by_anatomy
}

///Move the columns of every row from their original positions to their reordered
///positions, and count the statement ids of all cells.
pub fn sort_heatmap_data(
    original: &[String],
    reordered: &[String],
    data: &[Vec<PhenotypeBuckets>],
) -> SortedResults {
    let total = data
        .iter()
        .flatten()
        .flat_map(|buckets| buckets.values())
        .map(|ids| ids.len())
        .sum();

    let sorted = data
        .iter()
        .map(|row| {
            let mut sorted_row: Vec<PhenotypeBuckets> = vec![IndexMap::new(); original.len()];
            for (index, name) in original.iter().enumerate() {
                let new_position = reordered.iter().position(|x| x == name);
                if let (Some(position), Some(cell)) = (new_position, row.get(index)) {
                    if position < sorted_row.len() {
                        sorted_row[position] = cell.clone();
                    }
                }
            }
            sorted_row
        })
        .collect();

    SortedResults {
        data: sorted,
        total,
    }
}

///Return the statement ids of one secondary cell, across its phenotype buckets.
pub fn cell_statement_ids(cell: &PhenotypeBuckets) -> Vec<String> {
    let mut ids: IndexSet<String> = IndexSet::new();
    for bucket in cell.values() {
        ids.extend(bucket.iter().cloned());
    }
    ids.into_iter().collect()
}

///Merge every destination of the given organs into one catch-all organ; synaptic chains
///may end beyond the selected organ's own destinations.
pub fn merge_destinations(end_organ: &Organ, organs: &[&Organ]) -> Organ {
    let mut children: IndexMap<String, BaseEntity> = IndexMap::new();
    for organ in organs {
        for (id, child) in organ.children.iter() {
            children.entry(id.clone()).or_insert_with(|| child.clone());
        }
    }
    Organ {
        children,
        ..end_organ.clone()
    }
}
