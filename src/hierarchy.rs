use crate::bindings::{ConnectivityRow, OrderJson};
use crate::model::{Hierarchy, HierarchicalNode};
use crate::settings::{get_root_id, HIERARCHY_ID_PATH_DELIMITER, OTHER_X_AXIS_ID, ROOTS};
use indexmap::{IndexMap, IndexSet};
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    static ref NATURAL_CHUNK: Regex = Regex::new(r"\d+|\D+").unwrap();
}

//a row whose target or end organ is missing; revisited once all direct rows are applied
struct DeferredRow<'a> {
    row: &'a ConnectivityRow,
    parent_id: String,
    leaf_node_id: String,
}

// ################################################
// ######## build hierarchy #######################
// ################################################

///Given connectivity rows and ordering hints, return the node table of the
///origin hierarchy.
///
///The three roots are always present. Each row contributes one node per level of
///its origin chain (keyed by the cumulative `#` path) and a leaf holding the row's
///statement id under `connection_details[target organ][end organ]`.
///Rows without a statement id carry no addressable data and are skipped.
pub fn build_hierarchy(rows: &[ConnectivityRow], order_json: &OrderJson) -> Hierarchy {
    let mut nodes: Hierarchy = IndexMap::new();
    for root in ROOTS.iter() {
        nodes.insert(root.id.to_string(), HierarchicalNode::new(root.id, root.name));
    }

    let mut deferred: Vec<DeferredRow> = Vec::new();

    for row in rows {
        let neuron_id = match &row.neuron_id {
            Some(x) => x,
            None => {
                tracing::error!("Neuron_ID not found for entry {:?}", row.leaf_id);
                continue;
            }
        };

        let a_l1_name = row.a_l1_name.as_deref().unwrap_or("");
        let mut current_parent_id = String::from(get_root_id(a_l1_name));
        let mut current_path = current_parent_id.clone();

        for level in &row.levels {
            current_path = format!("{}{}{}", current_path, HIERARCHY_ID_PATH_DELIMITER, level.id);
            if !nodes.contains_key(&current_path) {
                nodes.insert(
                    current_path.clone(),
                    HierarchicalNode::new(&current_path, &level.name),
                );
            }
            link_child(&mut nodes, &current_parent_id, &current_path);
            current_parent_id = current_path.clone();
        }

        let (leaf_id, leaf_name) = match (&row.leaf_id, &row.leaf_name) {
            (Some(id), Some(name)) => (id, name),
            _ => continue,
        };
        let leaf_node_id = format!("{}{}{}", current_path, HIERARCHY_ID_PATH_DELIMITER, leaf_id);
        ensure_leaf(&mut nodes, &leaf_node_id, leaf_name);

        match (&row.target_organ_id, &row.end_organ_id) {
            (Some(target), Some(end)) => {
                add_connection(&mut nodes, &leaf_node_id, target, end, neuron_id);
                link_child(&mut nodes, &current_parent_id, &leaf_node_id);
            }
            _ => deferred.push(DeferredRow {
                row,
                parent_id: current_parent_id,
                leaf_node_id,
            }),
        }
    }

    for entry in deferred {
        apply_deferred_row(&mut nodes, &entry);
    }

    sort_children(&mut nodes, order_json);
    nodes
}

fn link_child(nodes: &mut Hierarchy, parent_id: &str, child_id: &str) {
    if let Some(parent) = nodes.get_mut(parent_id) {
        parent.children.insert(child_id.to_string());
    }
}

fn ensure_leaf(nodes: &mut Hierarchy, leaf_node_id: &str, leaf_name: &str) {
    let leaf = nodes
        .entry(leaf_node_id.to_string())
        .or_insert_with(|| HierarchicalNode::new(leaf_node_id, leaf_name));
    if leaf.connection_details.is_none() {
        leaf.connection_details = Some(IndexMap::new());
    }
}

fn add_connection(
    nodes: &mut Hierarchy,
    leaf_node_id: &str,
    target_organ: &str,
    end_organ: &str,
    neuron_id: &str,
) {
    if let Some(leaf) = nodes.get_mut(leaf_node_id) {
        leaf.connection_details
            .get_or_insert_with(IndexMap::new)
            .entry(target_organ.to_string())
            .or_default()
            .entry(end_organ.to_string())
            .or_default()
            .push(neuron_id.to_string());
    }
}

fn apply_deferred_row(nodes: &mut Hierarchy, entry: &DeferredRow) {
    let row = entry.row;
    let neuron_id = match &row.neuron_id {
        Some(x) => x.clone(),
        None => return,
    };
    ensure_leaf(
        nodes,
        &entry.leaf_node_id,
        row.leaf_name.as_deref().unwrap_or(""),
    );

    let mut target_organ = match &row.target_organ_id {
        Some(x) => x.clone(),
        None => {
            tracing::warn!("Target_Organ_IRI not found for entry with Neuron_ID: {}", neuron_id);
            String::from(OTHER_X_AXIS_ID)
        }
    };
    let end_organ = match &row.end_organ_id {
        Some(end) => {
            //the end organ may already be registered as a target organ on this leaf
            let registered = nodes
                .get(&entry.leaf_node_id)
                .and_then(|leaf| leaf.connection_details.as_ref())
                .map(|details| details.contains_key(end))
                .unwrap_or(false);
            if registered {
                target_organ = end.clone();
            }
            end.clone()
        }
        None => {
            tracing::warn!("B_ID not found for entry with Neuron_ID: {}", neuron_id);
            String::from(OTHER_X_AXIS_ID)
        }
    };

    add_connection(nodes, &entry.leaf_node_id, &target_organ, &end_organ, &neuron_id);
    link_child(nodes, &entry.parent_id, &entry.leaf_node_id);
}

// ################################################
// ######## child ordering ########################
// ################################################

//nodes with children first, then the parent's explicit order, then natural name order
fn compare_children(
    nodes: &Hierarchy,
    order: Option<&Vec<String>>,
    path_a: &str,
    path_b: &str,
) -> Ordering {
    let node_a = nodes.get(path_a);
    let node_b = nodes.get(path_b);
    let a_has_children = node_a.map_or(false, |n| !n.children.is_empty());
    let b_has_children = node_b.map_or(false, |n| !n.children.is_empty());

    match (a_has_children, b_has_children) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    if let Some(order) = order {
        let index_a = order.iter().position(|x| x == get_node_id_from_path(path_a));
        let index_b = order.iter().position(|x| x == get_node_id_from_path(path_b));
        match (index_a, index_b) {
            (Some(a), Some(b)) => return a.cmp(&b),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            _ => {}
        }
    }

    let name_a = node_a.map_or("", |n| n.name.as_str());
    let name_b = node_b.map_or("", |n| n.name.as_str());
    natural_cmp(name_a, name_b)
}

fn sort_children(nodes: &mut Hierarchy, order_json: &OrderJson) {
    let table: &Hierarchy = nodes;
    let sorted: Vec<(String, IndexSet<String>)> = table
        .values()
        .filter(|node| node.children.len() > 1)
        .map(|node| {
            let order = order_json.get(get_node_id_from_path(&node.id));
            let mut children: Vec<&String> = node.children.iter().collect();
            children.sort_by(|a, b| compare_children(table, order, a, b));
            (node.id.clone(), children.into_iter().cloned().collect())
        })
        .collect();

    for (id, children) in sorted {
        if let Some(node) = nodes.get_mut(&id) {
            node.children = children;
        }
    }
}

///Compare two labels the way a person would: case-insensitive, with runs of
///digits compared by numeric value ("level 2" before "level 10").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut chunks_a = NATURAL_CHUNK.find_iter(&a).map(|m| m.as_str());
    let mut chunks_b = NATURAL_CHUNK.find_iter(&b).map(|m| m.as_str());

    loop {
        match (chunks_a.next(), chunks_b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let numeric = x.starts_with(|c: char| c.is_ascii_digit())
                    && y.starts_with(|c: char| c.is_ascii_digit());
                let ordering = if numeric {
                    let x = x.trim_start_matches('0');
                    let y = y.trim_start_matches('0');
                    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
                } else {
                    x.cmp(y)
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

// ################################################
// ######## tree queries ##########################
// ################################################

///Given a path id, return the id of the entity it ends in.
pub fn get_node_id_from_path(path: &str) -> &str {
    path.rsplit(HIERARCHY_ID_PATH_DELIMITER).next().unwrap_or(path)
}

///Unknown ids count as leaves: they can only be matched verbatim.
pub fn is_leaf(node_id: &str, nodes: &Hierarchy) -> bool {
    nodes.get(node_id).map_or(true, |node| node.is_leaf())
}

///Given a node id, return the entity ids (last path segment) of all leaves below it.
///A leaf (or unknown id) yields its own entity id.
pub fn get_leaf_descendants(node_id: &str, nodes: &Hierarchy) -> Vec<String> {
    let mut descendants = Vec::new();
    let mut stack = vec![node_id.to_string()];

    while let Some(current) = stack.pop() {
        match nodes.get(&current) {
            Some(node) if !node.is_leaf() => {
                //reversed so the walk stays in display order
                for child in node.children.iter().rev() {
                    stack.push(child.clone());
                }
            }
            _ => descendants.push(String::from(get_node_id_from_path(&current))),
        }
    }
    descendants
}

///Given a selection of node ids, return the entity ids statements are matched against.
pub fn expand_to_leaf_ids(selected: &[String], nodes: &Hierarchy) -> Vec<String> {
    selected
        .iter()
        .flat_map(|id| {
            if is_leaf(id, nodes) {
                vec![id.clone()]
            } else {
                get_leaf_descendants(id, nodes)
            }
        })
        .collect()
}

///Return every statement id referenced by any leaf of the hierarchy.
pub fn get_statement_ids(nodes: &Hierarchy) -> IndexSet<String> {
    let mut ids = IndexSet::new();
    for node in nodes.values() {
        if let Some(details) = &node.connection_details {
            for end_organs in details.values() {
                for statement_ids in end_organs.values() {
                    ids.extend(statement_ids.iter().cloned());
                }
            }
        }
    }
    ids
}
