use crate::filters::matches_end_organ;
use crate::heatmap::DetailedRow;
use crate::model::{KnowledgeStatement, Organ, StatementMap};
use indexmap::IndexSet;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// The direct and multi-hop connections of one heatmap row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SynapticRow {
    pub label: String,
    pub id: String,
    //per column: statement ids ending there directly
    pub direct_connections: Vec<Vec<String>>,
    //per column: statement paths whose last hop ends there
    pub synaptic_connections: Vec<Vec<Vec<String>>>,
}

impl SynapticRow {
    ///Return every statement id the cell in `column` involves, direct ones first.
    pub fn cell_statement_ids(&self, column: usize) -> Vec<String> {
        let mut ids: IndexSet<String> = IndexSet::new();
        if let Some(direct) = self.direct_connections.get(column) {
            ids.extend(direct.iter().cloned());
        }
        if let Some(paths) = self.synaptic_connections.get(column) {
            ids.extend(paths.iter().flatten().cloned());
        }
        ids.into_iter().collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SynapticData {
    pub rows: Vec<SynapticRow>,
    //per row and column: the number of distinct statements involved
    pub matrix: Vec<Vec<usize>>,
}

// ################################################
// ######## path tracing ##########################
// ################################################

///Given a statement id, return the paths of statement ids that start with it and
///follow forward connections until no onward statement is left to expand.
///
///Every statement is expanded at most once per trace. A statement whose onward
///statements are all missing from the store or already reached ends its path there.
///Statements without any onward hop yield no path; they only connect directly.
pub fn trace_forward_paths(start: &str, statements: &StatementMap) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    let mut path = vec![start.to_string()];
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(start.to_string());
    walk(start, statements, &mut path, &mut visited, &mut paths);
    paths
}

fn walk(
    current: &str,
    statements: &StatementMap,
    path: &mut Vec<String>,
    visited: &mut HashSet<String>,
    paths: &mut Vec<Vec<String>>,
) {
    let ks = match statements.get(current) {
        Some(x) => x,
        None => return,
    };

    let mut extended = false;
    for hop in &ks.forward_connections {
        //an earlier branch may have reached the hop since this statement was entered
        if !statements.contains_key(hop) || !visited.insert(hop.clone()) {
            continue;
        }
        extended = true;
        path.push(hop.clone());
        walk(hop, statements, path, visited, paths);
        path.pop();
    }

    if !extended && path.len() > 1 {
        paths.push(path.clone());
    }
}

// ################################################
// ######## synaptic heatmap ######################
// ################################################

//the columns a statement's destinations land in, by the end organ containment rule
fn destination_columns(ks: &KnowledgeStatement, organs: &[&Organ]) -> Vec<usize> {
    organs
        .iter()
        .enumerate()
        .filter(|(_, organ)| {
            let mut ids: Vec<String> = vec![organ.id.clone()];
            ids.extend(organ.children.keys().cloned());
            matches_end_organ(ks, &ids)
        })
        .map(|(index, _)| index)
        .collect()
}

///Given the rows on screen, the organs in column order and the statement store,
///return each row's direct connections together with the multi-hop paths that start at
///one of the row's statements, each path placed in the column of its terminal
///statement's destinations.
pub fn calculate_synaptic_connections(
    rows: &[DetailedRow],
    organs: &[&Organ],
    statements: &StatementMap,
) -> SynapticData {
    let width = organs.len();
    let mut data = SynapticData::default();
    //rows share statements, so each start is traced once
    let mut traces: HashMap<String, Vec<Vec<String>>> = HashMap::new();

    for row in rows {
        let mut direct_connections: Vec<Vec<String>> = vec![Vec::new(); width];
        let mut synaptic_connections: Vec<IndexSet<Vec<String>>> = vec![IndexSet::new(); width];
        let mut starts: IndexSet<&String> = IndexSet::new();

        for (index, ids) in row.data.iter().enumerate().take(width) {
            direct_connections[index] = ids.clone();
            starts.extend(ids.iter());
        }

        for start in starts {
            let paths = traces
                .entry(start.clone())
                .or_insert_with(|| trace_forward_paths(start, statements));
            for path in paths.iter() {
                let terminal = match path.last().and_then(|id| statements.get(id)) {
                    Some(x) => x,
                    None => continue,
                };
                for index in destination_columns(terminal, organs) {
                    synaptic_connections[index].insert(path.clone());
                }
            }
        }

        let synaptic_connections: Vec<Vec<Vec<String>>> = synaptic_connections
            .into_iter()
            .map(|paths| paths.into_iter().collect())
            .collect();
        let synaptic_row = SynapticRow {
            label: row.label.clone(),
            id: row.id.clone(),
            direct_connections,
            synaptic_connections,
        };
        data.matrix.push(
            (0..width)
                .map(|column| synaptic_row.cell_statement_ids(column).len())
                .collect(),
        );
        data.rows.push(synaptic_row);
    }

    tracing::debug!("traced synaptic connections for {} rows", data.rows.len());
    data
}
