use crate::error::SckannerError;
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A single query-result row: variable name -> `{"type": ..., "value": ...}`.
pub type Binding = Map<String, Value>;

/// Ordering hints keyed by node (or target system) id. Key order is significant.
pub type OrderJson = IndexMap<String, Vec<String>>;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// A SPARQL-style query result document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: Results,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Level {
    pub id: String,
    pub name: String,
}

/// One connectivity row with its variable-depth origin chain.
///
/// Every field is optional because the source data is not validated upstream;
/// the builders decide how incomplete rows are absorbed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectivityRow {
    //name of the first hierarchy level, used to pick the root
    pub a_l1_name: Option<String>,
    pub levels: Vec<Level>,
    pub leaf_id: Option<String>,
    pub leaf_name: Option<String>,
    pub target_organ_id: Option<String>,
    pub target_organ_name: Option<String>,
    pub target_system_id: Option<String>,
    pub target_system_name: Option<String>,
    pub end_organ_id: Option<String>,
    pub end_organ_name: Option<String>,
    pub neuron_id: Option<String>,
}

///Given a row and a variable name, return the variable's value.
///Missing variables, non-string values and empty strings all count as absent.
pub fn get_value(binding: &Binding, key: &str) -> Option<String> {
    binding
        .get(key)
        .and_then(|v| v.get("value"))
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl ConnectivityRow {
    ///Given a raw row, collect the `A_L{n}_ID`/`A_L{n}` chain until the first
    ///level whose id variable is not bound. Levels missing either part are skipped.
    pub fn from_binding(binding: &Binding) -> ConnectivityRow {
        let mut levels = Vec::new();
        let mut level = 1;
        while binding.contains_key(&format!("A_L{}_ID", level)) {
            let id = get_value(binding, &format!("A_L{}_ID", level));
            let name = get_value(binding, &format!("A_L{}", level));
            if let (Some(id), Some(name)) = (id, name) {
                levels.push(Level { id, name });
            }
            level += 1;
        }

        ConnectivityRow {
            a_l1_name: get_value(binding, "A_L1"),
            levels,
            leaf_id: get_value(binding, "A_ID"),
            leaf_name: get_value(binding, "A"),
            target_organ_id: get_value(binding, "Target_Organ_IRI"),
            target_organ_name: get_value(binding, "Target_Organ"),
            target_system_id: get_value(binding, "Target_System_IRI"),
            target_system_name: get_value(binding, "Target_System"),
            end_organ_id: get_value(binding, "B_ID"),
            end_organ_name: get_value(binding, "B"),
            neuron_id: get_value(binding, "Neuron_ID"),
        }
    }
}

pub fn parse_query_results(text: &str) -> Result<QueryResults, SckannerError> {
    Ok(serde_json::from_str::<QueryResults>(text)?)
}

pub fn parse_rows(query_results: &QueryResults) -> Vec<ConnectivityRow> {
    query_results
        .results
        .bindings
        .iter()
        .map(ConnectivityRow::from_binding)
        .collect()
}

pub fn parse_order(text: &str) -> Result<OrderJson, SckannerError> {
    Ok(serde_json::from_str::<OrderJson>(text)?)
}

///Given the major-nerves query result, return the set of nerve ids it lists.
pub fn parse_major_nerves(query_results: &QueryResults) -> IndexSet<String> {
    query_results
        .results
        .bindings
        .iter()
        .filter_map(|b| get_value(b, "Nerve_IRI"))
        .collect()
}
