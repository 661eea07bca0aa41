use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sckanner::bindings::{
    parse_major_nerves, parse_order, parse_query_results, parse_rows, ConnectivityRow, Level,
    OrderJson,
};
use sckanner::hierarchy::{
    build_hierarchy, expand_to_leaf_ids, get_leaf_descendants, get_node_id_from_path,
    get_statement_ids, is_leaf, natural_cmp,
};
use sckanner::model::Hierarchy;
use sckanner::settings::{CNS_ID, HIERARCHY_ID_PATH_DELIMITER, OTHER_X_AXIS_ID, PNS_ID, UNK_ID};
use serde_json::json;
use std::cmp::Ordering;
use std::fs;

fn load_rows() -> Vec<ConnectivityRow> {
    let text = fs::read_to_string("src/resources/test_data/query_results.json").unwrap();
    parse_rows(&parse_query_results(&text).unwrap())
}

fn load_order() -> OrderJson {
    let text = fs::read_to_string("src/resources/test_data/order.json").unwrap();
    parse_order(&text).unwrap()
}

fn load_hierarchy() -> Hierarchy {
    build_hierarchy(&load_rows(), &load_order())
}

fn path(parts: &[&str]) -> String {
    parts.join(HIERARCHY_ID_PATH_DELIMITER)
}

#[test]
fn test_parse_variable_depth_levels() {
    let text = json!({
        "head": {"vars": []},
        "results": {"bindings": [{
            "A_L1_ID": {"type": "uri", "value": "L1"},
            "A_L1": {"type": "literal", "value": "first"},
            "A_L2_ID": {"type": "uri", "value": "L2"},
            "A_L3_ID": {"type": "uri", "value": "L3"},
            "A_L3": {"type": "literal", "value": "third"},
            "A_L4_ID": {"type": "uri", "value": "L4"},
            "A_L4": {"type": "literal", "value": "fourth"},
            "A_ID": {"type": "uri", "value": "leaf"},
            "A": {"type": "literal", "value": "leaf name"},
            "Neuron_ID": {"type": "uri", "value": ""},
            "Unrelated": {"type": "literal", "value": "ignored"}
        }]}
    })
    .to_string();

    let rows = parse_rows(&parse_query_results(&text).unwrap());
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(
        row.levels,
        vec![
            Level {
                id: String::from("L1"),
                name: String::from("first")
            },
            Level {
                id: String::from("L3"),
                name: String::from("third")
            },
            Level {
                id: String::from("L4"),
                name: String::from("fourth")
            },
        ]
    );
    assert_eq!(row.a_l1_name.as_deref(), Some("first"));
    assert_eq!(row.leaf_id.as_deref(), Some("leaf"));
    //empty values count as missing
    assert_eq!(row.neuron_id, None);
    assert_eq!(row.target_organ_id, None);
}

#[test]
fn test_parse_major_nerves() {
    let text = fs::read_to_string("src/resources/test_data/major_nerves.json").unwrap();
    let nerves = parse_major_nerves(&parse_query_results(&text).unwrap());
    assert_eq!(nerves.len(), 1);
    assert!(nerves.contains("UBERON:vagus"));
}

#[test]
fn test_roots_always_present() {
    let nodes = build_hierarchy(&[], &IndexMap::new());
    assert_eq!(
        nodes.keys().cloned().collect::<Vec<String>>(),
        vec![CNS_ID, PNS_ID, UNK_ID]
    );
    assert!(nodes.values().all(|node| node.children.is_empty()));
}

#[test]
fn test_path_consistency() {
    let nodes = load_hierarchy();
    for node in nodes.values() {
        for child in node.children.iter() {
            assert!(nodes.contains_key(child), "{} is not in the node table", child);
            let prefix = format!("{}{}", node.id, HIERARCHY_ID_PATH_DELIMITER);
            assert!(child.starts_with(&prefix), "{} does not extend {}", child, node.id);
            assert!(child.len() > prefix.len());
        }
    }
}

#[test]
fn test_build_hierarchy() {
    let nodes = load_hierarchy();

    let brain = path(&[CNS_ID, "UBERON:brain"]);
    let medulla = path(&[CNS_ID, "UBERON:brain", "UBERON:medulla"]);
    let nts = path(&[CNS_ID, "UBERON:brain", "UBERON:medulla", "UBERON:nts"]);

    assert_eq!(nodes.len(), 10);
    assert_eq!(nodes[CNS_ID].children.iter().collect::<Vec<_>>(), vec![&brain]);
    assert_eq!(nodes[&brain].name, "brain");
    assert_eq!(nodes[&medulla].children.iter().collect::<Vec<_>>(), vec![&nts]);

    let details = nodes[&nts].connection_details.as_ref().unwrap();
    assert_eq!(
        details["UBERON:heart"],
        IndexMap::from([
            (String::from("UBERON:heart_wall"), vec![String::from("ks1")]),
            (String::from("UBERON:heart"), vec![String::from("ks2")]),
        ])
    );
    //internal nodes never carry connection details
    assert_eq!(nodes[&medulla].connection_details, None);
}

#[test]
fn test_missing_statement_id_skips_row() {
    let nodes = load_hierarchy();
    assert!(nodes.keys().all(|id| !id.contains("UBERON:ghost")));
}

#[test]
fn test_deferred_rows() {
    let nodes = load_hierarchy();

    //no target organ: the row lands in the catch-all column
    let unknown = path(&[UNK_ID, "UBERON:x"]);
    assert_eq!(
        nodes[UNK_ID].children.iter().collect::<Vec<_>>(),
        vec![&unknown]
    );
    let details = nodes[&unknown].connection_details.as_ref().unwrap();
    assert_eq!(details[OTHER_X_AXIS_ID]["UBERON:skin"], vec!["ks5"]);

    //no end organ: the target organ stays, the end organ becomes the catch-all
    let stellate = path(&[PNS_ID, "UBERON:ganglion", "UBERON:sg"]);
    let details = nodes[&stellate].connection_details.as_ref().unwrap();
    assert_eq!(details["UBERON:lung"]["UBERON:bronchus"], vec!["ks3"]);
    assert_eq!(details["UBERON:lung"][OTHER_X_AXIS_ID], vec!["ks6"]);
}

#[test]
fn test_deferred_end_organ_registered_as_target() {
    let rows = vec![
        ConnectivityRow {
            a_l1_name: Some(String::from("ganglion")),
            levels: vec![Level {
                id: String::from("G"),
                name: String::from("ganglion"),
            }],
            leaf_id: Some(String::from("leaf")),
            leaf_name: Some(String::from("leaf")),
            target_organ_id: Some(String::from("organ")),
            target_organ_name: Some(String::from("organ")),
            end_organ_id: Some(String::from("organ")),
            end_organ_name: Some(String::from("organ")),
            neuron_id: Some(String::from("a")),
            ..Default::default()
        },
        ConnectivityRow {
            a_l1_name: Some(String::from("ganglion")),
            levels: vec![Level {
                id: String::from("G"),
                name: String::from("ganglion"),
            }],
            leaf_id: Some(String::from("leaf")),
            leaf_name: Some(String::from("leaf")),
            end_organ_id: Some(String::from("organ")),
            end_organ_name: Some(String::from("organ")),
            neuron_id: Some(String::from("b")),
            ..Default::default()
        },
    ];
    let nodes = build_hierarchy(&rows, &IndexMap::new());
    let leaf = path(&[PNS_ID, "G", "leaf"]);
    let details = nodes[&leaf].connection_details.as_ref().unwrap();
    assert_eq!(details["organ"]["organ"], vec!["a", "b"]);
    assert!(!details.contains_key(OTHER_X_AXIS_ID));
}

#[test]
fn test_child_order() {
    let ganglion = path(&[PNS_ID, "UBERON:ganglion"]);

    //explicit order keyed by the parent's own id
    let nodes = load_hierarchy();
    assert_eq!(
        nodes[&ganglion].children.iter().cloned().collect::<Vec<String>>(),
        vec![
            path(&[PNS_ID, "UBERON:ganglion", "UBERON:sg"]),
            path(&[PNS_ID, "UBERON:ganglion", "UBERON:cg"]),
        ]
    );

    //natural name order without hints
    let nodes = build_hierarchy(&load_rows(), &IndexMap::new());
    assert_eq!(
        nodes[&ganglion].children.iter().cloned().collect::<Vec<String>>(),
        vec![
            path(&[PNS_ID, "UBERON:ganglion", "UBERON:cg"]),
            path(&[PNS_ID, "UBERON:ganglion", "UBERON:sg"]),
        ]
    );
}

#[test]
fn test_nodes_with_children_sort_first() {
    let row = |levels: &[&str], leaf: &str, ks: &str| ConnectivityRow {
        a_l1_name: Some(String::from("nerve")),
        levels: levels
            .iter()
            .map(|x| Level {
                id: x.to_string(),
                name: x.to_string(),
            })
            .collect(),
        leaf_id: Some(leaf.to_string()),
        leaf_name: Some(leaf.to_string()),
        target_organ_id: Some(String::from("organ")),
        target_organ_name: Some(String::from("organ")),
        end_organ_id: Some(String::from("organ")),
        end_organ_name: Some(String::from("organ")),
        neuron_id: Some(ks.to_string()),
        ..Default::default()
    };
    let rows = vec![row(&["N"], "a leaf", "ks1"), row(&["N", "z group"], "inner", "ks2")];
    let nodes = build_hierarchy(&rows, &IndexMap::new());
    assert_eq!(
        nodes[&path(&[PNS_ID, "N"])]
            .children
            .iter()
            .cloned()
            .collect::<Vec<String>>(),
        vec![path(&[PNS_ID, "N", "z group"]), path(&[PNS_ID, "N", "a leaf"])]
    );
}

#[test]
fn test_natural_cmp() {
    assert_eq!(natural_cmp("level 2", "Level 10"), Ordering::Less);
    assert_eq!(natural_cmp("T10", "t9"), Ordering::Greater);
    assert_eq!(natural_cmp("x01", "x1"), Ordering::Equal);
    assert_eq!(natural_cmp("alpha", "Beta"), Ordering::Less);
    assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
}

#[test]
fn test_tree_queries() {
    let nodes = load_hierarchy();
    let ganglion = path(&[PNS_ID, "UBERON:ganglion"]);

    assert_eq!(get_node_id_from_path(&ganglion), "UBERON:ganglion");
    assert_eq!(get_node_id_from_path("plain"), "plain");
    assert!(!is_leaf(&ganglion, &nodes));
    assert!(is_leaf("UBERON:unknown", &nodes));

    assert_eq!(get_leaf_descendants(&ganglion, &nodes), vec!["UBERON:sg", "UBERON:cg"]);
    assert_eq!(
        get_leaf_descendants(PNS_ID, &nodes),
        vec!["UBERON:sg", "UBERON:cg"]
    );
    assert_eq!(
        expand_to_leaf_ids(&[ganglion, String::from("UBERON:nts")], &nodes),
        vec!["UBERON:sg", "UBERON:cg", "UBERON:nts"]
    );
}

#[test]
fn test_get_statement_ids() {
    let nodes = load_hierarchy();
    let mut ids: Vec<String> = get_statement_ids(&nodes).into_iter().collect();
    ids.sort();
    assert_eq!(ids, vec!["ks1", "ks2", "ks3", "ks4", "ks5", "ks6"]);
}
