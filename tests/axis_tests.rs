mod common;

use common::{ganglion_path, load_fixture, nts_path, path};
use indexmap::{IndexMap, IndexSet};
use pretty_assertions::assert_eq;
use sckanner::axis::{
    assign_expanded_state, collect_expanded_ids, filter_connections_map, filter_x_axis,
    filter_y_axis, generate_y_labels_and_ids, get_non_empty_columns, get_y_axis,
    get_y_axis_for_node, ColumnMapping, HierarchicalItem,
};
use sckanner::filters::{FilterOption, Filters};
use sckanner::heatmap::calculate_connections;
use sckanner::settings::{CNS_ID, PNS_ID, UNK_ID};
use std::collections::HashSet;

fn item(id: &str, label: &str, children: Vec<HierarchicalItem>) -> HierarchicalItem {
    HierarchicalItem {
        id: id.to_string(),
        label: label.to_string(),
        children,
        expanded: false,
    }
}

#[test]
fn test_get_y_axis() {
    let fixture = load_fixture();
    let y_axis = get_y_axis(&fixture.hierarchy);
    assert_eq!(
        y_axis.iter().map(|x| x.label.as_str()).collect::<Vec<&str>>(),
        vec!["Central nervous system", "Peripheral nervous system", "Others"]
    );
    assert!(y_axis.iter().all(|x| !x.expanded));
    assert_eq!(y_axis[1].children[0].children.len(), 2);

    let subtree = get_y_axis_for_node(&ganglion_path(), &fixture.hierarchy);
    assert_eq!(subtree.len(), 1);
    assert_eq!(subtree[0].label, "ganglion");
    assert!(get_y_axis_for_node("missing", &fixture.hierarchy).is_empty());
}

#[test]
fn test_generate_y_labels_and_ids() {
    let mut parent = item(
        "p",
        "parent",
        vec![item("p#a", "a", vec![]), item("p#b", "b", vec![item("p#b#c", "c", vec![])])],
    );
    parent.expanded = true;
    parent.children[1].expanded = true;
    let items = vec![parent, item("q", "other", vec![item("q#d", "d", vec![])])];

    let labels = generate_y_labels_and_ids(&items, "");
    assert_eq!(
        labels.labels,
        vec![
            "parent",
            "parent - a",
            "parent - b",
            "parent - b - c",
            "other"
        ]
    );
    assert_eq!(labels.ids, vec!["p", "p#a", "p#b", "p#b#c", "q"]);
    assert_eq!(labels.expanded, vec![true, false, true, false, false]);
}

#[test]
fn test_expanded_state_round_trip() {
    let fixture = load_fixture();
    let expanded: HashSet<String> = [CNS_ID.to_string(), ganglion_path(), nts_path()]
        .into_iter()
        .collect();
    let y_axis = assign_expanded_state(&get_y_axis(&fixture.hierarchy), &expanded);
    assert_eq!(collect_expanded_ids(&y_axis), expanded);

    //ids missing from the tree are dropped
    let mut with_unknown = expanded.clone();
    with_unknown.insert(String::from("missing"));
    let y_axis = assign_expanded_state(&get_y_axis(&fixture.hierarchy), &with_unknown);
    assert_eq!(collect_expanded_ids(&y_axis), expanded);
}

#[test]
fn test_filter_y_axis() {
    let fixture = load_fixture();
    let filters = Filters {
        phenotype: vec![FilterOption::new("enteric", "enteric")],
        ..Default::default()
    };
    let connections = calculate_connections(
        &fixture.hierarchy,
        fixture.organs(),
        &fixture.statements,
        &filters,
    );
    let y_axis = filter_y_axis(&get_y_axis(&fixture.hierarchy), &connections);

    //only the stellate ganglion keeps data
    assert_eq!(y_axis.len(), 1);
    assert_eq!(y_axis[0].id, PNS_ID);
    assert_eq!(y_axis[0].children[0].id, ganglion_path());
    assert_eq!(
        y_axis[0].children[0]
            .children
            .iter()
            .map(|x| x.id.clone())
            .collect::<Vec<String>>(),
        vec![path(&[PNS_ID, "UBERON:ganglion", "UBERON:sg"])]
    );
}

#[test]
fn test_non_empty_columns() {
    let fixture = load_fixture();
    let connections = calculate_connections(
        &fixture.hierarchy,
        fixture.organs(),
        &fixture.statements,
        &Filters {
            phenotype: vec![FilterOption::new("sympathetic", "sympathetic")],
            ..Default::default()
        },
    );
    let y_axis = filter_y_axis(&get_y_axis(&fixture.hierarchy), &connections);
    let columns = get_non_empty_columns(&y_axis, &connections);
    assert_eq!(columns.iter().copied().collect::<Vec<usize>>(), vec![0, 1]);

    let pruned = filter_connections_map(&y_axis, &connections, &columns);
    assert_eq!(pruned[CNS_ID], vec![vec![], vec![String::from("ks1")]]);
    assert_eq!(pruned[PNS_ID], vec![vec![String::from("ks6")], vec![]]);
    assert!(!pruned.contains_key(UNK_ID));
    //descendants of every kept item are pruned too
    assert_eq!(pruned[&nts_path()].len(), 2);

    let ordered = fixture.organ_index.ordered_organs();
    let organs = filter_x_axis(&ordered, &columns);
    assert_eq!(
        organs.iter().map(|x| x.id.as_str()).collect::<Vec<&str>>(),
        vec!["UBERON:lung", "UBERON:heart"]
    );
}

#[test]
fn test_column_mapping() {
    let columns: IndexSet<usize> = [3, 1, 7].into_iter().collect();
    let mapping = ColumnMapping::new(&columns, 5);

    //out of range columns are ignored
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.width(), 5);
    assert_eq!(mapping.to_original(0), Some(1));
    assert_eq!(mapping.to_original(1), Some(3));
    assert_eq!(mapping.to_original(2), None);
    assert_eq!(mapping.to_compact(3), Some(1));
    assert_eq!(mapping.to_compact(2), None);

    for compact in 0..mapping.len() {
        let original = mapping.to_original(compact).unwrap();
        assert_eq!(mapping.to_compact(original), Some(compact));
    }

    assert_eq!(mapping.expand_row(&[10, 30]), vec![0, 10, 0, 30, 0]);
    assert!(ColumnMapping::new(&IndexSet::new(), 3).is_empty());
}

#[test]
fn test_pruned_rows_expand_back_to_their_columns() {
    let fixture = load_fixture();
    let width = fixture.organ_index.ordered_organs().len();
    let selections = vec![
        Filters::default(),
        Filters {
            phenotype: vec![FilterOption::new("sympathetic", "sympathetic")],
            ..Default::default()
        },
        Filters {
            end_organ: vec![FilterOption::new("UBERON:heart", "heart")],
            ..Default::default()
        },
    ];

    for filters in selections {
        let connections = calculate_connections(
            &fixture.hierarchy,
            fixture.organs(),
            &fixture.statements,
            &filters,
        );
        let y_axis = filter_y_axis(&get_y_axis(&fixture.hierarchy), &connections);
        let columns = get_non_empty_columns(&y_axis, &connections);
        let pruned = filter_connections_map(&y_axis, &connections, &columns);
        let mapping = ColumnMapping::new(&columns, width);

        assert!(!pruned.is_empty());
        for (id, row) in &pruned {
            assert_eq!(row.len(), mapping.len());
            assert_eq!(&mapping.expand_row(row), &connections[id]);
        }
    }
}

#[test]
fn test_filter_connections_map_keeps_order() {
    let items = vec![item("a", "a", vec![item("a#b", "b", vec![])])];
    let connections = IndexMap::from([
        (String::from("a"), vec![1, 2, 3]),
        (String::from("a#b"), vec![4, 5, 6]),
    ]);
    let columns: IndexSet<usize> = [0, 2].into_iter().collect();
    let pruned = filter_connections_map(&items, &connections, &columns);
    assert_eq!(pruned["a"], vec![1, 3]);
    assert_eq!(pruned["a#b"], vec![4, 6]);
}
