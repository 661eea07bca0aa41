mod common;

use common::load_fixture;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sckanner::bindings::ConnectivityRow;
use sckanner::organs::{build_organ_index, get_x_axis_organs};
use sckanner::settings::{OTHER_X_AXIS_ID, OTHER_X_AXIS_LABEL};

#[test]
fn test_organ_column_order() {
    let fixture = load_fixture();
    let ordered: Vec<(&str, usize)> = fixture
        .organ_index
        .ordered_organs()
        .iter()
        .map(|organ| (organ.id.as_str(), organ.order))
        .collect();

    //explicit order first, then encounter order, catch-all last
    assert_eq!(
        ordered,
        vec![
            ("UBERON:lung", 1),
            ("UBERON:heart", 2),
            ("UBERON:stomach", 3),
            (OTHER_X_AXIS_ID, 4),
        ]
    );
    assert_eq!(fixture.organs()[OTHER_X_AXIS_ID].name, OTHER_X_AXIS_LABEL);
}

#[test]
fn test_organ_children() {
    let fixture = load_fixture();
    let children = |id: &str| -> Vec<String> {
        fixture.organs()[id].children.keys().cloned().collect()
    };

    //an organ is always one of its own destinations
    assert_eq!(children("UBERON:heart"), vec!["UBERON:heart", "UBERON:heart_wall"]);
    assert_eq!(children("UBERON:lung"), vec!["UBERON:lung", "UBERON:bronchus"]);
    assert_eq!(children("UBERON:stomach"), vec!["UBERON:stomach"]);
    assert_eq!(children(OTHER_X_AXIS_ID), vec!["UBERON:skin"]);
}

#[test]
fn test_target_systems() {
    let fixture = load_fixture();
    let index = &fixture.organ_index;

    assert_eq!(
        index.target_systems.keys().cloned().collect::<Vec<String>>(),
        vec!["SYS:cardio", "SYS:digestive", "SYS:resp"]
    );
    assert_eq!(index.target_system_names["SYS:resp"], "respiratory system");
    let members: Vec<(&str, usize)> = index.target_systems["SYS:cardio"]
        .iter()
        .map(|organ| (organ.id.as_str(), organ.order))
        .collect();
    assert_eq!(members, vec![("UBERON:heart", 1)]);
}

#[test]
fn test_empty_rows() {
    let index = build_organ_index(&[], &IndexMap::new());
    assert_eq!(index.organs.len(), 1);
    assert_eq!(index.organs[OTHER_X_AXIS_ID].order, 1);
    assert!(index.target_systems.is_empty());
}

#[test]
fn test_duplicate_order_entries() {
    let row = |organ: &str| ConnectivityRow {
        target_organ_id: Some(organ.to_string()),
        target_organ_name: Some(organ.to_string()),
        end_organ_id: Some(organ.to_string()),
        end_organ_name: Some(organ.to_string()),
        neuron_id: Some(String::from("ks")),
        ..Default::default()
    };
    let order = IndexMap::from([
        (String::from("a"), vec![String::from("b"), String::from("c")]),
        (String::from("d"), vec![String::from("b")]),
    ]);
    let index = build_organ_index(&[row("c"), row("b"), row("e")], &order);

    //the first occurrence of an organ in the order lists wins
    let ordered: Vec<&str> = get_x_axis_organs(&index.organs)
        .iter()
        .map(|organ| organ.id.as_str())
        .collect();
    assert_eq!(ordered, vec!["b", "c", "e", OTHER_X_AXIS_ID]);
}
