#![allow(dead_code)]

use indexmap::IndexSet;
use sckanner::bindings::{parse_major_nerves, parse_order, parse_query_results, parse_rows};
use sckanner::model::{Hierarchy, OrganMap, StatementMap};
use sckanner::organs::{build_organ_index, OrganIndex};
use sckanner::settings::{HIERARCHY_ID_PATH_DELIMITER, PNS_ID};
use sckanner::statements::{build_statement_map, parse_knowledge_statements};
use std::fs;

pub const TEST_DATA: &str = "src/resources/test_data";

pub struct Fixture {
    pub hierarchy: Hierarchy,
    pub organ_index: OrganIndex,
    pub statements: StatementMap,
    pub major_nerves: IndexSet<String>,
}

impl Fixture {
    pub fn organs(&self) -> &OrganMap {
        &self.organ_index.organs
    }
}

fn read(name: &str) -> String {
    fs::read_to_string(format!("{}/{}", TEST_DATA, name)).unwrap()
}

pub fn load_fixture() -> Fixture {
    let rows = parse_rows(&parse_query_results(&read("query_results.json")).unwrap());
    let order = parse_order(&read("order.json")).unwrap();
    let endorgans_order = parse_order(&read("endorgans_order.json")).unwrap();
    let major_nerves = parse_major_nerves(&parse_query_results(&read("major_nerves.json")).unwrap());
    let statements =
        build_statement_map(parse_knowledge_statements(&read("statements.json")).unwrap());

    Fixture {
        hierarchy: sckanner::hierarchy::build_hierarchy(&rows, &order),
        organ_index: build_organ_index(&rows, &endorgans_order),
        statements,
        major_nerves,
    }
}

pub fn path(parts: &[&str]) -> String {
    parts.join(HIERARCHY_ID_PATH_DELIMITER)
}

pub fn ganglion_path() -> String {
    path(&[PNS_ID, "UBERON:ganglion"])
}

pub fn nts_path() -> String {
    path(&[
        sckanner::settings::CNS_ID,
        "UBERON:brain",
        "UBERON:medulla",
        "UBERON:nts",
    ])
}

pub fn sorted_keys(statements: &StatementMap) -> Vec<String> {
    let mut keys: Vec<String> = statements.keys().cloned().collect();
    keys.sort();
    keys
}
