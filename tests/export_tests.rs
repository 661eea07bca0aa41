mod common;

use common::load_fixture;
use pretty_assertions::assert_eq;
use sckanner::export::{generate_csv, statement_row, write_csv, CSV_COLUMNS};
use sckanner::model::{KnowledgeStatement, Sex, StatementMap};
use sckanner::statements::get_knowledge_statement_map;

#[test]
fn test_statement_row() {
    let fixture = load_fixture();
    assert_eq!(
        statement_row(&fixture.statements["ks1"]),
        vec![
            "ks1",
            "preview of ks1",
            "[ https://doi.org/10.1/ks1 ]",
            "sympathetic",
            "",
            "",
            "",
            "",
            "[ URI: NCBITaxon:10116; Label: Rattus norvegicus ]",
            "model1",
            "[ journey of ks1 ]",
            "[ URIs: UBERON:nts; Label: nucleus of solitary tract ]",
            "[ (URI: UBERON:vagus; Label: vagus nerve); Type: AXON; From:  ]",
            "[ (URI: UBERON:heart_wall; Label: heart wall); Type: AXON-T; From:  ]",
        ]
    );
    assert_eq!(statement_row(&fixture.statements["ks2"]).len(), CSV_COLUMNS.len());
}

#[test]
fn test_cells_stay_on_one_line() {
    let ks = KnowledgeStatement {
        id: String::from("ks9"),
        statement_preview: String::from("first, second\nthird\r\tfourth"),
        sex: Sex {
            id: Some(1),
            name: String::from("male"),
            ontology_uri: String::from("PATO:male"),
        },
        ..Default::default()
    };
    let row = statement_row(&ks);
    assert_eq!(row[1], "first; second. third fourth");
    assert_eq!(row[7], "[ URI: PATO:male; Label: male ]");
}

#[test]
fn test_generate_csv() {
    let fixture = load_fixture();
    let statements: StatementMap = get_knowledge_statement_map(
        &[String::from("ks4"), String::from("ks5")],
        &fixture.statements,
    );
    let csv = generate_csv(&statements).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        CSV_COLUMNS
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<String>>()
            .join(",")
    );
    assert!(lines[1].starts_with("\"ks4\",\"preview of ks4\","));
    assert!(lines[1].contains(
        "\"[ (URI: UBERON:stomach (UBERON:muscle); Label: stomach (muscle layer)); Type: AXON-T; From:  ]\""
    ));
    assert!(lines[2].contains("Type: UNKNOWN"));
}

#[test]
fn test_write_csv_empty() {
    let mut buffer = Vec::new();
    write_csv(&StatementMap::new(), &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("\"id\",\"statement_preview\""));
}
