use pretty_assertions::assert_eq;
use sckanner::bindings::{parse_order, parse_query_results, parse_rows};
use sckanner::hierarchy::{build_hierarchy, get_statement_ids};
use sckanner::model::{BaseEntity, DestinationType, ViaType};
use sckanner::statements::{
    build_statement_map, forward_connection_id, get_knowledge_statement_map,
    parse_knowledge_statements,
};
use serde_json::json;
use std::fs;

fn load_statements() -> Vec<sckanner::model::KnowledgeStatement> {
    let text = fs::read_to_string("src/resources/test_data/statements.json").unwrap();
    parse_knowledge_statements(&text).unwrap()
}

#[test]
fn test_parse_paged_payload() {
    let statements = load_statements();
    let ids: Vec<&str> = statements.iter().map(|ks| ks.id.as_str()).collect();
    assert_eq!(ids, vec!["ks1", "ks2", "ks3", "ks4", "ks5", "ks6"]);

    let ks1 = &statements[0];
    assert_eq!(ks1.phenotype, "sympathetic");
    assert_eq!(ks1.apinatomy, "model1");
    assert_eq!(
        ks1.species,
        vec![BaseEntity::new("NCBITaxon:10116", "Rattus norvegicus")]
    );
    assert_eq!(ks1.origins[0].id, "UBERON:nts");
    assert_eq!(ks1.origins[0].synonyms, "NTS");
    assert_eq!(ks1.forward_connections, vec!["ks3"]);
    assert_eq!(ks1.provenances, vec!["https://doi.org/10.1/ks1"]);
    assert_eq!(ks1.journey, vec!["journey of ks1"]);
    assert_eq!(
        ks1.destinations[0].destination_type,
        Some(DestinationType::AxonT)
    );

    //explicit nulls become empty values
    assert_eq!(ks1.laterality, "");
    assert_eq!(ks1.sex.name, "");
    assert_eq!(statements[3].phenotype, "");
    assert_eq!(statements[3].apinatomy, "");
    assert_eq!(
        statements[4].destinations[0].destination_type,
        Some(DestinationType::Unknown)
    );
}

#[test]
fn test_parse_list_payload() {
    let text = json!([
        {"id": 7, "species": null, "vias": null, "forward_connection": [8, "ks9"]},
        {"reference_uri": "ks10", "sex": {"id": 1, "name": "female", "ontology_uri": "PATO:female"}}
    ])
    .to_string();
    let statements = parse_knowledge_statements(&text).unwrap();
    assert_eq!(statements.len(), 2);

    //the numeric id is used when there is no reference URI
    assert_eq!(statements[0].id, "7");
    assert!(statements[0].species.is_empty());
    assert_eq!(statements[0].forward_connections, vec!["8", "ks9"]);
    assert_eq!(statements[1].id, "ks10");
    assert_eq!(statements[1].sex.name, "female");
    assert_eq!(statements[1].sex.id, Some(1));
}

#[test]
fn test_parse_invalid_payload() {
    assert!(parse_knowledge_statements("{\"results\": 3}").is_err());
    assert!(parse_knowledge_statements("not json").is_err());
}

#[test]
fn test_region_layer_entities() {
    let statements = load_statements();
    let destination = &statements[3].destinations[0].anatomical_entities[0];
    assert_eq!(destination.id, "UBERON:stomach (UBERON:muscle)");
    assert_eq!(destination.ontology_uri, "UBERON:stomach (UBERON:muscle)");
    assert_eq!(destination.name, "stomach (muscle layer)");
}

#[test]
fn test_vias_sorted_by_order() {
    let statements = load_statements();
    let ks3 = &statements[2];
    let orders: Vec<i64> = ks3.vias.iter().map(|via| via.order).collect();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(ks3.vias[0].via_type, Some(ViaType::Dendrite));
    assert_eq!(
        ks3.via_entities().map(|x| x.id.as_str()).collect::<Vec<&str>>(),
        vec!["UBERON:vagus", "UBERON:tnerve"]
    );
}

#[test]
fn test_forward_connection_id() {
    assert_eq!(forward_connection_id(&json!("ks1")), Some(String::from("ks1")));
    assert_eq!(forward_connection_id(&json!(12)), Some(String::from("12")));
    assert_eq!(
        forward_connection_id(&json!({"reference_uri": "ks2", "id": 2})),
        Some(String::from("ks2"))
    );
    assert_eq!(forward_connection_id(&json!({"id": 2})), Some(String::from("2")));
    assert_eq!(forward_connection_id(&json!("")), None);
    assert_eq!(forward_connection_id(&json!(null)), None);
}

#[test]
fn test_build_statement_map() {
    let mut statements = load_statements();
    statements.push(Default::default());
    let map = build_statement_map(statements);
    assert_eq!(map.len(), 6);
    assert!(!map.contains_key(""));

    let subset = get_knowledge_statement_map(
        &[String::from("ks2"), String::from("missing"), String::from("ks5")],
        &map,
    );
    assert_eq!(subset.keys().collect::<Vec<_>>(), vec!["ks2", "ks5"]);
}

#[test]
fn test_every_leaf_reference_resolves() {
    let text = fs::read_to_string("src/resources/test_data/query_results.json").unwrap();
    let rows = parse_rows(&parse_query_results(&text).unwrap());
    let text = fs::read_to_string("src/resources/test_data/order.json").unwrap();
    let hierarchy = build_hierarchy(&rows, &parse_order(&text).unwrap());

    let map = build_statement_map(load_statements());
    let dangling: Vec<String> = get_statement_ids(&hierarchy)
        .into_iter()
        .filter(|id| !map.contains_key(id))
        .collect();
    assert_eq!(dangling, Vec::<String>::new());
}
