use crate::error::SckannerError;
use crate::model::{AnatomicalEntity, KnowledgeStatement, StatementMap};
use csv::{QuoteStyle, WriterBuilder};
use itertools::Itertools;
use serde_json::Value;
use std::io::Write;

pub const CSV_COLUMNS: [&str; 14] = [
    "id",
    "statement_preview",
    "provenances",
    "phenotype",
    "laterality",
    "projection",
    "circuit_type",
    "sex",
    "species",
    "apinatomy",
    "journey",
    "origins",
    "vias",
    "destinations",
];

//cells stay on one line and commas never reach the reader
fn flatten(text: &str) -> String {
    text.replace('\n', ". ")
        .replace('\r', "")
        .replace('\t', " ")
        .replace(',', ";")
}

fn list_cell(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("[ {} ]", v)).collect();
    flatten(&items.join(" & "))
}

fn entity_labels(entities: &[AnatomicalEntity]) -> String {
    itertools::join(
        entities
            .iter()
            .map(|e| format!("URI: {}; Label: {}", e.ontology_uri, e.name)),
        " & ",
    )
}

fn from_uris(entities: &[AnatomicalEntity]) -> String {
    itertools::join(entities.iter().map(|e| e.ontology_uri.as_str()), "; ")
}

//the wire name of a via or destination type, as the API spells it
fn type_name<T: serde::Serialize>(value: &Option<T>) -> String {
    match value.as_ref().map(serde_json::to_value) {
        Some(Ok(Value::String(x))) => x,
        _ => String::from("undefined"),
    }
}

///Given a knowledge statement, return its CSV cells in `CSV_COLUMNS` order.
pub fn statement_row(ks: &KnowledgeStatement) -> Vec<String> {
    let sex = if !ks.sex.name.is_empty() && !ks.sex.ontology_uri.is_empty() {
        format!("[ URI: {}; Label: {} ]", ks.sex.ontology_uri, ks.sex.name)
    } else {
        String::new()
    };
    let species = ks
        .species
        .iter()
        .map(|s| format!("[ URI: {}; Label: {} ]", s.id, s.name))
        .join(" & ");
    let origins = ks
        .origins
        .iter()
        .map(|o| format!("[ URIs: {}; Label: {} ]", o.ontology_uri, o.name))
        .join(" & ");
    let vias = ks
        .vias
        .iter()
        .map(|via| {
            format!(
                "[ ({}); Type: {}; From: {} ]",
                entity_labels(&via.anatomical_entities),
                type_name(&via.via_type),
                from_uris(&via.from_entities)
            )
        })
        .join(" & ");
    let destinations = ks
        .destinations
        .iter()
        .map(|destination| {
            format!(
                "[ ({}); Type: {}; From: {} ]",
                entity_labels(&destination.anatomical_entities),
                type_name(&destination.destination_type),
                from_uris(&destination.from_entities)
            )
        })
        .join(" & ");

    vec![
        flatten(&ks.id),
        flatten(&ks.statement_preview),
        list_cell(&ks.provenances),
        flatten(&ks.phenotype),
        flatten(&ks.laterality),
        flatten(&ks.projection),
        flatten(&ks.circuit_type),
        sex,
        species,
        flatten(&ks.apinatomy),
        list_cell(&ks.journey),
        flatten(&origins),
        flatten(&vias),
        flatten(&destinations),
    ]
}

///Write the statements as CSV, every cell quoted, header first.
pub fn write_csv<W: Write>(statements: &StatementMap, writer: W) -> Result<(), SckannerError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;
    for ks in statements.values() {
        wtr.write_record(statement_row(ks))?;
    }
    wtr.flush()?;
    Ok(())
}

///Return the statements as a CSV document.
pub fn generate_csv(statements: &StatementMap) -> Result<String, SckannerError> {
    let mut buffer = Vec::new();
    write_csv(statements, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| SckannerError::GeneralError(e.to_string()))
}
