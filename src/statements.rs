use crate::error::SckannerError;
use crate::model::{
    AnatomicalEntity, BaseEntity, Destination, DestinationType, KnowledgeStatement, Sex,
    StatementMap, Via, ViaType,
};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

//the API sends explicit nulls for empty collections
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiNamedUri {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ontology_uri: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiRegionLayer {
    pub region: ApiNamedUri,
    pub layer: ApiNamedUri,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiAnatomicalEntity {
    pub simple_entity: Option<ApiNamedUri>,
    pub region_layer: Option<ApiRegionLayer>,
    pub synonyms: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiVia {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub order: i64,
    #[serde(rename = "type")]
    pub via_type: Option<ViaType>,
    #[serde(deserialize_with = "null_as_default")]
    pub anatomical_entities: Vec<ApiAnatomicalEntity>,
    #[serde(deserialize_with = "null_as_default")]
    pub from_entities: Vec<ApiAnatomicalEntity>,
    #[serde(deserialize_with = "null_as_default")]
    pub are_connections_explicit: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiDestination {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "type")]
    pub destination_type: Option<DestinationType>,
    #[serde(deserialize_with = "null_as_default")]
    pub anatomical_entities: Vec<ApiAnatomicalEntity>,
    #[serde(deserialize_with = "null_as_default")]
    pub from_entities: Vec<ApiAnatomicalEntity>,
    #[serde(deserialize_with = "null_as_default")]
    pub are_connections_explicit: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiProvenance {
    pub uri: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiSex {
    pub id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ontology_uri: String,
}

/// A knowledge statement as served by the statements API.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiKnowledgeStatement {
    pub id: Option<Value>,
    pub reference_uri: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub species: Vec<ApiNamedUri>,
    #[serde(deserialize_with = "null_as_default")]
    pub origins: Vec<ApiAnatomicalEntity>,
    #[serde(deserialize_with = "null_as_default")]
    pub destinations: Vec<ApiDestination>,
    #[serde(deserialize_with = "null_as_default")]
    pub vias: Vec<ApiVia>,
    pub apinatomy_model: Option<String>,
    pub phenotype: Option<ApiNamedUri>,
    #[serde(deserialize_with = "null_as_default")]
    pub forward_connection: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub provenances: Vec<ApiProvenance>,
    pub knowledge_statement: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub journey: Vec<Value>,
    pub laterality: Option<String>,
    pub projection: Option<String>,
    pub circuit_type: Option<String>,
    pub sex: Option<ApiSex>,
    pub statement_preview: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatementPayload {
    List(Vec<ApiKnowledgeStatement>),
    Paged { results: Vec<ApiKnowledgeStatement> },
}

// ################################################
// ######## map API records #######################
// ################################################

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(x) if !x.is_empty() => Some(x.clone()),
        Value::Number(x) => Some(x.to_string()),
        _ => None,
    }
}

///Region/layer pairs are addressed as `region (layer)`, both for ids and names.
pub fn map_anatomical_entity(entity: &ApiAnatomicalEntity) -> AnatomicalEntity {
    let (id, name) = match (&entity.region_layer, &entity.simple_entity) {
        (Some(region_layer), _) => (
            format!(
                "{} ({})",
                region_layer.region.ontology_uri, region_layer.layer.ontology_uri
            ),
            format!("{} ({})", region_layer.region.name, region_layer.layer.name),
        ),
        (None, Some(simple)) => (simple.ontology_uri.clone(), simple.name.clone()),
        (None, None) => (String::new(), String::new()),
    };
    AnatomicalEntity {
        ontology_uri: id.clone(),
        id,
        name,
        synonyms: entity.synonyms.clone().unwrap_or_default(),
    }
}

///Forward connections arrive either as bare ids or as nested statement records.
pub fn forward_connection_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(x) => x
            .get("reference_uri")
            .and_then(value_to_string)
            .or_else(|| x.get("id").and_then(value_to_string)),
        _ => value_to_string(value),
    }
}

pub fn map_api_statement(api: &ApiKnowledgeStatement) -> KnowledgeStatement {
    let id = api
        .reference_uri
        .clone()
        .filter(|x| !x.is_empty())
        .or_else(|| api.id.as_ref().and_then(value_to_string))
        .unwrap_or_default();

    let mut vias: Vec<Via> = api
        .vias
        .iter()
        .map(|via| Via {
            id: via.id,
            order: via.order,
            via_type: via.via_type.clone(),
            anatomical_entities: via.anatomical_entities.iter().map(map_anatomical_entity).collect(),
            from_entities: via.from_entities.iter().map(map_anatomical_entity).collect(),
            are_connections_explicit: via.are_connections_explicit,
        })
        .collect();
    vias.sort_by_key(|via| via.order);

    let destinations = api
        .destinations
        .iter()
        .map(|destination| Destination {
            id: destination.id,
            destination_type: destination.destination_type.clone(),
            anatomical_entities: destination
                .anatomical_entities
                .iter()
                .map(map_anatomical_entity)
                .collect(),
            from_entities: destination.from_entities.iter().map(map_anatomical_entity).collect(),
            are_connections_explicit: destination.are_connections_explicit,
        })
        .collect();

    let sex = match &api.sex {
        Some(x) => Sex {
            id: x.id,
            name: x.name.clone(),
            ontology_uri: x.ontology_uri.clone(),
        },
        None => Sex::default(),
    };

    KnowledgeStatement {
        id,
        phenotype: api.phenotype.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
        apinatomy: api.apinatomy_model.clone().unwrap_or_default(),
        species: api
            .species
            .iter()
            .map(|s| BaseEntity::new(&s.ontology_uri, &s.name))
            .collect(),
        vias,
        origins: api.origins.iter().map(map_anatomical_entity).collect(),
        destinations,
        forward_connections: api.forward_connection.iter().filter_map(forward_connection_id).collect(),
        provenances: api
            .provenances
            .iter()
            .map(|p| p.uri.clone().unwrap_or_default())
            .collect(),
        knowledge_statement: api.knowledge_statement.clone().unwrap_or_default(),
        journey: api
            .journey
            .iter()
            .map(|j| match j {
                Value::String(x) => x.clone(),
                other => other.to_string(),
            })
            .collect(),
        laterality: api.laterality.clone().unwrap_or_default(),
        projection: api.projection.clone().unwrap_or_default(),
        circuit_type: api.circuit_type.clone().unwrap_or_default(),
        sex,
        statement_preview: api.statement_preview.clone().unwrap_or_default(),
    }
}

///Given a statements API response (a list, or a page with `results`),
///return the mapped knowledge statements.
pub fn parse_knowledge_statements(text: &str) -> Result<Vec<KnowledgeStatement>, SckannerError> {
    let payload = serde_json::from_str::<StatementPayload>(text)?;
    let records = match payload {
        StatementPayload::Paged { results } => results,
        StatementPayload::List(x) => x,
    };
    Ok(records.iter().map(map_api_statement).collect())
}

// ################################################
// ######## statement store #######################
// ################################################

///Key statements by id. Statements without an id cannot be referenced and are dropped.
pub fn build_statement_map(statements: Vec<KnowledgeStatement>) -> StatementMap {
    let mut map: StatementMap = IndexMap::new();
    for statement in statements {
        if statement.id.is_empty() {
            tracing::warn!("dropping knowledge statement without id");
            continue;
        }
        map.insert(statement.id.clone(), statement);
    }
    map
}

///Given statement ids, return the statements among them that the store knows.
pub fn get_knowledge_statement_map(ids: &[String], statements: &StatementMap) -> StatementMap {
    ids.iter()
        .filter_map(|id| statements.get(id).map(|ks| (id.clone(), ks.clone())))
        .collect()
}
