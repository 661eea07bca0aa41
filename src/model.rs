use chrono::{DateTime, FixedOffset};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// target organ -> end organ -> knowledge statement ids
pub type ConnectionDetails = IndexMap<String, IndexMap<String, Vec<String>>>;

/// The shared node table of the origin hierarchy, keyed by path id.
pub type Hierarchy = IndexMap<String, HierarchicalNode>;

/// Knowledge statements keyed by statement id.
pub type StatementMap = IndexMap<String, KnowledgeStatement>;

/// Organs keyed by organ id.
pub type OrganMap = IndexMap<String, Organ>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseEntity {
    pub id: String,
    pub name: String,
}

impl BaseEntity {
    pub fn new(id: &str, name: &str) -> BaseEntity {
        BaseEntity {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnatomicalEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ontology_uri: String,
    #[serde(default)]
    pub synonyms: String,
}

impl AnatomicalEntity {
    pub fn new(id: &str, name: &str) -> AnatomicalEntity {
        AnatomicalEntity {
            id: id.to_string(),
            name: name.to_string(),
            ontology_uri: id.to_string(),
            synonyms: String::new(),
        }
    }
}

/// A node of the origin hierarchy.
///
/// The id is a path from one of the roots through the ids of all ancestor
/// regions, joined by `#`. Children are ids into the same node table.
/// Only leaves carry `connection_details`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalNode {
    pub id: String,
    pub name: String,
    pub uri: String,
    pub children: IndexSet<String>,
    pub connection_details: Option<ConnectionDetails>,
}

impl HierarchicalNode {
    pub fn new(id: &str, name: &str) -> HierarchicalNode {
        HierarchicalNode {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An end organ column of the primary heatmap.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Organ {
    pub id: String,
    pub name: String,
    pub children: IndexMap<String, BaseEntity>,
    pub order: usize,
    //set for catch-all organs whose destinations are only known from the statements
    #[serde(default)]
    pub is_virtual_category: bool,
}

impl Organ {
    pub fn new(id: &str, name: &str) -> Organ {
        Organ {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViaType {
    #[serde(rename = "AXON")]
    Axon,
    #[serde(rename = "DENDRITE")]
    Dendrite,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationType {
    #[serde(rename = "AXON-T")]
    AxonT,
    #[serde(rename = "AFFERENT-T")]
    AfferentT,
    #[serde(rename = "UNKNOWN")]
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub id: i64,
    pub order: i64,
    pub via_type: Option<ViaType>,
    pub anatomical_entities: Vec<AnatomicalEntity>,
    pub from_entities: Vec<AnatomicalEntity>,
    pub are_connections_explicit: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: i64,
    pub destination_type: Option<DestinationType>,
    pub anatomical_entities: Vec<AnatomicalEntity>,
    pub from_entities: Vec<AnatomicalEntity>,
    pub are_connections_explicit: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sex {
    pub id: Option<i64>,
    pub name: String,
    pub ontology_uri: String,
}

/// A single connectivity assertion.
///
/// `vias` are sorted by their `order`. `forward_connections` holds the ids of the
/// statements continuing this one's path; the chain is not guaranteed to be acyclic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeStatement {
    pub id: String,
    pub phenotype: String,
    pub apinatomy: String,
    pub species: Vec<BaseEntity>,
    pub vias: Vec<Via>,
    pub origins: Vec<AnatomicalEntity>,
    pub destinations: Vec<Destination>,
    pub forward_connections: Vec<String>,
    pub provenances: Vec<String>,
    pub knowledge_statement: String,
    pub journey: Vec<String>,
    pub laterality: String,
    pub projection: String,
    pub circuit_type: String,
    pub sex: Sex,
    pub statement_preview: String,
}

impl KnowledgeStatement {
    pub fn via_entities(&self) -> impl Iterator<Item = &AnatomicalEntity> {
        self.vias.iter().flat_map(|via| via.anatomical_entities.iter())
    }

    pub fn destination_entities(&self) -> impl Iterator<Item = &AnatomicalEntity> {
        self.destinations
            .iter()
            .flat_map(|destination| destination.anatomical_entities.iter())
    }
}

/// A published data snapshot the knowledge statements can be fetched for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Datasnapshot {
    pub id: i64,
    pub timestamp: String,
    pub source_id: i64,
    pub source: String,
    pub version: String,
}

impl Datasnapshot {
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok()
    }
}
