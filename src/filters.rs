use crate::hierarchy::expand_to_leaf_ids;
use crate::model::{Hierarchy, KnowledgeStatement, OrganMap, StatementMap};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDetail {
    pub title: String,
    pub value: String,
}

/// A selectable value of one filter dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub content: Vec<OptionDetail>,
}

impl FilterOption {
    pub fn new(id: &str, label: &str) -> FilterOption {
        FilterOption {
            id: id.to_string(),
            label: label.to_string(),
            ..Default::default()
        }
    }
}

/// Selections of the primary view. An empty dimension does not constrain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub origin: Vec<FilterOption>,
    #[serde(default)]
    pub end_organ: Vec<FilterOption>,
    #[serde(default)]
    pub species: Vec<FilterOption>,
    #[serde(default)]
    pub phenotype: Vec<FilterOption>,
    #[serde(default)]
    pub apinatomy: Vec<FilterOption>,
    #[serde(default)]
    pub via: Vec<FilterOption>,
    #[serde(default)]
    pub entities: Vec<FilterOption>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.origin.is_empty()
            && self.end_organ.is_empty()
            && self.species.is_empty()
            && self.phenotype.is_empty()
            && self.apinatomy.is_empty()
            && self.via.is_empty()
            && self.entities.is_empty()
    }
}

/// Selections of the secondary (per-phenotype) view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFilters {
    #[serde(default)]
    pub phenotype: Vec<FilterOption>,
    #[serde(default)]
    pub nerve: Vec<FilterOption>,
}

fn option_ids(options: &[FilterOption]) -> Vec<String> {
    options.iter().map(|option| option.id.clone()).collect()
}

///Given filters and the organ registry, move every entity selection that names an
///organ into the end organ dimension.
pub fn extract_end_organ_filters_from_entities(filters: &Filters, organs: &OrganMap) -> Filters {
    let mut updated = filters.clone();
    if filters.entities.is_empty() {
        return updated;
    }

    let mut remaining = Vec::new();
    for entity in &filters.entities {
        if organs.contains_key(&entity.id) {
            if !updated.end_organ.iter().any(|e| e.id == entity.id) {
                updated.end_organ.push(entity.clone());
            }
        } else {
            remaining.push(entity.clone());
        }
    }
    updated.entities = remaining;
    updated
}

///The ids an end organ selection matches by containment: the organ's own id and
///all of its destinations.
fn end_organ_match_ids(selection: &[FilterOption], organs: &OrganMap) -> Vec<String> {
    let mut ids: IndexSet<String> = IndexSet::new();
    for option in selection {
        ids.insert(option.id.clone());
        if let Some(organ) = organs.get(&option.id) {
            ids.extend(organ.children.keys().cloned());
        }
    }
    ids.into_iter().collect()
}

pub fn matches_phenotype(ks: &KnowledgeStatement, phenotype_ids: &[String]) -> bool {
    phenotype_ids.is_empty()
        || phenotype_ids.contains(&ks.phenotype)
        || (!ks.circuit_type.is_empty() && phenotype_ids.contains(&ks.circuit_type))
        || (!ks.projection.is_empty() && phenotype_ids.contains(&ks.projection))
}

///Destination ids may be compound (e.g. `region (layer)`), so a destination matches
///when it contains any of the given ids.
pub fn matches_end_organ(ks: &KnowledgeStatement, end_organ_ids: &[String]) -> bool {
    end_organ_ids.is_empty()
        || ks.destination_entities().any(|entity| {
            end_organ_ids
                .iter()
                .any(|id| !id.is_empty() && entity.id.contains(id.as_str()))
        })
}

/// The normalized id selections of every primary filter dimension.
#[derive(Clone, Debug, Default)]
pub struct FilterSelection {
    pub phenotype: Vec<String>,
    pub apinatomy: Vec<String>,
    pub species: Vec<String>,
    pub via: Vec<String>,
    pub origin: Vec<String>,
    pub entities: Vec<String>,
    pub end_organ: Vec<String>,
}

impl FilterSelection {
    ///Resolve the selected options into the ids statements are matched against:
    ///hierarchical dimensions are expanded to leaf entity ids and end organs to
    ///their destinations.
    pub fn new(hierarchy: &Hierarchy, filters: &Filters, organs: &OrganMap) -> FilterSelection {
        let filters = extract_end_organ_filters_from_entities(filters, organs);
        FilterSelection {
            phenotype: option_ids(&filters.phenotype),
            apinatomy: option_ids(&filters.apinatomy),
            species: option_ids(&filters.species),
            via: expand_to_leaf_ids(&option_ids(&filters.via), hierarchy),
            origin: expand_to_leaf_ids(&option_ids(&filters.origin), hierarchy),
            entities: expand_to_leaf_ids(&option_ids(&filters.entities), hierarchy),
            end_organ: end_organ_match_ids(&filters.end_organ, organs),
        }
    }

    pub fn matches(&self, ks: &KnowledgeStatement) -> bool {
        let apinatomy_match =
            self.apinatomy.is_empty() || self.apinatomy.contains(&ks.apinatomy);
        let species_match = self.species.is_empty()
            || ks.species.iter().any(|s| self.species.contains(&s.id));
        let via_match =
            self.via.is_empty() || ks.via_entities().any(|e| self.via.contains(&e.id));
        let origin_match =
            self.origin.is_empty() || ks.origins.iter().any(|o| self.origin.contains(&o.id));
        let entity_match = self.entities.is_empty()
            || ks.destination_entities().any(|e| self.entities.contains(&e.id))
            || ks.via_entities().any(|e| self.entities.contains(&e.id))
            || ks.origins.iter().any(|o| self.entities.contains(&o.id));

        matches_phenotype(ks, &self.phenotype)
            && apinatomy_match
            && species_match
            && via_match
            && origin_match
            && entity_match
            && matches_end_organ(ks, &self.end_organ)
    }
}

///Given the statement store, the hierarchy, the active filters and the organ registry,
///return the statements passing every constrained dimension.
///
///Dimensions combine with AND; the options within a dimension combine with OR.
///Without any active filter the input is returned unchanged.
pub fn filter_knowledge_statements(
    statements: &StatementMap,
    hierarchy: &Hierarchy,
    filters: &Filters,
    organs: &OrganMap,
) -> StatementMap {
    if filters.is_empty() {
        return statements.clone();
    }

    let selection = FilterSelection::new(hierarchy, filters, organs);
    statements
        .iter()
        .filter(|(_, ks)| selection.matches(ks))
        .map(|(id, ks)| (id.clone(), ks.clone()))
        .collect()
}

///Given the organ registry and the end organ selection,
///return the organs that keep their heatmap columns.
pub fn filter_organs(organs: &OrganMap, end_organ_filter: &[FilterOption]) -> OrganMap {
    if end_organ_filter.is_empty() {
        return organs.clone();
    }
    let filter_ids = option_ids(end_organ_filter);
    organs
        .iter()
        .filter(|(id, _)| filter_ids.contains(id))
        .map(|(id, organ)| (id.clone(), organ.clone()))
        .collect()
}

///Filter the statements of a selected heatmap cell by phenotype and by the nerves
///they pass through.
pub fn summary_filter_knowledge_statements(
    statements: &StatementMap,
    summary_filters: &SummaryFilters,
) -> StatementMap {
    let phenotype_ids = option_ids(&summary_filters.phenotype);
    let nerve_ids = option_ids(&summary_filters.nerve);

    statements
        .iter()
        .filter(|(_, ks)| {
            let nerve_match =
                nerve_ids.is_empty() || ks.via_entities().any(|e| nerve_ids.contains(&e.id));
            matches_phenotype(ks, &phenotype_ids) && nerve_match
        })
        .map(|(id, ks)| (id.clone(), ks.clone()))
        .collect()
}

///Return copies of the statements whose via entities only keep major nerves.
pub fn restrict_vias_to_major_nerves(
    statements: &StatementMap,
    major_nerves: &IndexSet<String>,
) -> StatementMap {
    statements
        .iter()
        .map(|(id, ks)| {
            let mut ks = ks.clone();
            for via in ks.vias.iter_mut() {
                via.anatomical_entities
                    .retain(|entity| major_nerves.contains(&entity.id));
            }
            (id.clone(), ks)
        })
        .collect()
}
