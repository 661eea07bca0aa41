use crate::axis::HierarchicalItem;
use crate::filters::{FilterOption, OptionDetail};
use crate::hierarchy::get_node_id_from_path;
use crate::model::{AnatomicalEntity, BaseEntity, Organ, StatementMap};
use crate::settings::{END_ORGAN_SUFFIX, SYNONYMS_TITLE};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// The selectable options of every primary filter dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterValues {
    pub origins: Vec<FilterOption>,
    pub end_organs: Vec<FilterOption>,
    pub species: Vec<FilterOption>,
    pub phenotypes: Vec<FilterOption>,
    pub apinatomies: Vec<FilterOption>,
    pub vias: Vec<FilterOption>,
    pub entities: Vec<FilterOption>,
}

impl FilterValues {
    ///Derive the options from the filtered statements and the visible axes.
    pub fn new(
        statements: &StatementMap,
        y_axis: &[HierarchicalItem],
        x_organs: &[&Organ],
    ) -> FilterValues {
        FilterValues {
            origins: get_unique_origins(statements, y_axis),
            end_organs: get_unique_organs(x_organs),
            species: get_unique_species(statements),
            phenotypes: get_unique_phenotypes(statements),
            apinatomies: get_unique_apinatomies(statements),
            vias: get_unique_vias(statements),
            entities: get_unique_all_entities(statements, y_axis, x_organs),
        }
    }
}

fn entity_option(entity: &AnatomicalEntity) -> FilterOption {
    let mut option = FilterOption::new(&entity.id, &entity.name);
    if !entity.synonyms.is_empty() {
        option.content.push(OptionDetail {
            title: SYNONYMS_TITLE.to_string(),
            value: entity.synonyms.clone(),
        });
    }
    option
}

//one option per id; a later entity replaces an earlier one in place
fn unique_options<'a, I>(entities: I) -> Vec<FilterOption>
where
    I: IntoIterator<Item = &'a AnatomicalEntity>,
{
    let mut unique: IndexMap<String, &AnatomicalEntity> = IndexMap::new();
    for entity in entities {
        unique.insert(entity.id.clone(), entity);
    }
    unique.values().map(|entity| entity_option(entity)).collect()
}

fn sort_by_name(entities: &mut [AnatomicalEntity]) {
    entities.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}

///Every node of the tree, keyed by the entity id its path ends in.
fn get_all_nodes(items: &[HierarchicalItem]) -> Vec<AnatomicalEntity> {
    let mut nodes: IndexMap<String, AnatomicalEntity> = IndexMap::new();
    let mut stack: Vec<&HierarchicalItem> = items.iter().rev().collect();
    while let Some(item) = stack.pop() {
        let base_id = get_node_id_from_path(&item.id);
        nodes
            .entry(base_id.to_string())
            .or_insert_with(|| AnatomicalEntity::new(base_id, &item.label));
        stack.extend(item.children.iter().rev());
    }
    nodes.into_values().collect()
}

pub fn get_unique_origins(
    statements: &StatementMap,
    y_axis: &[HierarchicalItem],
) -> Vec<FilterOption> {
    let mut origins: Vec<AnatomicalEntity> = statements
        .values()
        .flat_map(|ks| ks.origins.iter().cloned())
        .collect();
    sort_by_name(&mut origins);
    origins.extend(get_all_nodes(y_axis));
    unique_options(origins.iter())
}

pub fn get_unique_vias(statements: &StatementMap) -> Vec<FilterOption> {
    let mut vias: Vec<AnatomicalEntity> = statements
        .values()
        .flat_map(|ks| ks.via_entities().cloned())
        .collect();
    sort_by_name(&mut vias);
    unique_options(vias.iter())
}

///Origins, vias, destinations, end organs (suffixed ` (End Organ)`) and the nodes
///of the visible tree, in one list.
pub fn get_unique_all_entities(
    statements: &StatementMap,
    y_axis: &[HierarchicalItem],
    x_organs: &[&Organ],
) -> Vec<FilterOption> {
    let mut entities: Vec<AnatomicalEntity> = Vec::new();
    for ks in statements.values() {
        entities.extend(ks.origins.iter().cloned());
        entities.extend(ks.via_entities().cloned());
        entities.extend(ks.destination_entities().cloned());
    }
    entities.extend(x_organs.iter().map(|organ| {
        AnatomicalEntity::new(&organ.id, &format!("{}{}", organ.name, END_ORGAN_SUFFIX))
    }));
    sort_by_name(&mut entities);
    entities.extend(get_all_nodes(y_axis));
    unique_options(entities.iter())
}

pub fn get_unique_species(statements: &StatementMap) -> Vec<FilterOption> {
    let mut unique: IndexMap<String, &BaseEntity> = IndexMap::new();
    for species in statements.values().flat_map(|ks| ks.species.iter()) {
        unique.insert(species.id.clone(), species);
    }
    unique
        .values()
        .map(|species| FilterOption::new(&species.id, &species.name))
        .collect()
}

pub fn get_unique_organs(x_organs: &[&Organ]) -> Vec<FilterOption> {
    x_organs
        .iter()
        .map(|organ| FilterOption::new(&organ.id, &organ.name))
        .collect()
}

fn name_options(names: IndexSet<&str>) -> Vec<FilterOption> {
    names.into_iter().map(|x| FilterOption::new(x, x)).collect()
}

pub fn get_unique_apinatomies(statements: &StatementMap) -> Vec<FilterOption> {
    name_options(
        statements
            .values()
            .map(|ks| ks.apinatomy.as_str())
            .filter(|x| !x.is_empty())
            .collect(),
    )
}

pub fn get_unique_phenotypes(statements: &StatementMap) -> Vec<FilterOption> {
    name_options(
        statements
            .values()
            .map(|ks| ks.phenotype.as_str())
            .filter(|x| !x.is_empty())
            .collect(),
    )
}

///Options for the nerve filter of the secondary view.
pub fn get_nerve_options(nerves: &IndexMap<String, String>) -> Vec<FilterOption> {
    nerves
        .iter()
        .map(|(id, name)| FilterOption::new(id, name))
        .collect()
}
