use crate::bindings::{ConnectivityRow, OrderJson};
use crate::model::{BaseEntity, Organ, OrganMap};
use crate::settings::{OTHER_X_AXIS_ID, OTHER_X_AXIS_LABEL};
use indexmap::IndexMap;

/// The end organ registry and its target system groupings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrganIndex {
    pub organs: OrganMap,
    pub target_systems: IndexMap<String, Vec<Organ>>,
    pub target_system_names: IndexMap<String, String>,
}

impl OrganIndex {
    ///Return the organs in column order.
    pub fn ordered_organs(&self) -> Vec<&Organ> {
        get_x_axis_organs(&self.organs)
    }
}

///Given an organ map, return the organs sorted by their `order`.
pub fn get_x_axis_organs(organs: &OrganMap) -> Vec<&Organ> {
    let mut sorted: Vec<&Organ> = organs.values().collect();
    sorted.sort_by_key(|organ| organ.order);
    sorted
}

///Given connectivity rows and the end organ ordering (target system id -> organ ids),
///return the organ index.
///
///Rows without a target organ put their end organ into the catch-all `OTHER_X` organ,
///which always receives the highest order.
pub fn build_organ_index(rows: &[ConnectivityRow], endorgans_order: &OrderJson) -> OrganIndex {
    let mut organs: OrganMap = IndexMap::new();
    let mut target_systems: IndexMap<String, IndexMap<String, Organ>> = IndexMap::new();
    let mut target_system_names: IndexMap<String, String> = IndexMap::new();

    organs.insert(
        OTHER_X_AXIS_ID.to_string(),
        Organ::new(OTHER_X_AXIS_ID, OTHER_X_AXIS_LABEL),
    );

    for row in rows {
        let child = match (&row.end_organ_id, &row.end_organ_name) {
            (Some(id), Some(name)) => Some(BaseEntity::new(id, name)),
            _ => None,
        };

        match (&row.target_organ_id, &row.target_organ_name) {
            (Some(organ_id), Some(organ_name)) => {
                let organ = organs
                    .entry(organ_id.clone())
                    .or_insert_with(|| Organ::new(organ_id, organ_name));
                //an organ is always one of its own destinations
                organ
                    .children
                    .entry(organ_id.clone())
                    .or_insert_with(|| BaseEntity::new(organ_id, organ_name));
                if let Some(child) = child {
                    organ.children.entry(child.id.clone()).or_insert(child);
                }

                if let (Some(system_id), Some(system_name)) =
                    (&row.target_system_id, &row.target_system_name)
                {
                    target_system_names
                        .entry(system_id.clone())
                        .or_insert_with(|| system_name.clone());
                    target_systems
                        .entry(system_id.clone())
                        .or_default()
                        .entry(organ_id.clone())
                        .or_insert_with(|| Organ::new(organ_id, organ_name));
                }
            }
            _ => {
                if let Some(child) = child {
                    if let Some(other) = organs.get_mut(OTHER_X_AXIS_ID) {
                        other.children.entry(child.id.clone()).or_insert(child);
                    }
                }
            }
        }
    }

    assign_organ_order(&mut organs, endorgans_order);

    let target_systems = target_systems
        .into_iter()
        .map(|(system_id, members)| {
            let empty = Vec::new();
            let order = endorgans_order.get(&system_id).unwrap_or(&empty);
            let mut members: Vec<Organ> = members.into_values().collect();
            members.sort_by(|a, b| {
                let index_a = order.iter().position(|x| x == &a.id);
                let index_b = order.iter().position(|x| x == &b.id);
                match (index_a, index_b) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                }
            });
            for (index, organ) in members.iter_mut().enumerate() {
                organ.order = index + 1;
            }
            (system_id, members)
        })
        .collect();

    OrganIndex {
        organs,
        target_systems,
        target_system_names,
    }
}

fn assign_organ_order(organs: &mut OrganMap, endorgans_order: &OrderJson) {
    let mut order_index = 1;

    //explicit order first, flattened over all target systems
    for organ_id in endorgans_order.values().flatten() {
        if let Some(organ) = organs.get_mut(organ_id) {
            if organ.order == 0 && organ_id != OTHER_X_AXIS_ID {
                organ.order = order_index;
                order_index += 1;
            }
        }
    }

    //then encounter order
    for (organ_id, organ) in organs.iter_mut() {
        if organ_id != OTHER_X_AXIS_ID && organ.order == 0 {
            organ.order = order_index;
            order_index += 1;
        }
    }

    if let Some(other) = organs.get_mut(OTHER_X_AXIS_ID) {
        other.order = order_index;
    }
}
