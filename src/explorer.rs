use crate::axis::{
    assign_expanded_state, filter_connections_map, filter_x_axis, filter_y_axis,
    generate_y_labels_and_ids, get_non_empty_columns, get_y_axis, get_y_axis_for_node,
    AxisLabels, ColumnMapping, HierarchicalItem,
};
use crate::bindings::{ConnectivityRow, OrderJson};
use crate::error::SckannerError;
use crate::fetch::{Fetcher, StartupData};
use crate::filter_values::{get_nerve_options, FilterValues};
use crate::filters::{
    filter_knowledge_statements, restrict_vias_to_major_nerves, FilterOption, Filters,
    SummaryFilters,
};
use crate::heatmap::{
    calculate_connections, get_heatmap_data, get_min_max_connections, ConnectionsMap, HeatmapData,
};
use crate::hierarchy::{build_hierarchy, get_statement_ids};
use crate::model::{Datasnapshot, Hierarchy, KnowledgeStatement, Organ, StatementMap};
use crate::organs::{build_organ_index, OrganIndex};
use crate::statements::{build_statement_map, get_knowledge_statement_map};
use crate::summary::{
    calculate_secondary_connections, convert_via_to_string, get_all_phenotypes,
    get_all_vias_from_connections, get_destinations, get_nerve_filters,
    get_secondary_heatmap_data, merge_destinations, reorder_x_axis, sort_heatmap_data,
    ConnectionSummary, SortedResults,
};
use crate::synaptic::{calculate_synaptic_connections, SynapticData};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatmapMode {
    #[default]
    Default,
    Synaptic,
}

/// Everything the user has chosen on screen. Views are derived from it, never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub filters: Filters,
    pub summary_filters: SummaryFilters,
    pub expanded_ids: HashSet<String>,
    pub mode: HeatmapMode,
}

impl ViewState {
    pub fn with_filters(&self, filters: Filters) -> ViewState {
        ViewState {
            filters,
            ..self.clone()
        }
    }

    pub fn with_expanded(&self, node_id: &str) -> ViewState {
        let mut expanded_ids = self.expanded_ids.clone();
        expanded_ids.insert(node_id.to_string());
        ViewState {
            expanded_ids,
            ..self.clone()
        }
    }

    pub fn with_collapsed(&self, node_id: &str) -> ViewState {
        let mut expanded_ids = self.expanded_ids.clone();
        expanded_ids.remove(node_id);
        ViewState {
            expanded_ids,
            ..self.clone()
        }
    }
}

/// The primary heatmap as it would be rendered.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PrimaryView {
    pub y_axis: Vec<HierarchicalItem>,
    pub y_labels: AxisLabels,
    pub x_organs: Vec<Organ>,
    pub heatmap: HeatmapData,
    pub connections: ConnectionsMap,
    pub min_max: Option<(usize, usize)>,
    #[serde(skip)]
    pub columns: ColumnMapping,
    pub synaptic: Option<SynapticData>,
}

/// The per-phenotype heatmap of a selected cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SecondaryView {
    pub x_axis: Vec<String>,
    pub y_labels: AxisLabels,
    pub heatmap: SortedResults,
    pub phenotypes: Vec<String>,
    pub vias: String,
    pub nerves: Vec<FilterOption>,
    pub connection_count: usize,
}

///Check a requested dataset id against the available ones.
///
///Returns the id to use and the warnings to surface: an unknown id falls back to
///the first available dataset.
pub fn validate_datasnapshot_reference(
    requested: Option<&str>,
    datasnapshots: &[Datasnapshot],
) -> (Option<String>, Vec<String>) {
    let default_id = datasnapshots.first().map(|ds| ds.id.to_string());
    let mut warnings = Vec::new();

    let requested = match requested {
        Some(x) if !x.is_empty() => x,
        _ => return (default_id, warnings),
    };
    if datasnapshots.iter().any(|ds| ds.id.to_string() == requested) {
        return (Some(requested.to_string()), warnings);
    }

    let available = datasnapshots
        .iter()
        .map(|ds| ds.id.to_string())
        .collect::<Vec<String>>()
        .join(", ");
    let warning = format!(
        "Invalid data snapshot \"{}\". Available snapshots: {}",
        requested, available
    );
    tracing::warn!("{}", warning);
    warnings.push(warning);
    (default_id, warnings)
}

/// The loaded stores of one session and the views derived from them.
#[derive(Clone, Debug, Default)]
pub struct Explorer {
    pub hierarchy: Hierarchy,
    pub organ_index: OrganIndex,
    pub major_nerves: IndexSet<String>,
    pub datasnapshots: Vec<Datasnapshot>,
    pub datasnapshot_id: Option<String>,
    pub statements: StatementMap,
}

impl Explorer {
    ///Build the hierarchy and organ stores; no dataset is loaded yet.
    pub fn new(data: StartupData) -> Explorer {
        Explorer::from_parts(
            &data.rows,
            &data.order,
            &data.endorgans_order,
            data.major_nerves,
            data.datasnapshots,
        )
    }

    pub fn from_parts(
        rows: &[ConnectivityRow],
        order: &OrderJson,
        endorgans_order: &OrderJson,
        major_nerves: IndexSet<String>,
        datasnapshots: Vec<Datasnapshot>,
    ) -> Explorer {
        let hierarchy = build_hierarchy(rows, order);
        let organ_index = build_organ_index(rows, endorgans_order);
        tracing::info!(
            "built hierarchy of {} nodes and {} organs",
            hierarchy.len(),
            organ_index.organs.len()
        );
        Explorer {
            hierarchy,
            organ_index,
            major_nerves,
            datasnapshots,
            datasnapshot_id: None,
            statements: StatementMap::new(),
        }
    }

    ///Load the startup data and the statements of the requested dataset (or the first
    ///one). Returns the warnings raised while resolving the dataset.
    pub async fn load(
        fetcher: &Fetcher,
        requested_dataset: Option<&str>,
    ) -> Result<(Explorer, Vec<String>), SckannerError> {
        let data = fetcher.load_startup().await?;
        let mut explorer = Explorer::new(data);
        let (dataset, warnings) =
            validate_datasnapshot_reference(requested_dataset, &explorer.datasnapshots);
        match dataset {
            Some(id) => explorer.switch_dataset(fetcher, &id).await?,
            None => tracing::warn!("no datasnapshot available"),
        }
        Ok((explorer, warnings))
    }

    ///Replace the statement store with the given statements.
    pub fn set_statements(&mut self, datasnapshot_id: &str, statements: Vec<KnowledgeStatement>) {
        self.statements = build_statement_map(statements);
        self.datasnapshot_id = Some(datasnapshot_id.to_string());
        let dangling = self.dangling_statement_ids();
        if !dangling.is_empty() {
            tracing::debug!(
                "{} statement ids of the hierarchy are not in datasnapshot {}",
                dangling.len(),
                datasnapshot_id
            );
        }
    }

    ///Fetch the statements of another dataset. On failure the current store stays
    ///active and the error is returned.
    pub async fn switch_dataset(
        &mut self,
        fetcher: &Fetcher,
        datasnapshot_id: &str,
    ) -> Result<(), SckannerError> {
        match fetcher.fetch_knowledge_statements(datasnapshot_id).await {
            Ok(statements) => {
                self.set_statements(datasnapshot_id, statements);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to fetch knowledge statements data: {}", e);
                Err(e)
            }
        }
    }

    ///Statement ids referenced by the hierarchy that the current store lacks.
    pub fn dangling_statement_ids(&self) -> Vec<String> {
        get_statement_ids(&self.hierarchy)
            .into_iter()
            .filter(|id| !self.statements.contains_key(id))
            .collect()
    }

    pub fn filtered_statements(&self, view: &ViewState) -> StatementMap {
        filter_knowledge_statements(
            &self.statements,
            &self.hierarchy,
            &view.filters,
            &self.organ_index.organs,
        )
    }

    pub fn connections(&self, view: &ViewState) -> ConnectionsMap {
        calculate_connections(
            &self.hierarchy,
            &self.organ_index.organs,
            &self.statements,
            &view.filters,
        )
    }

    ///Derive the primary heatmap: aggregate, prune the empty rows and columns, then
    ///apply the expand state.
    pub fn primary_view(&self, view: &ViewState) -> PrimaryView {
        let connections = self.connections(view);
        let y_axis = filter_y_axis(&get_y_axis(&self.hierarchy), &connections);
        let y_axis = assign_expanded_state(&y_axis, &view.expanded_ids);

        let non_empty = get_non_empty_columns(&y_axis, &connections);
        let filtered_connections = filter_connections_map(&y_axis, &connections, &non_empty);
        let ordered = self.organ_index.ordered_organs();
        let x_organs: Vec<&Organ> = filter_x_axis(&ordered, &non_empty);

        let heatmap = get_heatmap_data(&y_axis, &filtered_connections);
        let synaptic = match view.mode {
            HeatmapMode::Synaptic => Some(calculate_synaptic_connections(
                &heatmap.detailed,
                &x_organs,
                &self.filtered_statements(view),
            )),
            HeatmapMode::Default => None,
        };

        PrimaryView {
            y_labels: generate_y_labels_and_ids(&y_axis, ""),
            x_organs: x_organs.into_iter().cloned().collect(),
            min_max: get_min_max_connections(&filtered_connections),
            columns: ColumnMapping::new(&non_empty, ordered.len()),
            heatmap,
            connections: filtered_connections,
            y_axis,
            synaptic,
        }
    }

    ///Given a rendered primary view and a cell (row node id, organ id), return the
    ///cell's statements under the active filters.
    pub fn select_cell(
        &self,
        view: &ViewState,
        primary: &PrimaryView,
        node_id: &str,
        organ_id: &str,
    ) -> Option<ConnectionSummary> {
        let column = primary.x_organs.iter().position(|o| o.id == organ_id)?;
        let end_organ = &primary.x_organs[column];

        let (ids, end_organ) = match (&primary.synaptic, view.mode) {
            (Some(synaptic), HeatmapMode::Synaptic) => {
                let row = synaptic.rows.iter().find(|r| r.id == node_id)?;
                let organs: Vec<&Organ> = primary.x_organs.iter().collect();
                (
                    row.cell_statement_ids(column),
                    merge_destinations(end_organ, &organs),
                )
            }
            _ => {
                let row = primary.connections.get(node_id)?;
                (row.get(column)?.clone(), end_organ.clone())
            }
        };

        let connections = get_knowledge_statement_map(&ids, &self.statements);
        let filtered = filter_knowledge_statements(
            &connections,
            &self.hierarchy,
            &view.filters,
            &self.organ_index.organs,
        );
        Some(ConnectionSummary {
            node_id: node_id.to_string(),
            end_organ,
            connections,
            filtered_knowledge_statements: restrict_vias_to_major_nerves(
                &filtered,
                &self.major_nerves,
            ),
        })
    }

    ///Derive the per-phenotype heatmap of a selected cell.
    pub fn secondary_view(&self, summary: &ConnectionSummary, view: &ViewState) -> SecondaryView {
        let destinations = get_destinations(summary);
        let connections = calculate_secondary_connections(
            &self.hierarchy,
            &destinations,
            &summary.filtered_knowledge_statements,
            &view.summary_filters,
            &summary.node_id,
        );
        let y_axis = assign_expanded_state(
            &get_y_axis_for_node(&summary.node_id, &self.hierarchy),
            &view.expanded_ids,
        );

        //drop empty rows and destination columns before ordering the x axis
        let y_axis = filter_y_axis(&y_axis, &connections);
        let non_empty = get_non_empty_columns(&y_axis, &connections);
        let connections = filter_connections_map(&y_axis, &connections, &non_empty);
        let rows = get_secondary_heatmap_data(&y_axis, &connections);

        let x_axis: Vec<String> = destinations
            .values()
            .enumerate()
            .filter(|(index, _)| non_empty.contains(index))
            .map(|(_, d)| d.name.clone())
            .collect();
        let mut sorted_x_axis = x_axis.clone();
        sorted_x_axis.sort();
        let reordered = reorder_x_axis(&sorted_x_axis);
        let vias = get_all_vias_from_connections(&summary.filtered_knowledge_statements);
        let via_names: Vec<String> = vias.values().cloned().collect();

        SecondaryView {
            heatmap: sort_heatmap_data(&x_axis, &reordered, &rows),
            x_axis: reordered,
            y_labels: generate_y_labels_and_ids(&y_axis, ""),
            phenotypes: get_all_phenotypes(&summary.filtered_knowledge_statements),
            vias: convert_via_to_string(&via_names),
            nerves: get_nerve_options(&get_nerve_filters(&vias, &self.major_nerves)),
            connection_count: summary.filtered_knowledge_statements.len(),
        }
    }

    ///The filter options offered for the current view.
    pub fn filter_values(&self, view: &ViewState) -> FilterValues {
        let primary = self.primary_view(view);
        let x_organs: Vec<&Organ> = primary.x_organs.iter().collect();
        FilterValues::new(&self.filtered_statements(view), &primary.y_axis, &x_organs)
    }
}
