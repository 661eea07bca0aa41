use anyhow::Context;
use clap::{arg, command, value_parser, ArgMatches, Command};
use sckanner::config::{config, get_config, init, CONFIG_FILE};
use sckanner::error::SckannerError;
use sckanner::explorer::{Explorer, HeatmapMode, PrimaryView, SecondaryView, ViewState};
use sckanner::export::write_csv;
use sckanner::fetch::Fetcher;
use sckanner::filter_values::FilterValues;
use sckanner::filters::{FilterOption, Filters, SummaryFilters};
use std::fs::File;
use std::io::Write;
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;

fn tabulate(rows_with_header: &str) -> Result<String, SckannerError> {
    //format using elastic tabstops
    let mut tw = TabWriter::new(vec![]);
    write!(&mut tw, "{}", rows_with_header)?;
    tw.flush()?;
    let bytes = tw
        .into_inner()
        .map_err(|e| SckannerError::GeneralError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SckannerError::GeneralError(e.to_string()))
}

fn format_heatmap_stdout(view: &PrimaryView) -> Result<String, SckannerError> {
    let mut text = String::from("origin");
    for organ in &view.x_organs {
        text.push_str(&format!("\t{}", organ.name));
    }
    text.push('\n');

    let counts = match &view.synaptic {
        Some(synaptic) => &synaptic.matrix,
        None => &view.heatmap.matrix,
    };
    for (label, row) in view.heatmap.detailed.iter().zip(counts.iter()) {
        text.push_str(&label.label);
        for count in row {
            text.push_str(&format!("\t{}", count));
        }
        text.push('\n');
    }
    tabulate(&text)
}

fn format_summary_stdout(view: &SecondaryView) -> Result<String, SckannerError> {
    let mut text = format!(
        "connections\t{}\nvias\t{}\nphenotypes\t{}\n\norigin",
        view.connection_count,
        view.vias,
        view.phenotypes.join(", ")
    );
    for destination in &view.x_axis {
        text.push_str(&format!("\t{}", destination));
    }
    text.push('\n');

    for (label, row) in view.y_labels.labels.iter().zip(view.heatmap.data.iter()) {
        text.push_str(label);
        for cell in row {
            let cell_text = cell
                .iter()
                .map(|(phenotype, ids)| format!("{}: {}", phenotype, ids.len()))
                .collect::<Vec<String>>()
                .join(", ");
            let cell_text = if cell_text.is_empty() {
                "-"
            } else {
                cell_text.as_str()
            };
            text.push_str(&format!("\t{}", cell_text));
        }
        text.push('\n');
    }
    tabulate(&text)
}

fn format_filters_stdout(values: &FilterValues) -> Result<String, SckannerError> {
    let dimensions: [(&str, &Vec<FilterOption>); 7] = [
        ("origin", &values.origins),
        ("end organ", &values.end_organs),
        ("species", &values.species),
        ("phenotype", &values.phenotypes),
        ("apinatomy", &values.apinatomies),
        ("via", &values.vias),
        ("entities", &values.entities),
    ];
    let mut text = String::from("filter\tid\tlabel\n");
    for (dimension, options) in dimensions {
        for option in options {
            text.push_str(&format!("{}\t{}\t{}\n", dimension, option.id, option.label));
        }
    }
    tabulate(&text)
}

fn options(sub_matches: &ArgMatches, name: &str) -> Vec<FilterOption> {
    sub_matches
        .get_many::<String>(name)
        .map(|values| values.map(|x| FilterOption::new(x, x)).collect())
        .unwrap_or_default()
}

fn view_state(sub_matches: &ArgMatches) -> ViewState {
    ViewState {
        filters: Filters {
            origin: options(sub_matches, "origin"),
            end_organ: options(sub_matches, "end-organ"),
            phenotype: options(sub_matches, "phenotype"),
            ..Default::default()
        },
        summary_filters: SummaryFilters {
            nerve: options(sub_matches, "nerve"),
            ..Default::default()
        },
        expanded_ids: sub_matches
            .get_many::<String>("expand")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        mode: if sub_matches.get_flag("synaptic") {
            HeatmapMode::Synaptic
        } else {
            HeatmapMode::Default
        },
    }
}

async fn load_explorer(sub_matches: &ArgMatches) -> anyhow::Result<Explorer> {
    let config = get_config(CONFIG_FILE)
        .with_context(|| format!("Failed to read {}", CONFIG_FILE))?;
    let fetcher = Fetcher::new(config.sources);
    let dataset = sub_matches.get_one::<String>("dataset").map(|x| x.as_str());
    let (explorer, warnings) = Explorer::load(&fetcher, dataset)
        .await
        .context("Failed to load SCKAN data")?;
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(explorer)
}

async fn heatmap(sub_matches: &ArgMatches) -> anyhow::Result<String> {
    let explorer = load_explorer(sub_matches).await?;
    let view = explorer.primary_view(&view_state(sub_matches));
    Ok(format_heatmap_stdout(&view)?)
}

async fn summary(sub_matches: &ArgMatches) -> anyhow::Result<String> {
    let explorer = load_explorer(sub_matches).await?;
    let state = view_state(sub_matches);
    let row = sub_matches.get_one::<String>("row").context("No row given")?;
    let organ = sub_matches.get_one::<String>("organ").context("No organ given")?;

    //the row must be on screen, so expand every ancestor of it
    let mut expanded = state.clone();
    let parts: Vec<&str> = row.split('#').collect();
    for end in 1..parts.len() {
        expanded = expanded.with_expanded(&parts[..end].join("#"));
    }
    let primary = explorer.primary_view(&expanded);
    let summary = explorer
        .select_cell(&expanded, &primary, row, organ)
        .with_context(|| format!("No heatmap cell for {} and {}", row, organ))?;
    Ok(format_summary_stdout(&explorer.secondary_view(&summary, &state))?)
}

async fn filters(sub_matches: &ArgMatches) -> anyhow::Result<String> {
    let explorer = load_explorer(sub_matches).await?;
    Ok(format_filters_stdout(
        &explorer.filter_values(&view_state(sub_matches)),
    )?)
}

async fn export(sub_matches: &ArgMatches) -> anyhow::Result<String> {
    let explorer = load_explorer(sub_matches).await?;
    let out = sub_matches
        .get_one::<String>("out")
        .context("No output file given")?;
    let statements = explorer.filtered_statements(&view_state(sub_matches));
    let file = File::create(out).with_context(|| format!("Failed to create {}", out))?;
    write_csv(&statements, file).with_context(|| format!("Failed to write {}", out))?;
    Ok(format!("Exported {} knowledge statements to {}", statements.len(), out))
}

fn view_args(command: Command) -> Command {
    command
        .arg(arg!(--dataset <ID> "Datasnapshot id").value_parser(value_parser!(String)))
        .arg(arg!(--expand <ID> ... "Expand a hierarchy node").value_parser(value_parser!(String)))
        .arg(arg!(--phenotype <NAME> ... "Filter by phenotype").value_parser(value_parser!(String)))
        .arg(arg!(--origin <ID> ... "Filter by origin").value_parser(value_parser!(String)))
        .arg(
            arg!(--"end-organ" <ID> ... "Filter by end organ")
                .value_parser(value_parser!(String)),
        )
        .arg(arg!(--nerve <ID> ... "Filter by nerve").value_parser(value_parser!(String)))
        .arg(arg!(--synaptic "Include synaptic connections"))
}

fn init_tracing() {
    let level = get_config(CONFIG_FILE)
        .map(|c| c.debug.directive())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let matches = command!() // requires `cargo` feature
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("init").about("Writes a starter sckanner.toml"))
        .subcommand(Command::new("config").about("Prints the merged configuration"))
        .subcommand(view_args(
            Command::new("heatmap").about("Prints the connectivity heatmap"),
        ))
        .subcommand(view_args(
            Command::new("summary")
                .about("Prints the per-phenotype heatmap of one cell")
                .arg(arg!(--row <ID> "Hierarchy node id").required(true))
                .arg(arg!(--organ <ID> "End organ id").required(true)),
        ))
        .subcommand(view_args(
            Command::new("filters").about("Lists the available filter options"),
        ))
        .subcommand(view_args(
            Command::new("export")
                .about("Exports the filtered knowledge statements as CSV")
                .arg(arg!(--out <FILE> "Output file").required(true)),
        ))
        .get_matches();

    init_tracing();

    let exit_result = match matches.subcommand() {
        Some(("init", _sub_matches)) => init(CONFIG_FILE).context("Failed to initialize"),
        Some(("config", _sub_matches)) => {
            config(CONFIG_FILE).with_context(|| format!("Failed to read {}", CONFIG_FILE))
        }
        Some(("heatmap", sub_matches)) => heatmap(sub_matches).await,
        Some(("summary", sub_matches)) => summary(sub_matches).await,
        Some(("filters", sub_matches)) => filters(sub_matches).await,
        Some(("export", sub_matches)) => export(sub_matches).await,
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    };

    //print exit message
    match exit_result {
        Err(x) => {
            println!("{:#}", x);
            std::process::exit(1)
        }

        Ok(x) => println!("{}", x),
    }
}
