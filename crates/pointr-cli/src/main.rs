use anyhow::{bail, Context};
use clap::Parser;
use pointr_core::{
    CategoryRegistry, Config, ContactFilters, DataTable, ExportFormat, FilterCriteria,
    JsonFileSource, SortDirection, SourcePalette,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pointr")]
#[command(version, about = "Browse, filter and export map business data", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/pointr/config.toml)
    #[arg(long, global = true, env = "POINTR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Filter, sort and print or export a JSON file of records
    Table {
        /// JSON array of records
        records: PathBuf,

        /// Case-insensitive text search across all columns
        #[arg(short, long)]
        search: Option<String>,

        /// Keep only these categories (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        #[arg(long)]
        has_phone: bool,

        #[arg(long)]
        has_email: bool,

        #[arg(long)]
        has_website: bool,

        /// Column id to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Write the visible rows instead of printing (.csv or .json). A
        /// directory or no value uses the configured default filename.
        #[arg(short, long, num_args = 0..=1, value_name = "PATH")]
        export: Option<Option<PathBuf>>,
    },
    /// Show the category legend
    Categories {
        /// Also print every type tag with its map color
        #[arg(long)]
        table: bool,
    },
    /// Show the marker color each data source gets
    Sources {
        /// Source ids, in the order they'd be seen
        ids: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pointr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    match cli.command {
        Some(Commands::Table {
            records,
            search,
            categories,
            has_phone,
            has_email,
            has_website,
            sort,
            desc,
            export,
        }) => {
            let mut criteria = FilterCriteria::default()
                .search(search.unwrap_or_default())
                .categories(categories)
                .contacts(ContactFilters {
                    has_phone,
                    has_email,
                    has_website,
                });
            if let Some(column) = sort {
                let direction = if desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                criteria = criteria.sort_by(column, direction);
            }

            run_table(&config, records, &criteria, export)?;
        }
        Some(Commands::Categories { table }) => print_categories(table),
        Some(Commands::Sources { ids }) => {
            let palette = SourcePalette::new();
            for id in &ids {
                println!("{:<24} {}", id, palette.assign(Some(id.as_str())));
            }
        }
        None => {
            println!("No command specified. Try --help");
        }
    }

    Ok(())
}

fn run_table(
    config: &Config,
    records: PathBuf,
    criteria: &FilterCriteria,
    export: Option<Option<PathBuf>>,
) -> anyhow::Result<()> {
    let pipeline = config.pipeline().context("Invalid table configuration")?;

    if let Some(categories) = pipeline.category_config() {
        let registry = &categories.registry;
        for name in &criteria.selected_categories {
            if registry.get(name).is_none() {
                bail!(
                    "Unknown category '{}'. Known categories: {}",
                    name,
                    registry.names().join(", ")
                );
            }
        }
    }

    let source = JsonFileSource::new(&records);
    let table = DataTable::load(&source, pipeline)
        .with_context(|| format!("Failed to load records from {}", records.display()))?;
    tracing::info!("Showing table for {}", records.display());

    if let Some(target) = export {
        let path = config.export.resolve_path(target.as_deref())?;
        let format = ExportFormat::from_path(&path)
            .map(Ok)
            .unwrap_or_else(|| config.export.format())?;
        let filename = path.file_name().and_then(|n| n.to_str());

        match table.export(criteria, format, filename)? {
            Some(payload) => {
                payload
                    .write_to(&path)
                    .with_context(|| format!("Failed to export to {}", path.display()))?;
                println!(
                    "Exported {} rows as {} to {}",
                    table.view(criteria).len(),
                    payload.mime_type(),
                    path.display()
                );
            }
            None => eprintln!("No data to export"),
        }
        return Ok(());
    }

    let headers: Vec<String> = table
        .pipeline()
        .columns()
        .headers()
        .into_iter()
        .map(str::to_string)
        .collect();
    let rows = table.rows(criteria);
    print_grid(&headers, &rows);
    println!("\n{} of {} records", rows.len(), table.records().len());

    Ok(())
}

fn print_grid(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(headers));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        println!("{}", line(row.as_slice()));
    }
}

fn print_categories(with_table: bool) {
    let registry = CategoryRegistry::builtin();

    for category in registry.iter() {
        println!(
            "{}  {:<20} {:>3} types  {}",
            category.color,
            category.name,
            category.types.len(),
            category.icon_id()
        );
    }

    if with_table {
        let table = registry.color_expression_table();
        println!();
        for (tag, color) in &table.entries {
            println!("{:<24} {}", tag, color);
        }
        println!("{:<24} {}", "(default)", table.default);
    }
}
