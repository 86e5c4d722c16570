use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use relbench::config::{BenchConfig, CliOverrides};
use relbench::harness::{seed, BenchReport, BenchRunner, Strategy};
use relbench::model_catalog::ModelCatalog;
use relbench::query_builder::Literal;
use relbench::relation_translator::{
    parse_relation_key, ModelQuery, RelationFilter, RelationPath,
};

/// relbench - benchmark ORM relation query strategies on SQLite
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed a database and time every strategy
    Run(RunArgs),
    /// Print the SQL each strategy generates for a relation path
    Sql(SqlArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// YAML benchmark configuration (defaults come from RELBENCH_* variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long)]
    database: Option<String>,

    /// Model catalog YAML (built-in benchmark catalog by default)
    #[arg(long)]
    schema: Option<String>,

    #[arg(long)]
    catalogs: Option<u32>,

    #[arg(long)]
    items: Option<u32>,

    #[arg(long)]
    iterations: Option<u32>,

    /// Sub-item name every round filters on
    #[arg(long)]
    probe_name: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    /// Benchmark an already seeded database
    #[arg(long)]
    skip_seed: bool,

    /// Strategies to run (all by default)
    #[arg(long, value_enum)]
    strategy: Vec<Strategy>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(clap::Args)]
struct SqlArgs {
    /// Dotted relation path, e.g. `catalogs.left@subItems`
    #[arg(long)]
    path: String,

    /// Root model
    #[arg(long, default_value = "Item")]
    model: String,

    /// Model catalog YAML (built-in benchmark catalog by default)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Equality filter for one hop, `relation:table.column=value`
    #[arg(long = "filter")]
    filters: Vec<String>,

    #[arg(long, value_enum)]
    strategy: Vec<Strategy>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl From<&RunArgs> for CliOverrides {
    fn from(args: &RunArgs) -> Self {
        CliOverrides {
            database: args.database.clone(),
            schema_path: args.schema.clone(),
            catalogs: args.catalogs,
            items: args.items,
            iterations: args.iterations,
            probe_name: args.probe_name.clone(),
            seed: args.seed,
            skip_seed: args.skip_seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Sql(args) => print_sql(args),
    }
}

fn load_catalog(schema: Option<&std::path::Path>) -> anyhow::Result<ModelCatalog> {
    match schema {
        Some(path) => ModelCatalog::from_yaml_file(path)
            .with_context(|| format!("loading model catalog {}", path.display())),
        None => Ok(ModelCatalog::benchmark()?),
    }
}

fn selected(strategies: &[Strategy]) -> Vec<Strategy> {
    if strategies.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        strategies.to_vec()
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let base = match &args.config {
        Some(path) => BenchConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => BenchConfig::from_env()?,
    };
    let config = base.with_overrides(CliOverrides::from(&args))?;
    let catalog = load_catalog(config.schema_path.as_deref().map(std::path::Path::new))?;

    let mut conn = rusqlite::Connection::open(&config.database)
        .with_context(|| format!("opening database {}", config.database))?;
    let mut report = BenchReport::new(catalog.name.clone(), config.database.clone());
    if config.skip_seed {
        log::info!("Skipping seed; using existing data in {}", config.database);
    } else {
        report.seeded = Some(seed(&mut conn, &config.seed_options())?);
    }

    let runner = BenchRunner::new(&conn, &catalog, config.probe_name.clone());
    report.timings = runner.run_all(&selected(&args.strategy), config.iterations)?;

    match args.format {
        OutputFormat::Table => print!("{}", report.render_table()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn print_sql(args: SqlArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.schema.as_deref())?;
    let filters = parse_filters(&args.filters)?;

    let path: RelationPath = args
        .path
        .split('.')
        .filter(|segment| !segment.is_empty())
        .fold(RelationPath::new(), |path, key| {
            let name = parse_relation_key(key, None).name;
            path.entry(key, filters.get(&name).cloned())
        });

    for strategy in selected(&args.strategy) {
        let mut query = ModelQuery::new(&catalog, &args.model)?;
        match strategy {
            Strategy::Exists => {
                query.where_has(path.clone())?;
            }
            Strategy::Subquery => {
                query.where_related_to(path.clone())?;
            }
            Strategy::Join => {
                query.join_relation(path.clone())?.select_root_distinct();
            }
        }
        println!("-- {}\n{};\n", strategy, query.to_sql());
    }
    Ok(())
}

/// `relation:table.column=value`; integers stay integers.
fn parse_filters(raw: &[String]) -> anyhow::Result<HashMap<String, RelationFilter>> {
    let mut filters = HashMap::new();
    for spec in raw {
        let Some((relation, condition)) = spec.split_once(':') else {
            bail!("filter '{}' must look like relation:column=value", spec);
        };
        let Some((column, value)) = condition.split_once('=') else {
            bail!("filter '{}' must look like relation:column=value", spec);
        };
        let value = match value.parse::<i64>() {
            Ok(number) => Literal::Integer(number),
            Err(_) => Literal::String(value.to_string()),
        };
        filters.insert(
            relation.to_string(),
            RelationFilter::equals(column.to_string(), value),
        );
    }
    Ok(filters)
}
