//! TBYN CLI - build per-country catalogs from CSV tables
//!
//! # Main Commands
//!
//! ```bash
//! tbyn generate --country KR       # CSV tables -> products.json, additives.json
//! tbyn generate --seed             # Same, writing seed tables for missing sources
//! tbyn init --country JP           # Only write seed tables
//! ```
//!
//! # Other Commands
//!
//! ```bash
//! tbyn parse data/KR/ingredients.csv               # Load a table, print records as JSON
//! tbyn validate data/KR/additives.json -e additives  # Check an artifact against its schema
//! tbyn collect --country KR                        # Print the image download plan
//! tbyn lookup product jinro_soju                   # Status of a product
//! tbyn lookup scan "원재료: 젤라틴, E120"            # Additives mentioned in label text
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tbyn::logs::{init_logging, LogConfig, LogFormat};
use tbyn::{
    collect_images, load_table, read_artifact, run_all, seed_sources, validate_artifact,
    Catalog, CatalogConfig, CollectionPlan, CountryCode, EntityDescriptor, EntityKind,
    PlanOnly, RunOptions,
};

#[derive(Parser)]
#[command(name = "tbyn")]
#[command(
    about = "Build per-country halal classification catalogs from CSV tables",
    long_about = None
)]
struct Cli {
    /// Base data directory (default: $TBYN_DATA_DIR or ./data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormatArg,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build products.json and additives.json for each country
    Generate {
        /// Country code (repeatable; default: $TBYN_COUNTRIES or KR)
        #[arg(short, long = "country")]
        countries: Vec<CountryCode>,

        /// Write seed tables for sources that do not exist yet
        #[arg(long)]
        seed: bool,

        /// Write the run report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write seed tables for missing sources
    Init {
        /// Country code (repeatable; default: $TBYN_COUNTRIES or KR)
        #[arg(short, long = "country")]
        countries: Vec<CountryCode>,
    },

    /// Load a CSV table and output its records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an artifact against its JSON schema
    Validate {
        /// Artifact JSON file
        input: PathBuf,

        /// Entity the artifact belongs to (products or additives)
        #[arg(short, long)]
        entity: EntityKind,
    },

    /// Show the image download plan for a country
    Collect {
        /// Country code (default: first of $TBYN_COUNTRIES, or KR)
        #[arg(short, long)]
        country: Option<CountryCode>,
    },

    /// Query the published catalogs of a country
    Lookup {
        /// Country code (default: first of $TBYN_COUNTRIES, or KR)
        #[arg(short, long)]
        country: Option<CountryCode>,

        #[command(subcommand)]
        action: LookupAction,
    },
}

#[derive(Subcommand)]
enum LookupAction {
    /// Status and colour of a product
    Product {
        /// Product id
        id: String,
    },

    /// Additives mentioned in label text
    Scan {
        /// Label text (e.g. OCR output)
        text: String,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(
        &LogConfig::default()
            .with_format(cli.log_format.into())
            .with_quiet(cli.quiet),
    );

    let data_dir = cli.data_dir;
    let result = match cli.command {
        Commands::Generate {
            countries,
            seed,
            report,
        } => cmd_generate(load_config(data_dir, countries), seed, report.as_deref()),

        Commands::Init { countries } => cmd_init(&load_config(data_dir, countries)),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Validate { input, entity } => cmd_validate(&input, entity),

        Commands::Collect { country } => {
            let config = load_config(data_dir, country.into_iter().collect());
            cmd_collect(&config, &config.primary_country())
        }

        Commands::Lookup { country, action } => {
            let config = load_config(data_dir, country.into_iter().collect());
            cmd_lookup(&config, &config.primary_country(), action)
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve configuration; exits with status 2 when it is invalid.
fn load_config(data_dir: Option<PathBuf>, countries: Vec<CountryCode>) -> CatalogConfig {
    match CatalogConfig::from_env_with(countries) {
        Ok(config) => config.with_data_dir(data_dir),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn cmd_generate(
    config: CatalogConfig,
    seed: bool,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = RunOptions { seed_missing: seed };
    let reports = run_all(&config, &options);

    if let Some(path) = report_path {
        fs::write(path, serde_json::to_string_pretty(&reports)?)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    let failures: usize = reports.iter().map(|r| r.failures()).sum();
    if failures > 0 {
        return Err(format!("{} entity pipeline(s) failed", failures).into());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_init(config: &CatalogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let descriptors = EntityDescriptor::all();
    for country in &config.countries {
        let dir = config.country_dir(country);
        let seeded = seed_sources(&dir, &descriptors);
        if seeded.is_empty() {
            eprintln!("📋 {}: all source tables already exist", country);
        }
    }
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let table = load_table(input)?;
    eprintln!("   Encoding: {}", table.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(table.delimiter));
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Parsed {} records", table.len());

    let json = serde_json::to_string_pretty(&table.records())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path, entity: EntityKind) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating {} artifact: {}", entity, input.display());

    let document: Value = read_artifact(input)?;
    let count = match &document {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    };

    validate_artifact(entity, &document)?;
    eprintln!("✅ {} records valid", count);
    Ok(())
}

fn cmd_collect(
    config: &CatalogConfig,
    country: &CountryCode,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = CollectionPlan::for_country(config, country);
    collect_images(&plan, &PlanOnly);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_lookup(
    config: &CatalogConfig,
    country: &CountryCode,
    action: LookupAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::load(&config.country_dir(country))?;

    match action {
        LookupAction::Product { id } => {
            let verdict = catalog.product_status(&id);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        LookupAction::Scan { text } => {
            if catalog.additives.is_empty() {
                eprintln!("⚠️  No additives catalog for {}", country);
            }
            let matches = catalog.scan_text(&text);
            let risky = matches.iter().filter(|m| m.is_risky()).count();
            eprintln!("🔎 {} match(es), {} need attention", matches.len(), risky);
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
    }

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
