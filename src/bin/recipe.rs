//! recipe: compile transform recipes to SQL
//!
//! # Usage
//!
//! ```bash
//! # Print the SQL for a stored recipe
//! recipe compile orders.json --dialect mysql --limit 100
//!
//! # Row count query
//! recipe compile orders.json --count
//!
//! # Walk through the steps
//! recipe explain orders.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use recipe_sql::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recipe")]
#[command(version)]
#[command(about = "Compile transform recipes into dialect-correct SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    recipe compile orders.json
    recipe compile orders.json --dialect sqlite --limit 10 --offset 20
    recipe compile orders.json --columns id,name,amount --format json
    recipe check-expr 'price * qty'")]
struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./recipe.toml, then the user config dir)
    #[arg(long, global = true, env = "RECIPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Sql,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a recipe file to SQL
    Compile {
        /// Recipe JSON file
        file: PathBuf,

        /// Target dialect (postgres, mysql, sqlite)
        #[arg(short, long)]
        dialect: Option<Dialect>,

        /// Caller pagination limit
        #[arg(short, long)]
        limit: Option<u64>,

        /// Caller pagination offset
        #[arg(short, long)]
        offset: Option<u64>,

        /// Known source columns, used to expand wildcard selections
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Emit the row-count query instead
        #[arg(long)]
        count: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "sql")]
        format: OutputFormat,
    },
    /// Show each step of a recipe and the SQL it compiles to
    Explain {
        /// Recipe JSON file
        file: PathBuf,

        /// Target dialect (postgres, mysql, sqlite)
        #[arg(short, long)]
        dialect: Option<Dialect>,
    },
    /// Check a calculated-column expression against the screening rules
    CheckExpr {
        /// The expression to check
        expression: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Compile {
            file,
            dialect,
            limit,
            offset,
            columns,
            count,
            format,
        } => {
            let config = CompilerConfig::load(cli.config.as_deref())?;
            let recipe = load_recipe(file, &config)?;
            let dialect = dialect.unwrap_or_else(|| recipe.dialect_or(config.dialect));

            let sql = if *count {
                recipe.to_count_sql(dialect)?
            } else {
                let known = (!columns.is_empty()).then_some(columns.as_slice());
                recipe.to_sql_with(dialect, limit.or(config.default_limit), *offset, known)?
            };

            match format {
                OutputFormat::Sql => println!("{}", sql),
                OutputFormat::Json => {
                    let out = serde_json::json!({
                        "dialect": dialect.name(),
                        "sql": sql,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
            Ok(())
        }
        Commands::Explain { file, dialect } => {
            let config = CompilerConfig::load(cli.config.as_deref())?;
            let recipe = load_recipe(file, &config)?;
            let dialect = dialect.unwrap_or_else(|| recipe.dialect_or(config.dialect));
            explain(&recipe, dialect)
        }
        Commands::CheckExpr { expression } => {
            check_expression(expression);
            Ok(())
        }
    }
}

/// Read a recipe file; a missing `source_schema` falls back to the config's.
fn load_recipe(path: &Path, config: &CompilerConfig) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut doc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if let Some(obj) = doc.as_object_mut() {
        obj.entry("source_schema")
            .or_insert_with(|| config.default_schema.clone().into());
    }

    let recipe: Recipe = serde_json::from_value(doc)
        .with_context(|| format!("{} is not a valid recipe", path.display()))?;
    Ok(recipe)
}

fn explain(recipe: &Recipe, dialect: Dialect) -> Result<()> {
    println!("{}", "Recipe Explanation".cyan().bold());
    println!();
    println!(
        "  {} {}.{}",
        "Source:".dimmed(),
        recipe.source_schema.white(),
        recipe.source_table.white()
    );
    println!("  {} {}", "Dialect:".dimmed(), dialect.to_string().cyan());

    if recipe.steps.is_empty() {
        println!("  {}", "(no steps)".dimmed());
    } else {
        println!("  {}", "Steps:".dimmed());
        for (i, step) in recipe.steps.iter().enumerate() {
            println!("    {:>2}. {}", i, step.kind().cyan());
        }
    }

    println!();
    let sql = recipe.to_sql_with(dialect, None, None, None)?;
    println!("{}", "Generated SQL:".green().bold());
    println!("  {}", sql.white());
    Ok(())
}

fn check_expression(expression: &str) {
    match validate_expression(expression) {
        Ok(accepted) => println!("{} {}", "✓".green(), accepted.white()),
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            std::process::exit(2);
        }
    }
}
