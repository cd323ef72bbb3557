//! influxql CLI
//!
//! Command-line interface for rendering InfluxQL statements:
//! - Render a query document as a select or continuous query
//! - Print administrative statements
//! - Generate the default config file

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use influxql_builder::admin::{self, RetentionPolicy, RetentionPolicyUpdate};
use influxql_builder::config::{generate_default_config, Config, LoggingConfig};
use influxql_builder::QueryDocument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "influxql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build InfluxQL statements from query documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a TOML or JSON query document
    Render {
        /// Path to the query document
        file: PathBuf,
        /// Wrap the select in a continuous query
        #[arg(long)]
        cq: bool,
    },

    /// Print an administrative statement
    Admin {
        #[command(subcommand)]
        statement: AdminCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    CreateDatabase {
        name: String,
        #[arg(long)]
        if_not_exists: bool,
    },
    DropDatabase {
        name: String,
    },
    ShowDatabases,
    ShowRetentionPolicies {
        database: String,
    },
    ShowMeasurements,
    ShowTagKeys {
        #[arg(long)]
        from: Option<String>,
    },
    ShowFieldKeys {
        #[arg(long)]
        from: Option<String>,
    },
    ShowSeries {
        #[arg(long)]
        from: Option<String>,
    },
    ShowContinuousQueries,
    DropContinuousQuery {
        name: String,
        database: String,
    },
    CreateRetentionPolicy {
        name: String,
        database: String,
        duration: String,
        #[arg(long, default_value = "1")]
        replication: u32,
        #[arg(long)]
        shard_duration: Option<String>,
        #[arg(long)]
        default: bool,
    },
    DropRetentionPolicy {
        name: String,
        database: String,
    },
    AlterRetentionPolicy {
        name: String,
        database: String,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long)]
        replication: Option<u32>,
        #[arg(long)]
        shard_duration: Option<String>,
        #[arg(long)]
        default: bool,
    },
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("influxql_builder={}", logging.level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn admin_statement(command: AdminCommand) -> String {
    match command {
        AdminCommand::CreateDatabase {
            name,
            if_not_exists,
        } => {
            if if_not_exists {
                admin::create_database_if_not_exists(&name)
            } else {
                admin::create_database(&name)
            }
        }
        AdminCommand::DropDatabase { name } => admin::drop_database(&name),
        AdminCommand::ShowDatabases => admin::show_databases(),
        AdminCommand::ShowRetentionPolicies { database } => {
            admin::show_retention_policies(&database)
        }
        AdminCommand::ShowMeasurements => admin::show_measurements(),
        AdminCommand::ShowTagKeys { from } => admin::show_tag_keys(from.as_deref()),
        AdminCommand::ShowFieldKeys { from } => admin::show_field_keys(from.as_deref()),
        AdminCommand::ShowSeries { from } => admin::show_series(from.as_deref()),
        AdminCommand::ShowContinuousQueries => admin::show_continuous_queries(),
        AdminCommand::DropContinuousQuery { name, database } => {
            admin::drop_continuous_query(&name, &database)
        }
        AdminCommand::CreateRetentionPolicy {
            name,
            database,
            duration,
            replication,
            shard_duration,
            default,
        } => {
            let mut policy = RetentionPolicy::new(name, database, duration)
                .replication(replication)
                .default_policy(default);
            if let Some(shard) = shard_duration {
                policy = policy.shard_duration(shard);
            }
            admin::create_retention_policy(&policy)
        }
        AdminCommand::DropRetentionPolicy { name, database } => {
            admin::drop_retention_policy(&name, &database)
        }
        AdminCommand::AlterRetentionPolicy {
            name,
            database,
            duration,
            replication,
            shard_duration,
            default,
        } => {
            let update = RetentionPolicyUpdate {
                name,
                database,
                duration,
                replication,
                shard_duration,
                default,
            };
            admin::alter_retention_policy(&update)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Render { file, cq } => {
            let document = QueryDocument::load(&file)
                .with_context(|| format!("reading query document {:?}", file))?;
            let query = document.to_query(&config.defaults)?;
            tracing::info!(file = ?file, mode = ?query.mode(), "Rendering query document");

            if cq {
                if query.into_measurement().is_none() {
                    tracing::warn!("Continuous query has no into target");
                }
                println!("{}", query.to_cq());
            } else {
                println!("{}", query.to_select());
            }
        }

        Commands::Admin { statement } => {
            println!("{}", admin_statement(statement));
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}
