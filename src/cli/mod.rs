pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::config;
use crate::database::Database;

#[derive(Parser)]
#[command(name = "sales-admin")]
#[command(about = "Administrative tasks for the sales API database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending schema migrations")]
    Migrate,

    #[command(about = "Load the starter product and admin user")]
    Seed,

    #[command(about = "Create a user")]
    Useradd(commands::user::UseraddArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let db = Database::open(&config().database)?;

    let result = match cli.command {
        Commands::Migrate => commands::schema::migrate(&db, output_format).await,
        Commands::Seed => commands::schema::seed(&db, output_format).await,
        Commands::Useradd(args) => commands::user::useradd(&db, args, output_format).await,
    };

    db.close().await;
    result
}
