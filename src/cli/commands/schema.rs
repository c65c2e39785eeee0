use serde_json::json;

use crate::cli::OutputFormat;
use crate::database::{seed as seed_data, Database};

pub async fn migrate(db: &Database, output_format: OutputFormat) -> anyhow::Result<()> {
    db.migrate().await?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "migrations": "complete" })),
        OutputFormat::Text => println!("Migrations complete"),
    }
    Ok(())
}

pub async fn seed(db: &Database, output_format: OutputFormat) -> anyhow::Result<()> {
    seed_data::seed(db).await?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "seed": "complete", "admin_email": seed_data::SEED_ADMIN_EMAIL })
        ),
        OutputFormat::Text => println!(
            "Seed data complete (admin login: {})",
            seed_data::SEED_ADMIN_EMAIL
        ),
    }
    Ok(())
}
