use anyhow::Context;
use chrono::Utc;
use clap::{Args, ValueEnum};
use serde_json::json;

use crate::auth::{ROLE_ADMIN, ROLE_USER};
use crate::cli::OutputFormat;
use crate::database::models::NewUser;
use crate::database::{Database, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Admins also hold the user role
    pub fn roles(self) -> Vec<String> {
        match self {
            Role::User => vec![ROLE_USER.to_string()],
            Role::Admin => vec![ROLE_ADMIN.to_string(), ROLE_USER.to_string()],
        }
    }
}

#[derive(Debug, Args)]
pub struct UseraddArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long, value_enum, default_value_t = Role::User)]
    pub role: Role,
}

pub async fn useradd(db: &Database, args: UseraddArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let new_user = NewUser {
        name: args.name,
        email: args.email,
        roles: args.role.roles(),
        password: args.password.clone(),
        password_confirm: args.password,
    };
    let user = UserRepository::new(db.pool().clone())
        .create(new_user, Utc::now())
        .await
        .context("creating user")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "user_id": user.id, "email": user.email, "roles": user.roles })
        ),
        OutputFormat::Text => println!("User created with id: {}", user.id),
    }
    Ok(())
}
