use clap::Subcommand;
use serde_json::json;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::superadmin;
use crate::database::DatabaseError;
use crate::email::{is_valid_email, normalize_email};

#[derive(Subcommand)]
pub enum SuperadminCommands {
    #[command(about = "Create a superadmin account")]
    Create {
        #[arg(long, help = "Login name")]
        username: String,
        #[arg(long, help = "Contact email")]
        email: String,
        #[arg(long, help = "Initial password")]
        password: String,
    },

    #[command(about = "Set a new password for an existing superadmin")]
    ResetPassword {
        #[arg(long, help = "Username or email")]
        login: String,
        #[arg(long, help = "New password")]
        password: String,
    },
}

pub async fn handle(cmd: SuperadminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SuperadminCommands::Create { username, email, password } => {
            let username = username.trim();
            if username.is_empty() {
                return Err(anyhow::anyhow!("Username must not be empty"));
            }
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                return Err(anyhow::anyhow!("'{}' is not a valid email address", email));
            }
            validate_password_strength(&password)?;

            let pool = connect().await?;
            let password_hash = hash_password(&password)?;
            let id = match superadmin::insert(&pool, username, &email, &password_hash).await {
                Ok(id) => id,
                Err(DatabaseError::Duplicate(_)) => {
                    output_error(&output_format, "Username or email already in use", Some("CONFLICT"))?;
                    return Err(anyhow::anyhow!("Superadmin '{}' already exists", username));
                }
                Err(e) => return Err(e.into()),
            };

            tracing::info!(superadmin_id = id, "Superadmin created from CLI");
            output_success(
                &output_format,
                "Superadmin created",
                Some(json!({ "id": id, "username": username, "email": email })),
            )
        }
        SuperadminCommands::ResetPassword { login, password } => {
            validate_password_strength(&password)?;

            let pool = connect().await?;
            let account = superadmin::find_by_login(&pool, login.trim())
                .await?
                .ok_or_else(|| anyhow::anyhow!("No superadmin matches '{}'", login))?;

            let password_hash = hash_password(&password)?;
            superadmin::update_password(&pool, account.id, &password_hash).await?;

            tracing::info!(superadmin_id = account.id, "Superadmin password reset from CLI");
            output_success(
                &output_format,
                "Password updated",
                Some(json!({ "id": account.id, "username": account.username })),
            )
        }
    }
}
