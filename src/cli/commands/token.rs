use clap::Subcommand;
use serde_json::json;

use crate::auth::token::{generate_token, hash_token};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Print the stored digest of a raw token")]
    Hash {
        #[arg(help = "Raw token as sent in email links")]
        token: String,
    },

    #[command(about = "Generate a random token and its digest")]
    Generate,
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Hash { token } => {
            let digest = hash_token(token.trim());
            output_success(&output_format, "Token digest", Some(json!({ "hash": digest })))
        }
        TokenCommands::Generate => {
            let token = generate_token();
            let digest = hash_token(&token);
            output_success(
                &output_format,
                "Token generated",
                Some(json!({ "token": token, "hash": digest })),
            )
        }
    }
}
