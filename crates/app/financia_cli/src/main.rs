// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use financia_core::auth::jwt::{TokenIssuer, generate_secret, resolve_jwt_secret};
use financia_core::auth::password::hash_password;

mod cli;
mod logging;

/// Shortest secret worth signing with.
const MIN_SECRET_BYTES: usize = 16;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn issuer(secret: Option<String>) -> TokenIssuer {
    let secret = secret.unwrap_or_else(resolve_jwt_secret);
    TokenIssuer::new(secret.as_bytes())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::GenSecret { bytes } => {
            if bytes < MIN_SECRET_BYTES {
                return Err(Error::Custom(format!(
                    "--bytes must be at least {MIN_SECRET_BYTES}"
                )));
            }
            println!("{}", generate_secret(bytes));
        }
        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
        }
        Commands::IssueToken { secret, user_id } => {
            println!("{}", issuer(secret).issue(&user_id)?);
        }
        Commands::VerifyToken { secret, token } => {
            let user_id = issuer(secret).verify(&token)?;
            log::info!("token valid");
            println!("{user_id}");
        }
    }

    Ok(())
}
