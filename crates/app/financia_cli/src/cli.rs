use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "financia", version, about = "Financia operator tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CLI version
    Version,

    /// Generate a random session signing secret (hex)
    GenSecret {
        /// Number of random bytes
        #[arg(long, default_value_t = 32)]
        bytes: usize,
    },

    /// Hash a password with the same settings the server uses
    HashPassword {
        password: String,
    },

    /// Issue a session token for a user id
    IssueToken {
        /// Signing secret; falls back to JWT_SECRET or the persisted secret
        #[arg(long)]
        secret: Option<String>,
        user_id: String,
    },

    /// Verify a session token and print its subject
    VerifyToken {
        /// Signing secret; falls back to JWT_SECRET or the persisted secret
        #[arg(long)]
        secret: Option<String>,
        token: String,
    },
}
