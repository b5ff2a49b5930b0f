#[macro_use]
extern crate log;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rentmitra::{
    context::Context,
    domain::{
        entities::favorite::FavoriteId,
        services::favorites::{RefreshOutcome, ToggleOutcome},
    },
    infrastructure::config::Config,
    notifier::Snackbar,
};
use serde_json::Value;

#[derive(Parser)]
#[clap(version, about = "RentMitra favorites client")]
struct Opts {
    /// Path to config file
    #[clap(long)]
    config: Option<String>,
    #[clap(subcommand)]
    subcmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a session token
    Login {
        token: String,
        #[clap(long)]
        refresh_token: Option<String>,
    },
    Logout,
    /// Print favorited item ids
    List,
    /// Replace local favorites with the server's list
    Refresh,
    /// Renew the session with the stored refresh token
    RefreshToken,
    Toggle {
        id: FavoriteId,
    },
    Status {
        id: String,
    },
}

fn init_logger() {
    let mut builder = env_logger::Builder::new();
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        builder.parse_filters(&rust_log);
    } else if let Ok(rentmitra_log) = std::env::var("RENTMITRA_LOG") {
        builder.parse_filters(&format!("rentmitra={rentmitra_log}"));
    } else {
        builder.parse_filters("rentmitra=warn");
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logger();

    let opts: Opts = Opts::parse();
    let config = Config::open(opts.config)?;

    debug!("config: {:?}", config);

    let snackbar = Arc::new(Snackbar::new());
    let ctx = Context::new(&config, snackbar.clone())?;

    match opts.subcmd {
        Command::Login {
            token,
            refresh_token,
        } => {
            ctx.auth.login(&token, refresh_token.as_deref())?;
            match ctx.init().await {
                RefreshOutcome::Refreshed(count) => println!("logged in, {count} favorites"),
                _ => println!("logged in"),
            }
        }
        Command::Logout => {
            ctx.logout().await?;
            println!("logged out");
        }
        Command::List => {
            for id in ctx.favorites.favorite_ids() {
                println!("{id}");
            }
        }
        Command::Refresh => match ctx.init().await {
            RefreshOutcome::Refreshed(count) => println!("{count} favorites"),
            RefreshOutcome::Cleared => println!("not logged in"),
            RefreshOutcome::Failed => println!("refresh failed, keeping local favorites"),
        },
        Command::Toggle { id } => match ctx.favorites.toggle(id).await {
            ToggleOutcome::Added => println!("{id} added to favorites"),
            ToggleOutcome::Removed => println!("{id} removed from favorites"),
            ToggleOutcome::RolledBack | ToggleOutcome::LoginRequired => {}
            ToggleOutcome::AlreadyPending => println!("{id} is already being updated"),
        },
        Command::RefreshToken => {
            if ctx.auth.refresh_token().is_none() {
                println!("no refresh token stored");
            } else {
                ctx.auth.refresh().await;
                if ctx.auth.refresh_token().is_some() {
                    println!("session refreshed");
                } else {
                    println!("refresh token rejected");
                }
            }
        }
        Command::Status { id } => {
            if ctx.favorites.store().contains_value(&Value::String(id.clone())) {
                println!("{id} is a favorite");
            } else {
                println!("{id} is not a favorite");
            }
        }
    }

    if let Some(message) = snackbar.dismiss() {
        eprintln!("{message}");
    }

    Ok(())
}
