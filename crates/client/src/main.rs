//! Admin console client CLI.
//!
//! Usage:
//!   admin-client login --username admin
//!   admin-client menus
//!   admin-client open /system/users
//!   admin-client logout

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use admin_client::api::ApiClient;
use admin_client::config::Config;
use admin_client::menu::MenuNode;
use admin_client::router::{LOGIN, MAIN};
use admin_client::session::Session;
use admin_client::storage::FileStore;
use admin_client::token::TokenStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides ADMIN_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Token storage file (overrides ADMIN_STORAGE_PATH).
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token.
    Login {
        #[arg(long, short)]
        username: String,

        /// Read from stdin when omitted.
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Forget the stored token.
    Logout,
    /// Ask the backend whether the stored token is valid.
    Verify,
    /// Show the logged-in user's profile.
    Whoami,
    /// Print the menu tree.
    Menus {
        /// Include entries hidden from navigation.
        #[arg(long)]
        all: bool,
    },
    /// Print the route table.
    Routes,
    /// Navigate to a route name or path and print where it lands.
    Open { target: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(url) = args.api_url {
        config.api_url = url;
    }
    if let Some(path) = args.storage {
        config.storage_path = path;
    }
    info!(api_url = %config.api_url, storage = %config.storage_path.display(), "configuration loaded");

    let tokens = TokenStore::new(Arc::new(FileStore::new(&config.storage_path)));
    let api = ApiClient::new(&config.api_url, config.http_timeout, tokens.clone())
        .context("failed to create API client")?;
    let session = Session::new(tokens, api).with_max_redirects(config.max_redirects);

    match args.command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let location = session
                .login(&username, &password)
                .await
                .context("login failed")?;
            println!(
                "Logged in as {username}; at '{}' with {} menu routes.",
                location.name(),
                session.router().dynamic_routes().count()
            );
        }
        Command::Logout => {
            session.logout().context("failed to clear token")?;
            println!("Logged out.");
        }
        Command::Verify => {
            let body = session.verify().await.context("verification failed")?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Whoami => {
            let body = session.user_info().await.context("failed to fetch user info")?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Menus { all } => {
            enter(&session).await?;
            let menus = session.menus().get_menu_list();
            if menus.is_empty() {
                println!("No menus.");
            }
            for node in menus.iter() {
                print_menu(node, 0, all);
            }
        }
        Command::Routes => {
            enter(&session).await?;
            let router = session.router();
            println!("{:<24} {:<32} {:<40} PARENT", "NAME", "PATH", "COMPONENT");
            println!("{}", "-".repeat(104));
            for route in router.routes() {
                println!(
                    "{:<24} {:<32} {:<40} {}",
                    route.name,
                    route.path,
                    route.component,
                    route.parent.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Open { target } => {
            let location = session
                .navigate(target.as_str())
                .await
                .with_context(|| format!("failed to open '{target}'"))?;
            println!(
                "{} {} ({})",
                location.name(),
                location.route.path,
                location.route.component
            );
            let mut params: Vec<_> = location.params.iter().collect();
            params.sort();
            for (key, value) in params {
                println!("  {key} = {value}");
            }
        }
    }

    Ok(())
}

/// Navigate to main, failing if the guard sends us to login instead.
async fn enter(session: &Session) -> Result<()> {
    let location = session
        .navigate(MAIN)
        .await
        .context("failed to load the menu")?;
    if location.name() == LOGIN {
        bail!("not logged in; run `admin-client login` first");
    }
    Ok(())
}

fn print_menu(node: &MenuNode, depth: usize, all: bool) {
    if !node.is_visible && !all {
        return;
    }
    let indent = "  ".repeat(depth);
    let hidden = if node.is_visible { "" } else { " [hidden]" };
    match (&node.url, node.is_leaf()) {
        (Some(url), true) => println!("{indent}{} ({url}){hidden}", node.label()),
        _ => println!("{indent}{}{hidden}", node.label()),
    }
    for child in node.children() {
        print_menu(child, depth + 1, all);
    }
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,admin_client=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
