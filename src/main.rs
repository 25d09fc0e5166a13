use std::{env, fmt, path::PathBuf, process};

use anyhow::{Context, Result};
use clap::Parser;
use github::{GithubClientImpl, DEFAULT_API_URL};

mod actions;
mod cleanup;
mod error;
mod github;

/// Delete all untagged versions of the container packages linked to a GitHub
/// repository.
#[derive(Parser)]
#[clap(version)]
struct Args {
    /// Repository whose packages should be cleaned, as owner/name
    #[clap(long, env = "INPUT_REPOSITORY")]
    repository: String,

    /// GitHub token with the delete:packages scope
    #[clap(long, env = "INPUT_GH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Path to a file containing a GitHub token (takes precedence over --token)
    #[clap(long)]
    token_file: Option<PathBuf>,

    /// Base URL of the GitHub REST API
    #[clap(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Make logging more verbose.
    /// You can also specify the log level via the RUST_LOG env variable.
    #[clap(long, short)]
    verbose: bool,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("repository", &self.repository)
            .field("has_token", &self.token.is_some())
            .field("token_file", &self.token_file)
            .field("api_url", &self.api_url)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[tokio::main]
async fn main() {
    // Has to happen before parsing, the .env file may provide arguments.
    let dotenv = should_load_dotenv(env::var("APP_ENV").ok().as_deref()).then(dotenvy::dotenv);

    let args = Args::parse();

    if env::var("RUST_LOG").is_err() {
        let level = match args.verbose {
            true => "debug",
            false => "info",
        };
        env::set_var("RUST_LOG", format!("{}={}", env!("CARGO_CRATE_NAME"), level));
    }
    env_logger::init();

    log::info!(
        "Starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );
    match dotenv {
        Some(Ok(path)) => log::info!("Loaded the dotenv file {}", path.display()),
        Some(Err(error)) if error.not_found() => log::debug!("No dotenv file found"),
        Some(Err(error)) => log::warn!("Failed to load the dotenv file: {}", error),
        None => {}
    }
    log::debug!("With arguments {:?}", args);

    if let Err(error) = run(args).await {
        log::error!("{:?}", error);
        actions::error(format!("{:#}", error));
        process::exit(1);
    }
}

fn should_load_dotenv(environment: Option<&str>) -> bool {
    matches!(environment, Some(environment) if environment != "production")
}

async fn run(args: Args) -> Result<()> {
    let token = match args.token_file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .context(format!(
                "Failed to read the github token from {}",
                path.display(),
            ))?
            .trim()
            .to_string(),
        None => args
            .token
            .filter(|token| !token.is_empty())
            .context("No github token provided via --token, --token-file or INPUT_GH_TOKEN")?,
    };
    actions::add_mask(&token);

    let client =
        GithubClientImpl::new(&token, args.api_url).context("Failed to create github client")?;

    let deleted_version_ids = cleanup::run(&client, &args.repository)
        .await
        .context(format!(
            "Failed to clean the packages of {}",
            args.repository,
        ))?;

    cleanup::report(&deleted_version_ids);
    Ok(())
}
