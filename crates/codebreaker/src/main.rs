//! Codebreaker - terminal CLI

#![warn(missing_docs)]

mod cli;

use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use codebreaker::{
    AppConfig, AuthenticatedUser, Authenticator, Console, FileIdentity, IdentityProvider,
    LocalLedger, PlaySettings, ProgressLedger, ProgressRepository, ProgressService,
    RemoteAuthenticator, RemoteLedger,
};
use codebreaker_core::{Catalog, highest_unlocked, is_locked};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config);

    std::fs::create_dir_all(config.data_dir()).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir().display())
    })?;
    let mut identity = FileIdentity::load_or_create(config.identity_path())?;
    let mut service = build_service(&config, &identity)?;
    let catalog = Catalog::generate();

    match cli.command {
        Command::Levels => list_levels(&service, &catalog).await,
        Command::Play { level } => play(&config, &service, &catalog, level).await,
        Command::Progress => show_progress(&service, &catalog).await,
        Command::Login { username } => {
            let auth = authenticator(&config)?;
            let password = prompt_password()?;
            let user = auth.login(&username, &password).await?;
            sign_in(&mut identity, &mut service, user).await
        }
        Command::Register { username } => {
            let auth = authenticator(&config)?;
            let password = prompt_password()?;
            let user = auth.register(&username, &password).await?;
            sign_in(&mut identity, &mut service, user).await
        }
        Command::Logout => {
            match identity.logout()? {
                Some(user) => println!("Signed out of {}.", user.username()),
                None => println!("Not signed in."),
            }
            service.on_logout();
            Ok(())
        }
        Command::Whoami => {
            match identity.user() {
                Some(user) => println!("{} ({})", user.username(), service.active_key()),
                None => println!("anonymous ({})", service.active_key()),
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &AppConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[instrument(skip_all)]
fn build_service(config: &AppConfig, identity: &FileIdentity) -> Result<ProgressService> {
    let db_path = config.database_path();
    let db_path = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?
        .to_string();
    let local = LocalLedger::new(ProgressRepository::open(db_path)?);
    let remote = config
        .remote_url()
        .as_deref()
        .map(|url| Box::new(RemoteLedger::new(url)) as Box<dyn ProgressLedger>);

    info!(has_remote = remote.is_some(), "Progress service ready");
    Ok(
        ProgressService::new(Box::new(local), remote, identity.resolve_player_key())
            .with_user(identity.user().cloned()),
    )
}

fn authenticator(config: &AppConfig) -> Result<RemoteAuthenticator> {
    match config.remote_url() {
        Some(url) => Ok(RemoteAuthenticator::new(url)),
        None => bail!("Accounts need a remote service; set remote_url or CODEBREAKER_REMOTE_URL"),
    }
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut password = String::new();
    std::io::stdin().lock().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}

async fn sign_in(
    identity: &mut FileIdentity,
    service: &mut ProgressService,
    user: AuthenticatedUser,
) -> Result<()> {
    identity.set_user(user.clone())?;
    service.on_login(user.clone()).await?;
    println!("Signed in as {}.", user.username());
    Ok(())
}

async fn list_levels(service: &ProgressService, catalog: &Catalog) -> Result<()> {
    let completed = service.completed_levels().await?;
    for level in catalog.levels() {
        let state = if completed.contains(level.id()) {
            "done"
        } else if is_locked(*level.id(), &completed) {
            "locked"
        } else {
            "open"
        };
        println!(
            "{:>3}  {:<20} {} slots, {:>2} attempts  {}",
            level.id(),
            level.title(),
            level.secret_length(),
            level.max_attempts(),
            state
        );
    }
    Ok(())
}

async fn play(
    config: &AppConfig,
    service: &ProgressService,
    catalog: &Catalog,
    requested: Option<u32>,
) -> Result<()> {
    let completed = match service.completed_levels().await {
        Ok(completed) => completed,
        Err(e) => {
            warn!(error = %e, "Progress unavailable, starting without it");
            eprintln!("Progress could not be loaded: {}", e);
            BTreeSet::new()
        }
    };
    let unlocked = highest_unlocked(&completed).min(catalog.last_id());
    let start = requested.unwrap_or(unlocked);

    if catalog.level(start).is_none() {
        bail!("There is no level {}", start);
    }
    if is_locked(start, &completed) {
        bail!("Level {} is locked; the highest unlocked level is {}", start, unlocked);
    }

    let settings = PlaySettings::new(*config.sound(), config.analysis_delay());
    let mut console = Console::new(std::io::stdin().lock(), std::io::stdout().lock(), settings);
    console.run_campaign(service, catalog, start).await?;
    Ok(())
}

async fn show_progress(service: &ProgressService, catalog: &Catalog) -> Result<()> {
    let snapshot = service.snapshot(catalog).await?;
    println!("Player: {}", snapshot.key());
    println!(
        "Completed: {}/{} ({}%)",
        snapshot.completed().len(),
        catalog.last_id(),
        snapshot.percent()
    );
    println!("Highest unlocked: {}", snapshot.highest_unlocked());
    if !snapshot.completed().is_empty() {
        let ids: Vec<String> = snapshot.completed().iter().map(u32::to_string).collect();
        println!("Levels: {}", ids.join(", "));
    }
    Ok(())
}
