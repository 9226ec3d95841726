use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::dashboard::{
    CommitOutcome, FieldKey, JudgingDashboard, JuryBrowser, RoundListing, ScoreSheetView,
};
use client::realtime::{SocketIoConnector, SubscriptionManager};
use client::{ApiClient, DEFAULT_API_URL, JudgingApi, QueryCache, Session, TokenStore};
use judging::dto::auth::ChangePasswordRequest;
use judging::services::event_filter::{DayFilter, EventFilter, filter_teams};
use judging::services::export::WINNERS_FILE_NAME;
use judging::{EventCategory, RoundKey};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod render;

use config::Config;

#[derive(Parser)]
#[command(name = "incridea")]
#[command(about = "Incridea judging client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "INCRIDEA_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "INCRIDEA_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an access token and check it against the server
    Login { token: String },
    Logout,
    /// Show the signed-in user
    Me,
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Rounds assigned to the signed-in judge
    Rounds,
    Teams {
        event: i32,
        round: i32,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Enter one score; an unchanged value is not resent
    Score {
        event: i32,
        round: i32,
        team: i32,
        criteria: i32,
        value: String,
    },
    /// Score sheet of a round across all judges
    Sheet {
        event: i32,
        round: i32,
        /// Judge name to show, defaults to the first judge on the sheet
        #[arg(long)]
        judge: Option<String>,
        /// Keep the sheet open and reload on live score updates
        #[arg(short, long)]
        watch: bool,
        /// Write the judge's sheet as CSV into this directory
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Published events
    Events {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long)]
        category: Option<EventCategory>,
        #[arg(short, long, default_value = "ALL")]
        day: DayFilter,
    },
    Event { id: i32 },
    /// Winners of one event, or of every event
    Winners { event: Option<i32> },
    ExportWinners {
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("incridea={},client={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new(&cli.api_url, cli.token_file).context("Invalid configuration")?;
    tracing::debug!("Using API at {}", config.api_url);

    let session = Session::init(TokenStore::new(&config.token_file))
        .await
        .context("Failed to read the saved session")?;
    let api = Arc::new(ApiClient::new(&config.api_url, session.clone())?);
    let cache = QueryCache::default();

    match cli.command {
        Commands::Login { token } => handle_login(&api, &session, &token).await?,
        Commands::Logout => {
            session.logout().await?;
            println!("Signed out");
        }
        Commands::Me => render::user(&api.me().await?),
        Commands::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let request = ChangePasswordRequest {
                current_password: current,
                new_password: new,
                confirm_new_password: confirm,
            };
            println!("{}", api.change_password(&request).await?);
        }
        Commands::Rounds => handle_rounds(api, cache).await?,
        Commands::Teams {
            event,
            round,
            search,
        } => handle_teams(api, cache, RoundKey::new(event, round), &search).await?,
        Commands::Score {
            event,
            round,
            team,
            criteria,
            value,
        } => {
            let field = FieldKey::new(RoundKey::new(event, round), team, criteria);
            handle_score(api, cache, field, &value).await?;
        }
        Commands::Sheet {
            event,
            round,
            judge,
            watch,
            csv,
        } => {
            let connector = Arc::new(SocketIoConnector::new(config.socket_origin.clone()));
            let subscriptions = SubscriptionManager::new(connector, cache.clone());
            let options = SheetOptions { judge, watch, csv };
            handle_sheet(api, cache, &subscriptions, RoundKey::new(event, round), options).await?;
        }
        Commands::Events {
            search,
            category,
            day,
        } => {
            let filter = EventFilter {
                search,
                category,
                day,
            };
            let events = JuryBrowser::new(api, cache).events(&filter).await?;
            render::events(&events);
        }
        Commands::Event { id } => {
            let browser = JuryBrowser::new(api, cache);
            let event = browser.event(id).await?;
            render::event(&event, &browser.round_tabs(id).await?);
            render::event_winners(&browser.event_winners(id).await?);
        }
        Commands::Winners { event } => {
            let browser = JuryBrowser::new(api, cache);
            match event {
                Some(id) => render::event_winners(&browser.event_winners(id).await?),
                None => render::all_winners(&browser.all_winners().await?),
            }
        }
        Commands::ExportWinners { output } => handle_export_winners(api, cache, &output).await?,
    }

    Ok(())
}

async fn handle_login(api: &ApiClient, session: &Session, token: &str) -> Result<()> {
    session.login(token).await?;

    match api.me().await {
        Ok(user) => {
            tracing::info!("Signed in as {}", user.name);
            println!("Signed in as {}", user.name);
            Ok(())
        }
        Err(e) if e.is_authorization() => {
            session.logout().await?;
            bail!("The server rejected this token")
        }
        Err(e) => Err(e).context("Token saved but the profile could not be loaded"),
    }
}

async fn handle_rounds(api: Arc<dyn JudgingApi>, cache: QueryCache) -> Result<()> {
    let dashboard = JudgingDashboard::new(api, cache);
    match dashboard.list_rounds().await? {
        RoundListing::Assigned(rounds) => {
            render::rounds(&rounds, |r| dashboard.is_final_round(r.key()));
        }
        RoundListing::NotAssigned => println!("You are not assigned to any rounds"),
    }
    Ok(())
}

async fn handle_teams(
    api: Arc<dyn JudgingApi>,
    cache: QueryCache,
    key: RoundKey,
    search: &str,
) -> Result<()> {
    let mut dashboard = JudgingDashboard::new(api, cache);
    let round = dashboard.select_round(key).await?;
    let teams = dashboard.list_teams_for_round(key).await?;

    let matching = filter_teams(&teams, search);
    if matching.is_empty() {
        println!("No teams found");
        return Ok(());
    }
    render::teams(&matching, &round);
    Ok(())
}

async fn handle_score(
    api: Arc<dyn JudgingApi>,
    cache: QueryCache,
    field: FieldKey,
    value: &str,
) -> Result<()> {
    let dashboard = JudgingDashboard::new(api, cache);
    dashboard
        .list_teams_for_round(field.round)
        .await
        .context("Failed to load the round's teams")?;

    if !dashboard.edit_score(field, value).await? {
        bail!("'{}' is not a valid score for criteria {}", value, field.criteria_id);
    }

    let report = dashboard.commit_score(field).await?;
    if let Some(notice) = &report.notice {
        println!("{}", notice);
    }
    match report.outcome {
        CommitOutcome::Unchanged => println!("Score unchanged"),
        CommitOutcome::RolledBack => bail!("Score was not saved"),
        CommitOutcome::Saved | CommitOutcome::Superseded => {}
    }
    Ok(())
}

struct SheetOptions {
    judge: Option<String>,
    watch: bool,
    csv: Option<PathBuf>,
}

async fn handle_sheet(
    api: Arc<dyn JudgingApi>,
    cache: QueryCache,
    subscriptions: &SubscriptionManager,
    key: RoundKey,
    options: SheetOptions,
) -> Result<()> {
    let mut view = ScoreSheetView::mount(api, cache, subscriptions, key).await?;

    if let Some(name) = &options.judge {
        let judge_id = view
            .judges()
            .iter()
            .find(|j| j.name.eq_ignore_ascii_case(name))
            .map(|j| j.id)
            .with_context(|| format!("No judge named '{}' on this sheet", name))?;
        view.select_judge(judge_id)?;
    }

    render::score_sheet(&view);

    if let Some(dir) = &options.csv {
        let (file_name, contents) = view.export_csv()?;
        let path = write_export(dir, &file_name, &contents).await?;
        println!("Wrote {}", path.display());
    }

    if !options.watch {
        return Ok(());
    }
    if !view.is_live() {
        bail!("Live updates are unavailable, cannot watch {}", key);
    }

    println!("Watching {} for score updates, press Ctrl-C to stop", key);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            updated = view.next_update() => {
                match updated {
                    Ok(true) => {
                        println!();
                        render::score_sheet(&view);
                    }
                    Ok(false) => {
                        tracing::warn!("Push channel closed");
                        break;
                    }
                    Err(e) => {
                        // the sheet stays stale until the next update retries the fetch
                        tracing::warn!("Score sheet reload failed: {}", e);
                        println!("{}", e.notice());
                    }
                }
            }
        }
    }
    Ok(())
}

async fn handle_export_winners(
    api: Arc<dyn JudgingApi>,
    cache: QueryCache,
    output: &Path,
) -> Result<()> {
    let browser = JuryBrowser::new(api, cache);
    match browser.export_winners().await? {
        Some(contents) => {
            let path = write_export(output, WINNERS_FILE_NAME, &contents).await?;
            println!("Wrote {}", path.display());
        }
        None => println!("No winners to export"),
    }
    Ok(())
}

async fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Exported {}", path.display());
    Ok(path)
}
