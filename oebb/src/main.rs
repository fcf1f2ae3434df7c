use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use oebb::display;
use oebb::domain::{ApiTime, ConnectionRecord, StationRef};
use oebb::oebb::{OebbClient, OebbConfig};
use oebb::search::{Paginator, SearchConfig, SearchError};
use oebb::session::{CredentialCache, Session, SessionProvider};
use oebb::stations::{
    CachedStationLookup, LookupError, StationCacheConfig, StationLookup, resolve_station,
};

#[derive(Parser)]
#[command(name = "oebb")]
#[command(about = "Search train connections in the ÖBB ticket shop", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search connections between two stations
    Search {
        /// Departure station name
        from: String,

        /// Arrival station name
        to: String,

        /// Number of connections to list
        #[arg(short, long, default_value_t = 5)]
        results: usize,

        /// Earliest departure today, as HH:MM (default: now)
        #[arg(short, long)]
        time: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{msg} {spinner}")?.tick_strings(&["|", "/", "-", "\\", " "]),
    );
    spinner.set_message("Searching for connections");
    spinner.enable_steady_tick(Duration::from_millis(50));

    let outcome = tokio::select! {
        outcome = run(cli.command) => outcome,
        _ = tokio::signal::ctrl_c() => {
            spinner.finish_and_clear();
            std::process::exit(1);
        }
    };

    spinner.finish_and_clear();
    print!("{}", outcome?);
    Ok(())
}

async fn run(command: Commands) -> Result<String> {
    match command {
        Commands::Search {
            from,
            to,
            results,
            time,
        } => search(&from, &to, results, time.as_deref()).await,
    }
}

async fn search(from: &str, to: &str, want: usize, time: Option<&str>) -> Result<String> {
    let now = Local::now();
    let departure = match time {
        Some(clock) => ApiTime::parse_clock(clock, now.date_naive())
            .with_context(|| format!("invalid --time {clock:?}"))?,
        None => ApiTime::new(now.naive_local()),
    };

    let client = OebbClient::new(OebbConfig::default())?;

    let cache = match CredentialCache::in_user_cache_dir() {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(error = %e, "credential cache disabled");
            None
        }
    };
    let session = Session::open(client.clone(), cache)
        .await
        .context("authentication failed")?;

    let stations = CachedStationLookup::new(client.clone(), &StationCacheConfig::default());
    let (from, to) = futures::future::try_join(
        resolve(&session, &stations, from),
        resolve(&session, &stations, to),
    )
    .await?;

    let config = SearchConfig::default();
    let paginator = Paginator::new(&client, &config);
    let found = session
        .with_refresh(|creds| {
            let (paginator, from, to) = (&paginator, &from, &to);
            async move { paginator.search(from, to, &creds, departure, want).await }
        })
        .await;

    match found {
        Ok(connections) => Ok(render(&from, &to, &connections)),
        Err(SearchError::ProviderExhausted { probes, partial }) => {
            let mut out = render(&from, &to, &partial);
            out.push_str(&format!(
                "Only {} of {want} connections found (gave up after {probes} empty pages)\n",
                partial.len()
            ));
            Ok(out)
        }
        Err(e) => Err(e).context("connection search failed"),
    }
}

async fn resolve<P, L>(
    session: &Session<P>,
    stations: &L,
    query: &str,
) -> Result<StationRef, LookupError>
where
    P: SessionProvider,
    L: StationLookup,
{
    session
        .with_refresh(|creds| async move { resolve_station(stations, query, &creds).await })
        .await
}

fn render(from: &StationRef, to: &StationRef, connections: &[ConnectionRecord]) -> String {
    if connections.is_empty() {
        return format!("{}\n", display::no_connections(from, to));
    }
    connections.iter().map(display::render_connection).collect()
}
