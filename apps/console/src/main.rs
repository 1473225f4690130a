use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{config::load_settings, CardCollection, CollectionKey, Notice, ScreenSession};
use shared::{
    domain::{Companion, TimeOfWeek, Venue},
    protocol::category_label,
};
use tracing_subscriber::EnvFilter;

const DELIVERY_GRACE: Duration = Duration::from_secs(5);
/// Used when requests have no timeout. Dropped responses never deliver, so
/// the console still needs somewhere to stop.
const UNTIMED_WAIT: Duration = Duration::from_secs(300);

#[derive(Parser, Debug)]
struct Cli {
    /// Settings file; `recommender.toml` in the working directory otherwise.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    user: Option<String>,
    /// How long to wait for an answer; derived from the request timeout otherwise.
    #[arg(long)]
    wait_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the user's favourite movies.
    Favourites,
    /// Add a movie to the favourites by title.
    Add { title: String },
    /// Ask for recommendations for a viewing situation.
    Recommend {
        #[arg(long, value_enum)]
        venue: Option<VenueArg>,
        #[arg(long, value_enum)]
        companion: Option<CompanionArg>,
        /// Defaults to today's weekday/weekend.
        #[arg(long, value_enum)]
        time: Option<TimeArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VenueArg {
    Home,
    Cinema,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CompanionArg {
    Alone,
    Partner,
    Family,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TimeArg {
    Weekday,
    Weekend,
}

impl From<VenueArg> for Venue {
    fn from(value: VenueArg) -> Self {
        match value {
            VenueArg::Home => Venue::Home,
            VenueArg::Cinema => Venue::Cinema,
        }
    }
}

impl From<CompanionArg> for Companion {
    fn from(value: CompanionArg) -> Self {
        match value {
            CompanionArg::Alone => Companion::Alone,
            CompanionArg::Partner => Companion::Partner,
            CompanionArg::Family => Companion::Family,
        }
    }
}

impl From<TimeArg> for TimeOfWeek {
    fn from(value: TimeArg) -> Self {
        match value {
            TimeArg::Weekday => TimeOfWeek::Weekday,
            TimeArg::Weekend => TimeOfWeek::Weekend,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(user) = cli.user {
        settings.user = Some(user);
    }
    let user = settings
        .user
        .clone()
        .ok_or_else(|| anyhow!("no user given; pass --user or set RECOMMENDER_USER"))?;

    let mut session = ScreenSession::start(&settings)?;
    let queued = match cli.command {
        Command::Favourites => session.request_favourites(&user),
        Command::Add { title } => session.add_favourite(&user, &title),
        Command::Recommend {
            venue,
            companion,
            time,
        } => session.request_recommendations(
            &user,
            time.map(TimeOfWeek::from).unwrap_or_else(TimeOfWeek::today),
            venue.map(Venue::from),
            companion.map(Companion::from),
        ),
    };
    println!("{}", session.status());
    if queued.is_none() {
        session.close();
        return Ok(());
    }

    let deadline = Instant::now()
        + answer_wait(settings.request_timeout(), cli.wait_secs.map(Duration::from_secs));
    while session.pending() > 0 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            println!("No answer to show from {}", settings.server_url);
            session.forget_pending();
            break;
        }
        for notice in session.wait_for_deliveries(remaining) {
            render_notice(&session, &notice);
        }
    }

    session.close();
    Ok(())
}

/// The request timeout plus a grace period for classification and delivery.
fn answer_wait(request_timeout: Option<Duration>, explicit: Option<Duration>) -> Duration {
    explicit.unwrap_or_else(|| match request_timeout {
        Some(timeout) => timeout + DELIVERY_GRACE,
        None => UNTIMED_WAIT,
    })
}

fn render_notice(session: &ScreenSession, notice: &Notice) {
    match notice {
        Notice::CollectionChanged(key) => {
            let Some(collection) = session.view().collection(key) else {
                return;
            };
            let heading = match key {
                CollectionKey::Favourites => "Favourites",
                CollectionKey::Category(category) => category_label(category),
            };
            render_collection(heading, collection);
        }
        Notice::NothingFound(message) | Notice::Failure { message, .. } => {
            println!("{message}");
        }
    }
}

fn render_collection(heading: &str, collection: &CardCollection) {
    println!("{heading} ({})", collection.len());
    for card in collection.cards() {
        let movie = card.movie();
        println!("  {} {} [{}]", card.movie_id(), movie.title, movie.genre_list().join(", "));
        if !movie.director.is_empty() {
            println!("      directed by {}", movie.director);
        }
        let keywords = movie.keyword_list();
        if !keywords.is_empty() {
            println!("      {}", keywords.join(", "));
        }
        println!("      {}", card.imdb_url());
    }
}
