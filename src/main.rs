mod catalog;
mod config;
mod error;
mod genre;
mod http;
mod ingest;
mod models;
mod omdb;
mod queries;

use anyhow::Result;
use catalog::Catalog;
use clap::{Parser, Subcommand};
use config::Configuration;
use genre::{Genre, Vocabulary};
use http::HttpClient;
use models::{EpisodeView, SeriesId, SeriesView};
use omdb::OmdbClient;
use queries::{sort_by_rating_desc, CatalogQuery};
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a series from OMDb and add it to the catalog
    Fetch { title: String },
    /// Fetch every season of a catalogued series and store its episodes
    Episodes { title: String },
    #[command(flatten)]
    Read(Query),
}

#[derive(Subcommand)]
enum Query {
    /// List every catalogued series, grouped by genre
    List,
    /// Show one series by id
    Show { id: u64 },
    /// Find the first series whose title contains the text
    Find { text: String },
    /// Best rated series
    Top {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Series of one genre, best rated first
    Genre {
        name: String,
        #[arg(long, value_enum, default_value = "user")]
        vocabulary: Vocabulary,
    },
    /// Series with at most N seasons and at least the given rating
    Filter {
        #[arg(long)]
        max_seasons: u32,
        #[arg(long)]
        min_rating: f64,
    },
    /// Episodes across all series whose title contains the text
    EpisodeSearch { text: String },
    /// Best rated episodes of the first series matching the title
    TopEpisodes {
        title: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Series with the most recently released episodes
    Recent {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Episodes of one season of a series
    Season { id: u64, season: u32 },
    /// Every episode of a series
    SeriesEpisodes { id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = Configuration::from_file(&cli.config)?;
    let mut catalog = Catalog::load(&config.catalog.path)?;
    if catalog.is_empty() {
        info!("Catalog at {} is empty", config.catalog.path.display());
    }

    match cli.command {
        Command::Fetch { title } => {
            let omdb = OmdbClient::new(HttpClient::new()?, config.omdb.clone())?;
            let id = fetch_series(&omdb, &mut catalog, &title).await?;
            catalog.persist(&config.catalog.path)?;
            print(&CatalogQuery::new(&catalog).by_id(id).map(|s| s.view()))
        }
        Command::Episodes { title } => {
            let omdb = OmdbClient::new(HttpClient::new()?, config.omdb.clone())?;
            match fetch_episodes(&omdb, &mut catalog, &title).await? {
                Some(id) => {
                    catalog.persist(&config.catalog.path)?;
                    let episodes = CatalogQuery::new(&catalog).episodes_for_series(id);
                    print(&episodes.map(|e| e.iter().map(|e| e.view()).collect::<Vec<_>>()))
                }
                None => {
                    warn!("No catalogued series matches '{}'", title);
                    print(&None::<Vec<EpisodeView>>)
                }
            }
        }
        Command::Read(read) => run_query(&CatalogQuery::new(&catalog), read, config.query.limit),
    }
}

/// Fetches one series and saves it. Classification and rating errors abort
/// the whole ingestion.
#[instrument(skip(omdb, catalog))]
async fn fetch_series(omdb: &OmdbClient, catalog: &mut Catalog, title: &str) -> Result<SeriesId> {
    let data = omdb.fetch_series(title).await?;
    let series = ingest::build_series(&data)?;
    let id = catalog.save(series)?;

    info!("Catalogued '{}' as series {}", data.title, id);
    Ok(id)
}

/// Replaces the episodes of the first catalogued series matching `title`.
///
/// The series and its new episodes are saved together; the catalog is left
/// untouched if fetching, attaching or saving fails.
#[instrument(skip(omdb, catalog))]
async fn fetch_episodes(omdb: &OmdbClient, catalog: &mut Catalog, title: &str) -> Result<Option<SeriesId>> {
    let Some(found) = CatalogQuery::new(catalog).find_by_title_substring(title) else {
        return Ok(None);
    };
    let mut series = found.clone();

    let seasons = omdb.fetch_seasons(&series.title, series.total_seasons).await?;
    let episodes = ingest::aggregate_episodes(&seasons);
    info!("Aggregated {} episodes for '{}'", episodes.len(), series.title);

    series.attach(episodes)?;
    Ok(Some(catalog.save(series)?))
}

fn run_query(query: &CatalogQuery<'_>, command: Query, default_limit: usize) -> Result<()> {
    let views = |series: Vec<&models::Series>| -> Vec<SeriesView> {
        series.into_iter().map(|s| s.view()).collect()
    };

    match command {
        Query::List => print(&views(query.all_by_genre())),
        Query::Show { id } => print(&query.by_id(SeriesId(id)).map(|s| s.view())),
        Query::Find { text } => print(&query.find_by_title_substring(&text).map(|s| s.view())),
        Query::Top { limit } => print(&views(query.top_by_rating(limit.unwrap_or(default_limit)))),
        Query::Genre { name, vocabulary } => {
            let genre = Genre::parse(vocabulary, &name)?;
            let mut series = query.by_genre(genre);
            sort_by_rating_desc(&mut series);
            print(&views(series))
        }
        Query::Filter { max_seasons, min_rating } => {
            let mut series = query.by_seasons_and_rating(max_seasons, min_rating);
            sort_by_rating_desc(&mut series);
            print(&views(series))
        }
        Query::EpisodeSearch { text } => print(&query.episodes_by_title_substring(&text)),
        Query::TopEpisodes { title, limit } => {
            let top = query.find_by_title_substring(&title).map(|series| {
                query
                    .top_episodes(series, limit.unwrap_or(default_limit))
                    .into_iter()
                    .map(|e| e.view())
                    .collect::<Vec<_>>()
            });
            print(&top)
        }
        Query::Recent { limit } => {
            print(&views(query.most_recent_by_latest_episode(limit.unwrap_or(default_limit))))
        }
        Query::Season { id, season } => {
            let episodes: Vec<_> = query
                .episodes_for_season(SeriesId(id), season)
                .into_iter()
                .map(|e| e.view())
                .collect();
            print(&episodes)
        }
        Query::SeriesEpisodes { id } => {
            let episodes = query
                .episodes_for_series(SeriesId(id))
                .map(|e| e.iter().map(|e| e.view()).collect::<Vec<_>>());
            print(&episodes)
        }
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
