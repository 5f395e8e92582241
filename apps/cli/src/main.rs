use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{transport::TmdbClient, ListState, MoviesSession};
use shared::{
    domain::{CatalogSegment, Movie, MovieId},
    error::CatalogError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "movies", about = "Browse the movie catalog from the terminal")]
struct Args {
    /// Config file; defaults to ./movies.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_token: Option<String>,
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Movies currently in theaters.
    NowPlaying {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    Popular {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    Search {
        query: String,
    },
    Details {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(token) = args.api_token {
        settings.api_token = Some(token);
    }
    if let Some(base_url) = args.base_url {
        settings.api_base_url = base_url;
    }

    let client = TmdbClient::new(settings.transport_config()?)
        .context("failed to set up catalog client")?;
    let session = MoviesSession::from_client(Arc::new(client));
    info!(base_url = %settings.api_base_url, "catalog session ready");
    let images = settings.image_base_url.as_str();

    let outcome = match args.command {
        Command::NowPlaying { pages } => {
            browse(&session, CatalogSegment::NowPlaying, pages, images).await
        }
        Command::Popular { pages } => {
            browse(&session, CatalogSegment::Popular, pages, images).await
        }
        Command::Search { query } => {
            for movie in session.search(&query).await {
                print_movie(&movie, images);
            }
            session.search_error().await.map_or(Ok(()), Err)
        }
        Command::Details { id } => {
            session.load_detail(MovieId(id)).await;
            let state = session.details().snapshot().await;
            if let Some(detail) = &state.value {
                println!("{} ({})", detail.title, detail.id);
                if let Some(original) = &detail.original_title {
                    println!("  original title: {original}");
                }
                println!("  rating: {}", detail.formatted_rating());
                if let Some(year) = detail.release_year() {
                    println!("  released: {year}");
                }
                if let Some(url) = detail.poster_url_at(images) {
                    println!("  poster: {url}");
                }
                if let Some(overview) = &detail.overview {
                    println!("\n{overview}");
                }
            }
            state.last_error.map_or(Ok(()), Err)
        }
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("catalog request failed: {err}");
            if err.kind.status_code() == Some(401) {
                eprintln!("hint: check the configured api token");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Loads up to `pages` pages of one segment and prints them.
async fn browse(
    session: &MoviesSession,
    segment: CatalogSegment,
    pages: u32,
    images: &str,
) -> std::result::Result<(), CatalogError> {
    session.load_initial(segment).await;
    let mut state = session.list(segment).snapshot().await;
    let mut loaded = 1;
    while loaded < pages && state.last_error.is_none() && state.has_more {
        session.load_more(segment).await;
        state = session.list(segment).snapshot().await;
        loaded += 1;
    }

    print_list(segment, &state, images);
    state.last_error.map_or(Ok(()), Err)
}

fn print_list(segment: CatalogSegment, state: &ListState<Movie>, images: &str) {
    println!("{segment}: {} movies", state.items.len());
    for movie in &state.items {
        print_movie(movie, images);
    }
    if state.has_more {
        println!("(more available from page {})", state.page);
    }
}

fn print_movie(movie: &Movie, images: &str) {
    let year = movie
        .release_year()
        .map(|year| year.to_string())
        .unwrap_or_else(|| "----".into());
    println!(
        "{:>8}  {}  {:>4}  {}",
        movie.id.0,
        year,
        movie.formatted_rating(),
        movie.title
    );
    if let Some(url) = movie.poster_url_at(images) {
        println!("{:>8}  {url}", "");
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
