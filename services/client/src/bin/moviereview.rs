//! services/client/src/bin/moviereview.rs

use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use client_lib::{
    adapters::{FileSessionStore, HttpLinkResolver},
    app::{bootstrap, check_draft, Catalog, Navigation, SessionService, Store},
    config::Config,
    error::ClientError,
};
use moviereview_core::domain::{relations, Credentials, Hypermedia, Movie, Review, ReviewDraft};
use moviereview_core::ports::LinkResolver;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "moviereview")]
#[command(about = "Browse and review movies from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all movies
    Movies,
    /// Show one movie and its reviews
    Movie { id: i64 },
    /// List all categories
    Categories,
    /// Log in and remember the session
    Login { username: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Write a review for a movie
    Review {
        movie_id: i64,
        rating: u8,
        comment: String,
    },
    /// Delete one of your reviews
    DeleteReview { movie_id: i64, review_id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Using API at {}", config.api_base_url);

    // --- 2. Build the Store & Resolver ---
    let session_store = Arc::new(FileSessionStore::open(&config.session_file));
    let store = Arc::new(Store::new(session_store));
    let resolver: Arc<dyn LinkResolver> =
        Arc::new(HttpLinkResolver::from_config(&config, store.clone()));
    let mut navigation = store.subscribe_navigation();
    let session = SessionService::new(store.clone(), resolver.clone());

    // Logging out only touches local state; it works with the server down.
    if let Commands::Logout = cli.command {
        session.logout();
        println!("Logged out");
        return Ok(());
    }

    // --- 3. Discover Endpoints & Restore the Session ---
    bootstrap(&store, resolver.as_ref()).await?;
    if let Err(e) = session.restore().await {
        warn!("Could not restore the previous session: {}", e);
    }
    let catalog = Catalog::new(store.clone(), resolver.clone());

    // --- 4. Run the Command ---
    let result = run(cli.command, &catalog, &session).await;

    if let Ok(Navigation::Login) = navigation.try_recv() {
        eprintln!("Your session has expired. Run `moviereview login <username> <password>`.");
    }
    result
}

async fn run(command: Commands, catalog: &Catalog, session: &SessionService) -> Result<(), ClientError> {
    match command {
        Commands::Movies => {
            let movies = catalog
                .movies()
                .await?
                .ok_or_else(|| ClientError::Unavailable("movie list".to_string()))?;
            for movie in &movies.items {
                print_movie_line(movie);
            }
        }
        Commands::Movie { id } => {
            let movie = catalog
                .find_movie(id)
                .await?
                .ok_or_else(|| ClientError::Unavailable(format!("movie {}", id)))?;
            print_movie_line(&movie);
            println!("  directed by {}, released {}", movie.director, movie.release_date);
            match catalog.reviews_for(&movie).await? {
                Some(reviews) if reviews.items.is_empty() => println!("  no reviews yet"),
                Some(reviews) => reviews.items.iter().for_each(print_review),
                None => println!("  reviews are not available"),
            }
        }
        Commands::Categories => {
            let categories = catalog
                .categories()
                .await?
                .ok_or_else(|| ClientError::Unavailable("category list".to_string()))?;
            for category in &categories.items {
                println!("{:>4}  {}", category.id, category.title);
            }
        }
        Commands::Login { username, password } => {
            let user = session.login(&Credentials { username, password }).await?;
            println!("Logged in as {} ({:?})", user.username, user.role);
        }
        Commands::Logout => session.logout(),
        Commands::Whoami => match session.current_user() {
            Some(user) => println!("{} <{}> ({:?})", user.username, user.email_address, user.role),
            None => println!("Not logged in"),
        },
        Commands::Review {
            movie_id,
            rating,
            comment,
        } => {
            let user = session
                .current_user()
                .ok_or_else(|| ClientError::Unavailable("writing reviews requires a login".to_string()))?;
            let movie = catalog
                .find_movie(movie_id)
                .await?
                .ok_or_else(|| ClientError::Unavailable(format!("movie {}", movie_id)))?;
            let reviews = catalog
                .reviews_for(&movie)
                .await?
                .ok_or_else(|| ClientError::Unavailable("reviews".to_string()))?;

            let draft = ReviewDraft {
                rating,
                comment,
                date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
                author: user.username,
                movie_id,
            };
            if let Some(link) = reviews.control(relations::ADD_REVIEW) {
                check_draft(link, &draft)?;
            }

            let review = catalog
                .add_review(&reviews, &draft)
                .await?
                .ok_or_else(|| ClientError::Unavailable("adding reviews".to_string()))?;
            print_review(&review);
        }
        Commands::DeleteReview { movie_id, review_id } => {
            let user = session
                .current_user()
                .ok_or_else(|| ClientError::Unavailable("deleting reviews requires a login".to_string()))?;
            let movie = catalog
                .find_movie(movie_id)
                .await?
                .ok_or_else(|| ClientError::Unavailable(format!("movie {}", movie_id)))?;
            let review = catalog
                .reviews_for(&movie)
                .await?
                .and_then(|reviews| reviews.items.into_iter().find(|r| r.id == review_id))
                .ok_or_else(|| ClientError::Unavailable(format!("review {}", review_id)))?;
            if !user.can_modify(&review) {
                return Err(ClientError::Unavailable(format!(
                    "review {} belongs to {}",
                    review_id, review.author
                )));
            }
            if catalog.delete_review(&review).await? {
                println!("Deleted review {}", review_id);
            } else {
                return Err(ClientError::Unavailable("deleting this review".to_string()));
            }
        }
    }
    Ok(())
}

fn print_movie_line(movie: &Movie) {
    println!("{:>4}  {} ({} min)", movie.id, movie.title, movie.length / 60);
}

fn print_review(review: &Review) {
    let stars: String = (0..5).map(|i| if i < review.rating { '*' } else { '.' }).collect();
    println!("  [{}] {} by {}: {}", review.id, stars, review.author, review.comment);
}
