//! Foodgram Backend
//!
//! A recipe-sharing REST backend with SQLite persistence: recipes, favorites,
//! shopping cart, subscriptions and an aggregated shopping list download.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod import;
mod models;
mod shopping_list;
mod slug;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use clap::{Parser, Subcommand};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[derive(Parser, Debug)]
#[command(name = "foodgram", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Load ingredients from a headerless `name,unit` file
    LoadIngredients {
        /// Source file; defaults to FOODGRAM_INGREDIENTS_PATH
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env();

    init_tracing(&config);

    // Initialize database
    tracing::info!("Database path: {:?}", config.db_path);
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(repo, config).await,
        Command::LoadIngredients { path } => {
            let path = path.unwrap_or_else(|| config.ingredients_path.clone());
            let summary = import::load_ingredients_file(&repo, &path).await?;
            tracing::info!(
                created = summary.created,
                existing = summary.existing,
                skipped = summary.skipped,
                "Ingredient load finished"
            );
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(repo: Arc<Repository>, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting Foodgram Backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_psk.is_none() {
        tracing::warn!("No admin PSK configured (FOODGRAM_ADMIN_PSK). Admin routes are disabled");
    }

    let bind_addr = config.bind_addr;
    let state = AppState {
        repo,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the admin layer
    let psk = state.config.admin_psk.clone();

    // Reference data management, guarded by the admin PSK
    let admin_routes = Router::new()
        .route("/tags", post(api::create_tag))
        .route("/tags/{id}", delete(api::delete_tag))
        .route("/ingredients/import", post(api::import_ingredients))
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_psk_layer(psk.clone(), req, next)
        }));

    let api_routes = Router::new()
        // Auth
        .route("/auth/token/login", post(api::login))
        .route("/auth/token/logout", post(api::logout))
        // Users
        .route("/users", get(api::list_users).post(api::create_user))
        .route("/users/me", get(api::get_me))
        .route("/users/set_password", post(api::set_password))
        .route(
            "/users/me/avatar",
            put(api::set_avatar).delete(api::delete_avatar),
        )
        .route("/users/subscriptions", get(api::list_subscriptions))
        .route("/users/{id}", get(api::get_user))
        .route("/users/{id}/recipes", get(api::list_user_recipes))
        .route(
            "/users/{id}/subscribe",
            post(api::subscribe).delete(api::unsubscribe),
        )
        // Reference data
        .route("/tags", get(api::list_tags))
        .route("/tags/{id}", get(api::get_tag))
        .route("/ingredients", get(api::list_ingredients))
        .route("/ingredients/{id}", get(api::get_ingredient))
        // Recipes
        .route("/recipes", get(api::list_recipes).post(api::create_recipe))
        .route(
            "/recipes/download_shopping_cart",
            get(api::download_shopping_cart),
        )
        .route("/recipes/slug/{slug}", get(api::get_recipe_by_slug))
        .route(
            "/recipes/{id}",
            get(api::get_recipe)
                .put(api::update_recipe)
                .delete(api::delete_recipe),
        )
        .route("/recipes/{id}/get-link", get(api::get_recipe_link))
        .route(
            "/recipes/{id}/favorite",
            post(api::add_favorite).delete(api::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(api::add_to_shopping_cart).delete(api::remove_from_shopping_cart),
        )
        .route("/favorites", get(api::list_favorites))
        .route("/shopping_cart", get(api::list_shopping_cart))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
