use libremore::{
    adapters::{
        cache::{NoopCacheStore, RedisCacheStore},
        calil::CalilProvider,
        directory::StaticLibraryDirectory,
        feeds::{CiniiFeed, NdlFeed},
        http::create_http_client,
        postgres::{PostgresBookRepository, PostgresGoalRepository, PostgresUserRepository},
    },
    api::{AppState, create_router},
    application::{
        auth::{AuthDependencies, TokenIssuer},
        availability::{AvailabilityDependencies, PollPolicy},
        goal::GoalDependencies,
        recommendation::RecommendationDependencies,
    },
    config::Settings,
    ports::{AvailabilityProvider, CacheStore},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Redisのキー接頭辞
const CACHE_PREFIX: &str = "libremore";

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libremore=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().expect("Invalid configuration");

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let http_client = create_http_client(settings.http_timeout).expect("Failed to build HTTP client");

    // Cache: Redis if configured, otherwise a store that always misses
    let cache: Arc<dyn CacheStore> = match settings.redis_url.as_deref() {
        Some(url) => {
            tracing::info!("Using Redis cache");
            Arc::new(
                RedisCacheStore::new(url, CACHE_PREFIX, settings.redis_timeout)
                    .expect("Invalid REDIS_URL"),
            )
        }
        None => {
            tracing::info!("REDIS_URL not set; caching disabled");
            Arc::new(NoopCacheStore::new())
        }
    };

    // Availability provider: only with a real API key
    let provider: Option<Arc<dyn AvailabilityProvider>> = match settings.valid_calil_appkey() {
        Some(appkey) => Some(Arc::new(CalilProvider::new(
            http_client.clone(),
            &settings.calil_base,
            appkey,
        ))),
        None => {
            tracing::warn!("CALIL_APPKEY not set; availability will always be pending");
            None
        }
    };

    let book_repository = Arc::new(PostgresBookRepository::new(pool.clone()));

    let app_state = Arc::new(AppState {
        auth: AuthDependencies {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            tokens: Arc::new(TokenIssuer::new(
                &settings.jwt_secret,
                settings.jwt_algorithm,
            )),
        },
        goals: GoalDependencies {
            goals: Arc::new(PostgresGoalRepository::new(pool.clone())),
            books: book_repository,
        },
        availability: AvailabilityDependencies {
            cache,
            directory: Arc::new(StaticLibraryDirectory::new()),
            provider,
            poll_policy: PollPolicy::new(settings.calil_max_polls),
        },
        recommendation: RecommendationDependencies {
            primary: Arc::new(NdlFeed::new(http_client.clone(), &settings.ndl_api_base)),
            secondary: Arc::new(CiniiFeed::new(http_client, &settings.cinii_base)),
        },
        default_city: settings.default_city.clone(),
    });

    let app = create_router(app_state, &settings.allowed_origins);

    // Server configuration
    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
