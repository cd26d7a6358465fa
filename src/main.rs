use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yoga_api::{
    create_router, session::PostgresSessionRepository, teacher::PostgresTeacherRepository,
    user::PostgresUserRepository, AppConfig, AppState, TokenAuthority,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yoga_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting yoga studio booking server");

    let config = AppConfig::from_env()?;
    let token_authority = Arc::new(TokenAuthority::new(config.token.clone()));

    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Connected to PostgreSQL and applied migrations");

            AppState::new(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresTeacherRepository::new(pool.clone())),
                Arc::new(PostgresSessionRepository::new(pool)),
                token_authority,
            )
        }
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");
            AppState::in_memory(token_authority)
        }
    };

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server running on http://{}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
