/*
 * Responsibility
 * - Config読み込み → 依存生成 (PgPool / Store / Authorizer) → Router 組み立て
 * - tracing と panic hook の初期化
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::pg::PgStore,
    services::authz::StaticRoleAuthorizer,
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,orgscope=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Reading an unresolved request value panics; surface it through
        // tracing so it is never lost.
        tracing::error!(?info, "panic");

        // In development, fail fast: a misordered middleware chain should
        // crash the process, not a single request.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(StaticRoleAuthorizer),
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router, config.request_timeout)
}
