use std::{net::SocketAddr, process, sync::Arc};

use bottega::{
    application::{
        catalog::CatalogService,
        coupons::CouponService,
        error::AppError,
        orders::OrderService,
        repos::{
            CouponsRepo, CouponsWriteRepo, OrdersRepo, OrdersWriteRepo, ProductsRepo,
            ProductsWriteRepo, UsersRepo, UsersWriteRepo,
        },
        statistics::StatisticsService,
        users::UserService,
    },
    cache::{CacheConfig, CacheConsumer, CacheTrigger, EventQueue, ViewStore},
    config,
    infra::{db::PostgresRepositories, error::InfraError, http, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    run_serve(settings).await
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = PostgresRepositories::connect(
        &settings.database.url,
        settings.database.max_connections,
    )
    .await
    .map_err(|err| InfraError::database(format!("failed to connect: {err}")))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(format!("failed to run migrations: {err}")))?;

    let repositories = PostgresRepositories::new(pool);

    // Cache plumbing: one store, one queue, one consumer, one trigger,
    // owned here and shared by handle.
    let cache_config = CacheConfig::from(&settings.cache);
    let views = Arc::new(ViewStore::new(&cache_config));
    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(CacheConsumer::new(
        cache_config.clone(),
        Arc::clone(&views),
        Arc::clone(&queue),
    ));
    let trigger = Arc::new(CacheTrigger::new(
        cache_config.clone(),
        Arc::clone(&queue),
        Arc::clone(&consumer),
    ));

    let products: Arc<dyn ProductsRepo> = Arc::new(repositories.clone());
    let products_write: Arc<dyn ProductsWriteRepo> = Arc::new(repositories.clone());
    let orders: Arc<dyn OrdersRepo> = Arc::new(repositories.clone());
    let orders_write: Arc<dyn OrdersWriteRepo> = Arc::new(repositories.clone());
    let users: Arc<dyn UsersRepo> = Arc::new(repositories.clone());
    let users_write: Arc<dyn UsersWriteRepo> = Arc::new(repositories.clone());
    let coupons: Arc<dyn CouponsRepo> = Arc::new(repositories.clone());
    let coupons_write: Arc<dyn CouponsWriteRepo> = Arc::new(repositories.clone());

    let state = http::AppState {
        catalog: CatalogService::new(
            Arc::clone(&products),
            Arc::clone(&products_write),
            Arc::clone(&views),
            Arc::clone(&trigger),
        ),
        orders: OrderService::new(
            Arc::clone(&orders),
            orders_write,
            Arc::clone(&products),
            products_write,
            Arc::clone(&views),
            Arc::clone(&trigger),
            settings.pricing.clone(),
        ),
        users: UserService::new(Arc::clone(&users), users_write, Arc::clone(&trigger)),
        coupons: CouponService::new(coupons, coupons_write),
        statistics: StatisticsService::new(products, orders, users, views),
        repositories: repositories.clone(),
    };

    // Sweep events the immediate-consume path missed (eventual consistency
    // safety net; the write paths consume synchronously).
    let sweep_handle = {
        let consumer = Arc::clone(&consumer);
        let interval_ms = cache_config.auto_consume_interval_ms;
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_millis(interval_ms));
            interval.tick().await; // Skip the first immediate tick
            loop {
                interval.tick().await;
                consumer.consume().await;
            }
        })
    };

    let router = http::build_router(state);
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .map_err(|err| AppError::unexpected(format!("invalid listen address: {err}")))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::from(InfraError::Io(err)))?;
    info!(%addr, "bottega listening");

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")));

    sweep_handle.abort();
    let _ = sweep_handle.await;

    result
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
