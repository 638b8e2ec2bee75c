use std::{str::FromStr, sync::Arc, time::Duration};

use clinic_bin::ClinicState;
use service_impl::notification::{
    run_notification_worker, ChannelNotificationService, LogNotificationDispatcher,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
#[cfg(feature = "json_logging")]
use tracing_subscriber::fmt::format::FmtSpan;

const DEFAULT_DATABASE_URL: &str = "sqlite:./clinic.sqlite3";

#[tokio::main]
async fn main() {
    let version = env!("CARGO_PKG_VERSION");

    #[cfg(feature = "local_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .pretty()
        .with_file(true)
        .finish();

    #[cfg(feature = "json_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_span_list(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    tracing::info!("Clinic slot engine version: {}", version);
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let connect_options = SqliteConnectOptions::from_str(&database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);
    let pool = Arc::new(
        SqlitePoolOptions::new()
            .connect_with(connect_options)
            .await
            .expect("Could not connect to database"),
    );

    sqlx::migrate!("../migrations/sqlite")
        .run(pool.as_ref())
        .await
        .expect("Failed to run migrations");

    let (notification_service, receiver) = ChannelNotificationService::channel();
    let worker = tokio::spawn(run_notification_worker(
        receiver,
        Arc::new(LogNotificationDispatcher),
    ));
    let clinic_state = ClinicState::new(pool.clone(), Arc::new(notification_service));
    tracing::info!("Clinic slot engine ready on {}", database_url);

    tokio::signal::ctrl_c()
        .await
        .expect("Could not listen for shutdown signal");
    tracing::info!("Shutting down");

    drop(clinic_state);
    if let Err(err) = worker.await {
        tracing::error!("Notification worker failed: {}", err);
    }
    pool.close().await;
}
