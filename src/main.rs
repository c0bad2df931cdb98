use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;

mod api;
mod config;
mod docs;
mod error;
mod model;
mod notify;
mod reminder;
mod repository;
mod routes;
mod sheets;
mod storage;

use config::{Config, StoreBackend};

use crate::docs::ApiDoc;
use crate::notify::smtp::SmtpNotifier;
use crate::notify::{LogNotifier, Notifier, Outbox, RetryPolicy};
use crate::repository::{Clock, Repository};
use crate::sheets::google::GoogleSheetsStore;
use crate::sheets::memory::MemoryStore;
use crate::sheets::{ServiceAccountKey, TabularStore};
use crate::storage::{BlobStorage, OpendalStorage};
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Employee portal is running"
}

async fn build_store(backend: &StoreBackend) -> anyhow::Result<Arc<dyn TabularStore>> {
    match backend {
        StoreBackend::Google {
            spreadsheet_id,
            credentials_path,
            api_base,
            timeout,
        } => {
            let key = ServiceAccountKey::from_file(credentials_path).map_err(|e| {
                anyhow::anyhow!("cannot read credentials {}: {e}", credentials_path.display())
            })?;
            info!(spreadsheet = %spreadsheet_id, "Using Google Sheets store");
            Ok(Arc::new(GoogleSheetsStore::new(
                api_base,
                spreadsheet_id.as_str(),
                key,
                *timeout,
            )?))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::with_portal_sheets().await))
        }
    }
}

fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "Email notifications via SMTP");
            Ok(Arc::new(SmtpNotifier::new(smtp)?))
        }
        None => {
            warn!("SMTP_HOST not set, notifications are only logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

fn startup_error(e: anyhow::Error) -> std::io::Error {
    error!(error = %e, "Startup failed");
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = build_store(&config.store).await.map_err(startup_error)?;
    let notifier = build_notifier(&config).map_err(startup_error)?;
    let blobs: Arc<dyn BlobStorage> =
        Arc::new(OpendalStorage::from_config(&config.storage).map_err(startup_error)?);

    let (outbox, outbox_rx) = Outbox::channel();
    let policy = RetryPolicy {
        max_attempts: config.notify_max_attempts,
        backoff: config.notify_backoff,
    };
    actix_web::rt::spawn(notify::run_dispatcher(outbox_rx, notifier, policy));

    let repo = Data::new(Repository::new(
        store,
        outbox,
        Clock::Zone(config.reminder.timezone),
    ));

    if config.reminder.enabled {
        actix_web::rt::spawn(reminder::run(repo.clone().into_inner(), config.reminder.clone()));
    } else {
        info!("Timesheet reminder disabled");
    }

    let blobs = Data::from(blobs);
    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, prefix = %config.api_prefix, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets match
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(repo.clone())
            .app_data(blobs.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
