use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use jarvis::api::middleware::SessionCookie;
use jarvis::cli::{commands::{Cli, Commands}, run_cli};
use jarvis::config::AppConfig;
use jarvis::llm::ProviderFactory;
use jarvis::page::PageController;
use jarvis::session::SessionStore;
use tracing::{error, info};

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

async fn index() -> impl Responder {
    let html = include_str!("../static/index.html");
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if !matches!(cli.command, Commands::Serve) {
        if let Err(e) = run_cli(cli.command, config).await {
            error!("{}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    info!("Starting Jarvis image chatbot...");

    let llm_provider = match ProviderFactory::create_default(&config) {
        Some(p) => p,
        None => {
            error!("Unknown LLM provider '{}'", config.llm.provider);
            std::process::exit(1);
        }
    };

    info!(
        "Using {} model {} with a {}s idle timeout",
        llm_provider.name(),
        config.llm.gemini.model,
        config.chat.idle_timeout_secs
    );

    let controller = PageController::from_config(llm_provider, &config);
    let store = SessionStore::new();

    let max_upload_bytes = config.chat.max_upload_bytes;
    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(controller.clone()))
            .app_data(jarvis::api::routes::json_config(max_upload_bytes))
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .wrap(SessionCookie)
            .configure(jarvis::api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
