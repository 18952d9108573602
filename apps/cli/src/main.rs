mod args;
mod config;
mod dirs;

use std::io;
use std::net::SocketAddr;
use std::process::Command;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use app_api::AppContext;
use detect::{HttpImageFetcher, RemoteClassifier, RemoteInsightGenerator};
use http_api::HttpState;
use lens_app::{AppPaths, AppState, ExternalClients, ensure_app_data_dir};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        println!(
            "Created config at {} (default port {}).",
            config.paths.file.display(),
            config.config.port
        );
    }

    let data_dir = dirs::resolve_data_dir().map_err(io::Error::other)?;
    if data_dir.matched_existing {
        println!("Using existing data dir: {}", data_dir.dir.display());
    } else {
        println!("Using data dir: {}", data_dir.dir.display());
    }

    let port = args.port.unwrap_or(config.config.port);

    let paths = AppPaths::new(data_dir.dir.clone());
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;

    let clients = build_clients(&config.config).map_err(io::Error::other)?;
    let app_state = AppState::new(paths.db_path, clients);
    if let Err(err) = app_state.initialize() {
        return Err(io::Error::other(format!("failed to initialize database: {}", err)).into());
    }

    let context = AppContext {
        app_state,
        app_data_dir: data_dir.dir,
    };

    let state = HttpState::new(context);
    let router = http_api::router(state);

    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    let url = format!("http://127.0.0.1:{actual_port}");

    if used_fallback {
        eprintln!("Configured port {port} was unavailable; using {actual_port} for this run.");
    }

    println!("VerityLens is running at {url}");
    println!("Press Ctrl+C to stop.");

    if !args.no_open {
        if let Err(err) = open_url(&url) {
            eprintln!("failed to open browser: {}", err);
        }
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_clients(config: &config::CliConfig) -> Result<ExternalClients, String> {
    let base = config.model_base_url.trim_end_matches('/');
    let api_key = std::env::var("VERITYLENS_API_KEY")
        .ok()
        .or_else(|| config.api_key.clone());

    let classifier = RemoteClassifier::new(format!("{base}/v1/analyze-image"), api_key.clone())
        .map_err(|err| format!("build classifier client: {}", err))?;
    let fetcher =
        HttpImageFetcher::new().map_err(|err| format!("build image fetcher: {}", err))?;
    let insights =
        RemoteInsightGenerator::new(format!("{base}/v1/usage-insights"), api_key)
            .map_err(|err| format!("build insight client: {}", err))?;

    Ok(ExternalClients {
        classifier: Arc::new(classifier),
        fetcher: Arc::new(fetcher),
        insights: Arc::new(insights),
    })
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

fn open_url(url: &str) -> Result<(), io::Error> {
    let status = Command::new("open").arg(url).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other("open command failed"))
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
