use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use storyboard::illustration::{
    HttpImageService, IllustrationConfig, IllustrationError, PageIllustrationManager, PageKey, parse_pages,
};
use storyboard::imagegen::{self, ImageGenerator};
use storyboard::routes;
use storyboard::state::AppState;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
    #[error("illustration setup failed: {0}")]
    Illustration(#[from] IllustrationError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storyboard", about = "Storyboard page illustration backend and CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the `/generate_image` backend.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8123)]
        port: u16,
    },
    /// Illustrate every page of a storyboard message and print the page views.
    Illustrate(IllustrateArgs),
}

#[derive(Args, Debug)]
struct IllustrateArgs {
    /// File holding the message content, `-` for stdin.
    path: PathBuf,

    #[arg(long)]
    message_id: Option<String>,

    /// Overrides `STORYBOARD_BACKEND_URL`.
    #[arg(long)]
    backend_url: Option<String>,

    /// Overrides `STORYBOARD_ASPECT_RATIO`.
    #[arg(long)]
    aspect_ratio: Option<String>,

    /// Overrides `STORYBOARD_IMAGE_SIZE`.
    #[arg(long)]
    image_size: Option<String>,

    /// Regenerate a page with a new prompt after the first pass: `PAGE_ID=PROMPT`.
    #[arg(long = "edit", value_parser = parse_edit)]
    edits: Vec<(i64, String)>,

    /// Show an older version of a page at the end: `PAGE_ID=INDEX`.
    #[arg(long = "select", value_parser = parse_select)]
    selects: Vec<(i64, usize)>,
}

fn parse_edit(raw: &str) -> Result<(i64, String), String> {
    let (id, prompt) = raw.split_once('=').ok_or("expected PAGE_ID=PROMPT")?;
    let id = id.trim().parse::<i64>().map_err(|e| format!("invalid page id: {e}"))?;
    Ok((id, prompt.to_string()))
}

fn parse_select(raw: &str) -> Result<(i64, usize), String> {
    let (id, index) = raw.split_once('=').ok_or("expected PAGE_ID=INDEX")?;
    let id = id.trim().parse::<i64>().map_err(|e| format!("invalid page id: {e}"))?;
    let index = index.trim().parse::<usize>().map_err(|e| format!("invalid version index: {e}"))?;
    Ok((id, index))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve { port } => serve(port).await,
        Command::Illustrate(args) => illustrate(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "storyboard failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(port: u16) -> Result<(), CliError> {
    // Non-fatal: generation answers 503 until a key is configured.
    let generator: Option<Arc<dyn ImageGenerator>> = match imagegen::from_env() {
        Ok(client) => {
            info!(model = client.model(), "image generator initialized");
            Some(Arc::new(client) as Arc<dyn ImageGenerator>)
        }
        Err(e) => {
            warn!(error = %e, "image generator not configured, generation disabled");
            None
        }
    };

    let app = routes::app(AppState::new(generator));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| CliError::Bind { port, source })?;

    info!(%port, "storyboard backend listening");
    axum::serve(listener, app).await.map_err(CliError::Serve)
}

async fn illustrate(args: IllustrateArgs) -> Result<(), CliError> {
    let content = read_content(&args.path)?;
    let Some(pages) = parse_pages(&content) else {
        info!("message is plain text; nothing to illustrate");
        println!("{content}");
        return Ok(());
    };

    let mut config = IllustrationConfig::from_env()?;
    if let Some(url) = args.backend_url {
        config.backend_url = url.trim_end_matches('/').to_string();
    }
    if let Some(ratio) = args.aspect_ratio {
        config.aspect_ratio = ratio;
    }
    if let Some(size) = args.image_size {
        config.image_size = size;
    }

    let service = Arc::new(HttpImageService::new(&config)?);
    let mut pim = PageIllustrationManager::new(service, config);
    let message_id = args.message_id.as_deref();

    let started = pim.observe_message(message_id, &pages);
    info!(pages = pages.len(), started, "illustrating storyboard");
    pim.settle().await;

    for (page_id, prompt) in &args.edits {
        let Some(page) = pages.iter().find(|p| p.id == *page_id) else {
            warn!(page_id, "edit for unknown page ignored");
            continue;
        };
        let key = PageKey::for_message(message_id, page.id);
        pim.set_draft(&key, prompt);
        pim.submit(&key, &page.detail);
    }
    pim.settle().await;

    for (page_id, index) in &args.selects {
        let key = PageKey::for_message(message_id, *page_id);
        if !pim.select_version(&key, *index) {
            warn!(%key, index, "version selection out of range");
        }
    }

    println!("{}", serde_json::to_string_pretty(&pim.views(message_id, &pages))?);
    Ok(())
}

fn read_content(path: &Path) -> Result<String, CliError> {
    let read_err = |source| CliError::Read { path: path.display().to_string(), source };
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(read_err)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(read_err)
    }
}
