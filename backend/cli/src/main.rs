use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use zackly_bot::Services;
use zackly_config::Config;
use zackly_core::ReplySink;
use zackly_refine::chat::ChatClient;
use zackly_refine::{CombinedProcessor, Proofreader, Summarizer};
use zackly_slack::{SlackAdapter, SlackClient, SlackConfig, SlackReplySink};
use zackly_stt::{WhisperBackend, WhisperClient};

#[derive(Parser)]
#[command(name = "zackly")]
#[command(about = "zackly — Slack voice-note transcription bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Slack webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
    }
    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    config.validate()?;
    let timeout = Duration::from_secs(config.request_timeout_secs);

    // Remote clients are constructed once and injected into the bot.
    let slack = Arc::new(SlackClient::new(config.slack_bot_token.clone(), timeout));

    let backend = match (&config.whisper_local_endpoint, config.whisper_local_instance) {
        (Some(endpoint), true) => WhisperBackend::SelfHosted {
            endpoint: endpoint.clone(),
        },
        _ => WhisperBackend::Hosted {
            api_key: config.openai_api_key.clone(),
        },
    };
    let whisper = WhisperClient::new(backend, timeout).with_language(&config.whisper_language);

    let chat = Arc::new(ChatClient::new(config.openai_api_key.clone(), timeout));
    let services = Arc::new(Services {
        fetcher: slack.clone(),
        stt: Arc::new(whisper),
        proofreader: Arc::new(Proofreader::new(chat.clone(), &config.openai_model)),
        summarizer: Arc::new(Summarizer::new(chat.clone(), &config.openai_model)),
        processor: Arc::new(CombinedProcessor::new(chat, &config.openai_model)),
    });

    let (events_tx, events_rx) = mpsc::channel(64);
    let adapter = SlackAdapter::new(
        SlackConfig {
            signing_secret: config.slack_signing_secret.clone(),
            webhook_path: config.slack_webhook_path.clone(),
        },
        events_tx,
    );
    let router = adapter.build_router();

    {
        let slack = slack.clone();
        tokio::spawn(zackly_bot::run_worker(events_rx, services, move |event| {
            Arc::new(SlackReplySink::new(slack.clone(), &event.channel)) as Arc<dyn ReplySink>
        }));
    }

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("zackly listening on {addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
