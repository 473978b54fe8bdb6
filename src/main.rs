use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use voice_session::{
    create_router, wait_for_outcome, AppState, ChannelHandler, Config, FileAudioInput,
    ScriptedRecognizer, VoiceEvent, VoiceSessionController,
};

#[derive(Parser)]
#[command(name = "voice-session", version, about = "Voice session orchestration")]
struct Cli {
    /// Config file (without extension is fine: config/voice-session)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the loopback transcription endpoint
    Serve,

    /// Run one voice session from a recognition script
    Simulate {
        /// Recognition script (JSON)
        #[arg(long)]
        script: PathBuf,

        /// Recording replayed as microphone input
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Hand final transcripts off to this endpoint
        #[arg(long)]
        backend: Option<String>,

        #[arg(long)]
        user_id: Option<String>,

        /// Give up and tear down after this many seconds
        #[arg(long, default_value_t = 30)]
        max_secs: u64,

        /// Quiet period after a session ends without a final transcript
        #[arg(long, default_value_t = 2000)]
        settle_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Serve => serve(&cfg).await,
        Command::Simulate {
            script,
            audio,
            backend,
            user_id,
            max_secs,
            settle_ms,
        } => {
            simulate(
                &cfg,
                script,
                audio,
                backend,
                user_id,
                Duration::from_secs(max_secs),
                Duration::from_millis(settle_ms),
            )
            .await
        }
    }
}

async fn serve(cfg: &Config) -> Result<()> {
    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Loopback transcription endpoint listening on http://{}/api/process", addr);

    axum::serve(listener, create_router(AppState::new()))
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn simulate(
    cfg: &Config,
    script: PathBuf,
    audio: Option<PathBuf>,
    backend: Option<String>,
    user_id: Option<String>,
    max_wait: Duration,
    settle: Duration,
) -> Result<()> {
    let mut session_config = cfg.session_config();
    if let Some(endpoint) = backend {
        session_config.use_backend_transcription = true;
        session_config.api_endpoint = Some(endpoint);
    }
    if user_id.is_some() {
        session_config.user_id = user_id;
    }

    let recognizer = ScriptedRecognizer::from_file(&script)?;
    let input = match audio {
        Some(path) => FileAudioInput::new(path),
        None => FileAudioInput::none(),
    };

    let (handler, mut events) = ChannelHandler::new();
    let (controller, handle) = VoiceSessionController::new(
        session_config,
        Box::new(recognizer),
        Box::new(input),
        Box::new(handler),
    )?;

    let run_task = tokio::spawn(controller.run());

    handle.toggle();

    let outcome = tokio::time::timeout(
        max_wait,
        wait_for_outcome(&handle, &mut events, settle, print_event),
    )
    .await;

    match outcome {
        Ok(true) => info!("Session finished"),
        Ok(false) => warn!("Session ended without a final transcript"),
        Err(_) => warn!("Session did not finish within {:?}, tearing down", max_wait),
    }

    handle.teardown();
    run_task.await.context("Controller task panicked")?;

    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }

    Ok(())
}

fn print_event(event: &VoiceEvent) {
    match event {
        VoiceEvent::Transcript { text, is_final } => {
            println!("transcript ({}): {}", if *is_final { "final" } else { "partial" }, text)
        }
        VoiceEvent::BackendResponse(payload) => println!("backend response: {}", payload),
        VoiceEvent::VoiceStart => println!("voice start"),
        VoiceEvent::VoiceEnd => println!("voice end"),
        VoiceEvent::Error(message) => println!("error: {}", message),
    }
}
