//! Guided Consult server binary.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use guided_consult::adapters::http::{app_router, ConsultationAppState};
use guided_consult::adapters::{InMemorySessionStore, OpenAIConfig, OpenAIProvider};
use guided_consult::application::{
    ConsultationService, DialogueController, DialogueSettings, HealthTipGenerator,
    SuggestionGenerator, TipBoard,
};
use guided_consult::config::AppConfig;
use guided_consult::domain::consultation::{HeadingReportDetector, InterviewProfile};
use guided_consult::ports::AIProvider;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        eprintln!(
            "Invalid configuration: {}\n\
             Set GUIDED_CONSULT__AI__API_KEY to your completion service key \
             (a .env file in the working directory is read too).",
            e
        );
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = config
        .ai
        .api_key()
        .cloned()
        .ok_or("completion service key is missing")?;
    let provider: Arc<dyn AIProvider> = Arc::new(OpenAIProvider::new(
        OpenAIConfig::from_secret(api_key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?);

    let profile = Arc::new(
        InterviewProfile::wellness()
            .as_ref()
            .clone()
            .with_extra_headings(config.interview.report_headers_list()),
    );
    let detector = Arc::new(HeadingReportDetector::new(profile.report_headings.iter()));

    let controller = DialogueController::new(
        Arc::clone(&provider),
        SuggestionGenerator::new(Arc::clone(&provider))
            .with_temperature(config.ai.suggestion_temperature)
            .with_timeout(config.ai.side_call_timeout()),
        detector,
        DialogueSettings {
            temperature: config.ai.dialogue_temperature,
            stream: config.ai.stream,
            response_timeout: config.interview.response_timeout(),
        },
    );
    let service = ConsultationService::new(
        Arc::new(InMemorySessionStore::new()),
        controller,
        profile,
        config.interview.turn_limit()?,
    );
    let tips = Arc::new(TipBoard::new(
        HealthTipGenerator::new(Arc::clone(&provider))
            .with_temperature(config.ai.tip_temperature)
            .with_timeout(config.ai.side_call_timeout()),
    ));

    let app = app_router(ConsultationAppState::new(service, tips), &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        model = %config.ai.model,
        environment = ?config.server.environment,
        "Guided Consult listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
