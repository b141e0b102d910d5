mod app;
mod backend;
mod config;
mod event;
mod session;
mod theme;
mod turn;
mod ui;

use app::HelpdeskApp;
use backend::http::HttpChatBackend;
use backend::ChatClient;
use clap::Parser;
use config::ChatConfig;
use eframe::egui;
use std::sync::{mpsc, Arc};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ChatConfig::parse();
    config.validate()?;
    tracing::info!(api_url = %config.api_url, "starting helpdesk chat");

    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("helpdesk-runtime")
        .build()?;

    let backend = HttpChatBackend::new(&config.api_url, config.request_timeout())?
        .with_health_timeout(config.health_interval());
    let client = ChatClient::new(
        Arc::new(backend),
        tx,
        runtime.handle().clone(),
        config.health_interval(),
    );
    client.start();

    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Customer Support")
            .with_inner_size([480.0, 720.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Customer Support",
        native_options,
        Box::new(move |creation_context| {
            Ok(Box::new(HelpdeskApp::new(
                rx,
                client,
                &creation_context.egui_ctx,
            )))
        }),
    )?;

    Ok(())
}
