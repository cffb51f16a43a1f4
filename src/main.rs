mod backend;
mod frontend;
mod utils;

use crate::backend::utils::config::AppConfig;
use crate::frontend::app::main::Route;
use crate::frontend::services::context::LaunchContext;
use crate::utils::logging;
use anyhow::Context;
use clap::Parser;
use dioxus::LaunchBuilder;
use dioxus::prelude::*;
use dioxus_desktop::{Config, LogicalSize, WindowBuilder};
use dioxus_router::Router;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static LAUNCH: OnceLock<LaunchContext> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "businesspro", version, about = "BusinessPro dashboard")]
struct Cli {
    /// Location to start from, e.g. an OAuth callback URL.
    #[arg(long)]
    launch_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    logging::init_from_env();
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    if cfg!(debug_assertions) {
        config.log_summary();
    }
    config.report_problems();

    let launch_url = config
        .launch_url(cli.launch_url.as_deref())
        .context("Cannot determine launch location")?;
    log::info!("Starting BusinessPro at {launch_url}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;
    // Dioxus drives futures on the main thread; reqwest and timers need this runtime.
    let _guard = RUNTIME.get_or_init(|| runtime).enter();

    let _ = LAUNCH.set(LaunchContext { config, launch_url });

    let size = LogicalSize::new(1280.0, 832.0);
    let config = Config::default()
        .with_window(
            WindowBuilder::new()
                .with_title("BusinessPro")
                .with_inner_size(size)
                .with_min_inner_size(LogicalSize::new(480.0, 640.0)),
        )
        .with_menu(None);

    LaunchBuilder::new().with_cfg(config).launch(App);
    Ok(())
}

#[component]
fn App() -> Element {
    let Some(launch) = LAUNCH.get() else {
        return rsx! { "Launch context missing" };
    };
    use_context_provider(|| launch.clone());
    rsx! { Router::<Route> {} }
}
