mod app;
mod config;

use crate::app::App;
use crate::config::DioramaConfig;
use anyhow::Result;
use diorama_runtime::Graphics;
use log::info;
use winit::event_loop::{DeviceEvents, EventLoop};

fn run_app(event_loop: EventLoop<Graphics>, mut app: App) -> Result<()> {
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() -> Result<()> {
    let path = DioramaConfig::path();

    if std::env::args().skip(1).any(|arg| arg == "--write-config") {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        DioramaConfig::write_default(&path)?;
        info!("wrote default config to {}", path.display());
        return Ok(());
    }

    let config = DioramaConfig::load(&path)?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();
    if !path.exists() {
        info!("{} not found, using defaults", path.display());
    }

    let event_loop = EventLoop::<Graphics>::with_user_event().build()?;
    event_loop.listen_device_events(DeviceEvents::Always);

    let app = App::new(&event_loop, config);
    run_app(event_loop, app)
}
