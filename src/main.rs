use crate::app::App;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use log::LevelFilter;
use simple_logger::SimpleLogger;

mod app;
mod color;
mod config;
mod error;
mod input;
mod renderers;
mod stroke;
mod user_interface;
mod vulkan;

fn main() -> eyre::Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Trace).init()?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    log::set_max_level(config.level_filter()?);

    let (mut app, event_loop) = App::new(config)?;
    event_loop.run(move |event, _, control_flow| app.on_event(event, control_flow));
}
