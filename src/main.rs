use hecs_shooter::shooter::{ShooterConfig, ShooterPlugin};
use hecs_shooter::{App, EnginePlugin};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    #[cfg(feature = "profile")]
    let _guard = start_profiling();

    let config = ShooterConfig::from_args(std::env::args().nth(1))?;
    let mut builder = App::builder();
    builder
        .plugin(EnginePlugin {
            title: config.window.title.clone(),
            window_width: config.window.width,
            window_height: config.window.height,
            tick_duration: config.tick_duration(),
        })
        .plugin(ShooterPlugin { config });
    builder.run()
}

/// Writes spans to a trace file viewable in chrome://tracing.
#[cfg(feature = "profile")]
fn start_profiling() -> tracing_chrome::FlushGuard {
    use tracing_subscriber::prelude::*;
    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
    tracing_subscriber::registry().with(chrome_layer).init();
    guard
}
