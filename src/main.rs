mod astro_math;
pub mod config;
mod console;
mod tracker;
mod util;

use config::Config;
use console::Console;
use eyre::WrapErr;
use tracker::AstroProvider;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let config: Config =
        confy::load_path("config.toml").wrap_err("Couldn't parse configuration")?;
    let tracker_config = config.validate()?;
    let calibration = &tracker_config.calibration;
    tracing::info!(
        "Pan servo covers azimuth {}..{} over {} degrees",
        calibration.window().start(),
        calibration.window().end(),
        calibration.servo_max_deg()
    );
    let transport = config.com_settings.transport_builder().open()?;
    tracing::info!("Streaming frames to {}", transport.path());

    Console::new(&tracker_config, &AstroProvider, transport)
        .run()
        .await?;
    Ok(())
}
