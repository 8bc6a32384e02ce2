use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use devchat::core::config::{DevchatConfig, EnvOverrides, load_config, resolve};
use devchat::core::state::App;
use devchat::inference::create_session;
use devchat::{render, tui};

#[derive(Parser)]
#[command(name = "devchat", about = "Terminal chat assistant for software development")]
struct Args {
    /// Model to use (overrides DEVCHAT_MODEL and the config file)
    #[arg(short, long)]
    model: Option<String>,

    /// Config file to read instead of ~/.devchat/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the transcript as an HTML page to this path on exit
    #[arg(long)]
    export_html: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "devchat.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The terminal belongs to the TUI, so logs only go to the file.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    info!("devchat starting up");

    let config = load_config(args.config.as_deref()).unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        DevchatConfig::default()
    });
    let resolved = resolve(&config, &EnvOverrides::from_env(), args.model.as_deref());
    info!("Using model: {}", resolved.model_name);

    let session = create_session(&resolved.session_config());
    let mut app = App::new(session, resolved.model_name.clone());

    tui::run(&mut app)?;

    if let Some(path) = &args.export_html {
        render::export_html(path, &app.model_name, &app.transcript)?;
    }

    info!("devchat shut down");
    Ok(())
}
