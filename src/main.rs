use domain::device_shutoff::DeviceDirectory;
use log::{error, info};
use service::{config::Config, logging::Logger};
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!(
        "Starting Leo automation service [{}]...",
        config.runtime_env()
    );

    let app_state = match AppState::new(config, DeviceDirectory::from_env()) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to initialize application state: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(app_state).await {
        error!("Server terminated: {e}");
        std::process::exit(1);
    }
}
