use clap::Parser;
use shoutbox::app_state::AppState;
use shoutbox::http::setup_http_server;
use shoutbox::init_telemetry::init_telemetry_and_tracing;
use shoutbox::scheduler::setup_scheduler;
use tokio::time::sleep;
use tracing::info;

#[derive(Parser)]
#[command(name = "shoutbox")]
#[command(about = "Threaded shoutbox service with flood control and a profanity filter")]
#[clap(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
enum Commands {
    /// Show current configuration and exit
    Config,
    /// Start the shoutbox server (default)
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local first, dotenvy never overrides variables that are already set.
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Commands::Config) = cli.command {
        let app_state = AppState::new_for_config_only()?;
        println!("{:#?}", &app_state.settings);
        return Ok(());
    }

    let mut handles = vec![];

    let app_state = AppState::new().await?;
    init_telemetry_and_tracing(&app_state.settings.telemetry)?;

    // Setup http server.
    {
        let handle = setup_http_server(
            app_state.clone(),
            &app_state.settings.api.bind_address,
            app_state.settings.traces_enabled(),
        )
        .await?;

        handles.push(handle);
    }

    // Setup housekeeping.
    {
        let handle = setup_scheduler(app_state.clone()).await?;
        handles.push(handle);
    }

    sleep(std::time::Duration::from_millis(100)).await;

    loop {
        handles.retain(|handle| !handle.is_finished());

        if handles.is_empty() {
            info!("All tasks are done");
            break;
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    }

    Ok(())
}
