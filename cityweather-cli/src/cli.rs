use anyhow::{Context, anyhow};
use cityweather_core::{
    Config, FetchPhase, WeatherRepository, WeatherViewModel, config::API_KEY_ENV,
};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tokio::task::JoinHandle;

use crate::{locate, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure {
        /// Forget the stored answer to the location permission prompt.
        #[arg(long)]
        reset_location: bool,
    },

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Nagpur" or "London,GB".
        city: String,
    },

    /// Show current weather where you are.
    Locate {
        /// Latitude; without it the position is estimated from your IP address.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Some(command) = self.command else {
            render::welcome();
            return Ok(());
        };

        let mut config = Config::load()?;
        tracing::debug!(base_url = config.base_url(), "loaded configuration");

        match command {
            Command::Configure { reset_location } => configure(&mut config, reset_location),
            Command::Show { city } => {
                let vm = view_model(&config);
                vm.update_city_name(&city);
                let task = vm.get_forecast();
                drive(&vm, task, interrupted()).await
            }
            Command::Locate { lat, lon } => locate::run(&mut config, lat.zip(lon)).await,
        }
    }
}

fn configure(config: &mut Config, reset_location: bool) -> anyhow::Result<()> {
    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;

    if !key.trim().is_empty() {
        config.set_api_key(&key);
    }
    if reset_location {
        config.set_location_consent(None);
    }

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());

    if config.stored_api_key().is_none() {
        println!("No API key stored. Set {API_KEY_ENV} or run `cityweather configure` again.");
    }

    Ok(())
}

pub(crate) fn view_model(config: &Config) -> WeatherViewModel {
    let repo = WeatherRepository::open_weather(config.base_url());
    WeatherViewModel::new(repo, config.api_key().unwrap_or_default())
}

/// Resolves on Ctrl-C; never, if the handler cannot be installed.
pub(crate) async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Render state changes and notifications until `task` finishes, then print
/// the final state. If `interrupt` resolves first the fetch is cancelled.
pub(crate) async fn drive(
    vm: &WeatherViewModel,
    mut task: JoinHandle<()>,
    interrupt: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let mut states = vm.watch_state();
    let mut events = vm.events().subscribe().await;
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            res = &mut task => {
                res.context("Weather fetch task failed")?;
                break;
            }
            () = &mut interrupt => {
                vm.cancel();
                render::cancelled();
                return Ok(());
            }
            Ok(()) = states.changed() => {
                let state = states.borrow_and_update().clone();
                if state.is_loading() {
                    render::loading(&state.city_name);
                }
            }
            Some(event) = events.recv() => render::event(&event),
        }
    }

    for event in events.drain() {
        render::event(&event);
    }

    let state = vm.state();
    match &state.phase {
        FetchPhase::Success(forecast) => {
            render::forecast(forecast);
            Ok(())
        }
        FetchPhase::Failed(failure) => Err(anyhow!(failure.message())),
        FetchPhase::Idle | FetchPhase::Loading => Ok(()),
    }
}
