use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dashboard_core::{
    Action, Config, Dashboard, GeoCoordinates, SearchOutcome,
    geolocation::{FixedPosition, Geolocator},
    provider::{WeatherService, service_from_config},
    settings::Dispatched,
    store::{FileStore, KeyValueStore},
};
use inquire::{Confirm, CustomType, Password, Select, Text};

use crate::terminal;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the AccuWeather API key and, optionally, this device's position.
    Configure,

    /// Resolve the location, fetch the forecast and draw the dashboard.
    Show {
        /// Print the view tree as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Latitude to geolocate with on first run (overrides config).
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude to geolocate with on first run (overrides config).
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List locations matching a search text.
    Search {
        /// Beginning of a city name.
        query: String,
    },

    /// Pick a different location interactively and redraw.
    Settings,

    /// Print the saved location.
    Location,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { json, lat, lon } => {
                let position = lat.zip(lon).map(|(latitude, longitude)| GeoCoordinates { latitude, longitude });
                let dashboard = build_dashboard(position)?;

                if dashboard.start().await.is_err() {
                    return Ok(ExitCode::FAILURE);
                }
                print_view(&dashboard, json)
            }
            Command::Search { query } => {
                let mut settings = build_dashboard(None)?.settings();

                match settings.on_search_input(&query).await {
                    Ok(SearchOutcome::Updated(0)) => println!("No locations match '{query}'."),
                    Ok(_) => {
                        for candidate in settings.candidates() {
                            println!("{}  ({})", candidate.label, candidate.key);
                        }
                    }
                    Err(_) => return Ok(ExitCode::FAILURE),
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Settings => pick_location().await,
            Command::Location => {
                let dashboard = build_dashboard(None)?;
                match dashboard.location()? {
                    Some(location) => println!("{}  ({})", location.label, location.key),
                    None => println!("No location saved yet; `weather-dashboard show` will pick one."),
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_dashboard(position: Option<GeoCoordinates>) -> anyhow::Result<Arc<Dashboard>> {
    let config = Config::load()?;
    let service: Arc<dyn WeatherService> = service_from_config(&config)?.into();

    let store_path = Config::location_store_path()?;
    let kv: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::open(&store_path)
            .with_context(|| format!("Failed to open location store: {}", store_path.display()))?,
    );

    let geolocator = position
        .or(config.position)
        .map(|p| Arc::new(FixedPosition(p)) as Arc<dyn Geolocator>);

    Ok(Arc::new(Dashboard::new(service, kv, geolocator, terminal::ui())))
}

fn print_view(dashboard: &Dashboard, json: bool) -> anyhow::Result<ExitCode> {
    let Some(view) = dashboard.current_view() else {
        return Ok(ExitCode::FAILURE);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view).context("Failed to serialize view")?);
    } else {
        print!("{}", terminal::view_to_text(&view));
    }
    Ok(ExitCode::SUCCESS)
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("AccuWeather API key:")
        .without_confirmation()
        .with_help_message("Create one at https://developer.accuweather.com")
        .prompt()?;
    config.api_key = Some(api_key.trim().to_string());

    let language = Text::new("Response language:")
        .with_default(config.language.as_deref().unwrap_or("en-us"))
        .prompt()?;
    config.language = Some(language);

    let use_position = Confirm::new("Set this device's position for geolocation?")
        .with_default(config.position.is_some())
        .prompt()?;
    config.position = if use_position {
        let latitude = CustomType::<f64>::new("Latitude:").prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:").prompt()?;
        Some(GeoCoordinates { latitude, longitude })
    } else {
        None
    };

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(ExitCode::SUCCESS)
}

async fn pick_location() -> anyhow::Result<ExitCode> {
    let dashboard = build_dashboard(None)?;
    let mut settings = dashboard.settings();

    let query = Text::new("Location:")
        .with_initial_value(settings.input())
        .with_placeholder("Type to search...")
        .prompt()?;
    settings.set_input(query);

    if settings.dispatch(Action::SearchInput).await.is_err() {
        return Ok(ExitCode::FAILURE);
    }
    if settings.candidates().is_empty() {
        println!("No locations match '{}'.", settings.input());
        return Ok(ExitCode::FAILURE);
    }

    let labels: Vec<String> = settings.candidates().iter().map(|c| c.label.clone()).collect();
    let choice = Select::new("Pick a location:", labels).prompt()?;
    settings.set_input(choice);

    match settings.dispatch(Action::SaveSettings).await {
        Ok(Dispatched::Saved(_)) => print_view(&dashboard, false),
        Ok(_) | Err(_) => Ok(ExitCode::FAILURE),
    }
}
