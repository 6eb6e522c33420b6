use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use weatherapp_core::{Config, ResultState, StateStream};

use crate::view;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherapp", version, about = "Current weather for your city")]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key.
    Configure {
        /// Only print where the config file lives.
        #[arg(long)]
        show_path: bool,
    },

    /// Show current weather once.
    Show {
        /// City name; if absent, the city is looked up from your IP address.
        city: Option<String>,

        /// Print the report as JSON instead of the detail view.
        #[arg(long)]
        json: bool,
    },

    /// Locate, show weather, then keep asking for cities to search.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { show_path } => configure(show_path),
            Command::Show { city, json } => show(city, json).await,
            Command::Interactive => interactive().await,
        }
    }
}

fn configure(show_path: bool) -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    if show_path {
        println!("{}", path.display());
        return Ok(());
    }

    let mut config = Config::load()?;
    let api_key = Password::new("WeatherAPI.com key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Create one at https://www.weatherapi.com/my/")
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(city: Option<String>, json: bool) -> anyhow::Result<()> {
    let session = Config::load()?.build_session()?;
    let mut states = session.subscribe();

    match city {
        Some(city) => {
            session.fetch_weather(city);
        }
        None => {
            if !json {
                println!("{}", view::LOCATING);
            }
            session.bootstrap();
        }
    }

    let last = follow(&mut states, !json).await?;
    match last {
        ResultState::Success(report) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        ResultState::Success(_) => Ok(()),
        ResultState::Error(msg) => Err(anyhow!(msg)),
        other => Err(anyhow!("request ended in unexpected state: {}", other.name())),
    }
}

async fn interactive() -> anyhow::Result<()> {
    let session = Config::load()?.build_session()?;
    let mut states = session.subscribe();

    println!("{}", view::LOCATING);
    session.bootstrap();

    loop {
        if let ResultState::Error(msg) = follow(&mut states, true).await? {
            println!("{msg}");
        }

        let Some(city) = prompt_city().await? else {
            break;
        };
        session.fetch_weather(city);
    }

    session.shutdown();
    Ok(())
}

/// Render every state change until the cell settles on `Success` or `Error`.
async fn follow(states: &mut StateStream, render: bool) -> anyhow::Result<ResultState> {
    while let Some(state) = states.changed().await {
        if render && !matches!(state, ResultState::Error(_)) {
            let text = view::render(&state);
            if !text.is_empty() {
                println!("{text}");
            }
        }
        if state.is_terminal() {
            return Ok(state);
        }
    }

    Err(anyhow!("session closed before a result arrived"))
}

/// `None` when the user cancels or submits an empty line.
async fn prompt_city() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Text::new("Search for the location").with_help_message("empty line or Esc to quit").prompt()
    })
    .await?;

    match answer {
        Ok(city) if city.trim().is_empty() => Ok(None),
        Ok(city) => Ok(Some(city)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read city"),
    }
}
