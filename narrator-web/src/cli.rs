use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::Password;
use narrator_core::{
    Config, Narrative, NarrativeOptions, ProviderId, narrate,
    narrative::{BandEdges, FramingPolicy},
    provider::default_provider_from_config,
};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "narrator", version, about = "Weather narratives for a named city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Print the weather narrative for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,

        /// Override the configured time framing.
        #[arg(long, value_enum)]
        framing: Option<FramingArg>,

        /// Override the configured comparison bands.
        #[arg(long, value_enum)]
        bands: Option<BandsArg>,
    },

    /// Serve narrative pages over HTTP.
    Serve {
        /// Address to listen on; defaults to the configured `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FramingArg {
    HourOfDay,
    DayNight,
}

impl From<FramingArg> for FramingPolicy {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::HourOfDay => FramingPolicy::HourOfDay,
            FramingArg::DayNight => FramingPolicy::DayNight,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BandsArg {
    Tight,
    Wide,
}

impl From<BandsArg> for BandEdges {
    fn from(arg: BandsArg) -> Self {
        match arg {
            BandsArg::Tight => BandEdges::Tight,
            BandsArg::Wide => BandEdges::Wide,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { city, framing, bands } => {
                let config = Config::load()?;
                let mut options = config.narrative_options();
                if let Some(framing) = framing {
                    options.framing = framing.into();
                }
                if let Some(bands) = bands {
                    options.bands = bands.into();
                }
                show(&config, &city, &options).await
            }
            Command::Serve { bind } => {
                let config = Config::load()?;
                let bind = bind.unwrap_or_else(|| config.bind_address());
                server::serve(&config, &bind).await
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key);
    let path = config.save()?;

    println!("Saved {id} credentials to {}", path.display());
    if config.default_provider_id()? == id {
        println!("{id} is the default provider.");
    }

    Ok(())
}

async fn show(config: &Config, city: &str, options: &NarrativeOptions) -> anyhow::Result<()> {
    let provider = default_provider_from_config(config)?;
    let narrative = narrate(provider.as_ref(), city, options)
        .await
        .with_context(|| format!("Failed to get weather for '{city}'"))?;

    println!("{}", format_narrative(&narrative));
    Ok(())
}

fn format_narrative(n: &Narrative) -> String {
    let mut lines = vec![format!(
        "{}, {}: {}°C with {}",
        n.city, n.country, n.temperature, n.description
    )];

    if let (Some(low), Some(high)) = (n.temperature_min, n.temperature_max) {
        lines.push(format!("Low {low}°C, high {high}°C"));
    }
    if !n.comparison.is_empty() {
        lines.push(n.comparison.clone());
    }
    lines.push(format!(
        "Humidity {}%, pressure {} hPa, wind {:.1} m/s",
        n.humidity_pct, n.pressure_hpa, n.wind_speed_mps
    ));
    if let (Some(rise), Some(set)) = (n.sunrise, n.sunset) {
        lines.push(format!(
            "Sunrise {} UTC, sunset {} UTC",
            rise.format("%H:%M"),
            set.format("%H:%M")
        ));
    }

    lines.join("\n")
}
