use std::path::{Path, PathBuf};
use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde_aux::prelude::deserialize_number_from_string;

use crate::error::Error;
use crate::oracle::Mode;
use crate::player::PlayerId;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub application: ApplicationSettings,
    pub game: GameSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub dictionary_path: PathBuf,
    pub scores_path: PathBuf,
    /// The only player allowed to reset every session and score.
    pub admin_id: PlayerId,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct GameSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_players: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_players: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub countdown_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub countdown_step_seconds: u64,
    /// Amount of turns per player played with the longer deadline.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub opening_turns: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub opening_turn_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub turn_seconds: u64,
    pub default_mode: Mode,
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_players < 2 {
            return Err(Error::Configuration(format!(
                "A game needs at least two players. MinPlayers: '{}'.",
                self.min_players
            )));
        }
        if self.max_players < self.min_players {
            return Err(Error::Configuration(format!(
                "MaxPlayers can't be lower than MinPlayers. MinPlayers: '{}', MaxPlayers: '{}'.",
                self.min_players, self.max_players
            )));
        }
        if self.countdown_step_seconds == 0 {
            return Err(Error::Configuration(
                "The countdown step must be at least one second.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn countdown_step(&self) -> Duration {
        Duration::from_secs(self.countdown_step_seconds)
    }

    /// Deadline of a player's turn, `turn_number` starts at 1.
    pub fn turn_timeout(&self, turn_number: u32) -> Duration {
        if turn_number <= self.opening_turns {
            Duration::from_secs(self.opening_turn_seconds)
        } else {
            Duration::from_secs(self.turn_seconds)
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            min_players: 2,
            max_players: 4,
            countdown_seconds: 30,
            countdown_step_seconds: 5,
            opening_turns: 2,
            opening_turn_seconds: 20,
            turn_seconds: 10,
            default_mode: Mode::Synonym,
        }
    }
}

impl Config {
    pub fn get() -> Result<Config, ConfigError> {
        let base_path = std::env::current_dir().map_err(|error| {
            ConfigError::Message(format!(
                "Failed to determine the current directory. Error: '{error}'."
            ))
        })?;

        let environment: Environment = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| DEV.to_string())
            .try_into()
            .map_err(ConfigError::Message)?;

        Config::from_directory(&base_path.join("config"), environment)
    }

    pub fn from_directory(
        configuration_directory: &Path,
        environment: Environment,
    ) -> Result<Config, ConfigError> {
        let environment_filename = format!("{}.yaml", environment.as_str());

        let config = config::Config::builder()
            .add_source(config::File::from(
                configuration_directory.join("base.yaml"),
            ))
            .add_source(
                config::File::from(configuration_directory.join(environment_filename))
                    .required(false),
            )
            .build()?;

        config.try_deserialize::<Config>()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

const DEV: &str = "dev";
const PROD: &str = "prod";

impl Environment {
    fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => DEV,
            Environment::Prod => PROD,
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(string: String) -> Result<Self, Self::Error> {
        match string.to_lowercase().as_str() {
            DEV => Ok(Self::Dev),
            PROD => Ok(Self::Prod),
            other => Err(format!(
                "{other} is not a supported environment. Use either `{DEV}` or `{PROD}`.",
            )),
        }
    }
}
