use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

use crate::error::Error;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ACTIVE_SESSIONS: IntGauge =
        IntGauge::new("wordclash_active_sessions", "Sessions currently alive")
            .expect("metric cannot be created");
    pub static ref FINISHED_GAMES: IntCounter =
        IntCounter::new("wordclash_finished_games", "Games that ended with a winner")
            .expect("metric cannot be created");
    pub static ref ELIMINATIONS: IntCounter =
        IntCounter::new("wordclash_eliminations", "Players eliminated by a missed deadline")
            .expect("metric cannot be created");
}

pub fn register_metrics() {
    REGISTRY
        .register(Box::new(ACTIVE_SESSIONS.clone()))
        .expect("collector cannot be registered");

    REGISTRY
        .register(Box::new(FINISHED_GAMES.clone()))
        .expect("collector cannot be registered");

    REGISTRY
        .register(Box::new(ELIMINATIONS.clone()))
        .expect("collector cannot be registered");
}

/// Text exposition of the registry, for whichever transport serves it.
pub fn render() -> Result<String, Error> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|error| {
            Error::log_and_create_internal(&format!(
                "Could not encode the metrics. Error: '{error}'."
            ))
        })?;
    String::from_utf8(buffer).map_err(|error| {
        Error::log_and_create_internal(&format!(
            "Metrics are not valid UTF-8. Error: '{error}'."
        ))
    })
}
