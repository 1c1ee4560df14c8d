pub mod config;
pub mod console;
pub mod error;
pub mod metrics;
pub mod oracle;
pub mod player;
pub mod registry;
pub mod scores;
pub mod session;
pub mod startup;
