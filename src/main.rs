use wordclash::config::Config;
use wordclash::console;
use wordclash::error::Error;
use wordclash::metrics::register_metrics;
use wordclash::startup::Application;

#[tokio::main]
async fn main() -> Result<(), Error> {
    std_logger::Config::logfmt().init();

    let config = Config::get().map_err(|error| {
        log::error!("Unable to read the configuration. Error: '{error}'.");
        Error::Configuration(error.to_string())
    })?;
    register_metrics();

    let application = Application::build(&config)?;
    log::info!(
        "Application started. Dictionary: '{}', Scores: '{}'.",
        config.application.dictionary_path.display(),
        config.application.scores_path.display()
    );

    console::run(application).await
}
