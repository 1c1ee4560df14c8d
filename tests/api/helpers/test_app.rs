use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use wordclash::config::{ApplicationSettings, Config, GameSettings};
use wordclash::oracle::Dictionary;
use wordclash::player::PlayerId;
use wordclash::scores::ScoreStore;
use wordclash::startup::Application;

pub const ADMIN: PlayerId = PlayerId(99);

pub struct TestApp {
    pub application: Application,
    pub oracle: Arc<Dictionary>,
    pub scores_path: PathBuf,
    // Removed along with the scores file when the test ends
    _directory: TempDir,
}

impl TestApp {
    pub fn spawn_app() -> TestApp {
        TestApp::spawn_app_with_scores(None)
    }

    /// Starts the application on top of an existing scores file.
    pub fn spawn_app_with_scores(scores: Option<&str>) -> TestApp {
        let directory = tempfile::tempdir().expect("Failed to create a temporary directory.");
        let scores_path = directory.path().join("scores.json");
        if let Some(scores) = scores {
            std::fs::write(&scores_path, scores).expect("Failed to write the scores file.");
        }

        let config = Config {
            application: ApplicationSettings {
                dictionary_path: dictionary_path(),
                scores_path: scores_path.clone(),
                admin_id: ADMIN,
            },
            game: GameSettings::default(),
        };
        let oracle = Dictionary::load(&config.application.dictionary_path)
            .expect("Failed to load the dictionary.");
        let application = Application::build(&config).expect("Failed to build the application.");

        TestApp {
            application,
            oracle: Arc::new(oracle),
            scores_path,
            _directory: directory,
        }
    }

    /// Starts the application with a custom score store instead of the scores file.
    pub fn spawn_app_with_store(store: Box<dyn ScoreStore>) -> TestApp {
        let directory = tempfile::tempdir().expect("Failed to create a temporary directory.");
        let oracle = Arc::new(
            Dictionary::load(&dictionary_path()).expect("Failed to load the dictionary."),
        );
        let application =
            Application::with_parts(GameSettings::default(), ADMIN, oracle.clone(), store);

        TestApp {
            application,
            oracle,
            scores_path: directory.path().join("scores.json"),
            _directory: directory,
        }
    }

    pub fn read_scores_file(&self) -> serde_json::Value {
        let content =
            std::fs::read_to_string(&self.scores_path).expect("Failed to read the scores file.");
        serde_json::from_str(&content).expect("Scores file is not valid JSON.")
    }
}

fn dictionary_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("words")
        .join("dictionary.json")
}
