use std::sync::Arc;

use crate::config::{Config, GameSettings};
use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::oracle::{Dictionary, WordOracle};
use crate::player::{Player, PlayerId};
use crate::registry::actor::RegistryActor;
use crate::registry::actor_client::RegistryClient;
use crate::scores::actor::ScoreKeeperActor;
use crate::scores::actor_client::ScoreKeeperClient;
use crate::scores::{JsonFileScoreStore, ScoreStore};
use crate::session::actor_client::SessionClient;
use crate::session::ChatKey;

/// Process-wide handles shared by every transport.
#[derive(Clone, Debug)]
pub struct Application {
    registry: RegistryClient,
    score_keeper: ScoreKeeperClient,
    admin: PlayerId,
}

impl Application {
    /// Loads the dictionary and the scores, then spawns the actors. Needs a tokio runtime.
    pub fn build(config: &Config) -> Result<Application, Error> {
        config.game.validate()?;
        let dictionary = Dictionary::load(&config.application.dictionary_path)?;
        let store = JsonFileScoreStore::open(&config.application.scores_path)?;

        Ok(Application::with_parts(
            config.game.clone(),
            config.application.admin_id,
            Arc::new(dictionary),
            Box::new(store),
        ))
    }

    pub fn with_parts(
        settings: GameSettings,
        admin: PlayerId,
        oracle: Arc<dyn WordOracle>,
        store: Box<dyn ScoreStore>,
    ) -> Application {
        let score_keeper = ScoreKeeperActor::spawn(store);
        let registry = RegistryActor::spawn(settings, oracle, score_keeper.clone());

        Application {
            registry,
            score_keeper,
            admin,
        }
    }

    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    pub fn score_keeper(&self) -> &ScoreKeeperClient {
        &self.score_keeper
    }

    /// Joins the session of the chat, creating it first when the chat has none.
    pub async fn join(&self, key: ChatKey, player: Player) -> Result<(SessionClient, bool), Error> {
        let session = match self.registry.get_session(key).await? {
            Some(session) => session,
            None => match self.registry.create_session(key).await {
                Ok(session) => session,
                // Someone else created it in the meantime
                Err(Error::Domain(DomainError::SessionAlreadyExists(_))) => self
                    .registry
                    .get_session(key)
                    .await?
                    .ok_or(Error::Domain(DomainError::SessionDoesNotExist(key)))?,
                Err(error) => return Err(error),
            },
        };

        let joined = session.join(player).await?;
        Ok((session, joined))
    }

    pub async fn session(&self, key: ChatKey) -> Result<SessionClient, Error> {
        self.registry
            .get_session(key)
            .await?
            .ok_or(Error::Domain(DomainError::SessionDoesNotExist(key)))
    }

    /// Stops every session and wipes the scores. Only the administrator may do it.
    pub async fn reset(&self, requesting_player: PlayerId) -> Result<(), Error> {
        if requesting_player != self.admin {
            log::info!("Refused a reset from a non administrator. PlayerId: '{requesting_player}'.");
            return Err(Error::Domain(DomainError::NotPermitted(requesting_player)));
        }
        let sessions = self.registry.reset().await?;
        self.score_keeper.reset().await?;
        log::info!("Application reset. Sessions: '{sessions}'.");
        Ok(())
    }
}
