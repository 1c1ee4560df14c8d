pub mod actor;
pub mod actor_client;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::GameSettings;
use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::oracle::WordOracle;
use crate::registry::actor_client::RegistryClient;
use crate::scores::actor_client::ScoreKeeperClient;
use crate::session::actor::SessionActor;
use crate::session::actor_client::SessionClient;
use crate::session::{ChatKey, SessionId};

/// Existence bookkeeping of the sessions, one per chat.
pub struct SessionRegistry {
    sessions: HashMap<ChatKey, SessionClient>,
    next_id: SessionId,
    settings: GameSettings,
    oracle: Arc<dyn WordOracle>,
    score_keeper: ScoreKeeperClient,
}

impl SessionRegistry {
    pub fn new(
        settings: GameSettings,
        oracle: Arc<dyn WordOracle>,
        score_keeper: ScoreKeeperClient,
    ) -> Self {
        SessionRegistry {
            sessions: HashMap::default(),
            next_id: 0,
            settings,
            oracle,
            score_keeper,
        }
    }

    pub fn create_session(
        &mut self,
        key: ChatKey,
        registry: RegistryClient,
    ) -> Result<SessionClient, Error> {
        if self.sessions.contains_key(&key) {
            return Err(Error::Domain(DomainError::SessionAlreadyExists(key)));
        }

        self.next_id += 1;
        let session = SessionActor::spawn(
            self.next_id,
            key,
            self.settings.clone(),
            self.oracle.clone(),
            registry,
            self.score_keeper.clone(),
        );
        self.sessions.insert(key, session.clone());
        Ok(session)
    }

    pub fn get_session(&self, key: ChatKey) -> Option<&SessionClient> {
        self.sessions.get(&key)
    }

    pub fn remove_session(&mut self, key: ChatKey) -> Option<SessionClient> {
        self.sessions.remove(&key)
    }

    /// Only removes the entry when it still belongs to the session `id`.
    pub fn remove_finished_session(&mut self, key: ChatKey, id: SessionId) -> bool {
        match self.sessions.get(&key) {
            Some(session) if session.id() == id => {
                self.sessions.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub fn drain(&mut self) -> Vec<SessionClient> {
        self.sessions.drain().map(|(_, session)| session).collect()
    }
}
