use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot::Sender as OneshotSender;

use crate::config::GameSettings;
use crate::error::Error;
use crate::oracle::WordOracle;
use crate::registry::actor_client::RegistryClient;
use crate::registry::SessionRegistry;
use crate::scores::actor_client::ScoreKeeperClient;
use crate::session::actor_client::SessionClient;
use crate::session::{ChatKey, SessionId};

pub struct RegistryActor {
    registry: SessionRegistry,
    registry_rx: Receiver<RegistryCommand>,
    registry_tx: Sender<RegistryCommand>,
}

impl RegistryActor {
    /// Runs the Registry Actor in background and returns a Client to communicate with it
    pub fn spawn(
        settings: GameSettings,
        oracle: Arc<dyn WordOracle>,
        score_keeper: ScoreKeeperClient,
    ) -> RegistryClient {
        let (registry_tx, registry_rx): (Sender<RegistryCommand>, Receiver<RegistryCommand>) =
            mpsc::channel(512);

        tokio::spawn(
            RegistryActor {
                registry: SessionRegistry::new(settings, oracle, score_keeper),
                registry_rx,
                registry_tx: registry_tx.clone(),
            }
            .start(),
        );

        RegistryClient { registry_tx }
    }

    async fn start(mut self) {
        while let Some(command) = self.registry_rx.recv().await {
            let response = match command {
                RegistryCommand::CreateSession { key, response_tx } => {
                    let result = self
                        .registry
                        .create_session(
                            key,
                            RegistryClient {
                                registry_tx: self.registry_tx.clone(),
                            },
                        )
                        .map(|session| RegistryResponse::Session {
                            session: Some(session),
                        });
                    Some((result, response_tx))
                }
                RegistryCommand::GetSession { key, response_tx } => {
                    let session = self.registry.get_session(key).cloned();
                    Some((Ok(RegistryResponse::Session { session }), response_tx))
                }
                RegistryCommand::RemoveSession { key, response_tx } => {
                    let removed = self.registry.remove_session(key);
                    let was_present = removed.is_some();
                    if let Some(session) = removed {
                        log::info!("Session removed. ChatKey: '{key}'.");
                        RegistryActor::shutdown(vec![session]);
                    }
                    Some((
                        Ok(RegistryResponse::Removed {
                            amount: usize::from(was_present),
                        }),
                        response_tx,
                    ))
                }
                RegistryCommand::RemoveFinishedSession { key, id } => {
                    if !self.registry.remove_finished_session(key, id) {
                        log::debug!(
                            "Ignoring the removal of a session that is no longer registered. ChatKey: '{key}', SessionId: '{id}'."
                        );
                    }
                    None
                }
                RegistryCommand::Reset { response_tx } => {
                    let sessions = self.registry.drain();
                    let amount = sessions.len();
                    log::info!("Registry reset. Sessions: '{amount}'.");
                    RegistryActor::shutdown(sessions);
                    Some((Ok(RegistryResponse::Removed { amount }), response_tx))
                }
            };
            if let Some((result, response_tx)) = response {
                let event = match result {
                    Ok(event) => event,
                    Err(error) => RegistryResponse::Error { error },
                };
                if let Err(event) = response_tx.send(event) {
                    log::error!("Sent RegistryResponse but the response channel is closed. RegistryResponse: '{event}'.");
                }
            }
        }
    }

    // Waiting on the sessions here would block the registry while they flush
    fn shutdown(sessions: Vec<SessionClient>) {
        if sessions.is_empty() {
            return;
        }
        tokio::spawn(async move {
            for session in sessions {
                session.shutdown().await;
            }
        });
    }
}

#[derive(Debug)]
pub(crate) enum RegistryCommand {
    CreateSession {
        key: ChatKey,
        response_tx: OneshotSender<RegistryResponse>,
    },
    GetSession {
        key: ChatKey,
        response_tx: OneshotSender<RegistryResponse>,
    },
    RemoveSession {
        key: ChatKey,
        response_tx: OneshotSender<RegistryResponse>,
    },
    RemoveFinishedSession {
        key: ChatKey,
        id: SessionId,
    },
    Reset {
        response_tx: OneshotSender<RegistryResponse>,
    },
}

#[derive(Debug)]
pub(crate) enum RegistryResponse {
    Session { session: Option<SessionClient> },
    Removed { amount: usize },
    Error { error: Error },
}

impl Display for RegistryResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryResponse::Session { session } => write!(
                formatter,
                "Session(key: {})",
                session
                    .as_ref()
                    .map(|session| session.key().to_string())
                    .unwrap_or_else(|| "none".to_string())
            ),
            RegistryResponse::Removed { amount } => write!(formatter, "Removed(amount: {amount})"),
            RegistryResponse::Error { error } => write!(formatter, "Error '{error}'"),
        }
    }
}
