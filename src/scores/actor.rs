use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot::Sender as OneshotSender;

use crate::error::Error;
use crate::player::PlayerId;
use crate::scores::actor_client::ScoreKeeperClient;
use crate::scores::{ScoreChange, ScoreRecord, ScoreStore};

/// Owns the ScoreStore so that writes are applied one at a time and file I/O never runs on a
/// session actor. Writes run on the blocking pool, awaited before the next command.
pub struct ScoreKeeperActor {
    store: Arc<Mutex<Box<dyn ScoreStore>>>,
    score_keeper_rx: Receiver<ScoreKeeperCommand>,
}

impl ScoreKeeperActor {
    /// Runs the ScoreKeeper Actor in background and returns a Client to communicate with it
    pub fn spawn(store: Box<dyn ScoreStore>) -> ScoreKeeperClient {
        let (score_keeper_tx, score_keeper_rx): (
            Sender<ScoreKeeperCommand>,
            Receiver<ScoreKeeperCommand>,
        ) = mpsc::channel(512);

        tokio::spawn(
            ScoreKeeperActor {
                store: Arc::new(Mutex::new(store)),
                score_keeper_rx,
            }
            .start(),
        );

        ScoreKeeperClient { score_keeper_tx }
    }

    async fn start(mut self) {
        while let Some(command) = self.score_keeper_rx.recv().await {
            match command {
                ScoreKeeperCommand::Record { change } => {
                    // A result that cannot be persisted is lost, games keep going regardless
                    if let Err(error) = self.write(move |store| store.apply(change)).await {
                        log::error!(
                            "Could not record a score change. PlayerId: '{}', Change: '{change:?}', Error: '{error}'.",
                            change.player()
                        );
                    }
                }
                ScoreKeeperCommand::GetAll { response_tx } => {
                    let response = match self.read_all() {
                        Ok(scores) => ScoreKeeperResponse::Scores { scores },
                        Err(error) => ScoreKeeperResponse::Error { error },
                    };
                    if response_tx.send(response).is_err() {
                        log::warn!("Sent the scores but the response channel is closed.");
                    }
                }
                ScoreKeeperCommand::Reset { response_tx } => {
                    let response = match self.write(|store| store.reset()).await {
                        Ok(()) => {
                            log::info!("Scores have been reset.");
                            ScoreKeeperResponse::Ok
                        }
                        Err(error) => ScoreKeeperResponse::Error { error },
                    };
                    if response_tx.send(response).is_err() {
                        log::warn!("Reset the scores but the response channel is closed.");
                    }
                }
            }
        }
        log::info!("ScoreKeeper channel has been dropped. Stopping score keeper actor.");
    }

    fn read_all(&self) -> Result<BTreeMap<PlayerId, ScoreRecord>, Error> {
        let store = self
            .store
            .lock()
            .map_err(|_| Error::log_and_create_internal("The score store lock is poisoned."))?;
        Ok(store.get_all())
    }

    async fn write(
        &self,
        operation: impl FnOnce(&mut dyn ScoreStore) -> Result<(), Error> + Send + 'static,
    ) -> Result<(), Error> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut store = store
                .lock()
                .map_err(|_| Error::log_and_create_internal("The score store lock is poisoned."))?;
            operation(&mut **store)
        })
        .await
        .map_err(|error| {
            Error::log_and_create_internal(&format!(
                "A score store write did not complete. Error: '{error}'."
            ))
        })?
    }
}

#[derive(Debug)]
pub(crate) enum ScoreKeeperCommand {
    Record {
        change: ScoreChange,
    },
    GetAll {
        response_tx: OneshotSender<ScoreKeeperResponse>,
    },
    Reset {
        response_tx: OneshotSender<ScoreKeeperResponse>,
    },
}

#[derive(Debug)]
pub(crate) enum ScoreKeeperResponse {
    Scores {
        scores: BTreeMap<PlayerId, ScoreRecord>,
    },
    Ok,
    Error {
        error: Error,
    },
}

impl Display for ScoreKeeperResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreKeeperResponse::Scores { scores } => {
                write!(formatter, "Scores(players: {})", scores.len())
            }
            ScoreKeeperResponse::Ok => write!(formatter, "Ok"),
            ScoreKeeperResponse::Error { error } => write!(formatter, "Error '{error}'"),
        }
    }
}
