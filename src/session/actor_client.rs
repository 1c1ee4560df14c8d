use tokio::sync::broadcast::{self, error::RecvError as BroadcastRecvError};
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::error::RecvError;
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::oracle::Mode;
use crate::player::{Player, PlayerId};
use crate::session::actor::{SessionCommand, SessionResponse};
use crate::session::{ChatKey, SessionEvent, SessionId, SessionSnapshot};

#[derive(Clone, Debug)]
pub struct SessionClient {
    pub(super) id: SessionId,
    pub(super) key: ChatKey,
    pub(super) session_tx: Sender<SessionCommand>,
}

impl SessionClient {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn key(&self) -> ChatKey {
        self.key
    }

    pub async fn subscribe(&self) -> Result<SessionEventReceiver, Error> {
        match self
            .request(|response_tx| SessionCommand::Subscribe { response_tx })
            .await?
        {
            SessionResponse::Subscribed { broadcast_rx } => {
                Ok(SessionEventReceiver { broadcast_rx })
            }
            unexpected_response => Err(self.unexpected(unexpected_response)),
        }
    }

    pub async fn set_mode(&self, mode: Mode) -> Result<(), Error> {
        self.expect_ok(|response_tx| SessionCommand::SetMode { mode, response_tx })
            .await
    }

    /// Returns whether the player was added to the session.
    pub async fn join(&self, player: Player) -> Result<bool, Error> {
        match self
            .request(|response_tx| SessionCommand::Join {
                player,
                response_tx,
            })
            .await?
        {
            SessionResponse::Joined { joined } => Ok(joined),
            unexpected_response => Err(self.unexpected(unexpected_response)),
        }
    }

    pub async fn start_countdown(&self) -> Result<(), Error> {
        self.expect_ok(|response_tx| SessionCommand::StartCountdown { response_tx })
            .await
    }

    pub async fn cancel_countdown(&self, silent: bool) -> Result<(), Error> {
        self.expect_ok(|response_tx| SessionCommand::CancelCountdown {
            silent,
            response_tx,
        })
        .await
    }

    pub async fn start_active(&self) -> Result<(), Error> {
        self.expect_ok(|response_tx| SessionCommand::StartActive { response_tx })
            .await
    }

    pub async fn validate(&self, player: PlayerId, word: &str) -> Result<(), Error> {
        self.expect_ok(|response_tx| SessionCommand::Validate {
            player,
            word: word.to_string(),
            response_tx,
        })
        .await
    }

    pub async fn cancel(&self, player: PlayerId) -> Result<(), Error> {
        self.expect_ok(|response_tx| SessionCommand::Cancel {
            player,
            response_tx,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, Error> {
        match self
            .request(|response_tx| SessionCommand::Snapshot { response_tx })
            .await?
        {
            SessionResponse::Snapshot { snapshot } => Ok(snapshot),
            unexpected_response => Err(self.unexpected(unexpected_response)),
        }
    }

    /// Asks the session to stop without waiting for it.
    pub(crate) async fn shutdown(&self) {
        if self.session_tx.send(SessionCommand::Shutdown).await.is_err() {
            log::debug!(
                "Session already stopped before its shutdown. ChatKey: '{}', SessionId: '{}'.",
                self.key,
                self.id
            );
        }
    }

    async fn expect_ok(
        &self,
        command: impl FnOnce(OneshotSender<SessionResponse>) -> SessionCommand,
    ) -> Result<(), Error> {
        match self.request(command).await? {
            SessionResponse::Ok => Ok(()),
            unexpected_response => Err(self.unexpected(unexpected_response)),
        }
    }

    async fn request(
        &self,
        command: impl FnOnce(OneshotSender<SessionResponse>) -> SessionCommand,
    ) -> Result<SessionResponse, Error> {
        let (tx, rx): (
            OneshotSender<SessionResponse>,
            OneshotReceiver<SessionResponse>,
        ) = oneshot::channel();

        // A closed channel means the game finished in the meantime
        if self.session_tx.send(command(tx)).await.is_err() {
            return Err(self.session_is_gone());
        }

        self.handle_response(rx.await)
    }

    fn handle_response(
        &self,
        response: Result<SessionResponse, RecvError>,
    ) -> Result<SessionResponse, Error> {
        match response {
            Ok(SessionResponse::Error { error }) => Err(error),
            Ok(response) => Ok(response),
            Err(_) => Err(self.session_is_gone()),
        }
    }

    fn session_is_gone(&self) -> Error {
        log::debug!(
            "Sent a command to a session that is no longer running. ChatKey: '{}', SessionId: '{}'.",
            self.key,
            self.id
        );
        Error::Domain(DomainError::SessionDoesNotExist(self.key))
    }

    fn unexpected(&self, response: SessionResponse) -> Error {
        Error::log_and_create_internal(&format!(
            "Received an unexpected SessionResponse. ChatKey: '{}', SessionResponse: '{response}'.",
            self.key
        ))
    }
}

pub struct SessionEventReceiver {
    broadcast_rx: broadcast::Receiver<SessionEvent>,
}

impl SessionEventReceiver {
    /// Next event of the session, `None` once the session has stopped.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.broadcast_rx.recv().await {
                Ok(event) => return Some(event),
                Err(BroadcastRecvError::Lagged(skipped)) => {
                    log::warn!("Session events were skipped by a slow subscriber. Skipped: '{skipped}'.");
                }
                Err(BroadcastRecvError::Closed) => return None,
            }
        }
    }
}
