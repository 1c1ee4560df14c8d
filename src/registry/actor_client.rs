use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::error::RecvError;
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::Error;
use crate::registry::actor::{RegistryCommand, RegistryResponse};
use crate::session::actor_client::SessionClient;
use crate::session::{ChatKey, SessionId};

#[derive(Clone, Debug)]
pub struct RegistryClient {
    pub(super) registry_tx: Sender<RegistryCommand>,
}

impl RegistryClient {
    pub async fn create_session(&self, key: ChatKey) -> Result<SessionClient, Error> {
        let (tx, rx): (
            OneshotSender<RegistryResponse>,
            OneshotReceiver<RegistryResponse>,
        ) = oneshot::channel();

        self.send_command(
            RegistryCommand::CreateSession {
                key,
                response_tx: tx,
            },
            "The Registry is not alive. Can't create Session",
        )
        .await?;

        match rx.await {
            Ok(RegistryResponse::Session {
                session: Some(session),
            }) => Ok(session),
            error => Err(RegistryClient::handle_response_error(error)),
        }
    }

    pub async fn get_session(&self, key: ChatKey) -> Result<Option<SessionClient>, Error> {
        let (tx, rx): (
            OneshotSender<RegistryResponse>,
            OneshotReceiver<RegistryResponse>,
        ) = oneshot::channel();

        self.send_command(
            RegistryCommand::GetSession {
                key,
                response_tx: tx,
            },
            "The Registry channel is closed",
        )
        .await?;

        match rx.await {
            Ok(RegistryResponse::Session { session }) => Ok(session),
            error => Err(RegistryClient::handle_response_error(error)),
        }
    }

    /// Removes the session of the chat and stops it. Returns whether there was one.
    pub async fn remove_session(&self, key: ChatKey) -> Result<bool, Error> {
        let (tx, rx): (
            OneshotSender<RegistryResponse>,
            OneshotReceiver<RegistryResponse>,
        ) = oneshot::channel();

        self.send_command(
            RegistryCommand::RemoveSession {
                key,
                response_tx: tx,
            },
            "The Registry channel is closed",
        )
        .await?;

        match rx.await {
            Ok(RegistryResponse::Removed { amount }) => Ok(amount > 0),
            error => Err(RegistryClient::handle_response_error(error)),
        }
    }

    /// Removes and stops every session. Returns how many there were.
    pub async fn reset(&self) -> Result<usize, Error> {
        let (tx, rx): (
            OneshotSender<RegistryResponse>,
            OneshotReceiver<RegistryResponse>,
        ) = oneshot::channel();

        self.send_command(
            RegistryCommand::Reset { response_tx: tx },
            "The Registry channel is closed",
        )
        .await?;

        match rx.await {
            Ok(RegistryResponse::Removed { amount }) => Ok(amount),
            error => Err(RegistryClient::handle_response_error(error)),
        }
    }

    pub(crate) async fn remove_finished_session(
        &self,
        key: ChatKey,
        id: SessionId,
    ) -> Result<(), Error> {
        self.send_command(
            RegistryCommand::RemoveFinishedSession { key, id },
            "The Registry channel is closed",
        )
        .await
    }

    async fn send_command(&self, command: RegistryCommand, error_message: &str) -> Result<(), Error> {
        self.registry_tx.send(command).await.map_err(|error| {
            Error::log_and_create_internal(&format!("{error_message}. Error: '{error}'"))
        })
    }

    fn handle_response_error(error: Result<RegistryResponse, RecvError>) -> Error {
        match error {
            Ok(RegistryResponse::Error { error }) => error,
            Ok(unexpected_response) => Error::log_and_create_internal(&format!(
                "Received an unexpected RegistryResponse. RegistryResponse: '{unexpected_response}'."
            )),
            _ => Error::log_and_create_internal(
                "Sent a command to the Registry actor, but the actor channel died.",
            ),
        }
    }
}
