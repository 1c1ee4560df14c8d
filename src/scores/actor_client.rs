use std::collections::BTreeMap;

use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::error::RecvError;
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::Error;
use crate::player::PlayerId;
use crate::scores::actor::{ScoreKeeperCommand, ScoreKeeperResponse};
use crate::scores::{ScoreChange, ScoreRecord};

#[derive(Clone, Debug)]
pub struct ScoreKeeperClient {
    pub(super) score_keeper_tx: Sender<ScoreKeeperCommand>,
}

impl ScoreKeeperClient {
    pub async fn record(&self, change: ScoreChange) -> Result<(), Error> {
        self.send_command(
            ScoreKeeperCommand::Record { change },
            "The ScoreKeeper is not alive. Can't record the score change",
        )
        .await
    }

    pub async fn record_win(&self, player: PlayerId) -> Result<(), Error> {
        self.record(ScoreChange::Win(player)).await
    }

    pub async fn record_loss(&self, player: PlayerId) -> Result<(), Error> {
        self.record(ScoreChange::Loss(player)).await
    }

    pub async fn get_all(&self) -> Result<BTreeMap<PlayerId, ScoreRecord>, Error> {
        let (tx, rx): (
            OneshotSender<ScoreKeeperResponse>,
            OneshotReceiver<ScoreKeeperResponse>,
        ) = oneshot::channel();

        self.send_command(
            ScoreKeeperCommand::GetAll { response_tx: tx },
            "The ScoreKeeper is not alive. Can't read the scores",
        )
        .await?;

        match rx.await {
            Ok(ScoreKeeperResponse::Scores { scores }) => Ok(scores),
            error => Err(ScoreKeeperClient::handle_response_error(error)),
        }
    }

    pub async fn reset(&self) -> Result<(), Error> {
        let (tx, rx): (
            OneshotSender<ScoreKeeperResponse>,
            OneshotReceiver<ScoreKeeperResponse>,
        ) = oneshot::channel();

        self.send_command(
            ScoreKeeperCommand::Reset { response_tx: tx },
            "The ScoreKeeper is not alive. Can't reset the scores",
        )
        .await?;

        match rx.await {
            Ok(ScoreKeeperResponse::Ok) => Ok(()),
            error => Err(ScoreKeeperClient::handle_response_error(error)),
        }
    }

    async fn send_command(
        &self,
        command: ScoreKeeperCommand,
        error_message: &str,
    ) -> Result<(), Error> {
        self.score_keeper_tx.send(command).await.map_err(|error| {
            Error::log_and_create_internal(&format!("{error_message}. Error: '{error}'"))
        })
    }

    fn handle_response_error(error: Result<ScoreKeeperResponse, RecvError>) -> Error {
        match error {
            Ok(ScoreKeeperResponse::Error { error }) => error,
            Ok(unexpected_response) => Error::log_and_create_internal(&format!(
                "Received an unexpected ScoreKeeperResponse. ScoreKeeperResponse: '{unexpected_response}'."
            )),
            _ => Error::log_and_create_internal(
                "Sent a command to the ScoreKeeper actor, but the actor channel died.",
            ),
        }
    }
}
