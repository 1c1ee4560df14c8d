use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot::Sender as OneshotSender;

use crate::config::GameSettings;
use crate::error::Error;
use crate::metrics::ACTIVE_SESSIONS;
use crate::oracle::{Mode, WordOracle};
use crate::player::{Player, PlayerId};
use crate::registry::actor_client::RegistryClient;
use crate::scores::actor_client::ScoreKeeperClient;
use crate::session::actor_client::SessionClient;
use crate::session::{
    ChatKey, GameSession, SessionEvent, SessionId, SessionSnapshot, TimerFired, TurnScheduler,
};

pub struct SessionActor {
    id: SessionId,
    session: GameSession,
    session_rx: Receiver<SessionCommand>,
    timer_rx: UnboundedReceiver<TimerFired>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    registry: RegistryClient,
    score_keeper: ScoreKeeperClient,
    deregistered: bool,
}

impl SessionActor {
    /// Runs the Session Actor in background and returns a Client to communicate with it
    pub fn spawn(
        id: SessionId,
        key: ChatKey,
        settings: GameSettings,
        oracle: Arc<dyn WordOracle>,
        registry: RegistryClient,
        score_keeper: ScoreKeeperClient,
    ) -> SessionClient {
        let (session_tx, session_rx): (Sender<SessionCommand>, Receiver<SessionCommand>) =
            mpsc::channel(128);
        let (timer_tx, timer_rx): (UnboundedSender<TimerFired>, UnboundedReceiver<TimerFired>) =
            mpsc::unbounded_channel();
        let (broadcast_tx, _): (
            broadcast::Sender<SessionEvent>,
            broadcast::Receiver<SessionEvent>,
        ) = broadcast::channel(64);

        let session = GameSession::new(key, settings, oracle, TurnScheduler::new(timer_tx));

        tokio::spawn(
            SessionActor {
                id,
                session,
                session_rx,
                timer_rx,
                broadcast_tx,
                registry,
                score_keeper,
                deregistered: false,
            }
            .start(),
        );

        SessionClient {
            id,
            key,
            session_tx,
        }
    }

    async fn start(mut self) {
        ACTIVE_SESSIONS.inc();
        log::info!(
            "Session started. ChatKey: '{}', SessionId: '{}'.",
            self.session.key(),
            self.id
        );

        loop {
            tokio::select! {
                command = self.session_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        log::info!("Session channel has been dropped. Stopping session actor.");
                        break;
                    }
                },
                Some(fired) = self.timer_rx.recv() => {
                    self.session.on_timer(fired);
                    self.flush().await;
                }
            }

            if self.session.is_finished() {
                break;
            }
        }

        log::info!(
            "Stopping session actor. ChatKey: '{}', SessionId: '{}'.",
            self.session.key(),
            self.id
        );
        ACTIVE_SESSIONS.dec();
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        let (result, response_tx) = match command {
            SessionCommand::SetMode { mode, response_tx } => (
                self.session.set_mode(mode).map(|_| SessionResponse::Ok),
                response_tx,
            ),
            SessionCommand::Join {
                player,
                response_tx,
            } => {
                let joined = self.session.join(player);
                (Ok(SessionResponse::Joined { joined }), response_tx)
            }
            SessionCommand::StartCountdown { response_tx } => (
                self.session.start_countdown().map(|_| SessionResponse::Ok),
                response_tx,
            ),
            SessionCommand::CancelCountdown {
                silent,
                response_tx,
            } => {
                self.session.cancel_countdown(silent);
                (Ok(SessionResponse::Ok), response_tx)
            }
            SessionCommand::StartActive { response_tx } => (
                self.session.start_active().map(|_| SessionResponse::Ok),
                response_tx,
            ),
            SessionCommand::Validate {
                player,
                word,
                response_tx,
            } => {
                self.session.validate(player, &word);
                (Ok(SessionResponse::Ok), response_tx)
            }
            SessionCommand::Cancel {
                player,
                response_tx,
            } => (
                self.session.cancel(player).map(|_| SessionResponse::Ok),
                response_tx,
            ),
            SessionCommand::Snapshot { response_tx } => (
                Ok(SessionResponse::Snapshot {
                    snapshot: self.session.snapshot(),
                }),
                response_tx,
            ),
            SessionCommand::Subscribe { response_tx } => (
                Ok(SessionResponse::Subscribed {
                    broadcast_rx: self.broadcast_tx.subscribe(),
                }),
                response_tx,
            ),
            SessionCommand::Shutdown => {
                self.session.terminate();
                self.flush().await;
                return;
            }
        };

        // The response is sent once the outcome is visible everywhere else
        self.flush().await;

        let response = match result {
            Ok(response) => response,
            Err(error) => SessionResponse::Error { error },
        };
        if let Err(response) = response_tx.send(response) {
            log::warn!(
                "Sent SessionResponse but the response channel is closed. ChatKey: '{}', SessionResponse: '{response}'.",
                self.session.key()
            );
        }
    }

    async fn flush(&mut self) {
        let outbox = self.session.take_outbox();
        let key = self.session.key();

        if self.session.is_finished() && !self.deregistered {
            self.deregistered = true;
            if let Err(error) = self.registry.remove_finished_session(key, self.id).await {
                log::error!(
                    "The Registry channel is closed, can't remove the Session. ChatKey: '{key}', Error: '{error}'."
                );
            }
        }

        for change in outbox.score_changes {
            if let Err(error) = self.score_keeper.record(change).await {
                log::error!(
                    "Could not forward a score change. ChatKey: '{key}', Change: '{change:?}', Error: '{error}'."
                );
            }
        }

        for event in outbox.events {
            // Nobody listening is not an error, the game goes on regardless
            if self.broadcast_tx.send(event).is_err() {
                log::debug!("No subscriber for the session events. ChatKey: '{key}'.");
            }
        }
    }
}

pub(crate) enum SessionCommand {
    SetMode {
        mode: Mode,
        response_tx: OneshotSender<SessionResponse>,
    },
    Join {
        player: Player,
        response_tx: OneshotSender<SessionResponse>,
    },
    StartCountdown {
        response_tx: OneshotSender<SessionResponse>,
    },
    CancelCountdown {
        silent: bool,
        response_tx: OneshotSender<SessionResponse>,
    },
    StartActive {
        response_tx: OneshotSender<SessionResponse>,
    },
    Validate {
        player: PlayerId,
        word: String,
        response_tx: OneshotSender<SessionResponse>,
    },
    Cancel {
        player: PlayerId,
        response_tx: OneshotSender<SessionResponse>,
    },
    Snapshot {
        response_tx: OneshotSender<SessionResponse>,
    },
    Subscribe {
        response_tx: OneshotSender<SessionResponse>,
    },
    Shutdown,
}

#[derive(Debug)]
pub(crate) enum SessionResponse {
    Ok,
    Joined {
        joined: bool,
    },
    Snapshot {
        snapshot: SessionSnapshot,
    },
    Subscribed {
        broadcast_rx: broadcast::Receiver<SessionEvent>,
    },
    Error {
        error: Error,
    },
}

impl Display for SessionResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionResponse::Ok => write!(formatter, "Ok"),
            SessionResponse::Joined { joined } => write!(formatter, "Joined(joined: {joined})"),
            SessionResponse::Snapshot { snapshot } => {
                write!(formatter, "Snapshot(state: {})", snapshot.state)
            }
            SessionResponse::Subscribed { .. } => write!(formatter, "Subscribed"),
            SessionResponse::Error { error } => write!(formatter, "Error '{error}'"),
        }
    }
}
