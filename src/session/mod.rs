pub mod actor;
pub mod actor_client;
mod event;
mod scheduler;
pub mod session_fsm;

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use rust_fsm::StateMachine;
use serde::{Deserialize, Serialize};

use crate::config::GameSettings;
use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::metrics::{ELIMINATIONS, FINISHED_GAMES};
use crate::oracle::{normalize, Mode, WordOracle};
use crate::player::{Player, PlayerId, PlayerView};
use crate::scores::ScoreChange;
use crate::session::session_fsm::{SessionFsm, SessionFsmInput, SessionFsmState};

pub use self::event::{Rejection, SessionEvent};
pub use self::scheduler::{ArmedTimer, TimerFired, TimerKind, TurnScheduler};

/// Identifies the chat a session belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatKey(pub i64);

impl Display for ChatKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Distinguishes successive sessions registered under the same chat.
pub type SessionId = u64;

/// What a command left to do once the session state has been updated.
#[derive(Debug, Default)]
pub struct Outbox {
    pub events: Vec<SessionEvent>,
    pub score_changes: Vec<ScoreChange>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub key: ChatKey,
    pub state: SessionFsmState,
    pub mode: Option<Mode>,
    pub players: Vec<PlayerView>,
    pub current_turn_index: usize,
    pub current_player: Option<PlayerId>,
    pub current_prompt: Option<String>,
    pub used_words: HashSet<String>,
    pub eliminated: HashSet<PlayerId>,
    pub armed_timer: Option<TimerKind>,
}

pub struct GameSession {
    key: ChatKey,
    settings: GameSettings,
    mode: Option<Mode>,
    fsm: StateMachine<SessionFsm>,
    players: Vec<Player>,
    current_turn_index: usize,
    current_player: Option<PlayerId>,
    current_prompt: Option<String>,
    used_words: HashSet<String>,
    turn_count: HashMap<PlayerId, u32>,
    eliminated: HashSet<PlayerId>,
    countdown_started: bool,
    countdown_remaining: u64,
    scheduler: TurnScheduler,
    oracle: Arc<dyn WordOracle>,
    outbox: Outbox,
}

impl GameSession {
    pub fn new(
        key: ChatKey,
        settings: GameSettings,
        oracle: Arc<dyn WordOracle>,
        scheduler: TurnScheduler,
    ) -> Self {
        GameSession {
            key,
            countdown_remaining: settings.countdown_seconds,
            settings,
            mode: None,
            fsm: StateMachine::default(),
            players: Vec::default(),
            current_turn_index: 0,
            current_player: None,
            current_prompt: None,
            used_words: HashSet::default(),
            turn_count: HashMap::default(),
            eliminated: HashSet::default(),
            countdown_started: false,
            scheduler,
            oracle,
            outbox: Outbox::default(),
        }
    }

    pub fn key(&self) -> ChatKey {
        self.key
    }

    pub fn state(&self) -> SessionFsmState {
        *self.fsm.state()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current_player.and_then(|id| self.get_player(id))
    }

    pub fn current_prompt(&self) -> Option<&str> {
        self.current_prompt.as_deref()
    }

    pub fn used_words(&self) -> &HashSet<String> {
        &self.used_words
    }

    pub fn eliminated(&self) -> &HashSet<PlayerId> {
        &self.eliminated
    }

    pub fn turn_count(&self, player: PlayerId) -> u32 {
        self.turn_count.get(&player).copied().unwrap_or(0)
    }

    pub fn armed_timer(&self) -> Option<&ArmedTimer> {
        self.scheduler.armed()
    }

    pub fn is_finished(&self) -> bool {
        self.state() == SessionFsmState::Finished
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            key: self.key,
            state: self.state(),
            mode: self.mode,
            players: self.players.iter().map(Player::view).collect(),
            current_turn_index: self.current_turn_index,
            current_player: self.current_player,
            current_prompt: self.current_prompt.clone(),
            used_words: self.used_words.clone(),
            eliminated: self.eliminated.clone(),
            armed_timer: self.scheduler.armed().map(|armed| armed.kind),
        }
    }

    pub fn take_outbox(&mut self) -> Outbox {
        std::mem::take(&mut self.outbox)
    }

    fn is_open(&self) -> bool {
        matches!(
            self.state(),
            SessionFsmState::Lobby | SessionFsmState::Countdown
        )
    }

    fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == id)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error> {
        if !self.is_open() {
            return Err(self.refuse(None, DomainError::AlreadyStarted));
        }
        self.mode = Some(mode);
        self.emit(SessionEvent::ModeSelected { mode });
        Ok(())
    }

    /// Returns whether the player was added. Refusals are also notified as `Refused` events.
    pub fn join(&mut self, player: Player) -> bool {
        let id = player.id();
        if self.get_player(id).is_some() {
            self.refuse(Some(id), DomainError::AlreadyJoined(id));
            return false;
        }
        if !self.is_open() {
            self.refuse(Some(id), DomainError::AlreadyStarted);
            return false;
        }
        if self.players.len() >= self.settings.max_players {
            self.refuse(Some(id), DomainError::SessionFull(self.settings.max_players));
            return false;
        }
        if player.is_automated() && self.players.iter().any(Player::is_automated) {
            self.refuse(Some(id), DomainError::AutomatedPlayerLimit);
            return false;
        }

        self.turn_count.insert(id, 0);
        self.emit(SessionEvent::PlayerJoined {
            player: player.view(),
            players: self.players.len() + 1,
            capacity: self.settings.max_players,
        });
        self.players.push(player);

        if self.players.len() >= self.settings.min_players && !self.countdown_started {
            if let Err(error) = self.start_countdown() {
                log::error!(
                    "Could not start the countdown after a join. ChatKey: '{}', Error: '{error}'.",
                    self.key
                );
            }
        }
        true
    }

    pub fn start_countdown(&mut self) -> Result<(), Error> {
        if !self.is_open() {
            return Err(self.refuse(None, DomainError::AlreadyStarted));
        }
        self.process_event(&SessionFsmInput::StartCountdown)?;
        self.countdown_started = true;
        self.countdown_remaining = self.settings.countdown_seconds;
        self.emit(SessionEvent::CountdownStarted {
            seconds: self.settings.countdown_seconds,
        });
        // First tick is immediate so that the opening milestone is announced right away
        self.scheduler
            .arm(TimerKind::CountdownTick, std::time::Duration::ZERO);
        Ok(())
    }

    /// No-op when the countdown is not running, so repeated calls notify a single pause.
    pub fn cancel_countdown(&mut self, silent: bool) {
        if !matches!(
            self.scheduler.armed(),
            Some(ArmedTimer {
                kind: TimerKind::CountdownTick,
                ..
            })
        ) {
            return;
        }
        self.scheduler.disarm();
        let _ = self.process_event(&SessionFsmInput::PauseCountdown);
        if !silent {
            self.emit(SessionEvent::CountdownPaused);
        }
    }

    pub fn start_active(&mut self) -> Result<(), Error> {
        match self.state() {
            SessionFsmState::Active => return Ok(()),
            SessionFsmState::Finished => {
                return Err(self.refuse(None, DomainError::AlreadyStarted))
            }
            SessionFsmState::Lobby | SessionFsmState::Countdown => {}
        }
        if self.players.len() < self.settings.min_players {
            return Err(self.refuse(
                None,
                DomainError::NotEnoughPlayers(self.players.len(), self.settings.min_players),
            ));
        }

        self.cancel_countdown(true);
        if self.mode.is_none() {
            log::info!(
                "No mode selected, using the default one. ChatKey: '{}', Mode: '{}'.",
                self.key,
                self.settings.default_mode
            );
            self.mode = Some(self.settings.default_mode);
        }
        self.process_event(&SessionFsmInput::Activate)?;
        log::info!(
            "Game started. ChatKey: '{}', Players: '{}'.",
            self.key,
            self.players.len()
        );
        self.begin_turn();
        Ok(())
    }

    pub fn validate(&mut self, player: PlayerId, raw_word: &str) {
        if self.state() != SessionFsmState::Active
            || self.current_player != Some(player)
            || self.eliminated.contains(&player)
        {
            return;
        }
        let Some(current) = self.get_player(player).cloned() else {
            return;
        };
        let (Some(mode), Some(prompt)) = (self.mode, self.current_prompt.clone()) else {
            return;
        };

        let word = normalize(raw_word);
        if word == prompt || self.used_words.contains(&word) {
            self.emit(SessionEvent::AnswerRejected {
                player: current.view(),
                word,
                reason: Rejection::AlreadyUsed,
            });
            return;
        }

        if self.oracle.get_valid_answers(mode, &prompt).contains(&word) {
            self.accept_answer(&current, word);
            self.begin_turn();
        } else {
            self.emit(SessionEvent::AnswerRejected {
                player: current.view(),
                word,
                reason: Rejection::WrongAnswer,
            });
        }
    }

    /// Entry point of the scheduler. Firings of a timer that has since been disarmed or
    /// replaced are dropped.
    pub fn on_timer(&mut self, fired: TimerFired) {
        if !self.scheduler.accept(fired) {
            log::debug!(
                "Dropping a superseded timer. ChatKey: '{}', Timer: '{fired:?}'.",
                self.key
            );
            return;
        }
        match fired.kind {
            TimerKind::CountdownTick => self.on_countdown_tick(),
            TimerKind::TurnTimeout => self.on_timeout(),
        }
    }

    pub fn cancel(&mut self, requesting_player: PlayerId) -> Result<(), Error> {
        if self.is_finished() {
            return Ok(());
        }
        if self.players.first().map(Player::id) != Some(requesting_player) {
            return Err(self.refuse(
                Some(requesting_player),
                DomainError::NotPermitted(requesting_player),
            ));
        }
        self.finish_cancelled(Some(requesting_player));
        Ok(())
    }

    /// Stops the session regardless of who asked, used when it is dropped from the registry.
    pub fn terminate(&mut self) {
        if !self.is_finished() {
            self.finish_cancelled(None);
        }
    }

    fn on_countdown_tick(&mut self) {
        if self.state() != SessionFsmState::Countdown {
            return;
        }
        if self.countdown_remaining == 0 {
            if let Err(error) = self.start_active() {
                log::info!(
                    "Countdown expired but the game could not start. ChatKey: '{}', Error: '{error}'.",
                    self.key
                );
                let _ = self.process_event(&SessionFsmInput::PauseCountdown);
            }
            return;
        }

        if is_countdown_milestone(self.countdown_remaining) {
            self.emit(SessionEvent::CountdownTick {
                remaining_seconds: self.countdown_remaining,
            });
        }
        self.countdown_remaining = self
            .countdown_remaining
            .saturating_sub(self.settings.countdown_step_seconds);
        self.scheduler
            .arm(TimerKind::CountdownTick, self.settings.countdown_step());
    }

    fn begin_turn(&mut self) {
        // Iterates instead of recursing when an automated player answers right away
        loop {
            if self.state() != SessionFsmState::Active {
                return;
            }
            self.scheduler.disarm();

            let Some(player) = self.players.get(self.current_turn_index).cloned() else {
                log::error!(
                    "Turn index out of bounds. ChatKey: '{}', TurnIndex: '{}', Players: '{}'.",
                    self.key,
                    self.current_turn_index,
                    self.players.len()
                );
                return;
            };
            let turn = {
                let count = self.turn_count.entry(player.id()).or_insert(0);
                *count += 1;
                *count
            };
            let mode = self.mode.unwrap_or(self.settings.default_mode);
            let prompt = match self.oracle.get_prompt(mode, &self.used_words) {
                Ok(prompt) => prompt,
                Err(error) => {
                    log::error!(
                        "Could not pick a prompt, cancelling the session. ChatKey: '{}', Error: '{error}'.",
                        self.key
                    );
                    self.terminate();
                    return;
                }
            };

            self.used_words.insert(prompt.clone());
            self.current_player = Some(player.id());
            self.current_prompt = Some(prompt.clone());
            let deadline = self.settings.turn_timeout(turn);
            self.scheduler.arm(TimerKind::TurnTimeout, deadline);
            self.emit(SessionEvent::TurnStarted {
                player: player.view(),
                prompt: prompt.clone(),
                mode,
                deadline_seconds: deadline.as_secs(),
                turn,
            });

            let Some(policy) = player.policy() else {
                return;
            };
            let valid_answers = self.oracle.get_valid_answers(mode, &prompt);
            let Some(word) = policy.answer(&valid_answers, &self.used_words) else {
                return;
            };
            self.accept_answer(&player, word);
        }
    }

    fn accept_answer(&mut self, player: &Player, word: String) {
        self.scheduler.disarm();
        self.used_words.insert(word.clone());
        self.emit(SessionEvent::AnswerAccepted {
            player: player.view(),
            word,
        });
        self.advance_turn();
    }

    fn on_timeout(&mut self) {
        if self.state() != SessionFsmState::Active {
            return;
        }
        let Some(player) = self.current_player().cloned() else {
            return;
        };
        self.scheduler.disarm();

        self.eliminated.insert(player.id());
        ELIMINATIONS.inc();
        self.outbox.score_changes.push(ScoreChange::Loss(player.id()));
        log::info!(
            "Player eliminated by timeout. ChatKey: '{}', PlayerId: '{}'.",
            self.key,
            player.id()
        );
        self.emit(SessionEvent::PlayerEliminated {
            player: player.view(),
        });
        self.resolve_or_continue();
    }

    fn resolve_or_continue(&mut self) {
        self.scheduler.disarm();
        let alive: Vec<Player> = self
            .players
            .iter()
            .filter(|player| !self.eliminated.contains(&player.id()))
            .cloned()
            .collect();

        match alive.as_slice() {
            [winner] => {
                self.outbox.score_changes.push(ScoreChange::Win(winner.id()));
                self.emit(SessionEvent::Winner {
                    player: winner.view(),
                });
                let _ = self.process_event(&SessionFsmInput::LastPlayerStanding);
                FINISHED_GAMES.inc();
                log::info!(
                    "Game finished. ChatKey: '{}', Winner: '{}'.",
                    self.key,
                    winner.id()
                );
            }
            [] => {
                // Eliminations happen one at a time and are resolved right away
                log::error!("No player left in an active game. ChatKey: '{}'.", self.key);
                self.terminate();
            }
            _ => {
                self.advance_turn();
                self.begin_turn();
            }
        }
    }

    fn advance_turn(&mut self) {
        let amount_of_players = self.players.len();
        for _ in 0..amount_of_players {
            self.current_turn_index = (self.current_turn_index + 1) % amount_of_players;
            if !self
                .eliminated
                .contains(&self.players[self.current_turn_index].id())
            {
                return;
            }
        }
    }

    fn finish_cancelled(&mut self, by: Option<PlayerId>) {
        self.scheduler.disarm();
        let _ = self.process_event(&SessionFsmInput::Cancel);
        self.emit(SessionEvent::Cancelled { by });
        log::info!("Session cancelled. ChatKey: '{}'.", self.key);
    }

    fn refuse(&mut self, player: Option<PlayerId>, error: DomainError) -> Error {
        log::debug!("Command refused. ChatKey: '{}', Error: '{error}'.", self.key);
        self.emit(SessionEvent::Refused {
            player,
            error: error.clone(),
        });
        Error::Domain(error)
    }

    fn emit(&mut self, event: SessionEvent) {
        self.outbox.events.push(event);
    }

    fn process_event(&mut self, event: &SessionFsmInput) -> Result<(), Error> {
        match self.fsm.consume(event) {
            Ok(_) => Ok(()),
            Err(error) => Err(Error::log_and_create_internal(&format!(
                "The fsm in state {:?} can't transition with an event {:?}. Error: '{error}'.",
                self.fsm.state(),
                event
            ))),
        }
    }
}

/// Remaining times announced to the chat while the countdown runs.
fn is_countdown_milestone(remaining_seconds: u64) -> bool {
    remaining_seconds <= 30 && remaining_seconds % 5 == 0
}
