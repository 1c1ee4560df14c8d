//! Line based transport for a single chat, reading commands on stdin and printing the session
//! events on stdout.
//!
//! Every line starts with the id of the player talking, e.g. `1 /startgame alice` or `2 glad`.

use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::error::Error;
use crate::metrics;
use crate::oracle::Mode;
use crate::player::{AnswerPolicy, Player, PlayerId};
use crate::scores::leaderboard::{self, Title};
use crate::session::actor_client::SessionEventReceiver;
use crate::session::{ChatKey, Rejection, SessionEvent};
use crate::startup::Application;

const CONSOLE_CHAT: ChatKey = ChatKey(0);
const BOT_ID: PlayerId = PlayerId(0);

#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleCommand {
    StartGame { name: Option<String> },
    Play { name: Option<String> },
    Mode(Mode),
    Bot { accuracy: f64 },
    FlashGame,
    WaitGame,
    Countdown,
    Cancel,
    Gradin,
    Bilan,
    Joueurs,
    Reset,
    Metrics,
    Word(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleLine {
    pub player: PlayerId,
    pub command: ConsoleCommand,
}

pub fn parse_line(line: &str) -> Result<ConsoleLine, String> {
    let line = line.trim();
    let (player, text) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("Expected `<player id> <message>`, got '{line}'."))?;
    let player = player
        .parse::<i64>()
        .map_err(|_| format!("'{player}' is not a player id."))?;
    if player == BOT_ID.0 {
        return Err(format!("Player id {player} is reserved for the bot."));
    }

    let text = text.trim();
    let command = match text.strip_prefix('/') {
        None => ConsoleCommand::Word(text.to_string()),
        Some(command) => {
            let (name, argument) = match command.split_once(char::is_whitespace) {
                Some((name, argument)) => (name, Some(argument.trim().to_string())),
                None => (command, None),
            };
            match name.to_lowercase().as_str() {
                "startgame" => ConsoleCommand::StartGame { name: argument },
                "play" => ConsoleCommand::Play { name: argument },
                "mode" => ConsoleCommand::Mode(Mode::try_from(
                    argument.as_deref().unwrap_or_default(),
                )?),
                "bot" => ConsoleCommand::Bot {
                    accuracy: match argument {
                        Some(accuracy) => accuracy
                            .parse::<f64>()
                            .map_err(|_| format!("'{accuracy}' is not an accuracy."))?,
                        None => 1.0,
                    },
                },
                "flashgame" => ConsoleCommand::FlashGame,
                "waitgame" => ConsoleCommand::WaitGame,
                "countdown" => ConsoleCommand::Countdown,
                "cancel" => ConsoleCommand::Cancel,
                "gradin" => ConsoleCommand::Gradin,
                "bilan" => ConsoleCommand::Bilan,
                "joueurs" => ConsoleCommand::Joueurs,
                "reset" => ConsoleCommand::Reset,
                "metrics" => ConsoleCommand::Metrics,
                other => return Err(format!("Unknown command /{other}.")),
            }
        }
    };

    Ok(ConsoleLine {
        player: PlayerId(player),
        command,
    })
}

pub async fn run(application: Application) -> Result<(), Error> {
    let mut lines = BufReader::new(io::stdin()).lines();
    println!("Ready. Type `<player id> /startgame <name>` to open a game.");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                return Err(Error::log_and_create_internal(&format!(
                    "Could not read from stdin. Error: '{error}'."
                )))
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(line) => {
                if let Err(error) = execute(&application, line).await {
                    if error.is_user_error() {
                        println!("! {error}");
                    } else {
                        log::error!("Console command failed. Error: '{error}'.");
                    }
                }
            }
            Err(message) => println!("! {message}"),
        }
    }

    log::info!("Stdin closed. Stopping the console.");
    Ok(())
}

async fn execute(application: &Application, line: ConsoleLine) -> Result<(), Error> {
    let player = line.player;
    match line.command {
        ConsoleCommand::StartGame { name } => {
            let session = application.registry().create_session(CONSOLE_CHAT).await?;
            print_events(session.subscribe().await?);
            session.join(human(player, name)).await?;
        }
        ConsoleCommand::Play { name } => {
            application
                .session(CONSOLE_CHAT)
                .await?
                .join(human(player, name))
                .await?;
        }
        ConsoleCommand::Mode(mode) => application.session(CONSOLE_CHAT).await?.set_mode(mode).await?,
        ConsoleCommand::Bot { accuracy } => {
            application
                .session(CONSOLE_CHAT)
                .await?
                .join(Player::automated(BOT_ID, "bot", AnswerPolicy::new(accuracy)))
                .await?;
        }
        ConsoleCommand::FlashGame => application.session(CONSOLE_CHAT).await?.start_active().await?,
        ConsoleCommand::WaitGame => {
            application
                .session(CONSOLE_CHAT)
                .await?
                .cancel_countdown(false)
                .await?
        }
        ConsoleCommand::Countdown => {
            application
                .session(CONSOLE_CHAT)
                .await?
                .start_countdown()
                .await?
        }
        ConsoleCommand::Cancel => application.session(CONSOLE_CHAT).await?.cancel(player).await?,
        ConsoleCommand::Gradin => {
            let scores = application.score_keeper().get_all().await?;
            if scores.is_empty() {
                println!("No winner recorded yet.");
            }
            for standing in leaderboard::ranking(&scores) {
                println!(
                    "{}. player {} - {} win(s), {} loss(es)",
                    standing.position, standing.player, standing.record.wins, standing.record.losses
                );
            }
        }
        ConsoleCommand::Bilan => {
            let scores = application.score_keeper().get_all().await?;
            let summary = leaderboard::summary(&scores, player);
            println!(
                "Player {}: {} win(s), {} loss(es), {:.1}% won, position {}, {}",
                summary.player,
                summary.wins,
                summary.losses,
                summary.win_rate,
                summary
                    .position
                    .map(|position| position.to_string())
                    .unwrap_or_else(|| "unranked".to_string()),
                describe_title(summary.title)
            );
        }
        ConsoleCommand::Joueurs => {
            let scores = application.score_keeper().get_all().await?;
            println!(
                "Registered players: {}",
                leaderboard::registered_players(&scores)
            );
        }
        ConsoleCommand::Reset => {
            application.reset(player).await?;
            println!("Everything has been reset.");
        }
        ConsoleCommand::Metrics => print!("{}", metrics::render()?),
        ConsoleCommand::Word(word) => {
            // Chatter outside of a game is not a command
            if let Ok(session) = application.session(CONSOLE_CHAT).await {
                session.validate(player, &word).await?;
            }
        }
    }
    Ok(())
}

fn human(player: PlayerId, name: Option<String>) -> Player {
    match name {
        Some(name) if !name.is_empty() => Player::human(player, &name),
        _ => Player::human(player, &format!("player {player}")),
    }
}

fn print_events(mut events: SessionEventReceiver) {
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            println!("{}", describe(&event));
        }
    });
}

fn describe_title(title: Title) -> &'static str {
    match title {
        Title::Newcomer => "newcomer",
        Title::LivingLegend => "living legend",
        Title::Champion => "champion",
        Title::Veteran => "veteran",
        Title::Rising => "rising",
    }
}

pub fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::PlayerJoined {
            player,
            players,
            capacity,
        } => format!("{} joined ({players}/{capacity}).", player.name),
        SessionEvent::ModeSelected { mode } => format!("Mode: {mode}."),
        SessionEvent::CountdownStarted { seconds } => {
            format!("The game starts in {seconds} seconds.")
        }
        SessionEvent::CountdownTick { remaining_seconds } => {
            format!("{remaining_seconds} seconds left.")
        }
        SessionEvent::CountdownPaused => "Countdown paused.".to_string(),
        SessionEvent::TurnStarted {
            player,
            prompt,
            mode,
            deadline_seconds,
            turn,
        } => format!(
            "{}, turn {turn}: give a {mode} of '{prompt}' within {deadline_seconds} seconds.",
            player.name
        ),
        SessionEvent::AnswerAccepted { player, word } => {
            format!("{} found '{word}'.", player.name)
        }
        SessionEvent::AnswerRejected {
            player,
            word,
            reason: Rejection::AlreadyUsed,
        } => format!("{}: '{word}' was already used.", player.name),
        SessionEvent::AnswerRejected {
            player,
            word,
            reason: Rejection::WrongAnswer,
        } => format!("{}: '{word}' is not accepted.", player.name),
        SessionEvent::PlayerEliminated { player } => format!("{} is eliminated.", player.name),
        SessionEvent::Winner { player } => format!("{} wins!", player.name),
        SessionEvent::Cancelled { by: Some(player) } => {
            format!("Game cancelled by player {player}.")
        }
        SessionEvent::Cancelled { by: None } => "Game stopped.".to_string(),
        SessionEvent::Refused { error, .. } => format!("! {error}"),
    }
}
