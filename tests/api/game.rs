use std::time::Duration;

use tokio::time::Instant;
use wordclash::error::{domain_error::DomainError, Error};
use wordclash::oracle::Mode;
use wordclash::player::{Player, PlayerId};
use wordclash::scores::ScoreRecord;
use wordclash::session::session_fsm::SessionFsmState;
use wordclash::session::{ChatKey, SessionEvent, TimerKind};

use crate::helpers::test_app::{TestApp, ADMIN};
use crate::helpers::test_session::{is_turn_of, TestSession};

const CHAT: ChatKey = ChatKey(-1001);

#[tokio::test(start_paused = true)]
async fn countdown_starts_the_game_on_its_own() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.client.set_mode(Mode::Antonym).await.unwrap();
    session.join(1, "alice").await;
    let started = Instant::now();
    session.join(2, "bob").await;

    let turn = session
        .wait_for(|event| matches!(event, SessionEvent::TurnStarted { .. }))
        .await;
    assert!(started.elapsed() >= Duration::from_secs(30));

    match turn {
        SessionEvent::TurnStarted {
            player,
            mode,
            deadline_seconds,
            turn,
            ..
        } => {
            assert_eq!(player.id, PlayerId(1));
            assert_eq!(mode, Mode::Antonym);
            assert_eq!(deadline_seconds, 20);
            assert_eq!(turn, 1);
        }
        other => panic!("Unexpected event {other:?}"),
    }
    let snapshot = session.client.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionFsmState::Active);
    assert_eq!(snapshot.armed_timer, Some(TimerKind::TurnTimeout));
    assert_eq!(snapshot.current_turn_index, 0);
}

#[tokio::test(start_paused = true)]
async fn countdown_announces_every_milestone() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    session.join(2, "bob").await;

    let mut remaining = vec![];
    loop {
        match session.next_event().await {
            SessionEvent::CountdownTick { remaining_seconds } => remaining.push(remaining_seconds),
            SessionEvent::TurnStarted { .. } => break,
            _ => {}
        }
    }

    assert_eq!(remaining, vec![30, 25, 20, 15, 10, 5]);
}

#[tokio::test(start_paused = true)]
async fn manual_start_during_the_countdown_begins_a_single_turn() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    session.join(2, "bob").await;
    session
        .wait_for(|event| matches!(event, SessionEvent::CountdownTick { .. }))
        .await;

    session.client.start_active().await.unwrap();
    session.client.start_active().await.unwrap();

    let events = session.events_during(Duration::from_secs(15)).await;
    let turns = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::TurnStarted { .. }))
        .count();
    assert_eq!(turns, 1);
    assert!(!events
        .iter()
        .any(|event| matches!(event, SessionEvent::CountdownTick { .. } | SessionEvent::CountdownPaused)));
    let snapshot = session.client.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionFsmState::Active);
    assert_eq!(snapshot.armed_timer, Some(TimerKind::TurnTimeout));
}

#[tokio::test(start_paused = true)]
async fn paused_countdown_does_not_start_the_game() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    session.join(2, "bob").await;

    session.client.cancel_countdown(false).await.unwrap();
    session.client.cancel_countdown(false).await.unwrap();

    let events = session.events_during(Duration::from_secs(60)).await;
    let paused = events
        .iter()
        .filter(|event| **event == SessionEvent::CountdownPaused)
        .count();
    assert_eq!(paused, 1);
    let snapshot = session.client.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionFsmState::Lobby);
    assert_eq!(snapshot.armed_timer, None);
}

#[tokio::test(start_paused = true)]
async fn start_with_a_single_player_is_refused() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;

    let result = session.client.start_active().await;

    assert_eq!(
        result,
        Err(Error::Domain(DomainError::NotEnoughPlayers(1, 2)))
    );
    session
        .wait_for(|event| {
            matches!(
                event,
                SessionEvent::Refused {
                    error: DomainError::NotEnoughPlayers(1, 2),
                    ..
                }
            )
        })
        .await;
    assert_eq!(
        session.client.snapshot().await.unwrap().state,
        SessionFsmState::Lobby
    );
}

#[tokio::test(start_paused = true)]
async fn correct_answer_passes_the_turn() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    session.join(2, "bob").await;
    session.client.set_mode(Mode::Synonym).await.unwrap();
    session.client.start_active().await.unwrap();
    session.wait_for(|event| is_turn_of(event, 1)).await;
    let first_prompt = session
        .client
        .snapshot()
        .await
        .unwrap()
        .current_prompt
        .unwrap();
    let answer = session.correct_answer(&app).await;

    session.client.validate(PlayerId(1), &answer).await.unwrap();

    assert_eq!(
        session.next_event().await,
        SessionEvent::AnswerAccepted {
            player: Player::human(1, "alice").view(),
            word: answer.clone(),
        }
    );
    assert!(is_turn_of(&session.next_event().await, 2));
    let snapshot = session.client.snapshot().await.unwrap();
    assert_eq!(snapshot.current_player, Some(PlayerId(2)));
    assert_ne!(snapshot.current_prompt, Some(first_prompt.clone()));
    assert!(snapshot.used_words.contains(&first_prompt));
    assert!(snapshot.used_words.contains(&answer));
}

#[tokio::test(start_paused = true)]
async fn timeout_with_two_players_ends_the_game() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    session.join(2, "bob").await;
    session.client.start_active().await.unwrap();
    let started = Instant::now();

    let eliminated = session
        .wait_for(|event| matches!(event, SessionEvent::PlayerEliminated { .. }))
        .await;
    let winner = session.next_event().await;

    assert!(started.elapsed() >= Duration::from_secs(20));
    assert!(matches!(eliminated, SessionEvent::PlayerEliminated { player } if player.id == PlayerId(1)));
    assert!(matches!(winner, SessionEvent::Winner { player } if player.id == PlayerId(2)));
    assert!(session.events.next().await.is_none());
    assert!(app
        .application
        .registry()
        .get_session(CHAT)
        .await
        .unwrap()
        .is_none());
    let scores = app.application.score_keeper().get_all().await.unwrap();
    assert_eq!(scores[&PlayerId(1)], ScoreRecord { wins: 0, losses: 1 });
    assert_eq!(scores[&PlayerId(2)], ScoreRecord { wins: 1, losses: 0 });
    assert_eq!(
        session.client.validate(PlayerId(2), "glad").await,
        Err(Error::Domain(DomainError::SessionDoesNotExist(CHAT)))
    );
}

#[tokio::test(start_paused = true)]
async fn three_players_play_until_one_is_left() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        session.join(id, name).await;
    }
    session.client.start_active().await.unwrap();
    session.wait_for(|event| is_turn_of(event, 1)).await;

    let answer = session.correct_answer(&app).await;
    session.client.validate(PlayerId(1), &answer).await.unwrap();
    session.wait_for(|event| is_turn_of(event, 2)).await;
    session
        .wait_for(|event| matches!(event, SessionEvent::PlayerEliminated { .. }))
        .await;
    session.wait_for(|event| is_turn_of(event, 3)).await;
    let answer = session.correct_answer(&app).await;
    session.client.validate(PlayerId(3), &answer).await.unwrap();
    session.wait_for(|event| is_turn_of(event, 1)).await;

    let winner = session
        .wait_for(|event| matches!(event, SessionEvent::Winner { .. }))
        .await;

    assert!(matches!(winner, SessionEvent::Winner { player } if player.id == PlayerId(3)));
    let scores = app.application.score_keeper().get_all().await.unwrap();
    assert_eq!(scores[&PlayerId(1)].losses, 1);
    assert_eq!(scores[&PlayerId(2)].losses, 1);
    assert_eq!(scores[&PlayerId(3)].wins, 1);
}

#[tokio::test(start_paused = true)]
async fn automated_player_keeps_up_until_the_human_runs_out_of_time() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    session.join_bot(99, 1.0).await;
    session.client.start_active().await.unwrap();
    session.wait_for(|event| is_turn_of(event, 1)).await;

    let answer = session.correct_answer(&app).await;
    session.client.validate(PlayerId(1), &answer).await.unwrap();

    let bot_answer = session
        .wait_for(|event| matches!(event, SessionEvent::AnswerAccepted { player, .. } if player.id == PlayerId(99)))
        .await;
    assert!(matches!(bot_answer, SessionEvent::AnswerAccepted { .. }));
    session.wait_for(|event| is_turn_of(event, 1)).await;
    let winner = session
        .wait_for(|event| matches!(event, SessionEvent::Winner { .. }))
        .await;
    assert!(matches!(winner, SessionEvent::Winner { player } if player.id == PlayerId(99) && player.is_automated));
}

#[tokio::test(start_paused = true)]
async fn creator_cancels_the_session() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    session.join(2, "bob").await;

    assert_eq!(
        session.client.cancel(PlayerId(2)).await,
        Err(Error::Domain(DomainError::NotPermitted(PlayerId(2))))
    );
    session.client.cancel(PlayerId(1)).await.unwrap();

    session
        .wait_for(|event| *event == SessionEvent::Cancelled { by: Some(PlayerId(1)) })
        .await;
    assert!(session.events.next().await.is_none());
    assert!(app
        .application
        .registry()
        .get_session(CHAT)
        .await
        .unwrap()
        .is_none());
    assert!(app.application.score_keeper().get_all().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_chat_holds_a_single_session_at_a_time() {
    let app = TestApp::spawn_app();
    let _session = TestSession::open(&app, CHAT).await;

    let result = app.application.registry().create_session(CHAT).await;

    assert_eq!(
        result.unwrap_err(),
        Error::Domain(DomainError::SessionAlreadyExists(CHAT))
    );
    assert!(app
        .application
        .registry()
        .create_session(ChatKey(7))
        .await
        .is_ok());
}

#[tokio::test(start_paused = true)]
async fn join_creates_the_session_when_the_chat_has_none() {
    let app = TestApp::spawn_app();

    let (first, joined) = app
        .application
        .join(CHAT, Player::human(1, "alice"))
        .await
        .unwrap();
    let (second, _) = app
        .application
        .join(CHAT, Player::human(2, "bob"))
        .await
        .unwrap();

    assert!(joined);
    assert_eq!(first.id(), second.id());
    assert_eq!(second.snapshot().await.unwrap().players.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn reset_stops_every_session_and_wipes_the_scores() {
    let app = TestApp::spawn_app();
    let mut session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    app.application
        .score_keeper()
        .record_win(PlayerId(1))
        .await
        .unwrap();

    app.application.reset(ADMIN).await.unwrap();

    assert_eq!(
        session.next_event().await,
        SessionEvent::PlayerJoined {
            player: Player::human(1, "alice").view(),
            players: 1,
            capacity: 4,
        }
    );
    assert_eq!(
        session.next_event().await,
        SessionEvent::Cancelled { by: None }
    );
    assert!(app.application.score_keeper().get_all().await.unwrap().is_empty());
    assert_eq!(app.read_scores_file(), serde_json::json!({}));
}

#[tokio::test(start_paused = true)]
async fn reset_is_refused_to_anyone_but_the_admin() {
    let app = TestApp::spawn_app();
    let session = TestSession::open(&app, CHAT).await;
    session.join(1, "alice").await;
    app.application
        .score_keeper()
        .record_win(PlayerId(1))
        .await
        .unwrap();

    assert_eq!(
        app.application.reset(PlayerId(1)).await,
        Err(Error::Domain(DomainError::NotPermitted(PlayerId(1))))
    );

    assert!(app
        .application
        .registry()
        .get_session(CHAT)
        .await
        .unwrap()
        .is_some());
    assert_eq!(session.client.snapshot().await.unwrap().players.len(), 1);
    let scores = app.application.score_keeper().get_all().await.unwrap();
    assert_eq!(scores[&PlayerId(1)], ScoreRecord { wins: 1, losses: 0 });
}
