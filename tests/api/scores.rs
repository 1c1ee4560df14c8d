use serde_json::json;
use wordclash::player::PlayerId;
use wordclash::scores::leaderboard::{self, Title};
use wordclash::scores::ScoreRecord;
use wordclash::session::{ChatKey, SessionEvent};

use crate::helpers::test_app::TestApp;
use crate::helpers::test_session::TestSession;
use crate::helpers::unwritable_store::UnwritableScoreStore;

#[tokio::test(start_paused = true)]
async fn legacy_scores_are_migrated_by_the_next_win() {
    let app = TestApp::spawn_app_with_scores(Some(r#"{"123": 5, "456": {"wins": 1, "losses": 2}}"#));
    let mut session = TestSession::open(&app, ChatKey(1)).await;
    session.join(456, "loser").await;
    session.join(123, "veteran").await;
    session.client.start_active().await.unwrap();

    session
        .wait_for(|event| matches!(event, SessionEvent::Winner { .. }))
        .await;
    let scores = app.application.score_keeper().get_all().await.unwrap();

    assert_eq!(scores[&PlayerId(123)], ScoreRecord { wins: 6, losses: 0 });
    assert_eq!(
        app.read_scores_file(),
        json!({
            "123": { "wins": 6, "losses": 0 },
            "456": { "wins": 1, "losses": 3 }
        })
    );
}

#[tokio::test]
async fn leaderboard_reflects_the_persisted_scores() {
    let app = TestApp::spawn_app_with_scores(Some(r#"{"1": 2, "2": 9, "3": {"wins": 2, "losses": 1}}"#));

    let scores = app.application.score_keeper().get_all().await.unwrap();
    let ranking = leaderboard::ranking(&scores);

    assert_eq!(leaderboard::registered_players(&scores), 3);
    assert_eq!(
        ranking.iter().map(|standing| standing.player).collect::<Vec<PlayerId>>(),
        vec![PlayerId(2), PlayerId(1), PlayerId(3)]
    );
    assert_eq!(leaderboard::summary(&scores, PlayerId(2)).title, Title::LivingLegend);
    assert_eq!(leaderboard::summary(&scores, PlayerId(42)).title, Title::Newcomer);
}

#[tokio::test(start_paused = true)]
async fn game_ends_normally_when_scores_cannot_be_written() {
    let app = TestApp::spawn_app_with_store(Box::new(UnwritableScoreStore::default()));
    let mut session = TestSession::open(&app, ChatKey(1)).await;
    session.join(1, "alice").await;
    session.join(2, "bob").await;
    session.client.start_active().await.unwrap();

    let winner = session
        .wait_for(|event| matches!(event, SessionEvent::Winner { .. }))
        .await;

    assert!(matches!(winner, SessionEvent::Winner { player } if player.id == PlayerId(2)));
    assert!(session.events.next().await.is_none());
    assert!(app
        .application
        .registry()
        .get_session(ChatKey(1))
        .await
        .unwrap()
        .is_none());
    let scores = app.application.score_keeper().get_all().await.unwrap();
    assert_eq!(scores[&PlayerId(1)], ScoreRecord { wins: 0, losses: 1 });
    assert_eq!(scores[&PlayerId(2)], ScoreRecord { wins: 1, losses: 0 });

    let mut next_session = TestSession::open(&app, ChatKey(1)).await;
    next_session.join(3, "carol").await;
    assert!(matches!(
        next_session.next_event().await,
        SessionEvent::PlayerJoined { players: 1, .. }
    ));
}
