use std::time::Duration;

use tokio::time;
use wordclash::oracle::WordOracle;
use wordclash::player::{AnswerPolicy, Player, PlayerId};
use wordclash::session::actor_client::{SessionClient, SessionEventReceiver};
use wordclash::session::{ChatKey, SessionEvent};

use super::test_app::TestApp;

pub struct TestSession {
    pub client: SessionClient,
    pub events: SessionEventReceiver,
}

impl TestSession {
    pub async fn open(app: &TestApp, key: ChatKey) -> TestSession {
        let client = app
            .application
            .registry()
            .create_session(key)
            .await
            .expect("Failed to create the session.");
        let events = client
            .subscribe()
            .await
            .expect("Failed to subscribe to the session.");

        TestSession { client, events }
    }

    pub async fn join(&self, id: i64, name: &str) {
        let joined = self
            .client
            .join(Player::human(id, name))
            .await
            .expect("Failed to send the join.");
        assert!(joined, "Player {id} could not join.");
    }

    pub async fn join_bot(&self, id: i64, accuracy: f64) {
        let joined = self
            .client
            .join(Player::automated(id, "bot", AnswerPolicy::new(accuracy)))
            .await
            .expect("Failed to send the join.");
        assert!(joined, "Bot {id} could not join.");
    }

    pub async fn next_event(&mut self) -> SessionEvent {
        time::timeout(Duration::from_secs(300), self.events.next())
            .await
            .expect("No session event received in time.")
            .expect("The session stopped.")
    }

    /// Skips events until one matches.
    pub async fn wait_for(&mut self, predicate: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        loop {
            let event = self.next_event().await;
            if predicate(&event) {
                return event;
            }
        }
    }

    /// Collects whatever the session emits during `duration`.
    pub async fn events_during(&mut self, duration: Duration) -> Vec<SessionEvent> {
        let deadline = time::Instant::now() + duration;
        let mut events = vec![];
        while let Ok(Some(event)) = time::timeout_at(deadline, self.events.next()).await {
            events.push(event);
        }
        events
    }

    pub async fn correct_answer(&self, app: &TestApp) -> String {
        let snapshot = self.client.snapshot().await.expect("Failed to get a snapshot.");
        let prompt = snapshot.current_prompt.expect("No prompt in play.");
        let mode = snapshot.mode.expect("No mode selected.");
        let mut answers: Vec<String> = app
            .oracle
            .get_valid_answers(mode, &prompt)
            .into_iter()
            .filter(|word| !snapshot.used_words.contains(word))
            .collect();
        answers.sort();
        answers.into_iter().next().expect("No answer left for the prompt.")
    }
}

pub fn is_turn_of(event: &SessionEvent, player: i64) -> bool {
    matches!(event, SessionEvent::TurnStarted { player: view, .. } if view.id == PlayerId(player))
}
