use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::config::GameRulesConfig;
use crate::models::game::{Game, GameStatus};
use crate::models::notification::NotificationCategory;
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::notification_service::GameNotifier;

/// What a single sweep did.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub checked: usize,
    pub reminders: usize,
    pub expired: usize,
    pub invitations_timed_out: usize,
}

/// Periodic sweep over running games. Sends "time is running out" reminders, ends games
/// whose turn clock ran out and closes invitations nobody accepted.
#[derive(Clone)]
pub struct ExpiryService {
    games: Arc<dyn GameRepository + Send + Sync>,
    notifier: Arc<dyn GameNotifier + Send + Sync>,
    config: GameRulesConfig,
}

impl ExpiryService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        notifier: Arc<dyn GameNotifier + Send + Sync>,
        config: GameRulesConfig,
    ) -> Self {
        ExpiryService {
            games,
            notifier,
            config,
        }
    }

    pub async fn do_game_over_operations(&self) -> Result<SweepSummary, GameServiceError> {
        self.sweep_at(Utc::now()).await
    }

    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepSummary, GameServiceError> {
        let games = self
            .games
            .get_games_needing_expiry_check()
            .await
            .map_err(|e| {
                error!("Failed to load games for expiry check: {}", e);
                GameServiceError::from(e)
            })?;

        let mut summary = SweepSummary::default();
        for mut game in games {
            summary.checked += 1;
            self.check_game(&mut game, now, &mut summary).await?;
        }

        info!(
            "Expiry sweep checked {} games: {} reminders, {} expired, {} invitations timed out",
            summary.checked, summary.reminders, summary.expired, summary.invitations_timed_out
        );
        Ok(summary)
    }

    async fn check_game(
        &self,
        game: &mut Game,
        now: DateTime<Utc>,
        summary: &mut SweepSummary,
    ) -> Result<(), GameServiceError> {
        // Either side of `now` counts, so clock skew still expires games.
        let idle = if now > game.turn_at {
            now - game.turn_at
        } else {
            game.turn_at - now
        };
        let idle_hours = idle.num_hours();
        let idle_minutes = idle.num_minutes();

        // Distance from the reminder point, in either direction.
        let remained_time = if idle_minutes > self.config.before_game_expire_duration {
            idle_minutes - self.config.before_game_expire_duration
        } else {
            self.config.before_game_expire_duration - idle_minutes
        };

        let has_human_opponent = game.game_options.opponent_type.has_human_opponent();

        if has_human_opponent
            && remained_time <= self.config.notification_interval
            && !game.next_turn_player_id.is_empty()
        {
            let turn_holder = game.next_turn_player_id.clone();
            self.notify(game, &turn_holder, NotificationCategory::RemainingTime)
                .await?;
            summary.reminders += 1;
        }

        if idle_hours >= self.config.game_play_duration {
            game.game_over = true;
            game.winner_player_id = game
                .other_player(&game.next_turn_player_id)
                .map(str::to_string);
            game.status = GameStatus::TimeExpired;

            if has_human_opponent {
                if let Some(winner_player_id) = game.winner_player_id.clone() {
                    self.notify(game, &winner_player_id, NotificationCategory::GamePlay)
                        .await?;
                }
            }

            self.persist(game).await?;
            info!(
                "Game {} expired after {} idle hours, winner: {:?}",
                game.id, idle_hours, game.winner_player_id
            );
            summary.expired += 1;
        } else if idle_hours >= self.config.game_invitation_duration
            && game.status.is_waiting_for_invitation()
        {
            game.game_over = true;
            game.status = GameStatus::InvitationTimeout;

            self.persist(game).await?;
            info!("Invitation for game {} timed out", game.id);
            summary.invitations_timed_out += 1;
        }

        Ok(())
    }

    async fn notify(
        &self,
        game: &Game,
        player_id: &str,
        category: NotificationCategory,
    ) -> Result<(), GameServiceError> {
        self.notifier
            .send_game_play_notification(game, player_id, category)
            .await
            .map_err(|e| {
                error!(
                    "Failed to send {:?} notification to {} for game {}: {}",
                    category, player_id, game.id, e
                );
                GameServiceError::from(e)
            })
    }

    async fn persist(&self, game: &mut Game) -> Result<(), GameServiceError> {
        self.games.update_game(game).await.map_err(|e| {
            error!("Failed to persist expired game {}: {}", game.id, e);
            GameServiceError::from(e)
        })?;
        game.version += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use chrono::Duration;
    use proptest::prelude::*;
    use rstest::rstest;

    use crate::models::game_options::GameOptions;
    use crate::repositories::errors::game_repository_errors::GameRepositoryError;
    use crate::repositories::game_repository::tests::InMemoryGameRepository;
    use crate::services::notification_service::MockGameNotifier;

    fn friend_game(idle: Duration, now: DateTime<Utc>, status: GameStatus) -> Game {
        let mut game = Game::new(
            GameOptions::friend("player2"),
            vec!["player1".to_string(), "player2".to_string()],
            "player1",
            status,
        );
        game.id = "game-1".to_string();
        game.turn_at = now - idle;
        game
    }

    fn quiet_notifier() -> MockGameNotifier {
        let mut notifier = MockGameNotifier::new();
        notifier.expect_send_game_play_notification().never();
        notifier
    }

    fn service(games: Arc<InMemoryGameRepository>, notifier: MockGameNotifier) -> ExpiryService {
        ExpiryService::new(games, Arc::new(notifier), GameRulesConfig::default())
    }

    #[tokio::test]
    async fn test_expired_game_goes_to_player_without_turn() {
        let now = Utc::now();
        let game = friend_game(Duration::hours(33), now, GameStatus::Started);
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));
        let mut notifier = MockGameNotifier::new();
        notifier
            .expect_send_game_play_notification()
            .withf(|game, player_id, category| {
                game.status == GameStatus::TimeExpired
                    && player_id == "player2"
                    && *category == NotificationCategory::GamePlay
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let summary = service(games.clone(), notifier).sweep_at(now).await.unwrap();

        assert_eq!(summary.expired, 1);
        assert_eq!(summary.reminders, 0);
        let stored = games.stored("game-1").unwrap();
        assert!(stored.game_over);
        assert_eq!(stored.status, GameStatus::TimeExpired);
        assert_eq!(stored.winner_player_id.as_deref(), Some("player2"));
    }

    #[tokio::test]
    async fn test_turn_clock_in_the_future_still_expires() {
        let now = Utc::now();
        let mut game = friend_game(Duration::zero(), now, GameStatus::Started);
        game.turn_at = now + Duration::hours(40);
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));
        let mut notifier = MockGameNotifier::new();
        notifier
            .expect_send_game_play_notification()
            .returning(|_, _, _| Ok(()));

        let summary = service(games.clone(), notifier).sweep_at(now).await.unwrap();

        assert_eq!(summary.expired, 1);
        assert_eq!(
            games.stored("game-1").unwrap().status,
            GameStatus::TimeExpired
        );
    }

    #[rstest]
    #[case::ten_minutes_out(1910)]
    #[case::one_minute_out(1919)]
    #[tokio::test]
    async fn test_reminder_near_reminder_point(#[case] idle_minutes: i64) {
        let now = Utc::now();
        let game = friend_game(Duration::minutes(idle_minutes), now, GameStatus::Started);
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));
        let mut notifier = MockGameNotifier::new();
        notifier
            .expect_send_game_play_notification()
            .withf(|_, player_id, category| {
                player_id == "player1" && *category == NotificationCategory::RemainingTime
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let summary = service(games.clone(), notifier).sweep_at(now).await.unwrap();

        assert_eq!(summary.reminders, 1);
        assert_eq!(summary.expired, 0);
        assert!(!games.stored("game-1").unwrap().game_over);
        assert_eq!(games.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_player_game_gets_no_reminder() {
        let now = Utc::now();
        let mut game = Game::new(
            GameOptions::single(),
            vec!["solo".to_string()],
            "solo",
            GameStatus::Started,
        );
        game.id = "game-1".to_string();
        game.turn_at = now - Duration::minutes(1915);
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));

        let summary = service(games, quiet_notifier()).sweep_at(now).await.unwrap();

        assert_eq!(summary, SweepSummary { checked: 1, ..SweepSummary::default() });
    }

    #[rstest]
    #[case(GameStatus::WaitingForFriendInvitationAcceptance)]
    #[case(GameStatus::WaitingForRandomPlayerInvitationAcceptance)]
    #[tokio::test]
    async fn test_unaccepted_invitation_times_out(#[case] status: GameStatus) {
        let now = Utc::now();
        let game = friend_game(Duration::hours(25), now, status);
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));

        let summary = service(games.clone(), quiet_notifier())
            .sweep_at(now)
            .await
            .unwrap();

        assert_eq!(summary.invitations_timed_out, 1);
        let stored = games.stored("game-1").unwrap();
        assert!(stored.game_over);
        assert_eq!(stored.status, GameStatus::InvitationTimeout);
        assert!(stored.winner_player_id.is_none());
    }

    #[rstest]
    #[case::started_game_past_invitation_window(GameStatus::Started, 25)]
    #[case::fresh_invitation(GameStatus::WaitingForFriendInvitationAcceptance, 2)]
    #[tokio::test]
    async fn test_games_left_alone(#[case] status: GameStatus, #[case] idle_hours: i64) {
        let now = Utc::now();
        let game = friend_game(Duration::hours(idle_hours), now, status);
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));

        let summary = service(games.clone(), quiet_notifier())
            .sweep_at(now)
            .await
            .unwrap();

        assert_eq!(summary.checked, 1);
        assert_eq!(games.update_calls.load(Ordering::SeqCst), 0);
        assert!(!games.stored("game-1").unwrap().game_over);
    }

    #[tokio::test]
    async fn test_finished_games_are_not_checked() {
        let now = Utc::now();
        let mut game = friend_game(Duration::hours(40), now, GameStatus::Completed);
        game.game_over = true;
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));

        let summary = service(games, quiet_notifier()).sweep_at(now).await.unwrap();

        assert_eq!(summary, SweepSummary::default());
    }

    #[tokio::test]
    async fn test_persistence_failure_stops_sweep() {
        let now = Utc::now();
        let game = friend_game(Duration::hours(40), now, GameStatus::Started);
        let mut repository = InMemoryGameRepository::new().with_games(vec![game]);
        repository.fail_writes = true;
        let games = Arc::new(repository);
        let mut notifier = MockGameNotifier::new();
        notifier
            .expect_send_game_play_notification()
            .returning(|_, _, _| Ok(()));

        let result = service(games, notifier).sweep_at(now).await;

        assert!(matches!(
            result,
            Err(GameServiceError::RepositoryError(GameRepositoryError::DynamoDb(_)))
        ));
    }

    proptest! {
        #[test]
        fn prop_expired_winner_never_holds_turn(
            idle_hours in 32i64..500,
            second_player_holds_turn in any::<bool>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let now = Utc::now();
            let mut game = friend_game(Duration::hours(idle_hours), now, GameStatus::Started);
            if second_player_holds_turn {
                game.next_turn_player_id = "player2".to_string();
            }
            let holder = game.next_turn_player_id.clone();
            let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game]));
            let mut notifier = MockGameNotifier::new();
            notifier
                .expect_send_game_play_notification()
                .returning(|_, _, _| Ok(()));

            runtime
                .block_on(service(games.clone(), notifier).sweep_at(now))
                .unwrap();

            let stored = games.stored("game-1").unwrap();
            prop_assert!(stored.game_over);
            prop_assert_eq!(stored.status, GameStatus::TimeExpired);
            prop_assert!(stored.winner_player_id.is_some());
            prop_assert_ne!(stored.winner_player_id, Some(holder));
        }
    }
}
