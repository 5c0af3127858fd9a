use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::models::game::{Game, GameStatus};
use crate::models::game_operation::GameOperation;
use crate::models::game_options::PlayerMode;
use crate::models::notification::NotificationCategory;
use crate::models::player_qna::PlayerQnA;
use crate::repositories::account_repository::AccountRepository;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::system_stats_repository::{SystemStatsRepository, GAME_PLAYED_COUNTER};
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::notification_service::GameNotifier;
use crate::services::round_progression::update_round;

/// Answer time recorded when a player lets the 15 second window run out.
pub const TIMED_OUT_ANSWER_SECONDS: u32 = 16;

/// Longest answer time accepted from a client.
pub const MAX_ANSWER_SECONDS: u32 = 60;

/// Applies player actions to a game and persists the result.
#[derive(Clone)]
pub struct GamePlayService {
    games: Arc<dyn GameRepository + Send + Sync>,
    accounts: Arc<dyn AccountRepository + Send + Sync>,
    system_stats: Arc<dyn SystemStatsRepository + Send + Sync>,
    notifier: Arc<dyn GameNotifier + Send + Sync>,
}

impl GamePlayService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        accounts: Arc<dyn AccountRepository + Send + Sync>,
        system_stats: Arc<dyn SystemStatsRepository + Send + Sync>,
        notifier: Arc<dyn GameNotifier + Send + Sync>,
    ) -> Self {
        GamePlayService {
            games,
            accounts,
            system_stats,
            notifier,
        }
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Game, GameServiceError> {
        self.games.get_game(game_id).await.map_err(|e| {
            error!("Failed to load game {}: {}", game_id, e);
            GameServiceError::from(e)
        })
    }

    /// Applies `operation` on behalf of `user_id` and writes the whole record back.
    /// Nothing is retried: any collaborator failure is returned to the caller.
    pub async fn apply_operation(
        &self,
        user_id: &str,
        game: &mut Game,
        operation: GameOperation,
    ) -> Result<(), GameServiceError> {
        let operation_name = operation.name();
        let result = self.dispatch(user_id, game, operation).await;

        match &result {
            Ok(()) => info!(
                "Applied {} to game {} for player {}",
                operation_name, game.id, user_id
            ),
            Err(e) => error!(
                "Failed to apply {} to game {} for player {}: {}",
                operation_name, game.id, user_id, e
            ),
        }
        result
    }

    async fn dispatch(
        &self,
        user_id: &str,
        game: &mut Game,
        operation: GameOperation,
    ) -> Result<(), GameServiceError> {
        if game.game_over && !matches!(operation, GameOperation::ReportStatus(_)) {
            return Err(GameServiceError::GameAlreadyOver(game.id.clone()));
        }

        if let GameOperation::CalculateScore(answer) | GameOperation::ReportStatus(answer) =
            &operation
        {
            validate_answer(answer)?;
        }

        match operation {
            GameOperation::CalculateScore(answer) => {
                self.calculate_score(user_id, game, answer).await?
            }
            GameOperation::GameOver => self.game_over(game).await?,
            GameOperation::ReportStatus(answer) => {
                let index = game
                    .find_qna_index(&answer.question_id)
                    .ok_or_else(|| GameServiceError::QuestionNotFound(answer.question_id.clone()))?;
                game.player_qnas[index] = answer;
            }
            GameOperation::RejectGame => {
                game.game_over = true;
                game.status = GameStatus::Rejected;
                self.system_stats.increment(GAME_PLAYED_COUNTER).await?;
            }
            GameOperation::UpdateRound => update_round(game, user_id),
        }

        self.persist(game).await
    }

    async fn calculate_score(
        &self,
        user_id: &str,
        game: &mut Game,
        answer: PlayerQnA,
    ) -> Result<(), GameServiceError> {
        match game.find_qna_index(&answer.question_id) {
            Some(index) => game.player_qnas[index] = answer.clone(),
            None => game.player_qnas.push(answer.clone()),
        }

        let current_turn_player_id = game.next_turn_player_id.clone();
        game.decide_next_turn(&answer, user_id);

        if answer.answer_correct {
            self.accounts.credit_on_correct_answer(user_id).await?;
        }

        if !game.next_turn_player_id.trim().is_empty()
            && game.next_turn_player_id != current_turn_player_id
        {
            let next_turn_player_id = game.next_turn_player_id.clone();
            self.notifier
                .send_game_play_notification(
                    game,
                    &next_turn_player_id,
                    NotificationCategory::GamePlay,
                )
                .await?;
        }

        game.turn_at = Utc::now();
        game.calculate_stat(&answer.player_id);
        Ok(())
    }

    async fn game_over(&self, game: &mut Game) -> Result<(), GameServiceError> {
        game.game_over = true;
        game.decide_winner();
        if !game.next_turn_player_id.is_empty() {
            let turn_holder = game.next_turn_player_id.clone();
            game.calculate_stat(&turn_holder);
        }
        game.status = GameStatus::Completed;

        if let Some(winner_player_id) = game.winner_player_id.clone() {
            self.accounts.credit_on_win(&winner_player_id).await?;

            if game.game_options.is_opponent_mode()
                && game.game_options.opponent_type.has_human_opponent()
            {
                self.notifier
                    .send_game_play_notification(
                        game,
                        &winner_player_id,
                        NotificationCategory::GamePlay,
                    )
                    .await?;
            }
        }

        self.system_stats.increment(GAME_PLAYED_COUNTER).await?;
        Ok(())
    }

    /// Closes out a turn the player let run out. The latest record is marked wrong with
    /// the timed-out answer time and the opponent gets the turn.
    ///
    /// Returns `true` when the turn was already complete and nothing changed, `false`
    /// when this call changed the turn.
    pub async fn change_the_turn(&self, game: &mut Game) -> Result<bool, GameServiceError> {
        if game.game_over {
            return Ok(true);
        }
        let Some(last) = game.player_qnas.last_mut() else {
            return Ok(true);
        };
        if last.is_answered() {
            return Ok(true);
        }

        last.player_answer_id = None;
        last.answer_correct = false;
        last.player_answer_in_seconds = Some(TIMED_OUT_ANSWER_SECONDS);
        let player_id = last.player_id.clone();

        if game.game_options.player_mode == PlayerMode::Opponent {
            let opponent = game
                .other_player(&game.next_turn_player_id)
                .unwrap_or_default()
                .to_string();
            game.next_turn_player_id = opponent;
        }
        game.turn_at = Utc::now();
        game.calculate_stat(&player_id);

        info!(
            "Turn of player {} timed out in game {}, next turn: {}",
            player_id, game.id, game.next_turn_player_id
        );
        self.persist(game).await?;
        Ok(false)
    }

    async fn persist(&self, game: &mut Game) -> Result<(), GameServiceError> {
        self.games.update_game(game).await.map_err(|e| {
            error!("Failed to persist game {}: {}", game.id, e);
            GameServiceError::from(e)
        })?;
        game.version += 1;
        Ok(())
    }
}

fn validate_answer(answer: &PlayerQnA) -> Result<(), GameServiceError> {
    match answer.player_answer_in_seconds {
        Some(seconds) if seconds > MAX_ANSWER_SECONDS => {
            Err(GameServiceError::ValidationError(format!(
                "Answer time of {} seconds for question {} exceeds {} seconds",
                seconds, answer.question_id, MAX_ANSWER_SECONDS
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::Ordering;

    use crate::models::game_options::GameOptions;
    use crate::repositories::account_repository::MockAccountRepository;
    use crate::repositories::errors::game_repository_errors::GameRepositoryError;
    use crate::repositories::game_repository::tests::InMemoryGameRepository;
    use crate::repositories::system_stats_repository::MockSystemStatsRepository;
    use crate::services::notification_service::MockGameNotifier;

    fn friend_game() -> Game {
        let mut game = Game::new(
            GameOptions::friend("player2"),
            vec!["player1".to_string(), "player2".to_string()],
            "player1",
            GameStatus::Started,
        );
        game.id = "game-1".to_string();
        game.generate_default_stat();
        game
    }

    fn single_game() -> Game {
        let mut game = Game::new(
            GameOptions::single(),
            vec!["solo".to_string()],
            "solo",
            GameStatus::Started,
        );
        game.id = "game-1".to_string();
        game.generate_default_stat();
        game
    }

    fn service(
        games: Arc<InMemoryGameRepository>,
        accounts: MockAccountRepository,
        system_stats: MockSystemStatsRepository,
        notifier: MockGameNotifier,
    ) -> GamePlayService {
        GamePlayService::new(
            games,
            Arc::new(accounts),
            Arc::new(system_stats),
            Arc::new(notifier),
        )
    }

    fn quiet_service(games: Arc<InMemoryGameRepository>) -> GamePlayService {
        service(
            games,
            MockAccountRepository::new(),
            MockSystemStatsRepository::new(),
            MockGameNotifier::new(),
        )
    }

    #[tokio::test]
    async fn test_wrong_answer_passes_turn_and_notifies_opponent() {
        let mut game = friend_game();
        let before = game.turn_at;
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let mut notifier = MockGameNotifier::new();
        notifier
            .expect_send_game_play_notification()
            .withf(|game, player_id, category| {
                game.id == "game-1"
                    && player_id == "player2"
                    && *category == NotificationCategory::GamePlay
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let service = service(
            games.clone(),
            MockAccountRepository::new(),
            MockSystemStatsRepository::new(),
            notifier,
        );

        let answer = PlayerQnA::answered("q1", "player1", "a2", false, 8);
        service
            .apply_operation("player1", &mut game, GameOperation::CalculateScore(answer))
            .await
            .unwrap();

        assert_eq!(game.next_turn_player_id, "player2");
        assert!(game.is_player(&game.next_turn_player_id));
        assert!(game.turn_at >= before);
        assert_eq!(game.stats["player1"].wrong_answers, 1);
        assert_eq!(game.version, 1);

        let stored = games.stored("game-1").unwrap();
        assert_eq!(stored.next_turn_player_id, "player2");
        assert_eq!(stored.player_qnas.len(), 1);
    }

    #[tokio::test]
    async fn test_correct_answer_credits_player_and_keeps_turn() {
        let mut game = friend_game();
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_credit_on_correct_answer()
            .withf(|player_id| player_id == "player1")
            .times(1)
            .returning(|_| Ok(()));
        let mut notifier = MockGameNotifier::new();
        notifier.expect_send_game_play_notification().never();
        let service = service(games, accounts, MockSystemStatsRepository::new(), notifier);

        let answer = PlayerQnA::answered("q1", "player1", "a1", true, 3);
        service
            .apply_operation("player1", &mut game, GameOperation::CalculateScore(answer))
            .await
            .unwrap();

        assert_eq!(game.next_turn_player_id, "player1");
        assert_eq!(game.stats["player1"].score, 1);
    }

    #[tokio::test]
    async fn test_calculate_score_replaces_asked_question_in_place() {
        let mut game = friend_game();
        game.player_qnas.push(PlayerQnA::asked("q1", "player1"));
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_credit_on_correct_answer()
            .returning(|_| Ok(()));
        let service = service(
            games,
            accounts,
            MockSystemStatsRepository::new(),
            MockGameNotifier::new(),
        );

        let answer = PlayerQnA::answered("q1", "player1", "a1", true, 3);
        service
            .apply_operation(
                "player1",
                &mut game,
                GameOperation::CalculateScore(answer.clone()),
            )
            .await
            .unwrap();

        assert_eq!(game.player_qnas, vec![answer]);
    }

    #[tokio::test]
    async fn test_report_status_replaces_matching_entry_only() {
        let mut game = friend_game();
        game.player_qnas
            .push(PlayerQnA::answered("q1", "player1", "a1", false, 9));
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games);

        let mut reported = game.player_qnas[0].clone();
        reported.player_answer_id = Some("a4".to_string());
        service
            .apply_operation(
                "player1",
                &mut game,
                GameOperation::ReportStatus(reported.clone()),
            )
            .await
            .unwrap();

        assert_eq!(game.player_qnas, vec![reported]);
        assert_eq!(game.next_turn_player_id, "player1");
    }

    #[tokio::test]
    async fn test_report_status_unknown_question_is_rejected() {
        let mut game = friend_game();
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games.clone());

        let result = service
            .apply_operation(
                "player1",
                &mut game,
                GameOperation::ReportStatus(PlayerQnA::asked("missing", "player1")),
            )
            .await;

        assert_eq!(
            result,
            Err(GameServiceError::QuestionNotFound("missing".to_string()))
        );
        assert_eq!(games.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_game_over_completes_and_rewards_winner() {
        let mut game = friend_game();
        game.player_qnas = vec![
            PlayerQnA::answered("q1", "player1", "a", true, 4),
            PlayerQnA::answered("q2", "player1", "a", false, 4),
            PlayerQnA::answered("q3", "player2", "a", true, 4),
            PlayerQnA::answered("q4", "player2", "a", true, 4),
        ];
        game.calculate_stat("player1");
        game.calculate_stat("player2");
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_credit_on_win()
            .withf(|player_id| player_id == "player2")
            .times(1)
            .returning(|_| Ok(()));
        let mut system_stats = MockSystemStatsRepository::new();
        system_stats
            .expect_increment()
            .withf(|counter| counter == GAME_PLAYED_COUNTER)
            .times(1)
            .returning(|_| Ok(()));
        let mut notifier = MockGameNotifier::new();
        notifier
            .expect_send_game_play_notification()
            .withf(|game, player_id, _| game.game_over && player_id == "player2")
            .times(1)
            .returning(|_, _, _| Ok(()));
        let service = service(games.clone(), accounts, system_stats, notifier);

        service
            .apply_operation("player1", &mut game, GameOperation::GameOver)
            .await
            .unwrap();

        assert!(game.game_over);
        assert_eq!(game.status, GameStatus::Completed);
        assert_eq!(game.winner_player_id.as_deref(), Some("player2"));
        assert_eq!(
            games.stored("game-1").unwrap().status,
            GameStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_single_game_over_does_not_notify() {
        let mut game = single_game();
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_credit_on_win()
            .withf(|player_id| player_id == "solo")
            .returning(|_| Ok(()));
        let mut system_stats = MockSystemStatsRepository::new();
        system_stats.expect_increment().times(1).returning(|_| Ok(()));
        let mut notifier = MockGameNotifier::new();
        notifier.expect_send_game_play_notification().never();
        let service = service(games, accounts, system_stats, notifier);

        service
            .apply_operation("solo", &mut game, GameOperation::GameOver)
            .await
            .unwrap();

        assert_eq!(game.winner_player_id.as_deref(), Some("solo"));
    }

    #[tokio::test]
    async fn test_reject_game() {
        let mut game = friend_game();
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let mut system_stats = MockSystemStatsRepository::new();
        system_stats
            .expect_increment()
            .withf(|counter| counter == GAME_PLAYED_COUNTER)
            .times(1)
            .returning(|_| Ok(()));
        let service = service(
            games.clone(),
            MockAccountRepository::new(),
            system_stats,
            MockGameNotifier::new(),
        );

        service
            .apply_operation("player2", &mut game, GameOperation::RejectGame)
            .await
            .unwrap();

        let stored = games.stored("game-1").unwrap();
        assert!(stored.game_over);
        assert_eq!(stored.status, GameStatus::Rejected);
        assert!(stored.winner_player_id.is_none());
    }

    #[tokio::test]
    async fn test_update_round_is_persisted() {
        let mut game = friend_game();
        game.player_qnas = vec![
            PlayerQnA::answered("q1", "player1", "a", false, 4),
            PlayerQnA::answered("q2", "player2", "a", false, 4),
        ];
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games.clone());

        service
            .apply_operation("player2", &mut game, GameOperation::UpdateRound)
            .await
            .unwrap();

        assert_eq!(game.round, Some(2));
        assert_eq!(games.stored("game-1").unwrap().round, Some(2));
    }

    #[tokio::test]
    async fn test_operations_on_finished_game_are_rejected() {
        let mut game = friend_game();
        game.game_over = true;
        game.status = GameStatus::Completed;
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games.clone());

        let answer = PlayerQnA::answered("q1", "player1", "a", false, 4);
        let result = service
            .apply_operation("player1", &mut game, GameOperation::CalculateScore(answer))
            .await;

        assert_eq!(
            result,
            Err(GameServiceError::GameAlreadyOver("game-1".to_string()))
        );
        assert_eq!(game.next_turn_player_id, "player1");
        assert_eq!(games.update_calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[case::calculate_score(GameOperation::CalculateScore(PlayerQnA::answered(
        "q1", "player1", "a", false, u32::MAX
    )))]
    #[case::report_status(GameOperation::ReportStatus(PlayerQnA::answered(
        "q1", "player1", "a", false, MAX_ANSWER_SECONDS + 1
    )))]
    #[tokio::test]
    async fn test_oversized_answer_time_is_rejected(#[case] operation: GameOperation) {
        let mut game = friend_game();
        game.player_qnas.push(PlayerQnA::asked("q1", "player1"));
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games.clone());

        let result = service.apply_operation("player1", &mut game, operation).await;

        assert!(matches!(result, Err(GameServiceError::ValidationError(_))));
        assert!(!game.player_qnas[0].is_answered());
        assert_eq!(game.next_turn_player_id, "player1");
        assert_eq!(games.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_answer_time_at_limit_is_accepted() {
        let mut game = friend_game();
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let mut notifier = MockGameNotifier::new();
        notifier
            .expect_send_game_play_notification()
            .returning(|_, _, _| Ok(()));
        let service = service(
            games,
            MockAccountRepository::new(),
            MockSystemStatsRepository::new(),
            notifier,
        );

        let answer = PlayerQnA::answered("q1", "player1", "a", false, MAX_ANSWER_SECONDS);
        service
            .apply_operation("player1", &mut game, GameOperation::CalculateScore(answer))
            .await
            .unwrap();

        assert_eq!(game.stats["player1"].avg_answer_time, MAX_ANSWER_SECONDS);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_propagated() {
        let mut game = friend_game();
        let games = Arc::new(InMemoryGameRepository::failing());
        let service = quiet_service(games);

        let result = service
            .apply_operation("player1", &mut game, GameOperation::UpdateRound)
            .await;

        assert!(matches!(
            result,
            Err(GameServiceError::RepositoryError(GameRepositoryError::DynamoDb(_)))
        ));
        assert_eq!(game.version, 0);
    }

    #[tokio::test]
    async fn test_change_the_turn_times_out_unanswered_question() {
        let mut game = friend_game();
        game.player_qnas.push(PlayerQnA::asked("q1", "player1"));
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games.clone());

        let turn_was_already_complete = service.change_the_turn(&mut game).await.unwrap();

        assert!(!turn_was_already_complete);
        let last = game.player_qnas.last().unwrap();
        assert!(!last.answer_correct);
        assert!(last.player_answer_id.is_none());
        assert_eq!(last.player_answer_in_seconds, Some(TIMED_OUT_ANSWER_SECONDS));
        assert_eq!(game.next_turn_player_id, "player2");
        assert_eq!(game.stats["player1"].wrong_answers, 1);
        assert_eq!(
            games.stored("game-1").unwrap().next_turn_player_id,
            "player2"
        );
    }

    #[tokio::test]
    async fn test_change_the_turn_single_mode_keeps_player() {
        let mut game = single_game();
        game.player_qnas.push(PlayerQnA::asked("q1", "solo"));
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games);

        let turn_was_already_complete = service.change_the_turn(&mut game).await.unwrap();

        assert!(!turn_was_already_complete);
        assert_eq!(game.next_turn_player_id, "solo");
    }

    #[tokio::test]
    async fn test_change_the_turn_is_idempotent_once_answered() {
        let mut game = friend_game();
        game.player_qnas
            .push(PlayerQnA::answered("q1", "player1", "a", true, 0));
        let turn_at = game.turn_at;
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games.clone());

        for _ in 0..3 {
            assert!(service.change_the_turn(&mut game).await.unwrap());
        }

        assert_eq!(game.turn_at, turn_at);
        assert_eq!(games.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_change_the_turn_without_history() {
        let mut game = friend_game();
        let games = Arc::new(InMemoryGameRepository::new().with_games(vec![game.clone()]));
        let service = quiet_service(games);

        assert!(service.change_the_turn(&mut game).await.unwrap());
        assert_eq!(game.next_turn_player_id, "player1");
    }
}
