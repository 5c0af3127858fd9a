use crate::models::game::Game;
use crate::models::game_options::PlayerMode;

/// Advances the shared round counter of a two player game.
///
/// Each player's latest answer is stamped with the current round the first time it is
/// seen. When both latest answers belong to the current round and both are wrong, the
/// round moves on. Single player games and games where either player has not answered
/// yet are left untouched.
pub fn update_round(game: &mut Game, user_id: &str) {
    if game.game_options.player_mode != PlayerMode::Opponent {
        return;
    }
    let Some(other_player_id) = game.other_player(user_id).map(str::to_string) else {
        return;
    };
    let (Some(current_index), Some(other_index)) = (
        last_index_of(game, user_id),
        last_index_of(game, &other_player_id),
    ) else {
        return;
    };

    let round = match game.round {
        Some(round) => round,
        None => game
            .stats
            .get(user_id)
            .map_or(1, |stat| stat.round.max(1)),
    };
    game.round = Some(round);

    for index in [current_index, other_index] {
        let qna = &mut game.player_qnas[index];
        if qna.round.is_none() {
            qna.round = Some(round);
        }
    }

    let current = &game.player_qnas[current_index];
    let other = &game.player_qnas[other_index];
    if current.round == Some(round)
        && other.round == Some(round)
        && !current.answer_correct
        && !other.answer_correct
    {
        game.round = Some(round + 1);
    }
}

fn last_index_of(game: &Game, player_id: &str) -> Option<usize> {
    game.player_qnas
        .iter()
        .rposition(|qna| qna.player_id == player_id)
}
