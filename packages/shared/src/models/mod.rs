pub mod game;
pub mod game_operation;
pub mod game_options;
pub mod notification;
pub mod player_qna;
pub mod user;
