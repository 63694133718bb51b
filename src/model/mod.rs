pub mod game_save;
pub mod inventory;
pub mod message;
pub mod phase;
pub mod player;
pub mod turn;
