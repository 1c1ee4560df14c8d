mod game;
mod helpers;
mod scores;
