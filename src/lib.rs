pub mod assets;
pub mod audio;
pub mod config;
pub mod game;
pub mod input;
pub mod puzzle;
pub mod render;
pub mod shell;
pub mod timer;
