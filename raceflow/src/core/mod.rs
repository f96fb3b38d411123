pub mod finish_zone;
pub mod ghost;
pub mod ghost_player;
pub mod ghost_recorder;
pub mod race_controller;
pub mod track_monitor;
