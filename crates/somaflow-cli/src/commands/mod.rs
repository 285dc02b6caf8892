pub mod breathe;
pub mod config;
pub mod history;
pub mod home;
pub mod settings;
pub mod stats;
pub mod techniques;
