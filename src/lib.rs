pub mod client;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod shutdown;
pub mod sim;
pub mod spawner;
