#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod state;

mod admin_service;
mod context;
mod navigator;
mod practice_service;
mod quiz_client;
mod session_manager;
mod stats_service;

pub use quiz_core::Clock;

pub use admin_service::AdminService;
pub use config::{ClientConfig, ConfigError};
pub use context::Delivery;
pub use error::{ApiError, AuthError, ClientError, ClientInitError};
pub use navigator::Navigator;
pub use practice_service::{PracticeService, SubmitOutcome};
pub use quiz_client::QuizClient;
pub use session_manager::SessionManager;
pub use state::{AppState, View};
pub use stats_service::StatsService;
