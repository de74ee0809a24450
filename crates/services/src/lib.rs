#![forbid(unsafe_code)]

pub mod app_services;
pub mod class_service;
pub mod dashboard_service;
pub mod error;
pub mod progress_service;
pub mod skill_service;

pub use classroom_core::Clock;

pub use app_services::AppServices;
pub use class_service::{CODE_ALPHABET, CODE_LEN, ClassService};
pub use dashboard_service::{DashboardService, StudentDashboard};
pub use error::{AppServicesError, ClassError, DashboardError, ProgressError};
pub use progress_service::ProgressService;
pub use skill_service::SkillService;
