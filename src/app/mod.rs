mod study_config;
mod study_service;

pub use study_config::StudyConfig;
pub use study_service::StudyService;
