pub mod config;
pub mod credentials;
pub mod metrics;
pub mod orchestrator;
pub mod photo;
pub mod restoration;
pub mod session;
pub mod testing;
pub mod timeout;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, RemoteConfig, SanitizedConfig, SessionConfig,
};
pub use credentials::{
    platform_key_from_env, ApiKey, CredentialError, CredentialResolver, KeySelector,
    StaticKeySelector,
};
pub use orchestrator::{
    BatchProgress, BatchSummary, ItemOutcome, OrchestratorConfig, OrchestratorError,
    OrchestratorStatus, RestorationOrchestrator,
};
pub use photo::{
    Adjustment, Adjustments, InMemoryPreviews, PhotoError, PhotoEvent, PhotoId, PhotoLibrary,
    PhotoSnapshot, PhotoStatus, PreviewHandle, PreviewProvider,
};
pub use restoration::{
    GeminiClient, ImagePayload, RestorationClient, RestorationError, RestorationMode,
    RestoredImage,
};
pub use session::Session;
pub use timeout::{with_timeout, with_timeout_detached, DEFAULT_TIMEOUT};
