mod auth;
mod failures;
mod playlist;

pub use auth::CacheError;
pub use auth::TOKEN_SAFETY_MARGIN_SECS;
pub use auth::TokenCache;
pub use failures::FailureLog;
pub use failures::FailureLogError;
pub use playlist::HarmonyPlaylist;
pub use playlist::SONGS_KEY;
pub use playlist::TemplateError;
