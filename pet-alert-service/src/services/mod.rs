pub mod database;
pub mod dispatcher;
pub mod metrics;
pub mod providers;

pub use database::{PetDb, PetDirectory};
pub use dispatcher::AlertDispatcher;
pub use self::metrics::{get_metrics, init_metrics, record_alert};
pub use providers::{
    FcmProvider, MockPushProvider, ProviderError, ProviderResponse, PushMessage, PushProvider,
};
