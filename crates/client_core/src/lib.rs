//! Client side of the movie recommender: request building, HTTP execution,
//! outcome classification, result delivery and view-state reconciliation.

pub mod backend_bridge;
pub mod channel;
pub mod classify;
pub mod client;
pub mod config;
pub mod request;
pub mod session;
pub mod transport;
pub mod view_state;

pub use channel::{result_channel, Delivery, DeliveryOutcome, ResultReceiver, ResultSender};
pub use classify::{ClassifiedResult, Classifier, Payload, PayloadShape};
pub use client::{FetchKind, RecommenderClient};
pub use config::{load_settings, Settings, SettingsError};
pub use session::ScreenSession;
pub use transport::{HttpTransport, RawResponse, Transport, TransportFailure};
pub use view_state::{CardCollection, CollectionKey, MovieCard, Notice, ViewState};
