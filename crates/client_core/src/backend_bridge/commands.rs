//! Fetch commands queued from the consumer to the backend worker.

use shared::{
    domain::{RequestId, ViewingContext},
    protocol::TitleList,
};

use crate::client::FetchKind;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchCommand {
    FetchFavourites {
        user: String,
    },
    AddFavourites {
        user: String,
        titles: TitleList,
    },
    FetchRecommendations {
        user: String,
        context: ViewingContext,
    },
}

impl FetchCommand {
    pub fn kind(&self) -> FetchKind {
        match self {
            Self::FetchFavourites { .. } => FetchKind::Favourites,
            Self::AddFavourites { .. } => FetchKind::AddFavourites,
            Self::FetchRecommendations { .. } => FetchKind::Recommendations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedFetch {
    pub request_id: RequestId,
    pub command: FetchCommand,
}

impl QueuedFetch {
    pub fn new(command: FetchCommand) -> Self {
        Self {
            request_id: RequestId::new(),
            command,
        }
    }
}
