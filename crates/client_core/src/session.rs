//! Consumer side of one screen: queues fetches, drains deliveries and is the
//! only writer of its [`ViewState`].

use std::{collections::HashSet, sync::Arc, thread::JoinHandle, time::Duration};

use anyhow::Context;
use crossbeam_channel::{bounded, Sender, TrySendError};
use shared::{
    domain::{Companion, RequestId, TimeOfWeek, Venue, ViewingContext},
    protocol::{category_label, TitleList},
};
use tracing::{debug, error};

use crate::{
    backend_bridge::{launch, BackendOptions, FetchCommand, QueuedFetch},
    channel::{result_channel, Delivery, ResultReceiver},
    client::RecommenderClient,
    config::Settings,
    view_state::{CollectionKey, Notice, ViewState},
};

const COMMAND_QUEUE_CAPACITY: usize = 64;

pub const MISSING_CONTEXT_NOTICE: &str = "Please fill the context information.";
pub const MISSING_TITLE_NOTICE: &str = "Please provide the movie title.";

/// Queues a command without blocking; problems land in `status`.
pub fn dispatch_fetch_command(
    cmd_tx: &Sender<QueuedFetch>,
    queued: QueuedFetch,
    status: &mut String,
) -> bool {
    let command = queued.command.kind().as_str();
    match cmd_tx.try_send(queued) {
        Ok(()) => {
            debug!(command, "queued consumer->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "Command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker is not running; restart the session".to_string();
            false
        }
    }
}

pub struct ScreenSession {
    cmd_tx: Option<Sender<QueuedFetch>>,
    results: ResultReceiver,
    view: ViewState,
    status: String,
    pending: HashSet<RequestId>,
    backend: Option<JoinHandle<()>>,
}

impl ScreenSession {
    pub fn new(
        cmd_tx: Sender<QueuedFetch>,
        results: ResultReceiver,
        image_base_url: impl Into<String>,
    ) -> Self {
        Self {
            cmd_tx: Some(cmd_tx),
            results,
            view: ViewState::new(image_base_url),
            status: String::new(),
            pending: HashSet::new(),
            backend: None,
        }
    }

    /// Wires a client, backend worker and result channel from settings.
    pub fn start(settings: &Settings) -> anyhow::Result<Self> {
        let client = RecommenderClient::from_settings(settings)
            .context("failed to build recommender http client")?;
        Self::start_with_client(settings, Arc::new(client))
    }

    pub fn start_with_client(
        settings: &Settings,
        client: Arc<RecommenderClient>,
    ) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_CAPACITY);
        let (results_tx, results_rx) = result_channel();
        let backend = launch(
            client,
            cmd_rx,
            results_tx,
            BackendOptions {
                notify_transport_failures: settings.notify_transport_failures,
            },
        )
        .context("failed to spawn backend worker thread")?;

        let mut session = Self::new(cmd_tx, results_rx, settings.image_base_url.clone());
        session.backend = Some(backend);
        Ok(session)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn request_favourites(&mut self, user: &str) -> Option<RequestId> {
        self.status = "Fetching favourites...".to_string();
        self.dispatch(FetchCommand::FetchFavourites {
            user: user.to_string(),
        })
    }

    pub fn add_favourite(&mut self, user: &str, title: &str) -> Option<RequestId> {
        let title = title.trim();
        if title.is_empty() {
            self.status = MISSING_TITLE_NOTICE.to_string();
            return None;
        }
        self.status = format!("Adding \"{title}\" to favourites...");
        self.dispatch(FetchCommand::AddFavourites {
            user: user.to_string(),
            titles: TitleList::single(title),
        })
    }

    /// Venue and companion must both be chosen before anything is sent.
    pub fn request_recommendations(
        &mut self,
        user: &str,
        time_of_week: TimeOfWeek,
        venue: Option<Venue>,
        companion: Option<Companion>,
    ) -> Option<RequestId> {
        let (Some(venue), Some(companion)) = (venue, companion) else {
            self.status = MISSING_CONTEXT_NOTICE.to_string();
            return None;
        };
        self.status = "Searching for recommendations...".to_string();
        self.dispatch(FetchCommand::FetchRecommendations {
            user: user.to_string(),
            context: ViewingContext {
                time_of_week,
                venue,
                companion,
            },
        })
    }

    fn dispatch(&mut self, command: FetchCommand) -> Option<RequestId> {
        let cmd_tx = match &self.cmd_tx {
            Some(cmd_tx) => cmd_tx,
            None => {
                self.status = "Session is closed".to_string();
                return None;
            }
        };
        let queued = QueuedFetch::new(command);
        let request_id = queued.request_id;
        if dispatch_fetch_command(cmd_tx, queued, &mut self.status) {
            self.pending.insert(request_id);
            Some(request_id)
        } else {
            None
        }
    }

    /// Applies everything delivered so far without blocking.
    pub fn process_deliveries(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(delivery) = self.results.try_recv() {
            notices.extend(self.apply(delivery));
        }
        notices
    }

    /// Blocks up to `timeout` for the next delivery, then drains the rest.
    pub fn wait_for_deliveries(&mut self, timeout: Duration) -> Vec<Notice> {
        let mut notices = match self.results.recv_timeout(timeout) {
            Some(delivery) => self.apply(delivery),
            None => Vec::new(),
        };
        notices.extend(self.process_deliveries());
        notices
    }

    /// Stops tracking requests that will never deliver (dropped responses).
    pub fn forget_pending(&mut self) {
        self.pending.clear();
    }

    fn apply(&mut self, delivery: Delivery) -> Vec<Notice> {
        let Delivery {
            request_id,
            kind,
            result,
        } = delivery;
        self.pending.remove(&request_id);

        let notices = self.view.reconcile(kind.plan(), result);
        if let Some(last) = notices.last() {
            self.status = status_line(last);
        }
        debug!(
            %request_id,
            command = kind.as_str(),
            notices = notices.len(),
            "session: delivery applied"
        );
        notices
    }

    /// Tears the screen down without waiting. Fetches still in flight run to
    /// completion on the backend, but their deliveries are discarded.
    pub fn close(mut self) {
        self.shutdown();
    }

    /// Like [`close`](Self::close), then waits for the backend worker to exit.
    pub fn close_and_wait(mut self) {
        let backend = self.backend.take();
        self.shutdown();
        if let Some(backend) = backend {
            if backend.join().is_err() {
                error!("backend worker panicked during shutdown");
            }
        }
    }

    fn shutdown(&mut self) {
        self.results.close();
        self.cmd_tx.take();
        self.backend.take();
    }
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn status_line(notice: &Notice) -> String {
    match notice {
        Notice::CollectionChanged(CollectionKey::Favourites) => "Favourites updated".to_string(),
        Notice::CollectionChanged(CollectionKey::Category(category)) => {
            format!("Updated \"{}\"", category_label(category))
        }
        Notice::NothingFound(message) => message.clone(),
        Notice::Failure { message, .. } => message.clone(),
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
