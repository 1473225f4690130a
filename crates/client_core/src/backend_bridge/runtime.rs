//! Background worker: owns a tokio runtime, spawns one task per command.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::Receiver;
use tracing::{debug, error, info, warn};

use crate::{
    backend_bridge::commands::{FetchCommand, QueuedFetch},
    channel::{Delivery, DeliveryOutcome, ResultSender},
    classify::ClassifiedResult,
    client::RecommenderClient,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendOptions {
    pub notify_transport_failures: bool,
}

/// Starts the backend thread. It runs until every command sender is dropped,
/// then waits for fetches still in flight before exiting.
pub fn launch(
    client: Arc<RecommenderClient>,
    cmd_rx: Receiver<QueuedFetch>,
    results: ResultSender,
    options: BackendOptions,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("recommender-backend".to_string())
        .spawn(move || run_backend(client, cmd_rx, results, options))
}

fn run_backend(
    client: Arc<RecommenderClient>,
    cmd_rx: Receiver<QueuedFetch>,
    results: ResultSender,
    options: BackendOptions,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to build backend runtime: {err}");
            return;
        }
    };
    info!(server_url = client.server_url(), "backend worker ready");

    let mut in_flight: Vec<tokio::task::JoinHandle<()>> = Vec::new();
    while let Ok(queued) = cmd_rx.recv() {
        in_flight.retain(|task| !task.is_finished());
        debug!(
            request_id = %queued.request_id,
            command = queued.command.kind().as_str(),
            "backend: spawning fetch"
        );
        in_flight.push(runtime.spawn(run_fetch(
            client.clone(),
            results.clone(),
            queued,
            options,
        )));
    }

    debug!(
        in_flight = in_flight.len(),
        "backend: command queue closed, draining fetches"
    );
    runtime.block_on(async move {
        for task in in_flight {
            if let Err(err) = task.await {
                warn!("backend: fetch task ended abnormally: {err}");
            }
        }
    });
    info!("backend worker stopped");
}

async fn run_fetch(
    client: Arc<RecommenderClient>,
    results: ResultSender,
    queued: QueuedFetch,
    options: BackendOptions,
) {
    let QueuedFetch {
        request_id,
        command,
    } = queued;
    let kind = command.kind();

    let classified = match &command {
        FetchCommand::FetchFavourites { user } => client.fetch_favourites(user).await,
        FetchCommand::AddFavourites { user, titles } => client.add_favourites(user, titles).await,
        FetchCommand::FetchRecommendations { user, context } => {
            client.fetch_recommendations(user, context).await
        }
    };

    let Some(result) = classified else {
        return;
    };

    if let ClassifiedResult::TransportError(cause) = &result {
        if !options.notify_transport_failures {
            warn!(
                %request_id,
                command = kind.as_str(),
                "fetch failed in transport, not surfaced: {cause}"
            );
            return;
        }
    }

    match results.deliver(Delivery {
        request_id,
        kind,
        result,
    }) {
        DeliveryOutcome::Delivered => {
            debug!(%request_id, command = kind.as_str(), "backend: result delivered")
        }
        DeliveryOutcome::ConsumerGone => {
            debug!(%request_id, command = kind.as_str(), "backend: consumer gone, result dropped")
        }
    }
}

#[cfg(test)]
#[path = "../tests/backend_bridge_tests.rs"]
mod tests;
