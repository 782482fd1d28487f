//! Runtime bridge between the controller command queue and backend event intake.

use std::thread;

use client_core::{SearchClient, Settings};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, error, info};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{BackendEvent, SlotError},
        orchestration::SearchController,
    },
};

/// Wires a controller to a freshly spawned backend worker.
pub fn start_controller(
    settings: &Settings,
    client: SearchClient,
) -> std::io::Result<SearchController> {
    let (cmd_tx, cmd_rx) = bounded(settings.command_queue_capacity);
    let (event_tx, event_rx) = unbounded();
    launch(cmd_rx, event_tx, client)?;
    Ok(SearchController::new(cmd_tx, event_rx, settings))
}

/// Spawns the worker thread. It exits once every command sender is dropped.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    event_tx: Sender<BackendEvent>,
    client: SearchClient,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("search-backend".to_string())
        .spawn(move || run_backend(cmd_rx, event_tx, client))
}

fn run_backend(
    cmd_rx: Receiver<BackendCommand>,
    event_tx: Sender<BackendEvent>,
    client: SearchClient,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to build backend runtime: {err}");
            let reason = format!("backend worker startup failure: {err}");
            // Keep answering so no slot is left loading.
            while let Ok(cmd) = cmd_rx.recv() {
                let slot = cmd.slot();
                let event = failed_event(cmd, SlotError::queue_unavailable(slot, reason.clone()));
                if event_tx.send(event).is_err() {
                    debug!("controller gone; backend worker stopping");
                    break;
                }
            }
            return;
        }
    };

    runtime.block_on(async move {
        info!("backend worker ready");
        while let Ok(cmd) = cmd_rx.recv() {
            let client = client.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let event = execute_command(&client, cmd).await;
                if event_tx.send(event).is_err() {
                    debug!("controller gone; dropping backend outcome");
                }
            });
        }
        debug!("command queue closed; backend worker stopping");
    });
}

/// Runs one command to completion. Transport failures become failed outcomes.
pub async fn execute_command(client: &SearchClient, cmd: BackendCommand) -> BackendEvent {
    let slot = cmd.slot();
    match cmd {
        BackendCommand::Search {
            seq,
            request,
            limit,
        } => BackendEvent::SearchSettled {
            seq,
            result: client
                .search
                .execute(&request, limit)
                .await
                .map_err(|err| SlotError::from_transport(slot, &err)),
        },
        BackendCommand::LoadSuggestions {
            seq,
            request,
            limit,
        } => BackendEvent::SuggestionsSettled {
            seq,
            result: client
                .suggestions
                .load(&request, limit)
                .await
                .map_err(|err| SlotError::from_transport(slot, &err)),
        },
        BackendCommand::LoadBook { seq, book_id } => {
            let result = client
                .books
                .book(&book_id)
                .await
                .map_err(|err| SlotError::from_transport(slot, &err));
            BackendEvent::BookSettled {
                seq,
                book_id,
                result,
            }
        }
    }
}

fn failed_event(cmd: BackendCommand, err: SlotError) -> BackendEvent {
    match cmd {
        BackendCommand::Search { seq, .. } => BackendEvent::SearchSettled {
            seq,
            result: Err(err),
        },
        BackendCommand::LoadSuggestions { seq, .. } => BackendEvent::SuggestionsSettled {
            seq,
            result: Err(err),
        },
        BackendCommand::LoadBook { seq, book_id } => BackendEvent::BookSettled {
            seq,
            book_id,
            result: Err(err),
        },
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
