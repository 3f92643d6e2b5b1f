//! Selection controller: owns the flavor list and the active selection.
//!
//! Loads are identified by a [`LoadTicket`]. Beginning a new load supersedes
//! the one in flight: its cancellation token is cancelled and any completion
//! still carrying its ticket is ignored. The last requested load wins.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::factory::convert_with_stats;
use crate::flavor::{Flavor, RawRecord};
use crate::loader::RemoteLoader;
use crate::{LoadError, SelectError};

/// Presentation surface notified of controller state changes.
pub trait Listener {
    fn on_loading_started(&mut self);

    fn on_loading_ended(&mut self);

    fn on_items_changed(&mut self, items: &[Flavor]);

    fn on_selection_changed(&mut self, index: usize, item: &Flavor);

    /// The list was replaced by an empty one, so nothing is selected.
    fn on_selection_cleared(&mut self) {}

    /// A load failed; the previous items and selection are still in place.
    fn on_load_failed(&mut self, _error: &LoadError) {}
}

/// Identifies one load request. Later requests get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Handle for a load started with [`SelectionController::begin_load`].
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub ticket: LoadTicket,
    /// Cancelled when a newer load supersedes this one.
    pub cancel: CancellationToken,
}

/// Result of a spawned fetch, delivered back to the controller's owner.
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: LoadTicket,
    pub result: Result<Vec<RawRecord>, LoadError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
}

/// What [`SelectionController::finish_load`] did with a completion.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Items were replaced. `dropped` counts invalid records skipped.
    Applied { count: usize, dropped: usize },
    /// The fetch failed; state is unchanged.
    Failed(LoadError),
    /// The ticket was superseded; the completion was ignored.
    Stale,
}

struct ActiveLoad {
    ticket: LoadTicket,
    cancel: CancellationToken,
}

pub struct SelectionController<L> {
    listener: L,
    items: Vec<Flavor>,
    selection: Option<usize>,
    state: LoadState,
    last_ticket: u64,
    active: Option<ActiveLoad>,
    started: bool,
}

impl<L: Listener> SelectionController<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            items: Vec::new(),
            selection: None,
            state: LoadState::Idle,
            last_ticket: 0,
            active: None,
            started: false,
        }
    }

    pub fn items(&self) -> &[Flavor] {
        &self.items
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn selected_item(&self) -> Option<&Flavor> {
        self.selection.and_then(|i| self.items.get(i))
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// First load, once the presentation surface is ready.
    ///
    /// Returns `None` if the controller was already started.
    pub async fn start<R>(&mut self, loader: &R, source: &str) -> Option<LoadOutcome>
    where
        R: RemoteLoader + ?Sized,
    {
        if self.started {
            tracing::debug!("controller already started, ignoring start()");
            return None;
        }
        self.started = true;
        Some(self.load(loader, source).await)
    }

    /// Fetch `source` and apply the result.
    pub async fn load<R>(&mut self, loader: &R, source: &str) -> LoadOutcome
    where
        R: RemoteLoader + ?Sized,
    {
        let pending = self.begin_load();
        tracing::debug!(loader = loader.name(), source, ticket = pending.ticket.0, "loading flavors");
        let result = loader.fetch(source).await;
        self.finish_load(pending.ticket, result)
    }

    /// Begin a load and run its fetch on the tokio runtime.
    ///
    /// The completion is sent on `tx` for the owner to pass to
    /// [`finish_load`](Self::finish_load). Nothing is sent if the fetch is
    /// cancelled by a newer load first.
    pub fn spawn_load(
        &mut self,
        loader: Arc<dyn RemoteLoader>,
        source: impl Into<String>,
        tx: mpsc::UnboundedSender<FetchCompletion>,
    ) -> LoadTicket {
        let PendingLoad { ticket, cancel } = self.begin_load();
        let source = source.into();
        tracing::debug!(loader = loader.name(), source = %source, ticket = ticket.0, "spawning flavor fetch");

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(ticket = ticket.0, "fetch cancelled");
                }
                result = loader.fetch(&source) => {
                    let _ = tx.send(FetchCompletion { ticket, result });
                }
            }
        });

        ticket
    }

    /// Issue a new ticket, superseding any load in flight.
    pub fn begin_load(&mut self) -> PendingLoad {
        self.last_ticket += 1;
        let ticket = LoadTicket(self.last_ticket);
        let cancel = CancellationToken::new();

        let previous = self.active.replace(ActiveLoad {
            ticket,
            cancel: cancel.clone(),
        });
        if let Some(prev) = previous {
            tracing::debug!(
                superseded = prev.ticket.0,
                ticket = ticket.0,
                "superseding in-flight load"
            );
            prev.cancel.cancel();
        }

        if self.state == LoadState::Idle {
            self.state = LoadState::Loading;
            self.listener.on_loading_started();
        }

        PendingLoad { ticket, cancel }
    }

    /// Apply a fetch result if `ticket` is still the active load.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<RawRecord>, LoadError>,
    ) -> LoadOutcome {
        match &self.active {
            Some(active) if active.ticket == ticket => {}
            _ => {
                tracing::debug!(ticket = ticket.0, "ignoring stale load completion");
                return LoadOutcome::Stale;
            }
        }
        self.active = None;
        self.state = LoadState::Idle;

        let outcome = match result {
            Ok(records) => {
                let (items, dropped) = convert_with_stats(&records);
                // List and selection are replaced together.
                self.selection = if items.is_empty() { None } else { Some(0) };
                self.items = items;
                tracing::info!(count = self.items.len(), dropped, "flavors loaded");

                self.listener.on_items_changed(&self.items);
                self.notify_selection();
                LoadOutcome::Applied {
                    count: self.items.len(),
                    dropped,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "flavor load failed, keeping previous list");
                self.listener.on_load_failed(&error);
                LoadOutcome::Failed(error)
            }
        };

        self.listener.on_loading_ended();
        outcome
    }

    /// Select the item at `index` in the current list.
    pub fn select(&mut self, index: usize) -> Result<&Flavor, SelectError> {
        let Some(item) = self.items.get(index) else {
            return Err(SelectError::OutOfRange {
                index,
                len: self.items.len(),
            });
        };
        self.selection = Some(index);
        self.listener.on_selection_changed(index, item);
        Ok(item)
    }

    fn notify_selection(&mut self) {
        match self.selection.and_then(|i| self.items.get(i).map(|item| (i, item))) {
            Some((index, item)) => self.listener.on_selection_changed(index, item),
            None => self.listener.on_selection_cleared(),
        }
    }
}
