//! Worker thread runtime for blocking service work.
//!
//! A service that needs blocking I/O (a radio scan, a sensor read) implements
//! [`Job`] and runs it on a [`Worker`]. The worker owns its thread; the only
//! thing it shares with the loop thread is the service's [`QueueHandle`], into
//! which it appends results. Job failures never cross the thread boundary as a
//! panic: they are reported as a `"<worker> failed"` event carrying the error
//! text.
//!
//! Event handlers reach the worker through a [`Mailbox`], which they can capture
//! at registration time, before the worker exists.

use super::messages::Envelope;
use crate::bus::QueueHandle;
use crate::domain::{Result, RuntimeError};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Blocking work executed on a worker thread.
pub trait Job: Send + 'static {
    /// Request type accepted by this job.
    type Message: Send + 'static;

    /// Worker name; also the prefix of the failure event tag.
    fn name(&self) -> &str;

    /// Handles one request, appending any results to `out`.
    ///
    /// # Errors
    ///
    /// Any error is reported on the bus as `"<name> failed"`.
    fn handle(&mut self, message: Self::Message, out: &QueueHandle) -> Result<()>;
}

/// Tag of the event reporting a failed job.
#[must_use]
pub fn failure_tag(worker: &str) -> String {
    format!("{worker} failed")
}

/// Shared sending side of a worker's inbox.
///
/// Empty until a [`Worker`] is spawned into it and again after shutdown.
#[derive(Debug)]
pub struct Mailbox<M> {
    sender: Arc<Mutex<Option<Sender<Envelope<M>>>>>,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<M> Default for Mailbox<M> {
    fn default() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
        }
    }
}

impl<M> Mailbox<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Sender<Envelope<M>>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a running worker is attached.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.slot().is_some()
    }

    /// Posts a request to the worker.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Worker`] if no worker is running.
    pub fn post(&self, payload: M) -> Result<()> {
        let slot = self.slot();
        let sender = slot
            .as_ref()
            .ok_or_else(|| RuntimeError::Worker("worker is not running".to_string()))?;
        sender
            .send(Envelope::request(payload))
            .map_err(|_| RuntimeError::Worker("worker inbox disconnected".to_string()))
    }

    fn open(&self, sender: Sender<Envelope<M>>) {
        *self.slot() = Some(sender);
    }

    fn close(&self) {
        if let Some(sender) = self.slot().take() {
            let _ = sender.send(Envelope::Shutdown);
        }
    }
}

/// A running worker thread.
///
/// Dropping the worker shuts it down and joins the thread.
#[derive(Debug)]
pub struct Worker<M> {
    name: String,
    mailbox: Mailbox<M>,
    thread: Option<JoinHandle<()>>,
}

impl<M: Send + 'static> Worker<M> {
    /// Spawns `job` on a named thread and attaches it to `mailbox`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Worker`] if the thread cannot be spawned.
    pub fn spawn<J>(job: J, mailbox: &Mailbox<M>, out: QueueHandle) -> Result<Self>
    where
        J: Job<Message = M>,
    {
        let name = job.name().to_string();
        let (sender, inbox) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run(job, &inbox, &out))
            .map_err(|e| RuntimeError::Worker(format!("failed to spawn {name}: {e}")))?;

        mailbox.open(sender);
        tracing::debug!(worker = %name, "worker spawned");
        Ok(Self {
            name,
            mailbox: mailbox.clone(),
            thread: Some(thread),
        })
    }
}

impl<M> Worker<M> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops accepting requests, lets queued requests finish, and joins.
    pub fn shutdown(&mut self) {
        self.mailbox.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!(worker = %self.name, "worker thread panicked");
            } else {
                tracing::debug!(worker = %self.name, "worker joined");
            }
        }
    }
}

impl<M> Drop for Worker<M> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<J: Job>(mut job: J, inbox: &Receiver<Envelope<J::Message>>, out: &QueueHandle) {
    let name = job.name().to_string();
    while let Ok(envelope) = inbox.recv() {
        match envelope {
            Envelope::Request { payload, parent } => {
                let span = tracing::debug_span!(parent: &parent, "worker_handle_message", worker = %name);
                let _guard = span.enter();
                if let Err(e) = job.handle(payload, out) {
                    tracing::warn!(worker = %name, error = %e, "job failed");
                    out.emit(failure_tag(&name), e.to_string());
                }
            }
            Envelope::Shutdown => break,
        }
    }
    tracing::debug!(worker = %name, "worker loop exited");
}
