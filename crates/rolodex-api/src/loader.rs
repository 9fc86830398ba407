//! Request-scoped batching of "contacts of person X" lookups.
//!
//! Resolving contacts for every person on a page would otherwise cost one
//! query per person. A [`ContactsLoader`] collects the lookups issued while a
//! short batch window is open and answers all of them with a single
//! [`PersonRepository::find_contacts`] call, handing each caller back the
//! list at its own position.
//!
//! Create one loader per request and drop it afterwards; nothing is memoised
//! across windows.

use std::{
  mem,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use futures::future::try_join_all;
use rolodex_core::{person::Person, store::PersonRepository};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

/// How long a window stays open after its first lookup.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Error)]
pub enum LoadError {
  #[error("contact lookup failed: {0}")]
  Store(Arc<dyn std::error::Error + Send + Sync>),

  #[error("contact batch ended without a result for this lookup")]
  Dropped,
}

type Reply = Result<Vec<Person>, LoadError>;

struct Pending {
  person_id: Uuid,
  reply:     oneshot::Sender<Reply>,
}

struct Batch<R> {
  repo:    Arc<R>,
  pending: Mutex<Vec<Pending>>,
}

impl<R: PersonRepository> Batch<R> {
  /// Queue a lookup; returns `true` if it opened a new window.
  fn enqueue(&self, pending: Pending) -> bool {
    let mut queue = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
    queue.push(pending);
    queue.len() == 1
  }

  fn take(&self) -> Vec<Pending> {
    mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
  }

  async fn dispatch(&self) {
    let batch = self.take();
    if batch.is_empty() {
      return;
    }

    let ids: Vec<Uuid> = batch.iter().map(|p| p.person_id).collect();
    tracing::debug!(size = ids.len(), "executing contacts loader");

    // A dropped receiver just means that caller went away.
    match self.repo.find_contacts(&ids).await {
      Ok(lists) => {
        for (pending, contacts) in batch.into_iter().zip(lists) {
          let _ = pending.reply.send(Ok(contacts));
        }
      }
      Err(e) => {
        let err = LoadError::Store(Arc::new(e));
        for pending in batch {
          let _ = pending.reply.send(Err(err.clone()));
        }
      }
    }
  }
}

/// Coalesces contact lookups issued within one window into one query.
pub struct ContactsLoader<R> {
  batch:  Arc<Batch<R>>,
  window: Duration,
}

impl<R> ContactsLoader<R>
where
  R: PersonRepository + 'static,
{
  pub fn new(repo: Arc<R>) -> Self {
    Self {
      batch:  Arc::new(Batch { repo, pending: Mutex::new(Vec::new()) }),
      window: DEFAULT_WINDOW,
    }
  }

  pub fn with_window(mut self, window: Duration) -> Self {
    self.window = window;
    self
  }

  /// The direct contacts of `person_id`.
  ///
  /// The batch is dispatched from a spawned task, so cancelling one caller
  /// never strands the others in its window.
  pub async fn load(&self, person_id: Uuid) -> Reply {
    let (reply, result) = oneshot::channel();

    if self.batch.enqueue(Pending { person_id, reply }) {
      let batch = Arc::clone(&self.batch);
      let window = self.window;
      tokio::spawn(async move {
        if window.is_zero() {
          tokio::task::yield_now().await;
        } else {
          tokio::time::sleep(window).await;
        }
        batch.dispatch().await;
      });
    }

    result.await.map_err(|_| LoadError::Dropped)?
  }

  /// [`load`](Self::load) for every id, sharing one window. The output is
  /// parallel to `person_ids`.
  pub async fn load_many(&self, person_ids: &[Uuid]) -> Result<Vec<Vec<Person>>, LoadError> {
    try_join_all(person_ids.iter().map(|&id| self.load(id))).await
  }
}
