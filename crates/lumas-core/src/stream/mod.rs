// ── Reactive entity streams ──
//
// Subscription types for consuming store changes. Every published
// snapshot carries the version it was committed under, so subscribers
// can drop anything they have already seen.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// One committed state of a collection.
///
/// Cheap to clone: the item list is shared behind an `Arc`.
#[derive(Debug)]
pub struct Snapshot<T> {
    version: u64,
    items: Arc<Vec<Arc<T>>>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(version: u64, items: Vec<Arc<T>>) -> Self {
        Self {
            version,
            items: Arc::new(items),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Monotonic version; 0 is the empty initial state.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Items in insertion order.
    pub fn items(&self) -> &Arc<Vec<Arc<T>>> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.iter()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            items: Arc::clone(&self.items),
        }
    }
}

/// A subscription to a collection.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct EntityStream<T: Send + Sync + 'static> {
    current: Snapshot<T>,
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(mut receiver: watch::Receiver<Snapshot<T>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot most recently delivered to this subscriber.
    pub fn current(&self) -> &Snapshot<T> {
        &self.current
    }

    /// The latest committed snapshot, whether or not it was delivered yet.
    pub fn latest(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for a snapshot newer than the current one.
    ///
    /// Returns `None` once the owning store has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        loop {
            self.receiver.changed().await.ok()?;
            let snap = self.receiver.borrow_and_update().clone();
            if snap.version() > self.current.version() {
                self.current = snap.clone();
                return Some(snap);
            }
        }
    }

    /// Convert into a `Stream` yielding each distinct version once.
    pub fn into_stream(self) -> EntityWatchStream<T> {
        EntityWatchStream {
            inner: WatchStream::from_changes(self.receiver),
            last_version: self.current.version(),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Starts after the snapshot the originating [`EntityStream`] had
/// already delivered and never yields the same version twice.
pub struct EntityWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
    last_version: u64,
}

impl<T: Send + Sync + 'static> Stream for EntityWatchStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(snap)) if snap.version() <= self.last_version => {}
                Poll::Ready(Some(snap)) => {
                    self.last_version = snap.version();
                    return Poll::Ready(Some(snap));
                }
                other => return other,
            }
        }
    }
}
