//! The crawl work queue. Dedup is by canonical URL; termination is detected
//! without a fixed-size barrier by tracking how many discovered-but-not-yet-
//! completed URLs exist, the way a work-stealing queue with unknown total
//! work size has to.

use dashmap::DashMap;
use seo_types::CanonicalUrl;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Shared crawl frontier. `push` is synchronous (callers never block on it);
/// `pop` suspends until work is available, the budget is exhausted, or the
/// frontier is provably drained.
pub struct Frontier {
    queue: Mutex<VecDeque<CanonicalUrl>>,
    visited: DashMap<CanonicalUrl, ()>,
    /// Count of URLs pushed but not yet `complete`d. A worker only pushes
    /// children while the parent it popped is still counted here, so once the
    /// queue is empty and this reaches zero, no further push can ever occur.
    pending: AtomicU64,
    claimed: AtomicU32,
    max_pages: u32,
    deadline: Option<(Instant, Duration)>,
    notify: Notify,
}

impl Frontier {
    pub fn new(max_pages: u32, deadline: Option<Duration>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            visited: DashMap::new(),
            pending: AtomicU64::new(0),
            claimed: AtomicU32::new(0),
            max_pages,
            deadline: deadline.map(|d| (Instant::now(), d)),
            notify: Notify::new(),
        }
    }

    /// Enqueue `url` unless it was already seen or the page budget is already
    /// spoken for. Returns whether the URL was actually enqueued.
    pub fn push(&self, url: CanonicalUrl) -> bool {
        if self.claimed.load(Ordering::SeqCst) >= self.max_pages {
            return false;
        }
        if self.visited.insert(url.clone(), ()).is_some() {
            return false;
        }
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().push_back(url);
        self.notify.notify_one();
        true
    }

    /// Dequeue the next URL to crawl, or `None` once the frontier is drained,
    /// the page budget is spent, or the global deadline has elapsed.
    ///
    /// The budget slot is reserved with a single `fetch_add` before the queue
    /// is even consulted, and released if it turns out not to be needed
    /// (over budget, or no work was actually available) — two workers racing
    /// past a plain load-then-increment could otherwise both observe room
    /// for one more page and together claim two.
    pub async fn pop(&self) -> Option<CanonicalUrl> {
        loop {
            if self.deadline_elapsed() {
                return None;
            }

            let reserved = self.claimed.fetch_add(1, Ordering::SeqCst);
            if reserved >= self.max_pages {
                self.claimed.fetch_sub(1, Ordering::SeqCst);
                return None;
            }

            let popped = self.queue.lock().unwrap().pop_front();
            if let Some(url) = popped {
                return Some(url);
            }
            self.claimed.fetch_sub(1, Ordering::SeqCst);

            if self.pending.load(Ordering::SeqCst) == 0 {
                return None;
            }

            let wait = self.notify.notified();
            tokio::select! {
                _ = wait => {},
                _ = tokio::time::sleep(Duration::from_millis(50)) => {},
            }
        }
    }

    /// Mark the URL a worker popped as finished, whether it produced a
    /// record or was skipped.
    pub fn complete(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn deadline_elapsed(&self) -> bool {
        self.deadline.is_some_and(|(start, limit)| start.elapsed() >= limit)
    }
}
