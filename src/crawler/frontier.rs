//! Priority frontier for discovered-but-unfetched URLs
//!
//! A max-heap keyed by the extractor's predicted link priority, paired with
//! a monotone seen-set: a URL that has ever been enqueued is never accepted
//! again, so nothing dequeued can re-enter the queue. The crawler guards the
//! whole structure with a single lock.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// A single unit of crawl work
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// Normalized absolute URL
    pub url: String,

    /// Link depth from the seed
    pub depth: usize,

    /// Crawl priority, higher first
    pub priority: f64,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.url == other.url
    }
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Priority first; URL as a deterministic tie-break (BinaryHeap is a
        // max-heap, so higher priority pops first)
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.url.cmp(&self.url))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of a frontier push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Entry accepted into the queue
    Queued,
    /// URL was already seen (queued or fetched before)
    Duplicate,
    /// Queue is at capacity
    Full,
}

/// Bounded priority frontier with URL deduplication
pub struct Frontier {
    queue: BinaryHeap<FrontierEntry>,
    seen: HashSet<String>,
    capacity: usize,
}

impl Frontier {
    /// Create a frontier with a fixed queue capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            capacity,
        }
    }

    /// Attempt to enqueue an entry
    pub fn push(&mut self, entry: FrontierEntry) -> PushOutcome {
        if self.seen.contains(&entry.url) {
            return PushOutcome::Duplicate;
        }

        if self.queue.len() >= self.capacity {
            return PushOutcome::Full;
        }

        self.seen.insert(entry.url.clone());
        self.queue.push(entry);
        PushOutcome::Queued
    }

    /// Dequeue the highest-priority entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether a URL has ever been enqueued
    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Total distinct URLs ever enqueued
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
