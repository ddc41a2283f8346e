//! Carousel autoplay scheduler.
//!
//! Timing is driven by the caller's clock: `now_ms` comes in with every
//! call, so the scheduler is deterministic and needs no runtime. A
//! carousel runs while its `autoplay` flag is set and it has at least
//! [`MIN_AUTOPLAY_IMAGES`] images.

use pd_core::document::Document;
use pd_core::id::NodeId;
use pd_core::registry::DEFAULT_AUTOPLAY_INTERVAL_MS;

/// Fewer images than this never rotate on their own.
pub const MIN_AUTOPLAY_IMAGES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timer {
    id: NodeId,
    interval: u64,
    image_count: usize,
    next_due: u64,
}

#[derive(Debug, Clone)]
pub struct Autoplay {
    /// Running timers in document order.
    timers: Vec<Timer>,
    default_interval: u64,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOPLAY_INTERVAL_MS)
    }
}

impl Autoplay {
    /// `default_interval_ms` applies to carousels without an interval.
    pub fn new(default_interval_ms: u32) -> Self {
        Self {
            timers: Vec::new(),
            default_interval: u64::from(default_interval_ms.max(1)),
        }
    }

    /// Reconcile timers with the document. New or reconfigured carousels
    /// (interval or image count changed) start a fresh interval from
    /// `now_ms`; carousels that were deleted, switched off, or dropped
    /// below the image threshold stop.
    pub fn sync(&mut self, doc: &Document, now_ms: u64) {
        let mut next = Vec::new();
        for node in doc {
            let Some(carousel) = node.as_carousel() else {
                continue;
            };
            if carousel.autoplay != Some(true) || carousel.images.len() < MIN_AUTOPLAY_IMAGES {
                continue;
            }
            let interval = carousel
                .interval
                .filter(|ms| *ms > 0)
                .map_or(self.default_interval, u64::from);
            let image_count = carousel.images.len();

            let timer = match self.timers.iter().find(|t| t.id == node.id) {
                Some(t) if t.interval == interval && t.image_count == image_count => *t,
                _ => {
                    log::trace!("autoplay: arming {} every {interval}ms", node.id);
                    Timer {
                        id: node.id,
                        interval,
                        image_count,
                        next_due: now_ms + interval,
                    }
                }
            };
            next.push(timer);
        }
        self.timers = next;
    }

    /// Carousels whose interval has elapsed at `now_ms`, in document
    /// order. Each is re-armed one interval from `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> Vec<NodeId> {
        let mut fired = Vec::new();
        for timer in &mut self.timers {
            if timer.next_due <= now_ms {
                fired.push(timer.id);
                timer.next_due = now_ms + timer.interval;
            }
        }
        fired
    }

    pub fn is_running(&self, id: NodeId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
