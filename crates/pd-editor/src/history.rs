//! Undo/Redo history.
//!
//! A linear past / present / future store over owned snapshots. Every
//! `set` pushes the outgoing present onto the past and clears the future.
//!
//! Drag and resize gestures use **snapshot batching**: the present is
//! captured when the gesture starts, intermediate frames replace the
//! present live, and closing the gesture pushes one history step if the
//! value actually changed.

use std::collections::VecDeque;

/// Past / present / future snapshot store.
#[derive(Debug, Clone)]
pub struct History<T> {
    /// Undo stack, oldest first.
    past: VecDeque<T>,
    present: T,
    /// Redo stack. The last element is the next value `redo` restores.
    future: Vec<T>,
    /// Maximum undo depth; `None` is unbounded.
    max_depth: Option<usize>,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Present captured at the start of the outermost batch.
    batch_snapshot: Option<T>,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_max_depth(initial, None)
    }

    pub fn with_max_depth(initial: T, max_depth: Option<usize>) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Replace the present. Outside a batch the old present becomes an undo
    /// step and the redo stack is cleared.
    pub fn set(&mut self, value: T) {
        if self.batch_depth > 0 {
            self.present = value;
            return;
        }
        let old = std::mem::replace(&mut self.present, value);
        self.push_past(old);
        self.future.clear();
    }

    /// Replace the present without recording an undo step. Used for
    /// transient changes such as carousel autoplay.
    pub fn replace(&mut self, value: T) {
        self.present = value;
    }

    /// Functional form of [`set`](Self::set): compute the next value from
    /// the current one.
    pub fn set_with(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.present);
        self.set(next);
    }

    /// Step back. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.close_batches();
        let Some(prev) = self.past.pop_back() else {
            return false;
        };
        let old = std::mem::replace(&mut self.present, prev);
        self.future.push(old);
        true
    }

    /// Step forward. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.close_batches();
        let Some(next) = self.future.pop() else {
            return false;
        };
        let old = std::mem::replace(&mut self.present, next);
        self.push_past(old);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty() || self.batch_changed()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Replace the present and forget all history (document load).
    pub fn reset(&mut self, value: T) {
        self.present = value;
        self.past.clear();
        self.future.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
    }

    /// Start a batch group. Batches nest; only the outermost one records.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(self.present.clone());
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and the present
    /// differs from the captured snapshot, push one undo step.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        if let Some(before) = self.batch_snapshot.take()
            && before != self.present
        {
            self.push_past(before);
            self.future.clear();
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    fn batch_changed(&self) -> bool {
        self.batch_snapshot
            .as_ref()
            .is_some_and(|before| *before != self.present)
    }

    /// Undo/redo inside an open gesture commits the gesture first.
    fn close_batches(&mut self) {
        if self.batch_depth > 0 {
            log::debug!("history: closing {} open batch(es)", self.batch_depth);
            self.batch_depth = 1;
            self.end_batch();
        }
    }

    fn push_past(&mut self, value: T) {
        self.past.push_back(value);
        if let Some(max) = self.max_depth
            && self.past.len() > max
        {
            self.past.pop_front();
        }
    }
}
