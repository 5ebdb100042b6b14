use crate::binding::Binding;
use crate::error::BindResult;
use crate::propagate::Change;
use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};
use tracing::{debug, error};
use weft_dom::HostTree;

/// Changes queued while a batch is open
#[derive(Debug, Default)]
pub(crate) struct BatchState {
    depth: usize,
    pending: BTreeSet<Change>,
}

impl BatchState {
    pub(crate) fn is_open(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn defer(&mut self, change: Change) {
        self.pending.insert(change);
    }

    /// Queued changes with anything already covered by a broader one removed
    fn drain(&mut self) -> Vec<Change> {
        let pending = std::mem::take(&mut self.pending);
        if pending.contains(&Change::All) {
            return vec![Change::All];
        }
        pending
            .iter()
            .filter(|change| {
                !pending
                    .iter()
                    .any(|other| other != *change && other.covers(change))
            })
            .cloned()
            .collect()
    }
}

/// Scope that defers propagation until it is committed or dropped.
///
/// Writes made through the guard update the store immediately; the host tree
/// catches up in one merged pass at the end.
pub struct Batch<'b, H: HostTree> {
    binding: &'b mut Binding<H>,
    finished: bool,
}

impl<H: HostTree> Binding<H> {
    pub fn begin_batch(&mut self) -> Batch<'_, H> {
        self.batch.depth += 1;
        Batch {
            binding: self,
            finished: false,
        }
    }

    fn end_batch(&mut self) -> BindResult<usize> {
        self.batch.depth = self.batch.depth.saturating_sub(1);
        if self.batch.is_open() {
            return Ok(0);
        }

        let changes = self.batch.drain();
        debug!(changes = changes.len(), "Flushing batch");
        // A failing change does not stop the others; the first error is kept
        let mut rewritten = 0;
        let mut failure = None;
        for change in &changes {
            match self.apply(change) {
                Ok(count) => rewritten += count,
                Err(err) if failure.is_none() => failure = Some(err),
                Err(err) => debug!(error = %err, "Further batched change failed"),
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(rewritten),
        }
    }
}

impl<'b, H: HostTree> Batch<'b, H> {
    /// Close the batch and propagate everything it queued
    pub fn commit(mut self) -> BindResult<usize> {
        self.finished = true;
        self.binding.end_batch()
    }
}

impl<'b, H: HostTree> Deref for Batch<'b, H> {
    type Target = Binding<H>;

    fn deref(&self) -> &Binding<H> {
        &*self.binding
    }
}

impl<'b, H: HostTree> DerefMut for Batch<'b, H> {
    fn deref_mut(&mut self) -> &mut Binding<H> {
        &mut *self.binding
    }
}

impl<'b, H: HostTree> Drop for Batch<'b, H> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.binding.end_batch() {
            error!(error = %err, "Failed to flush batched changes");
        }
    }
}
