use std::ptr;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use promet_model::Exemplar;

use crate::sampler::ExemplarSampler;

/// Lock-free holder for the most recently sampled exemplar of one cell or
/// histogram bucket.
#[derive(Debug, Default)]
pub(crate) struct ExemplarSlot(ArcSwapOption<Exemplar>);

fn as_ptr(held: &Option<Arc<Exemplar>>) -> *const Exemplar {
    held.as_ref().map_or(ptr::null(), Arc::as_ptr)
}

impl ExemplarSlot {
    pub(crate) fn new() -> Self {
        ExemplarSlot(ArcSwapOption::empty())
    }

    /// Offers an observation to the sampler and installs its verdict with a
    /// compare-and-swap loop.
    ///
    /// The loop exits as soon as the sampler declines; it retries only when
    /// another observer swapped the slot between our load and our CAS.
    pub(crate) fn offer(&self, value: f64, sampler: &dyn ExemplarSampler) {
        loop {
            let previous = self.0.load_full();
            let next = match sampler.sample(value, previous.as_deref()) {
                Some(next) => Arc::new(next),
                None => return,
            };
            let swapped = self.0.compare_and_swap(&previous, Some(next));
            if as_ptr(&swapped) == as_ptr(&previous) {
                return;
            }
        }
    }

    /// Unconditionally installs `exemplar`.
    pub(crate) fn replace(&self, exemplar: Exemplar) {
        self.0.store(Some(Arc::new(exemplar)));
    }

    /// Reads the held exemplar.
    ///
    /// Collect paths call this before loading the numeric state, so a
    /// reported exemplar never describes an observation the numbers have
    /// not caught up with yet.
    pub(crate) fn peek(&self) -> Option<Exemplar> {
        self.0.load_full().map(|held| (*held).clone())
    }
}
