pub mod manager;
pub mod question;
pub mod selection;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;

use crate::catalog::question::Question;
use crate::catalog::selection::SelectionError;
use crate::store::{RecordId, RecordStore, StoreError, StoreOptions};
use crate::ui::console::Console;

/// The question set of the current topic plus the randomness used to quiz it.
pub struct QuestionCatalog {
    store: RecordStore<Question>,
    rng: SmallRng,
    width: usize,
}

impl QuestionCatalog {
    pub fn open(
        options: StoreOptions,
        topic: &str,
        width: usize,
        console: &mut dyn Console,
    ) -> Result<Self, StoreError> {
        let store = RecordStore::open(options, topic, console)?;
        Ok(Self::from_store(store, SmallRng::from_entropy(), width))
    }

    pub fn from_store(store: RecordStore<Question>, rng: SmallRng, width: usize) -> Self {
        Self { store, rng, width }
    }

    pub fn topic(&self) -> &str {
        self.store.name()
    }

    pub fn store(&self) -> &RecordStore<Question> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<Question> {
        &mut self.store
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Load another topic. The current one stays in place if loading fails.
    pub fn switch_topic(
        &mut self,
        options: StoreOptions,
        topic: &str,
        console: &mut dyn Console,
    ) -> Result<(), StoreError> {
        let store = RecordStore::open(options, topic, console)?;
        info!(from = %self.store.name(), to = topic, "switched topic");
        self.store = store;
        Ok(())
    }

    pub fn question(&self, id: RecordId) -> Option<&Question> {
        self.store.get(id)
    }

    pub fn enabled_ids(&self) -> Vec<RecordId> {
        self.store
            .iter()
            .filter(|(_, entry)| entry.record.enabled)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn enabled_count(&self) -> usize {
        self.store
            .iter()
            .filter(|(_, entry)| entry.record.enabled)
            .count()
    }

    /// Weighted draw over enabled questions, favouring the ones answered badly.
    pub fn pick_adaptive(&mut self) -> Option<RecordId> {
        let candidates: Vec<(RecordId, f64)> = self
            .store
            .iter()
            .filter(|(_, entry)| entry.record.enabled)
            .map(|(id, entry)| (id, entry.record.weight()))
            .collect();
        selection::adaptive_pick(&candidates, &mut self.rng)
    }

    /// `count` distinct enabled questions for a test. Nothing is mutated.
    pub fn sample(&mut self, count: usize) -> Result<Vec<RecordId>, SelectionError> {
        let pool = self.enabled_ids();
        selection::uniform_sample(&pool, count, &mut self.rng)
    }

    /// All questions in statistics order.
    pub fn ranked_ids(&self) -> Vec<RecordId> {
        let mut rows: Vec<(RecordId, &Question)> = self
            .store
            .iter()
            .map(|(id, entry)| (id, &entry.record))
            .collect();
        rows.sort_by(|a, b| selection::rank_order(*a, *b));
        rows.into_iter().map(|(id, _)| id).collect()
    }

    /// Count an answer against the question. Returns whether it was correct.
    pub fn record_answer(&mut self, id: RecordId, answer: &str) -> Result<bool, StoreError> {
        let mut correct = false;
        self.store.modify_record(id, |question| {
            correct = question.is_correct(answer);
            question.record_answer(correct);
        })?;
        Ok(correct)
    }
}
