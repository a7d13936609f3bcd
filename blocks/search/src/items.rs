//! Item resolution: candidate ids → ranked, paginated item records.

use std::collections::HashSet;
use std::sync::Arc;

use gallery_atoms::posts::{ItemBatch, ItemRecord};

use crate::cache::ShardCache;
use crate::error::FetchError;
use crate::gather::gather_settled;
use crate::store::{fetch_json, IndexStore};

/// `items/batch-001.json` … (1-based, 3 digits)
pub fn batch_key(number: usize) -> String {
    format!("items/batch-{:03}.json", number)
}

pub struct ItemResolver<'a> {
    store: &'a dyn IndexStore,
    cache: &'a ShardCache<ItemBatch>,
    batch_count: usize,
    fanout: usize,
}

impl<'a> ItemResolver<'a> {
    pub fn new(
        store: &'a dyn IndexStore,
        cache: &'a ShardCache<ItemBatch>,
        batch_count: usize,
        fanout: usize,
    ) -> Self {
        Self {
            store,
            cache,
            batch_count,
            fanout: fanout.max(1),
        }
    }

    pub async fn load_batch(&self, number: usize) -> Result<Arc<ItemBatch>, FetchError> {
        let key = batch_key(number);
        self.cache
            .get_or_try_load(&key, || async {
                let batch: ItemBatch = fetch_json(self.store, &key).await?;
                tracing::debug!("Loaded {} ({} items)", key, batch.items.len());
                Ok::<_, FetchError>(batch)
            })
            .await
    }

    /// Records whose id is in `candidates`, in discovery order (batch number,
    /// then position in batch). Stops as soon as every candidate is found.
    pub async fn locate(&self, candidates: &HashSet<String>) -> Vec<ItemRecord> {
        let mut found = Vec::new();
        if candidates.is_empty() {
            return found;
        }

        let numbers: Vec<usize> = (1..=self.batch_count).collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        let mut batches_read = 0;

        for group in numbers.chunks(self.fanout) {
            let results = gather_settled(group.iter().map(|&n| self.load_batch(n))).await;

            for (number, result) in group.iter().zip(results) {
                match result {
                    Ok(batch) => {
                        batches_read += 1;
                        for item in &batch.items {
                            if let Some(id) = candidates.get(&item.id) {
                                if seen.insert(id.as_str()) {
                                    found.push(item.clone());
                                }
                            }
                        }
                    }
                    Err(FetchError::NotFound(key)) => {
                        tracing::debug!("Batch {} missing ({})", number, key)
                    }
                    Err(e) => tracing::warn!("Skipping batch {}: {}", number, e),
                }
            }

            if seen.len() == candidates.len() {
                break;
            }
        }

        tracing::info!(
            "🔎 Located {}/{} candidates after {} batches",
            found.len(),
            candidates.len(),
            batches_read
        );
        found
    }

    /// First batch in stored order, paged, with the batch's total
    pub async fn default_listing(&self, offset: usize, limit: usize) -> (Vec<ItemRecord>, usize) {
        match self.load_batch(1).await {
            Ok(batch) => (paginate(&batch.items, offset, limit), batch.total()),
            Err(e) => {
                tracing::warn!("Default listing unavailable: {}", e);
                (Vec::new(), 0)
            }
        }
    }
}

/// Score descending; equal scores keep discovery order
pub fn rank(records: &mut [ItemRecord]) {
    records.sort_by(|a, b| b.score.cmp(&a.score));
}

pub fn paginate<T: Clone>(records: &[T], offset: usize, limit: usize) -> Vec<T> {
    records.iter().skip(offset).take(limit).cloned().collect()
}
