//! Chunk reassembly: the receiving half of one start/chunk/end channel.
//!
//! One [`ChunkAssembler`] per channel. "start" allocates the slot array
//! and enters `Collecting`; "chunk" fills a slot; "end" joins the slots in
//! index order and returns to `Idle`. The channel is trusted and
//! in-process, so protocol misuse is dropped silently: orphaned chunks,
//! out-of-range indices, and an "end" with no active collection all do
//! nothing. A slot never written joins as an empty segment.

/// Per-channel reassembly state.
///
/// `Complete` is not a stored state: [`ChunkAssembler::end`] hands the
/// joined payload to the caller and the assembler is immediately idle
/// again, ready for the next collection.
#[derive(Debug, Default)]
pub enum ChunkAssembler {
    #[default]
    Idle,
    Collecting {
        /// One slot per announced chunk; `None` until that index arrives.
        slots: Vec<Option<String>>,
    },
}

impl ChunkAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self, ChunkAssembler::Collecting { .. })
    }

    /// Begin a collection of `total_chunks` fragments.
    ///
    /// A fresh start while collecting discards the stale collection; an
    /// abandoned transfer costs nothing but the buffered fragments.
    pub fn start(&mut self, total_chunks: usize) {
        if self.is_collecting() {
            log::debug!("TRANSPORT fresh start discards a stale collection");
        }
        *self = ChunkAssembler::Collecting {
            slots: vec![None; total_chunks],
        };
    }

    /// Store one fragment at its declared index.
    pub fn accept(&mut self, index: usize, chunk: String) {
        match self {
            ChunkAssembler::Collecting { slots } if index < slots.len() => {
                slots[index] = Some(chunk);
            }
            ChunkAssembler::Collecting { slots } => {
                log::debug!(
                    "TRANSPORT chunk index {index} out of range for {} slots, dropped",
                    slots.len()
                );
            }
            ChunkAssembler::Idle => {
                log::debug!("TRANSPORT orphaned chunk {index}, no active collection");
            }
        }
    }

    /// Close the collection and return the payload joined in index order.
    ///
    /// Returns `None` for an "end" with no active collection. Unfilled
    /// slots join as empty segments; the gap is logged but not an error.
    pub fn end(&mut self) -> Option<String> {
        match std::mem::take(self) {
            ChunkAssembler::Idle => None,
            ChunkAssembler::Collecting { slots } => {
                let gaps = slots.iter().filter(|slot| slot.is_none()).count();
                if gaps > 0 {
                    log::debug!("TRANSPORT joined a collection with {gaps} unfilled slots");
                }
                Some(slots.into_iter().map(Option::unwrap_or_default).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chunks_join_in_index_order_not_arrival_order() {
        let mut assembler = ChunkAssembler::new();
        assembler.start(3);
        assembler.accept(2, "ij".into());
        assembler.accept(0, "abcd".into());
        assembler.accept(1, "efgh".into());
        assert_eq!(assembler.end().as_deref(), Some("abcdefghij"));
        assert!(!assembler.is_collecting());
    }

    #[test]
    fn orphaned_and_out_of_range_chunks_are_dropped() {
        let mut assembler = ChunkAssembler::new();
        assembler.accept(0, "lost".into());
        assert_eq!(assembler.end(), None, "end with no collection is a no-op");

        assembler.start(2);
        assembler.accept(5, "beyond".into());
        assembler.accept(0, "ok".into());
        assembler.accept(1, "fine".into());
        assert_eq!(assembler.end().as_deref(), Some("okfine"));
    }

    #[test]
    fn unfilled_slots_join_as_empty_segments() {
        let mut assembler = ChunkAssembler::new();
        assembler.start(3);
        assembler.accept(0, "head".into());
        assembler.accept(2, "tail".into());
        assert_eq!(assembler.end().as_deref(), Some("headtail"));
    }

    #[test]
    fn a_fresh_start_discards_the_stale_collection() {
        let mut assembler = ChunkAssembler::new();
        assembler.start(2);
        assembler.accept(0, "stale".into());

        assembler.start(1);
        assembler.accept(0, "fresh".into());
        assert_eq!(assembler.end().as_deref(), Some("fresh"));
    }

    #[test]
    fn a_parked_collection_waits_for_its_end() {
        let mut assembler = ChunkAssembler::new();
        assembler.start(1);
        assembler.accept(0, "held".into());
        assert!(assembler.is_collecting(), "no end, no join");
        assert_eq!(assembler.end().as_deref(), Some("held"));
    }

    #[test]
    fn duplicate_indices_keep_the_last_write() {
        let mut assembler = ChunkAssembler::new();
        assembler.start(1);
        assembler.accept(0, "first".into());
        assembler.accept(0, "second".into());
        assert_eq!(assembler.end().as_deref(), Some("second"));
    }
}
