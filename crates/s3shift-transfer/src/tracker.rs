//! Per-transfer record of which parts have been copied

use s3shift_core::types::PartResult;
use s3shift_core::{Error, Result};

/// What a call to [`CompletionTracker::record`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Recorded; more parts outstanding
    Pending { done: u32, total: u32 },
    /// Recorded the last outstanding part. Returned once per tracker.
    Done,
    /// Part already recorded; nothing changed
    Duplicate,
    /// Tracker already done; nothing changed
    AlreadyDone,
}

/// Collects part results for one multipart session
///
/// Slots are pre-sized to the part count and indexed by part number, so
/// results can arrive in any order and still come out ascending.
#[derive(Debug)]
pub struct CompletionTracker {
    slots: Vec<Option<String>>,
    done: u32,
    completed: bool,
}

impl CompletionTracker {
    pub fn new(total_parts: u32) -> Self {
        Self {
            slots: vec![None; total_parts as usize],
            done: 0,
            completed: total_parts == 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn done_count(&self) -> u32 {
        self.done
    }

    pub fn is_done(&self) -> bool {
        self.completed
    }

    /// Part numbers not yet recorded
    pub fn missing(&self) -> Vec<u32> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }

    /// Record a successful part copy
    pub fn record(&mut self, part_number: u32, e_tag: impl Into<String>) -> Result<RecordOutcome> {
        if self.completed {
            return Ok(RecordOutcome::AlreadyDone);
        }

        let total = self.total();
        if part_number == 0 || part_number > total {
            return Err(Error::InvalidPart(format!(
                "part number {} outside 1..={}",
                part_number, total
            )));
        }

        let slot = &mut self.slots[part_number as usize - 1];
        if slot.is_some() {
            return Ok(RecordOutcome::Duplicate);
        }
        *slot = Some(e_tag.into());
        self.done += 1;

        if self.done == total {
            self.completed = true;
            Ok(RecordOutcome::Done)
        } else {
            Ok(RecordOutcome::Pending {
                done: self.done,
                total,
            })
        }
    }

    pub fn record_result(&mut self, result: PartResult) -> Result<RecordOutcome> {
        self.record(result.part_number, result.e_tag)
    }

    /// All results in ascending part-number order
    pub fn into_ordered(self) -> Result<Vec<PartResult>> {
        if !self.completed {
            return Err(Error::InternalError(format!(
                "{} of {} parts recorded, missing {:?}",
                self.done,
                self.total(),
                self.missing()
            )));
        }

        self.slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.map(|e_tag| PartResult::new(i as u32 + 1, e_tag))
                    .ok_or_else(|| Error::InternalError(format!("part {} has no ETag", i + 1)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_completion() {
        let mut tracker = CompletionTracker::new(3);
        assert_eq!(
            tracker.record(1, "a").unwrap(),
            RecordOutcome::Pending { done: 1, total: 3 }
        );
        assert_eq!(
            tracker.record(2, "b").unwrap(),
            RecordOutcome::Pending { done: 2, total: 3 }
        );
        assert!(!tracker.is_done());
        assert_eq!(tracker.record(3, "c").unwrap(), RecordOutcome::Done);
        assert!(tracker.is_done());

        let parts = tracker.into_ordered().unwrap();
        assert_eq!(
            parts,
            vec![
                PartResult::new(1, "a"),
                PartResult::new(2, "b"),
                PartResult::new(3, "c")
            ]
        );
    }

    #[test]
    fn test_reverse_arrival_is_reordered() {
        let mut tracker = CompletionTracker::new(4);
        for n in (1..=4).rev() {
            tracker.record(n, format!("etag-{}", n)).unwrap();
        }

        let numbers: Vec<u32> = tracker
            .into_ordered()
            .unwrap()
            .iter()
            .map(|p| p.part_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut tracker = CompletionTracker::new(2);
        tracker.record(1, "first").unwrap();
        assert_eq!(tracker.record(1, "again").unwrap(), RecordOutcome::Duplicate);
        assert_eq!(tracker.done_count(), 1);
        assert!(!tracker.is_done());
        assert_eq!(tracker.missing(), vec![2]);

        assert_eq!(tracker.record(2, "second").unwrap(), RecordOutcome::Done);
        let parts = tracker.into_ordered().unwrap();
        assert_eq!(parts[0].e_tag, "first");
    }

    #[test]
    fn test_after_done_is_noop() {
        let mut tracker = CompletionTracker::new(1);
        assert_eq!(tracker.record(1, "x").unwrap(), RecordOutcome::Done);
        assert_eq!(tracker.record(1, "y").unwrap(), RecordOutcome::AlreadyDone);
        assert_eq!(tracker.record(7, "z").unwrap(), RecordOutcome::AlreadyDone);
        assert_eq!(tracker.done_count(), 1);
    }

    #[test]
    fn test_out_of_range_part_number() {
        let mut tracker = CompletionTracker::new(2);
        assert_eq!(tracker.record(0, "x").unwrap_err().code(), "InvalidPart");
        assert_eq!(tracker.record(3, "x").unwrap_err().code(), "InvalidPart");
        assert_eq!(tracker.done_count(), 0);
    }

    #[test]
    fn test_incomplete_tracker_cannot_finalize() {
        let mut tracker = CompletionTracker::new(3);
        tracker.record(2, "b").unwrap();

        let err = tracker.into_ordered().unwrap_err();
        assert_eq!(err.code(), "InternalError");
        assert!(err.to_string().contains("[1, 3]"));
    }
}
