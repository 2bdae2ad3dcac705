//! Stack-discipline resource journal.

/// Records acquired resources in order and releases them in reverse.
///
/// Entries are append-only until teardown. `unwind` pops newest-first and
/// stops at the first release failure, leaving the unreleased entries in
/// place for inspection or a later retry.
#[derive(Debug)]
pub struct Journal<T> {
    entries: Vec<T>,
}

impl<T> Default for Journal<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Journal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a successfully acquired resource.
    pub fn record(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Tracked entries, oldest first.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract a single entry that is being released out of band.
    pub fn remove(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let idx = self.entries.iter().rposition(|e| pred(e))?;
        Some(self.entries.remove(idx))
    }

    /// Release entries newest-first, removing each once `release` succeeds.
    pub fn unwind<E>(&mut self, mut release: impl FnMut(&T) -> Result<(), E>) -> Result<(), E> {
        while let Some(entry) = self.entries.last() {
            release(entry)?;
            self.entries.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwind_releases_in_reverse_order() {
        let mut journal = Journal::new();
        for n in 1..=3 {
            journal.record(n);
        }

        let mut released = Vec::new();
        journal
            .unwind(|n| {
                released.push(*n);
                Ok::<(), ()>(())
            })
            .unwrap();

        assert_eq!(released, vec![3, 2, 1]);
        assert!(journal.is_empty());
    }

    #[test]
    fn unwind_stops_at_first_failure() {
        let mut journal = Journal::new();
        for n in 1..=3 {
            journal.record(n);
        }

        let result = journal.unwind(|n| if *n == 2 { Err("stuck") } else { Ok(()) });

        assert_eq!(result, Err("stuck"));
        // 3 was released, 2 failed and stays, 1 was never attempted.
        assert_eq!(journal.entries(), &[1, 2]);
    }

    #[test]
    fn remove_extracts_single_entry() {
        let mut journal = Journal::new();
        journal.record("a");
        journal.record("b");
        journal.record("c");

        assert_eq!(journal.remove(|e| *e == "b"), Some("b"));
        assert_eq!(journal.remove(|e| *e == "missing"), None);
        assert_eq!(journal.entries(), &["a", "c"]);
    }

    #[test]
    fn remove_takes_newest_match() {
        let mut journal = Journal::new();
        journal.record(1);
        journal.record(2);
        journal.record(1);

        journal.remove(|e| *e == 1);
        assert_eq!(journal.entries(), &[1, 2]);
    }
}
