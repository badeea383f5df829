use super::memento::Snapshot;
use super::models::Calculation;
use tracing::{debug, warn};

/// Listener invoked after every append to the history.
pub trait HistoryObserver {
    fn name(&self) -> &str;

    /// `history` already contains `calculation` as its last entry.
    fn update(&mut self, calculation: &Calculation, history: &[Calculation]) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// An observer that failed while being notified. The append it was
/// notified about still stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObserverFailure {
    pub observer: String,
    pub message: String,
}

pub struct HistoryStore {
    entries: Vec<Calculation>,
    max_size: usize,
    observers: Vec<(ObserverId, Box<dyn HistoryObserver>)>,
    next_observer_id: u64,
}

impl HistoryStore {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size: max_size.max(1),
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    pub fn entries(&self) -> &[Calculation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends, evicts the oldest entries beyond capacity, then notifies
    /// every observer in registration order.
    pub fn append(&mut self, calculation: Calculation) -> Vec<ObserverFailure> {
        self.entries.push(calculation.clone());
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            for evicted in self.entries.drain(..excess) {
                debug!(%evicted, "evicted oldest history entry");
            }
        }
        self.notify(&calculation)
    }

    fn notify(&mut self, calculation: &Calculation) -> Vec<ObserverFailure> {
        let history = &self.entries;
        let mut failures = Vec::new();
        for (_, observer) in self.observers.iter_mut() {
            if let Err(e) = observer.update(calculation, history) {
                warn!(observer = observer.name(), error = %e, "history observer failed");
                failures.push(ObserverFailure {
                    observer: observer.name().to_string(),
                    message: format!("{:#}", e),
                });
            }
        }
        failures
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.entries.clone())
    }

    /// Replaces the entries wholesale. Keeps the newest entries when the
    /// snapshot is larger than the capacity.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let mut entries = snapshot.into_entries();
        if entries.len() > self.max_size {
            entries.drain(..entries.len() - self.max_size);
        }
        self.entries = entries;
    }

    pub fn register_observer(&mut self, observer: Box<dyn HistoryObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        debug!(observer = observer.name(), "registered history observer");
        self.observers.push((id, observer));
        id
    }

    /// Hands the observer back to the caller.
    pub fn remove_observer(&mut self, id: ObserverId) -> Option<Box<dyn HistoryObserver>> {
        let position = self.observers.iter().position(|(other, _)| *other == id)?;
        Some(self.observers.remove(position).1)
    }
}

#[cfg(test)]
impl HistoryStore {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::calc::models::OperationKind;
    use anyhow::bail;
    use rust_decimal::Decimal;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every notification it receives into a shared log.
    pub(crate) struct RecordingObserver {
        pub(crate) label: String,
        pub(crate) seen: Rc<RefCell<Vec<String>>>,
    }

    impl HistoryObserver for RecordingObserver {
        fn name(&self) -> &str {
            &self.label
        }

        fn update(&mut self, calculation: &Calculation, history: &[Calculation]) -> anyhow::Result<()> {
            self.seen
                .borrow_mut()
                .push(format!("{}:{}:{}", self.label, calculation, history.len()));
            Ok(())
        }
    }

    pub(crate) struct FailingObserver;

    impl HistoryObserver for FailingObserver {
        fn name(&self) -> &str {
            "failing"
        }

        fn update(&mut self, _: &Calculation, _: &[Calculation]) -> anyhow::Result<()> {
            bail!("log sink unavailable")
        }
    }

    fn add(a: i64, b: i64) -> Calculation {
        Calculation::new(OperationKind::Add, Decimal::from(a), Decimal::from(b)).unwrap()
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut store = HistoryStore::new(10);
        store.append(add(1, 1));
        store.append(add(2, 2));
        store.append(add(3, 3));

        let results: Vec<Decimal> = store.entries().iter().map(|c| c.result()).collect();
        assert_eq!(results, vec![Decimal::from(2), Decimal::from(4), Decimal::from(6)]);
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let mut store = HistoryStore::new(3);
        for n in 0..5 {
            store.append(add(n, 0));
        }

        assert_eq!(store.len(), 3);
        let results: Vec<Decimal> = store.entries().iter().map(|c| c.result()).collect();
        assert_eq!(results, vec![Decimal::from(2), Decimal::from(3), Decimal::from(4)]);
    }

    #[test]
    fn test_observers_notified_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = HistoryStore::new(10);
        for label in ["first", "second"] {
            store.register_observer(Box::new(RecordingObserver {
                label: label.to_string(),
                seen: Rc::clone(&seen),
            }));
        }

        store.append(add(2, 3));

        assert_eq!(
            *seen.borrow(),
            vec![
                "first:Addition(2, 3) = 5:1".to_string(),
                "second:Addition(2, 3) = 5:1".to_string(),
            ]
        );
    }

    #[test]
    fn test_failing_observer_does_not_block_others_or_roll_back() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = HistoryStore::new(10);
        store.register_observer(Box::new(FailingObserver));
        store.register_observer(Box::new(RecordingObserver {
            label: "after".to_string(),
            seen: Rc::clone(&seen),
        }));

        let failures = store.append(add(2, 3));

        assert_eq!(store.len(), 1);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(
            failures,
            vec![ObserverFailure {
                observer: "failing".to_string(),
                message: "log sink unavailable".to_string(),
            }]
        );
    }

    #[test]
    fn test_remove_observer_stops_notifications() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = HistoryStore::new(10);
        let id = store.register_observer(Box::new(RecordingObserver {
            label: "only".to_string(),
            seen: Rc::clone(&seen),
        }));

        store.append(add(1, 1));
        let removed = store.remove_observer(id);
        store.append(add(2, 2));

        assert_eq!(removed.map(|o| o.name().to_string()), Some("only".to_string()));
        assert_eq!(seen.borrow().len(), 1);
        assert!(store.remove_observer(id).is_none());
        assert_eq!(store.observer_count(), 0);
    }

    #[test]
    fn test_clear_does_not_notify() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = HistoryStore::new(10);
        store.append(add(1, 1));
        store.register_observer(Box::new(RecordingObserver {
            label: "watch".to_string(),
            seen: Rc::clone(&seen),
        }));

        store.clear();

        assert!(store.is_empty());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut store = HistoryStore::new(10);
        store.append(add(1, 1));
        let snapshot = store.snapshot();

        store.append(add(2, 2));
        assert_eq!(store.len(), 2);
        assert_eq!(snapshot.entries().len(), 1);

        store.restore(snapshot);
        assert_eq!(store.entries(), &[add(1, 1)]);
    }

    #[test]
    fn test_restore_truncates_to_capacity() {
        let mut store = HistoryStore::new(2);
        let snapshot = Snapshot::new(vec![add(1, 0), add(2, 0), add(3, 0)]);

        store.restore(snapshot);
        assert_eq!(store.entries(), &[add(2, 0), add(3, 0)]);
    }

    #[test]
    fn test_history_reads_are_stable() {
        let mut store = HistoryStore::new(10);
        store.append(add(1, 1));
        store.append(add(2, 2));

        let first: Vec<Calculation> = store.entries().to_vec();
        let second: Vec<Calculation> = store.entries().to_vec();
        assert_eq!(first, second);
    }
}
