use crate::sync::Mutex;
use std::fmt;
use std::mem;

/// Buffer capacity handed back to the queue after each drain.
pub(crate) const DEFAULT_CAPACITY: usize = 32;

/// FIFO queue shared between the submitting threads and the main thread.
///
/// Producers push one item at a time. The main thread takes the whole backlog
/// in one swap and processes it outside the lock, so producers are never held
/// up by a slow task.
pub(crate) struct TaskQueue<T> {
    buf: Mutex<Vec<T>>,

    /// Capacity of the fresh buffer swapped in by `drain_all`.
    capacity: usize,
}

impl<T> TaskQueue<T> {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends `item` and returns the queue depth including it.
    pub(crate) fn push(&self, item: T) -> usize {
        let mut buf = self.buf.lock();
        buf.push(item);
        buf.len()
    }

    /// Takes every queued item, in push order.
    ///
    /// An empty queue yields an empty `Vec` without allocating, which keeps
    /// idle ticks with nothing to do cheap.
    pub(crate) fn drain_all(&self) -> Vec<T> {
        let mut buf = self.buf.lock();
        if buf.is_empty() {
            return Vec::new();
        }

        mem::replace(&mut *buf, Vec::with_capacity(self.capacity))
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.buf.lock().is_empty()
    }
}

impl<T> fmt::Debug for TaskQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_queue_is_fifo() {
        let queue = TaskQueue::new();
        assert_eq!(queue.push("a"), 1);
        assert_eq!(queue.push("b"), 2);
        assert_eq!(queue.push("c"), 3);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain_all(), vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_drain_does_not_allocate() {
        let queue = TaskQueue::<u64>::new();
        let drained = queue.drain_all();
        assert!(drained.is_empty());
        assert_eq!(drained.capacity(), 0);
    }

    #[test]
    fn test_drain_swaps_in_preallocated_buffer() {
        let queue = TaskQueue::with_capacity(8);
        queue.push(1);

        assert_eq!(queue.drain_all(), vec![1]);
        assert!(queue.buf.lock().capacity() >= 8);
    }

    #[test]
    fn test_push_after_drain_lands_in_next_batch() {
        let queue = TaskQueue::new();
        queue.push(1);
        queue.push(2);

        let first = queue.drain_all();
        queue.push(3);

        assert_eq!(first, vec![1, 2]);
        assert_eq!(queue.drain_all(), vec![3]);
    }

    #[test]
    fn test_concurrent_producers_keep_per_thread_order() {
        let queue = Arc::new(TaskQueue::new());
        let producers = 4;
        let per_producer = 250;

        let handles = (0..producers)
            .map(|p| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..per_producer {
                        queue.push((p, i));
                    }
                })
            })
            .collect::<Vec<_>>();

        let mut seen = Vec::new();
        while handles.iter().any(|h| !h.is_finished()) {
            seen.extend(queue.drain_all());
        }
        for h in handles {
            h.join().unwrap();
        }
        seen.extend(queue.drain_all());

        assert_eq!(seen.len(), producers * per_producer);
        for p in 0..producers {
            let order = seen
                .iter()
                .filter(|(producer, _)| *producer == p)
                .map(|(_, i)| *i)
                .collect::<Vec<_>>();
            assert_eq!(order, (0..per_producer).collect::<Vec<_>>());
        }
    }
}
