use anyhow::{bail, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::models::{ExerciseKind, PoseFrame};

/// One entry in the analysis stream.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem {
    Frame(PoseFrame),
    /// Exercise switch, applied after every frame queued before it.
    Select(ExerciseKind),
}

/// Bounded single-consumer frame buffer between capture and analysis.
///
/// When full, the oldest frame is evicted: phase detection only cares about
/// the latest movement, and stale frames would make deltas meaningless.
/// Exercise switches travel in the same stream, are never evicted and do not
/// count toward the capacity.
pub struct FrameQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    notify: Notify,
}

struct QueueState {
    items: VecDeque<QueueItem>,
    frame_count: usize,
    closed: bool,
}

impl QueueState {
    fn evict_oldest_frame(&mut self) -> Option<PoseFrame> {
        let position = self
            .items
            .iter()
            .position(|item| matches!(item, QueueItem::Frame(_)))?;
        match self.items.remove(position) {
            Some(QueueItem::Frame(frame)) => {
                self.frame_count -= 1;
                Some(frame)
            }
            _ => None,
        }
    }
}

impl FrameQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                frame_count: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Enqueues `frame`, returning the frame evicted to make room, if any.
    pub fn push(&self, frame: PoseFrame) -> Result<Option<PoseFrame>> {
        let evicted = {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                bail!("frame queue closed");
            }
            let evicted = if state.frame_count >= self.capacity {
                state.evict_oldest_frame()
            } else {
                None
            };
            state.items.push_back(QueueItem::Frame(frame));
            state.frame_count += 1;
            evicted
        };
        self.notify.notify_one();
        Ok(evicted)
    }

    /// Enqueues an exercise switch behind the frames already waiting.
    pub fn push_select(&self, kind: ExerciseKind) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                bail!("frame queue closed");
            }
            state.items.push_back(QueueItem::Select(kind));
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Next item in arrival order. `None` once the queue is closed and empty.
    pub async fn pop(&self) -> Option<QueueItem> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().unwrap();
                if let Some(item) = state.items.pop_front() {
                    if matches!(item, QueueItem::Frame(_)) {
                        state.frame_count -= 1;
                    }
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Stops accepting frames; already queued frames can still be popped.
    pub fn close(&self) {
        self.state.lock().unwrap().closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Number of queued frames; pending switches are not counted.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().frame_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::test_support::standing_frame;
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    async fn pop_timestamp(queue: &FrameQueue) -> Option<u64> {
        match queue.pop().await {
            Some(QueueItem::Frame(frame)) => Some(frame.timestamp_ms),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_drop_oldest_when_full() {
        let queue = FrameQueue::new(2);
        assert!(queue.push(standing_frame(0)).unwrap().is_none());
        assert!(queue.push(standing_frame(33)).unwrap().is_none());
        let evicted = queue.push(standing_frame(66)).unwrap();
        assert_eq!(evicted.map(|f| f.timestamp_ms), Some(0));
        assert_eq!(queue.len(), 2);

        assert_eq!(pop_timestamp(&queue).await, Some(33));
        assert_eq!(pop_timestamp(&queue).await, Some(66));
    }

    #[tokio::test]
    async fn test_switch_keeps_its_place_under_eviction() {
        let queue = FrameQueue::new(2);
        queue.push(standing_frame(0)).unwrap();
        queue.push_select(ExerciseKind::Pushups).unwrap();
        queue.push(standing_frame(33)).unwrap();
        assert_eq!(queue.len(), 2);

        let evicted = queue.push(standing_frame(66)).unwrap();
        assert_eq!(evicted.map(|f| f.timestamp_ms), Some(0));
        assert_eq!(queue.len(), 2);

        assert_eq!(
            queue.pop().await,
            Some(QueueItem::Select(ExerciseKind::Pushups))
        );
        assert_eq!(pop_timestamp(&queue).await, Some(33));
        assert_eq!(pop_timestamp(&queue).await, Some(66));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_closed_queue_rejects_switches() {
        let queue = FrameQueue::new(2);
        queue.close();
        assert!(queue.push_select(ExerciseKind::Squats).is_err());
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let queue = FrameQueue::new(4);
        queue.push(standing_frame(0)).unwrap();
        queue.close();
        assert!(queue.push(standing_frame(33)).is_err());
        assert!(queue.pop().await.is_some());
        assert!(queue.pop().await.is_none());
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = Arc::new(FrameQueue::new(4));
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.push(standing_frame(7)).unwrap();

        let popped = timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(popped, Some(QueueItem::Frame(standing_frame(7))));
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_consumer() {
        let queue = Arc::new(FrameQueue::new(4));
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close();

        let popped = timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert!(popped.is_none());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(FrameQueue::new(0).capacity(), 1);
    }
}
