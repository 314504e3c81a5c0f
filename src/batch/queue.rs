//! Work queue for passing card images to the reader thread.
//!
//! Uses std::sync::mpsc channels. The CLI sends image paths, the card worker
//! receives them and sends one result back per item.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

/// A card image waiting to be read.
#[derive(Debug, Clone)]
pub struct CardWorkItem {
    /// Path to the card image
    pub image_path: PathBuf,
    /// Position in the input list (0-based)
    pub index: usize,
}

impl CardWorkItem {
    pub fn new(image_path: PathBuf, index: usize) -> Self {
        Self { image_path, index }
    }
}

/// Outcome of reading one card.
#[derive(Debug)]
pub struct CardResult {
    pub index: usize,
    pub image_path: PathBuf,
    /// Rendered output, or the error that stopped this card
    pub outcome: Result<String>,
}

/// Creates a new work queue.
///
/// Returns a tuple of (sender, receiver). The channel is unbounded, so the
/// CLI can queue every image up front while the worker reads them one by one.
pub fn create_work_queue() -> (Sender<CardWorkItem>, Receiver<CardWorkItem>) {
    channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_queue_preserves_order() {
        let (sender, receiver) = create_work_queue();

        for i in 0..5 {
            let item = CardWorkItem::new(PathBuf::from(format!("card_{}.png", i)), i);
            sender.send(item).expect("Failed to send");
        }

        for i in 0..5 {
            let received = receiver.recv().expect("Failed to receive");
            assert_eq!(received.index, i);
            assert_eq!(received.image_path, PathBuf::from(format!("card_{}.png", i)));
        }
    }

    #[test]
    fn test_channel_closes_when_sender_dropped() {
        let (sender, receiver) = create_work_queue();

        sender
            .send(CardWorkItem::new(PathBuf::from("card.png"), 0))
            .unwrap();
        drop(sender);

        assert!(receiver.recv().is_ok());
        assert!(receiver.recv().is_err());
    }
}
