use tokio::sync::mpsc;

use crate::error::{Result, TrackingError};
use crate::types::{DetectedImage, ImageId, LifecycleEvent};

/// Producer half handed to the host tracking subsystem.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::UnboundedSender<LifecycleEvent>,
}

impl EventSender {
    pub fn send(&self, event: LifecycleEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| TrackingError::SessionClosed)
    }

    pub fn added(&self, image: DetectedImage) -> Result<()> {
        self.send(LifecycleEvent::Added(image))
    }

    pub fn updated(&self, image: DetectedImage) -> Result<()> {
        self.send(LifecycleEvent::Updated(image))
    }

    pub fn removed(&self, id: ImageId) -> Result<()> {
        self.send(LifecycleEvent::Removed(id))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Receiving end of a live tracking session.
///
/// The session ends once every [`EventSender`] clone is dropped and the queued
/// events are drained.
#[derive(Debug)]
pub struct TrackingSession {
    reference_image_group_name: Option<String>,
    receiver: mpsc::UnboundedReceiver<LifecycleEvent>,
}

impl TrackingSession {
    pub fn open(reference_image_group_name: Option<String>) -> (EventSender, TrackingSession) {
        let (sender, receiver) = mpsc::unbounded_channel();
        match &reference_image_group_name {
            Some(group) => log::debug!("opening tracking session for reference group {}", group),
            None => log::debug!("opening tracking session for all reference images"),
        }
        (
            EventSender { sender },
            TrackingSession {
                reference_image_group_name,
                receiver,
            },
        )
    }

    pub fn reference_image_group_name(&self) -> Option<&str> {
        self.reference_image_group_name.as_deref()
    }

    pub async fn next_event(&mut self) -> Option<LifecycleEvent> {
        self.receiver.recv().await
    }

    pub fn receiver_mut(&mut self) -> &mut mpsc::UnboundedReceiver<LifecycleEvent> {
        &mut self.receiver
    }
}

/// Feeds a recorded sequence into `sender` in order. Returns how many were sent.
pub fn replay<I>(events: I, sender: &EventSender) -> Result<usize>
where
    I: IntoIterator<Item = LifecycleEvent>,
{
    let mut count = 0;
    for event in events {
        sender.send(event)?;
        count += 1;
    }
    Ok(count)
}
