use std::sync::mpsc;

use crate::render::RenderError;

/// Sending half of a [`MapRequest`]; handed to the map callback.
pub type MapSender = mpsc::Sender<Result<(), RenderError>>;

/// Completion handle of an asynchronous staging-buffer map.
///
/// The callback side sends exactly once. A dropped sender without a result
/// means the device went away before answering.
#[derive(Debug)]
pub struct MapRequest {
    receiver: mpsc::Receiver<Result<(), RenderError>>,
}

impl MapRequest {
    pub fn channel() -> (MapSender, MapRequest) {
        let (sender, receiver) = mpsc::channel();
        (sender, MapRequest { receiver })
    }

    /// Non-blocking check. `None` while the map is still pending.
    pub fn try_complete(&self) -> Option<Result<(), RenderError>> {
        match self.receiver.try_recv() {
            Ok(res) => Some(res),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(RenderError::DeviceLost(
                "staging map callback dropped without a result".to_string(),
            ))),
        }
    }
}
