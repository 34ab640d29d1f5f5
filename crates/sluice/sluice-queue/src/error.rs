#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("the queue already has a live consumer")]
    ConsumerClaimed,
}
