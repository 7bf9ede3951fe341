//! Background task queue
//!
//! Request handlers hand side-effecting work (verification and reset
//! emails) to a [`TaskDistributor`]. A [`TaskProcessor`] claims due tasks
//! from a [`TaskBroker`], dispatches them to registered handlers and applies
//! the retry policy. Delivery is at least once: a task whose worker dies
//! mid-flight becomes claimable again once its lease runs out.

mod broker;
mod distributor;
mod envelope;
mod handlers;
mod mock_broker;
mod payload;
mod processor;

#[cfg(test)]
mod tests;

pub use broker::{TaskBroker, DEFAULT_LEASE};
pub use distributor::{BrokerTaskDistributor, TaskDistributor};
pub use envelope::TaskEnvelope;
pub use handlers::{SendResetPasswordEmailHandler, SendVerifyEmailHandler};
pub use mock_broker::MockTaskBroker;
pub use payload::{
    PayloadSendResetPasswordEmail, PayloadSendVerifyEmail, TaskOptions, QUEUE_CRITICAL, QUEUE_DEFAULT,
    TASK_SEND_RESET_PASSWORD_EMAIL, TASK_SEND_VERIFY_EMAIL,
};
pub use processor::{retry_delay, ProcessorConfig, ProcessorHandle, TaskHandler, TaskOutcome, TaskProcessor};
