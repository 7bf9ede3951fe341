//! Tests for enqueueing typed tasks

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::services::tasks::{
    BrokerTaskDistributor, MockTaskBroker, PayloadSendResetPasswordEmail, PayloadSendVerifyEmail, TaskDistributor,
    TaskOptions, QUEUE_CRITICAL, TASK_SEND_RESET_PASSWORD_EMAIL, TASK_SEND_VERIFY_EMAIL,
};

#[tokio::test]
async fn test_verify_email_task_carries_options() {
    let broker = MockTaskBroker::new();
    let distributor = BrokerTaskDistributor::new(Arc::new(broker.clone()));
    let payload = PayloadSendVerifyEmail {
        user_id: 12,
        client_ip: "10.1.1.1".to_string(),
        user_agent: "firefox".to_string(),
    };
    let before = Utc::now();

    distributor
        .distribute_send_verify_email(
            &payload,
            TaskOptions::new()
                .max_retry(10)
                .process_in(Duration::from_secs(10))
                .queue(QUEUE_CRITICAL),
        )
        .await
        .unwrap();

    let pending = broker.pending(QUEUE_CRITICAL);
    assert_eq!(pending.len(), 1);
    let task = &pending[0];
    assert_eq!(task.task_type, TASK_SEND_VERIFY_EMAIL);
    assert_eq!(task.max_retry, 10);
    assert_eq!(task.retried, 0);
    assert!(task.process_at >= before + chrono::Duration::seconds(10));
    assert_eq!(task.decode::<PayloadSendVerifyEmail>().unwrap(), payload);
}

#[tokio::test]
async fn test_reset_payload_wire_names() {
    let broker = MockTaskBroker::new();
    let distributor = BrokerTaskDistributor::new(Arc::new(broker.clone()));
    let session_id = Uuid::new_v4();

    distributor
        .distribute_send_reset_password_email(
            &PayloadSendResetPasswordEmail {
                session_id,
                user_email: "ada@example.com".to_string(),
            },
            TaskOptions::new().queue(QUEUE_CRITICAL),
        )
        .await
        .unwrap();

    let task = broker.pending(QUEUE_CRITICAL).remove(0);
    assert_eq!(task.task_type, TASK_SEND_RESET_PASSWORD_EMAIL);
    let json: serde_json::Value = serde_json::from_str(&task.payload).unwrap();
    assert_eq!(json["payload_id"], session_id.to_string());
    assert_eq!(json["user_email"], "ada@example.com");
}

#[tokio::test]
async fn test_broker_failure_is_surfaced() {
    let broker = MockTaskBroker::new();
    broker.set_unavailable(true);
    let distributor = BrokerTaskDistributor::new(Arc::new(broker.clone()));

    let err = distributor
        .distribute_send_verify_email(
            &PayloadSendVerifyEmail {
                user_id: 1,
                client_ip: String::new(),
                user_agent: String::new(),
            },
            TaskOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(err.is_dependency());
}
