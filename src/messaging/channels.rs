// Lock-free notification channel

use std::sync::{Arc, Mutex};

use ringbuf::HeapRb;
use ringbuf::traits::{Producer, Split};

use crate::messaging::notification::Notification;

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

/// Producer side as shared by the pipeline, its dispatcher and stream callbacks
pub type SharedNotificationProducer = Arc<Mutex<NotificationProducer>>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity.max(1));
    rb.split()
}

/// Push without blocking; dropped if the producer is busy or the buffer is full
pub fn try_notify(tx: Option<&SharedNotificationProducer>, notification: Notification) {
    let Some(tx) = tx else {
        return;
    };
    if let Ok(mut tx) = tx.try_lock() {
        let _ = tx.try_push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::notification::NotificationCategory;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_notify_reaches_consumer() {
        let (tx, mut rx) = create_notification_channel(4);
        let tx = Arc::new(Mutex::new(tx));

        try_notify(
            Some(&tx),
            Notification::warning(NotificationCategory::Actuator, "dropped".to_string()),
        );

        let received = rx.try_pop().unwrap();
        assert_eq!(received.message, "dropped");
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_full_channel_drops_silently() {
        let (tx, mut rx) = create_notification_channel(1);
        let tx = Arc::new(Mutex::new(tx));

        for i in 0..3 {
            try_notify(
                Some(&tx),
                Notification::info(NotificationCategory::Output, format!("n{}", i)),
            );
        }

        assert_eq!(rx.try_pop().unwrap().message, "n0");
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_no_channel_is_a_no_op() {
        try_notify(
            None,
            Notification::info(NotificationCategory::Decode, "ignored".to_string()),
        );
    }
}
