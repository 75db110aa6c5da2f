pub mod channels;
pub mod notification;

pub use channels::{
    NotificationConsumer, NotificationProducer, SharedNotificationProducer,
    create_notification_channel, try_notify,
};
pub use notification::{Notification, NotificationCategory, NotificationLevel};
