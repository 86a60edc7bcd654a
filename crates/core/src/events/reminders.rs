//! Reminder generation for upcoming events

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use calendai_domain::constants::REMINDER_LOOKAHEAD_MINUTES;
use calendai_domain::{NotificationKind, Result};
use tracing::{debug, instrument};

use super::ports::{EventStore, NotificationStore};

/// Writes a reminder notification for every event starting within the
/// lookahead window, to the owner and every participant, once per
/// (event, user).
pub struct ReminderService {
    events: Arc<dyn EventStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl ReminderService {
    pub fn new(events: Arc<dyn EventStore>, notifications: Arc<dyn NotificationStore>) -> Self {
        Self { events, notifications }
    }

    /// One sweep; returns the number of reminders written.
    #[instrument(skip(self))]
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let until = now + Duration::minutes(REMINDER_LOOKAHEAD_MINUTES);
        let events = self.events.find_starting_between(now, until).await?;

        let mut written = 0;
        for event in events {
            let mut recipients = vec![event.owner_id];
            for &id in &event.participant_ids {
                if !recipients.contains(&id) {
                    recipients.push(id);
                }
            }
            for user_id in recipients {
                if self.notifications.reminder_exists(event.id, user_id).await? {
                    continue;
                }
                let content = format!(
                    "Your event '{}' starts within {} minutes",
                    event.title, REMINDER_LOOKAHEAD_MINUTES
                );
                self.notifications
                    .append(user_id, NotificationKind::Reminder, &content, event.id)
                    .await?;
                written += 1;
            }
        }
        debug!(written, "reminder sweep complete");
        Ok(written)
    }
}
