//! Member notifications
//!
//! Notifications are drafted, then sent now or scheduled for later. Sent
//! and failed deliveries show up in the history; channel switches and quiet
//! hours live in the settings document.

use super::{list_with, require, Draft, Id, Resource};
use crate::client::ApiClient;
use crate::error::{AdminError, Result};
use crate::filters::DateRangeFilter;
use crate::pagination::{Page, Pagination};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Email,
    Sms,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub audience: Option<String>,
    pub status: NotificationStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub channels: Vec<Channel>,
    pub audience: Option<String>,
}

impl Draft for NotificationDraft {
    type Record = Notification;

    fn from_record(record: &Notification) -> Self {
        Self {
            title: record.title.clone(),
            message: record.message.clone(),
            channels: record.channels.clone(),
            audience: record.audience.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Title")?;
        require(&self.message, "Message")
    }

    fn normalize(&self) -> Self {
        let mut channels = self.channels.clone();
        super::dedup_in_order(&mut channels);
        if channels.is_empty() {
            channels.push(Channel::default());
        }
        Self {
            title: self.title.trim().to_string(),
            message: self.message.trim().to_string(),
            channels,
            audience: Some(super::non_blank(&self.audience).unwrap_or_else(|| "all".into())),
        }
    }
}

pub struct Notifications;

impl Resource for Notifications {
    const PATH: &'static str = "/notifications";
    const NAME: &'static str = "notifications";
    type Record = Notification;
    type Draft = NotificationDraft;

    fn id(record: &Notification) -> Id {
        record.id
    }
}

#[derive(Debug, Serialize)]
struct ScheduleRequest {
    scheduled_at: DateTime<Utc>,
}

/// Schedule delivery at `at`, which must be after `now`
pub async fn schedule(client: &ApiClient, id: Id, at: DateTime<Utc>, now: DateTime<Utc>) -> Result<Notification> {
    if at <= now {
        return Err(AdminError::validation("Scheduled time must be in the future"));
    }
    let path = format!("{}/{}/schedule", Notifications::PATH, id);
    let scheduled = client.post(&path, &ScheduleRequest { scheduled_at: at }).await?;
    info!(id, %at, "notification scheduled");
    Ok(scheduled)
}

pub async fn send_now(client: &ApiClient, id: Id) -> Result<Notification> {
    let path = format!("{}/{}/send", Notifications::PATH, id);
    let sent = client.post(&path, &serde_json::json!({})).await?;
    info!(id, "notification sent");
    Ok(sent)
}

/// Drop a schedule, returning the notification to draft
pub async fn unschedule(client: &ApiClient, id: Id) -> Result<()> {
    client.delete(&format!("{}/{}/schedule", Notifications::PATH, id)).await
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: Id,
    pub notification_id: Id,
    #[serde(default)]
    pub title: String,
    pub channel: Channel,
    pub status: NotificationStatus,
    #[serde(default)]
    pub recipients: u32,
    #[serde(default)]
    pub failures: u32,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

pub async fn history(client: &ApiClient, page: Pagination, dates: &DateRangeFilter) -> Result<Page<DeliveryRecord>> {
    dates.validate()?;
    let mut query = dates.query("start_date", "end_date");
    query.extend(page.query());
    let result: Page<DeliveryRecord> = client
        .get_with(&format!("{}/history", Notifications::PATH), &query)
        .await?;
    Ok(result.assume(page))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub sender_name: String,
    pub quiet_hours_start: Option<NaiveTime>,
    pub quiet_hours_end: Option<NaiveTime>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: false,
            push_enabled: false,
            sender_name: String::new(),
            quiet_hours_start: None,
            quiet_hours_end: None,
        }
    }
}

impl NotificationSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.email_enabled || self.sms_enabled || self.push_enabled) {
            return Err(AdminError::validation("Enable at least one channel"));
        }
        match (self.quiet_hours_start, self.quiet_hours_end) {
            (Some(start), Some(end)) if start == end => {
                Err(AdminError::validation("Quiet hours must not start and end at the same time"))
            }
            (Some(_), None) | (None, Some(_)) => {
                Err(AdminError::validation("Set both ends of the quiet hours"))
            }
            _ => Ok(()),
        }
    }

    /// Whether `t` falls in quiet hours, which may wrap past midnight
    pub fn is_quiet(&self, t: NaiveTime) -> bool {
        match (self.quiet_hours_start, self.quiet_hours_end) {
            (Some(start), Some(end)) if start < end => t >= start && t < end,
            (Some(start), Some(end)) if start > end => t >= start || t < end,
            _ => false,
        }
    }
}

pub async fn settings(client: &ApiClient) -> Result<NotificationSettings> {
    client.get(&format!("{}/settings", Notifications::PATH)).await
}

pub async fn save_settings(client: &ApiClient, settings: &NotificationSettings) -> Result<NotificationSettings> {
    settings.validate()?;
    client.put(&format!("{}/settings", Notifications::PATH), settings).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use axum::{extract::Path, routing::{get, post}, Json, Router};
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_quiet_hours_wrap_midnight() {
        let settings = NotificationSettings {
            quiet_hours_start: Some(at(22, 0)),
            quiet_hours_end: Some(at(7, 0)),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert!(settings.is_quiet(at(23, 30)));
        assert!(settings.is_quiet(at(6, 59)));
        assert!(!settings.is_quiet(at(12, 0)));

        let half = NotificationSettings { quiet_hours_end: None, ..settings };
        assert!(half.validate().is_err());
        let silent = NotificationSettings { email_enabled: false, ..Default::default() };
        assert!(silent.validate().is_err());
    }

    #[test]
    fn test_draft_defaults_channel_and_audience() {
        let draft = NotificationDraft { title: "Snow day".into(), message: "Service moves online".into(), ..Default::default() };
        let payload = draft.normalize();
        assert_eq!(payload.channels, vec![Channel::Email]);
        assert_eq!(payload.audience.as_deref(), Some("all"));

        let repeated = NotificationDraft {
            channels: vec![Channel::Email, Channel::Sms, Channel::Email],
            ..draft
        };
        assert_eq!(repeated.normalize().channels, vec![Channel::Email, Channel::Sms]);
    }

    #[tokio::test]
    async fn test_schedule_history_and_settings() {
        let stored = Arc::new(RwLock::new(json!({ "email_enabled": true, "sms_enabled": true })));
        let settings_state = stored.clone();
        let router = Router::new()
            .route(
                "/notifications/:id/schedule",
                post(|Path(id): Path<Id>, Json(body): Json<Value>| async move {
                    Json(json!({ "id": id, "title": "Retreat", "status": "scheduled", "scheduled_at": body["scheduled_at"] }))
                }),
            )
            .route(
                "/notifications/history",
                get(|| async {
                    Json(json!({ "items": [{ "id": 1, "notification_id": 9, "channel": "sms", "status": "sent", "recipients": 120 }], "total": 1 }))
                }),
            )
            .route(
                "/notifications/settings",
                get(move || {
                    let stored = settings_state.clone();
                    async move { Json(stored.read().await.clone()) }
                })
                .put(move |Json(body): Json<Value>| {
                    let stored = stored.clone();
                    async move {
                        *stored.write().await = body.clone();
                        Json(body)
                    }
                }),
            );
        let client = ApiClient::new(&mock::serve(router).await, None);

        let now = Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap();
        assert!(schedule(&client, 9, now - Duration::hours(1), now).await.is_err());
        let scheduled = schedule(&client, 9, now + Duration::days(2), now).await.unwrap();
        assert_eq!(scheduled.status, NotificationStatus::Scheduled);
        assert_eq!(scheduled.scheduled_at, Some(now + Duration::days(2)));

        let page = history(&client, Pagination::default(), &DateRangeFilter::default()).await.unwrap();
        assert_eq!(page.items[0].channel, Channel::Sms);
        assert_eq!(page.page_size, 20);

        let mut current = settings(&client).await.unwrap();
        assert!(current.sms_enabled && !current.push_enabled);
        current.push_enabled = true;
        let saved = save_settings(&client, &current).await.unwrap();
        assert_eq!(saved, current);
        assert!(settings(&client).await.unwrap().push_enabled);
    }
}
