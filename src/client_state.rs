//! Per-browser job seeker state: saved jobs, notifications and profile.
//!
//! None of this touches the `jobPosts` / `jobApplications` collections. A
//! browser's state is kept as a single document in its own collection, keyed
//! by the client id the caller chooses; see `services::clients`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::JobView;
use crate::services::next_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Application,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub title: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub resume: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientState {
    pub saved_jobs: Vec<i64>,
    pub notifications: Vec<Notification>,
    pub profile: Profile,
    pub profile_views: u64,
}

/// `ClientState` as served over HTTP, with its unread count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStateView {
    #[serde(flatten)]
    pub state: ClientState,
    pub unread_notifications: usize,
}

impl From<ClientState> for ClientStateView {
    fn from(state: ClientState) -> Self {
        Self {
            unread_notifications: state.unread_count(),
            state,
        }
    }
}

impl ClientState {
    /// Saves or unsaves `job_id`; returns whether it is saved afterwards.
    pub fn toggle_saved_job(&mut self, job_id: i64) -> bool {
        if let Some(index) = self.saved_jobs.iter().position(|id| *id == job_id) {
            self.saved_jobs.remove(index);
            false
        } else {
            self.saved_jobs.push(job_id);
            true
        }
    }

    pub fn is_saved(&self, job_id: i64) -> bool {
        self.saved_jobs.contains(&job_id)
    }

    pub fn saved_jobs<'a>(&self, jobs: &'a [JobView]) -> Vec<&'a JobView> {
        jobs.iter().filter(|view| self.is_saved(view.job.id)).collect()
    }

    /// Prepends an unread notification and returns its id.
    pub fn add_notification(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        now: DateTime<Utc>,
    ) -> i64 {
        let id = next_id(self.notifications.iter().map(|n| n.id).max(), now);
        self.notifications.insert(
            0,
            Notification {
                id,
                message: message.into(),
                kind,
                timestamp: now,
                read: false,
            },
        );
        id
    }

    pub fn mark_notification_read(&mut self, id: i64) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.profile.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.profile.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.profile.skills.len();
        self.profile.skills.retain(|s| s != skill);
        before != self.profile.skills.len()
    }

    pub fn record_profile_view(&mut self) -> u64 {
        self.profile_views += 1;
        self.profile_views
    }
}
