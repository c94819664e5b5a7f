use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored trigger and its expansion text.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Trigger {
    pub id: String,
    pub trigger: String,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl Trigger {
    pub fn new(trigger: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            trigger,
            content,
            created_at: Local::now().to_rfc3339(),
        }
    }

    pub fn update_content(&mut self, new_content: String) {
        self.content = new_content;
    }

    pub fn formatted_time(&self) -> String {
        let entry_time = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Local))
            .unwrap_or_else(|_| Local::now());

        let now = Local::now();
        let duration = now.signed_duration_since(entry_time);

        if duration.num_seconds() < 60 {
            format!("{}s ago", duration.num_seconds())
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            format!("{}d ago", duration.num_days())
        }
    }
}
