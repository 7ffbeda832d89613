use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A user-facing message produced during setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Collects notices and mirrors each one to the log
#[derive(Debug, Default, Clone)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.items.push(Notice {
            level: NoticeLevel::Info,
            message,
        });
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.items.push(Notice {
            level: NoticeLevel::Warning,
            message,
        });
    }

    pub fn contains(&self, message: &str) -> bool {
        self.items.iter().any(|n| n.message == message)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter().filter(|n| n.level == NoticeLevel::Warning)
    }

    pub fn into_vec(self) -> Vec<Notice> {
        self.items
    }
}
