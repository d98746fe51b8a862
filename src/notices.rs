use indexmap::IndexMap;
use tracing::info;

use crate::error::ConsoleError;
use crate::models::notice::{Notice, NoticeDraft};

/// Locally held notice list, keyed by notice id in fetch order.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: IndexMap<String, Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, notices: Vec<Notice>) {
        self.notices = notices.into_iter().map(|n| (n.id.clone(), n)).collect();
        info!("Notice board holds {} notice(s)", self.notices.len());
    }

    pub fn insert(&mut self, notice: Notice) {
        self.notices.insert(notice.id.clone(), notice);
    }

    /// Applies a confirmed edit; the original timestamp is kept.
    pub fn update(&mut self, id: &str, draft: NoticeDraft) -> Result<&Notice, ConsoleError> {
        let notice = self
            .notices
            .get_mut(id)
            .ok_or_else(|| ConsoleError::NotFound(format!("Notice {} not found", id)))?;
        notice.title = draft.title;
        notice.description = draft.description;
        Ok(notice)
    }

    pub fn remove(&mut self, id: &str) -> Option<Notice> {
        self.notices.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Notice> {
        self.notices.get(id)
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn all(&self) -> Vec<Notice> {
        self.notices.values().cloned().collect()
    }

    /// Case-insensitive title search.
    pub fn search(&self, query: &str) -> Vec<Notice> {
        let query = query.trim().to_lowercase();
        self.notices
            .values()
            .filter(|n| n.title.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}
