use uuid::Uuid;

use super::types::{FolderId, Memo};

/// Where a memo continuing `current` goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPlan {
    pub thread_id: String,
    pub thread_order: u32,
    pub folder_id: Option<FolderId>,
    pub tags: Vec<String>,
    /// `current` was not threaded yet and becomes order 0 of a new thread.
    pub starts_thread: bool,
}

impl ThreadPlan {
    /// Give the anchor memo its thread position if this plan opens a thread.
    pub fn mark_anchor(&self, anchor: &mut Memo) {
        if self.starts_thread {
            anchor.thread_id = Some(self.thread_id.clone());
            anchor.thread_order = Some(0);
        }
    }

    /// Place a new memo in the thread, inheriting folder and tags.
    pub fn apply(&self, memo: &mut Memo) {
        memo.thread_id = Some(self.thread_id.clone());
        memo.thread_order = Some(self.thread_order);
        memo.folder_id = self.folder_id;
        memo.tags = self.tags.clone();
    }
}

/// Plan a follow-up memo for `current`.
///
/// `memos` is searched for the rest of the thread; it may or may not include `current`.
pub fn prepare_thread(current: &Memo, memos: &[Memo]) -> ThreadPlan {
    let (thread_id, thread_order, starts_thread) = match &current.thread_id {
        None => (Uuid::new_v4().to_string(), 1, true),
        Some(thread_id) => {
            let max_order = memos
                .iter()
                .filter(|m| m.thread_id.as_deref() == Some(thread_id.as_str()))
                .chain(std::iter::once(current))
                .map(|m| m.thread_order.unwrap_or(0))
                .max()
                .unwrap_or(0);
            (thread_id.clone(), max_order + 1, false)
        }
    };

    ThreadPlan {
        thread_id,
        thread_order,
        folder_id: current.folder_id,
        tags: current.tags.clone(),
        starts_thread,
    }
}

/// Memos of one thread in reading order.
pub fn thread_members<'a>(memos: &'a [Memo], thread_id: &str) -> Vec<&'a Memo> {
    let mut members: Vec<&Memo> = memos
        .iter()
        .filter(|m| m.thread_id.as_deref() == Some(thread_id))
        .collect();
    members.sort_by_key(|m| (m.thread_order.unwrap_or(0), m.created_at));
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn memo(title: &str, thread: Option<(&str, u32)>) -> Memo {
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap();
        let mut memo = Memo::new(title, "", now);
        if let Some((id, order)) = thread {
            memo.thread_id = Some(id.to_string());
            memo.thread_order = Some(order);
        }
        memo
    }

    #[test]
    fn test_unthreaded_memo_starts_a_thread() {
        // Given a memo that is not part of a thread
        let mut current = memo("first", None);
        current.folder_id = Some(2);
        current.tags = vec!["idea".to_string()];

        // When a follow-up is planned
        let plan = prepare_thread(&current, &[]);

        // Then a fresh thread is opened with current at 0 and the new memo at 1
        assert!(plan.starts_thread);
        assert!(Uuid::parse_str(&plan.thread_id).is_ok());
        assert_eq!(plan.thread_order, 1);

        plan.mark_anchor(&mut current);
        assert_eq!(current.thread_order, Some(0));
        assert_eq!(current.thread_id.as_deref(), Some(plan.thread_id.as_str()));

        let mut next = memo("second", None);
        plan.apply(&mut next);
        assert_eq!(next.folder_id, Some(2));
        assert_eq!(next.tags, vec!["idea".to_string()]);
        assert_eq!(next.thread_order, Some(1));
    }

    #[test]
    fn test_threaded_memo_appends_after_max_order() {
        let memos = vec![
            memo("a", Some(("t", 0))),
            memo("b", Some(("t", 4))),
            memo("c", Some(("t", 2))),
            memo("other", Some(("u", 9))),
        ];

        let plan = prepare_thread(&memos[0], &memos);

        assert!(!plan.starts_thread);
        assert_eq!(plan.thread_id, "t");
        assert_eq!(plan.thread_order, 5);
    }

    #[test]
    fn test_mark_anchor_leaves_existing_thread_alone() {
        let mut current = memo("a", Some(("t", 3)));
        let plan = prepare_thread(&current, &[]);

        plan.mark_anchor(&mut current);

        assert_eq!(current.thread_order, Some(3));
        assert_eq!(plan.thread_order, 4);
    }

    #[test]
    fn test_thread_members_sorted_by_order() {
        let mut late = memo("late", Some(("t", 1)));
        late.created_at += Duration::minutes(5);
        let memos = vec![
            late,
            memo("outside", None),
            memo("start", Some(("t", 0))),
            memo("also one", Some(("t", 1))),
        ];

        let titles: Vec<&str> = thread_members(&memos, "t")
            .iter()
            .map(|m| m.title.as_str())
            .collect();

        assert_eq!(titles, vec!["start", "also one", "late"]);
    }
}
