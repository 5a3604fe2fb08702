//! The page aggregate: metadata plus one owned area list.

use serde_json::{json, Value};

use crate::area::AreaList;
use crate::error::CoreError;
use crate::locking;
use crate::page_id::LogicalPageId;
use crate::registry::PortletRegistry;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// PageStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a draft/publication row, derived from its publication
/// window. Numeric values are part of the admin API contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(into = "i32")]
pub enum PageStatus {
    Public = 0,
    Planned = 1,
    Draft = 2,
    Backdate = 3,
    /// Sentinel for a window no other case covers.
    Invalid = -1,
}

impl From<PageStatus> for i32 {
    fn from(value: PageStatus) -> Self {
        value as i32
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One draft or publication row of a composed page.
///
/// Several `Page` rows share a [`LogicalPageId`]; the surrogate `key`
/// identifies this concrete row (0 until persisted). The logical id never
/// changes within a draft lineage.
#[derive(Debug, Clone)]
pub struct Page {
    /// Surrogate row key; 0 until persisted.
    pub key: DbId,

    /// What content this page decorates. Shared across draft versions.
    pub id: LogicalPageId,

    /// False for synthetic fallback pages (no CMS override exists); those
    /// must never be written back.
    pub is_modifiable: bool,

    /// Publication window. Both `None` means a permanent draft.
    pub publish_from: Option<Timestamp>,
    pub publish_to: Option<Timestamp>,

    pub name: String,
    pub url: String,
    pub rev_id: DbId,
    pub last_modified: Option<Timestamp>,

    /// Advisory lock owner; empty when unlocked.
    pub locked_by: String,
    pub locked_at: Option<Timestamp>,

    /// Customer groups allowed to see the published page. `None` = all.
    pub customer_groups: Option<Vec<DbId>>,

    /// The content tree. Exactly one per page.
    pub area_list: AreaList,
}

impl Page {
    pub fn new(id: LogicalPageId) -> Self {
        Self {
            key: 0,
            id,
            is_modifiable: true,
            publish_from: None,
            publish_to: None,
            name: String::new(),
            url: String::new(),
            rev_id: 0,
            last_modified: None,
            locked_by: String::new(),
            locked_at: None,
            customer_groups: None,
            area_list: AreaList::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Status derivation
    // -----------------------------------------------------------------------

    /// Derive the lifecycle status at `now`.
    ///
    /// `live_keys` carries the keys currently serving their logical ids, when
    /// the caller has that information. The asymmetry is deliberate and part
    /// of the contract: `None` means "no liveness information, an in-window
    /// page counts as public"; `Some(&[])` means "confirmed nothing is live",
    /// so an in-window page is merely planned.
    pub fn status(&self, now: Timestamp, live_keys: Option<&[DbId]>) -> PageStatus {
        if let Some(to) = self.publish_to {
            if to <= now {
                return PageStatus::Backdate;
            }
        }
        let Some(from) = self.publish_from else {
            return PageStatus::Draft;
        };
        if from > now {
            return PageStatus::Planned;
        }
        if from <= now {
            return match live_keys {
                None => PageStatus::Public,
                Some(keys) if keys.contains(&self.key) => PageStatus::Public,
                Some(_) => PageStatus::Planned,
            };
        }
        PageStatus::Invalid
    }

    /// Whether the published page is visible to the given customer group.
    /// `None` restricts nothing.
    pub fn visible_for_group(&self, group_id: DbId) -> bool {
        match &self.customer_groups {
            None => true,
            Some(groups) => groups.contains(&group_id),
        }
    }

    // -----------------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------------

    /// Try to take the advisory lock for `user` at `now`.
    ///
    /// On success the lock fields are refreshed (extending the lock by the
    /// timeout from `now`); on failure they stay untouched. Persisting the
    /// updated fields is the caller's job.
    pub fn lock(&mut self, user: &str, now: Timestamp) -> Result<bool, CoreError> {
        if !locking::may_acquire(&self.locked_by, self.locked_at, user, now)? {
            return Ok(false);
        }
        self.locked_by = user.to_string();
        self.locked_at = Some(now);
        Ok(true)
    }

    /// Clear the lock unconditionally. Ownership is not checked: any caller
    /// holding the page may force-unlock.
    pub fn unlock(&mut self) {
        self.locked_by.clear();
        self.locked_at = None;
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialized content tree, as stored in the row's JSON column.
    pub fn area_json(&self) -> Value {
        self.area_list.to_json()
    }

    /// Full JSON form for API responses; the area tree round-trips through it.
    pub fn to_json(&self, now: Timestamp, live_keys: Option<&[DbId]>) -> Value {
        json!({
            "key": self.key,
            "id": self.id.encode(),
            "isModifiable": self.is_modifiable,
            "publishFrom": self.publish_from,
            "publishTo": self.publish_to,
            "name": self.name,
            "url": self.url,
            "revId": self.rev_id,
            "lastModified": self.last_modified,
            "lockedBy": self.locked_by,
            "lockedAt": self.locked_at,
            "customerGroups": self.customer_groups,
            "status": self.status(now, live_keys),
            "areas": self.area_json(),
        })
    }

    /// Rebuild the content tree from a stored/submitted JSON value.
    pub fn deserialize_areas(&mut self, value: &Value, registry: &PortletRegistry) {
        self.area_list.deserialize_value(value, registry);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn page() -> Page {
        let mut page = Page::new(LogicalPageId::new("product", 42, 1));
        page.key = 10;
        page
    }

    // -----------------------------------------------------------------------
    // Status derivation
    // -----------------------------------------------------------------------

    #[test]
    fn test_status_public_inside_window_without_filter() {
        let mut p = page();
        p.publish_from = Some(now() - Duration::hours(1));
        assert_eq!(p.status(now(), None), PageStatus::Public);
    }

    #[test]
    fn test_status_planned_before_window() {
        let mut p = page();
        p.publish_from = Some(now() + Duration::hours(1));
        assert_eq!(p.status(now(), None), PageStatus::Planned);
    }

    #[test]
    fn test_status_draft_without_publish_from() {
        assert_eq!(page().status(now(), None), PageStatus::Draft);
    }

    #[test]
    fn test_status_backdate_after_window() {
        let mut p = page();
        p.publish_from = Some(now() - Duration::hours(2));
        p.publish_to = Some(now() - Duration::hours(1));
        assert_eq!(p.status(now(), None), PageStatus::Backdate);
    }

    #[test]
    fn test_status_filter_asymmetry() {
        let mut p = page();
        p.publish_from = Some(now() - Duration::hours(1));

        // Absent filter: no liveness information -> public.
        assert_eq!(p.status(now(), None), PageStatus::Public);
        // Empty filter: confirmed not live -> planned.
        assert_eq!(p.status(now(), Some(&[])), PageStatus::Planned);
        // Filter naming this key -> public.
        assert_eq!(p.status(now(), Some(&[10])), PageStatus::Public);
        // Filter naming another key -> planned.
        assert_eq!(p.status(now(), Some(&[99])), PageStatus::Planned);
    }

    // -----------------------------------------------------------------------
    // Lock lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn test_lock_expiry_sequence() {
        let mut p = page();
        let t0 = now();

        assert!(p.lock("alice", t0).unwrap());
        assert!(!p.lock("bob", t0 + Duration::seconds(30)).unwrap());
        // The losing call must not have extended anyone's lock.
        assert_eq!(p.locked_by, "alice");
        assert_eq!(p.locked_at, Some(t0));
        assert!(p.lock("bob", t0 + Duration::seconds(61)).unwrap());
        assert_eq!(p.locked_by, "bob");
    }

    #[test]
    fn test_lock_idempotent_for_owner_and_refreshes() {
        let mut p = page();
        let t0 = now();
        assert!(p.lock("alice", t0).unwrap());
        let t1 = t0 + Duration::seconds(10);
        assert!(p.lock("alice", t1).unwrap());
        assert_eq!(p.locked_at, Some(t1));
    }

    #[test]
    fn test_unlock_is_unconditional() {
        let mut p = page();
        p.lock("alice", now()).unwrap();
        p.unlock();
        assert!(p.locked_by.is_empty());
        assert!(p.locked_at.is_none());
    }

    // -----------------------------------------------------------------------
    // Group visibility
    // -----------------------------------------------------------------------

    #[test]
    fn test_group_visibility() {
        let mut p = page();
        assert!(p.visible_for_group(3));
        p.customer_groups = Some(vec![1, 2]);
        assert!(p.visible_for_group(2));
        assert!(!p.visible_for_group(3));
    }
}
