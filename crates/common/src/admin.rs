use crate::{
    newtypes::{ModerationLogId, UserId},
    user::UserIdentity,
    utils::null_as_default,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const USERS_PAGE_SIZE: u32 = 20;
pub const LOGS_PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdminUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsersPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<AdminUser>,
    pub total_pages: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModerationLog {
    pub id: ModerationLogId,
    pub action: String,
    pub target_id: i64,
    #[serde(default)]
    pub target_type: String,
    pub performed_by: UserId,
    pub admin_username: String,
    #[serde(default)]
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActiveUser {
    pub id: UserId,
    pub username: String,
    pub jokes_count: i64,
    pub comments_count: i64,
}

impl ActiveUser {
    pub fn total_activity(&self) -> i64 {
        self.jokes_count + self.comments_count
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub total_users: i64,
    pub admin_count: i64,
    pub new_users_today: i64,
    pub new_users_this_week: i64,
    pub new_users_this_month: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub most_active_users: Vec<ActiveUser>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdminView {
    #[default]
    Dashboard,
    Users,
    Stats,
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied;

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Admin privileges required")
    }
}

impl std::error::Error for AccessDenied {}

/// Non-admins get redirected away from every admin view.
pub fn require_admin(identity: Option<&UserIdentity>) -> Result<&UserIdentity, AccessDenied> {
    identity.filter(|i| i.is_admin).ok_or(AccessDenied)
}

/// Previous/next navigation for admin tables. The logs endpoint doesnt report a page count, in
/// that case there is always a next page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TablePager {
    page: u32,
    page_size: u32,
    total_pages: Option<u32>,
}

impl TablePager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            total_pages: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = Some(total_pages);
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.total_pages.is_none_or(|total| self.page < total)
    }

    pub fn previous(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn next(&mut self) {
        if self.has_next() {
            self.page += 1;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UsersTable {
    pub pager: TablePager,
    pub users: Vec<AdminUser>,
}

impl Default for UsersTable {
    fn default() -> Self {
        Self {
            pager: TablePager::new(USERS_PAGE_SIZE),
            users: vec![],
        }
    }
}

impl UsersTable {
    pub fn replace(&mut self, page: UsersPage) {
        self.users = page.users;
        self.pager.set_total_pages(page.total_pages);
    }

    /// Admins cannot change their own status.
    pub fn can_toggle_admin(viewer: &UserIdentity, user: &AdminUser) -> bool {
        viewer.user_id != user.id
    }

    /// Called once the backend confirmed the status change.
    pub fn set_admin(&mut self, user_id: UserId, is_admin: bool) {
        if let Some(user) = self.users.iter_mut().find(|u| u.id == user_id) {
            user.is_admin = is_admin;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogsTable {
    pub pager: TablePager,
    pub logs: Vec<ModerationLog>,
}

impl Default for LogsTable {
    fn default() -> Self {
        Self {
            pager: TablePager::new(LOGS_PAGE_SIZE),
            logs: vec![],
        }
    }
}

impl LogsTable {
    pub fn replace(&mut self, logs: Option<Vec<ModerationLog>>) {
        self.logs = logs.unwrap_or_default();
    }
}
