use super::ApiClient;
use crate::errors::{FrontendError, FrontendResult};
use jokebox_common::{
    admin::{
        require_admin,
        LogsTable,
        ModerationLog,
        UserStats,
        UsersPage,
        UsersTable,
    },
    newtypes::{CommentId, JokeId, UserId},
};
use log::info;
use serde::{de::IgnoredAny, Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct AdminPageParams {
    pub page: u32,
    pub page_size: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct SetAdminStatusParams {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl ApiClient {
    pub async fn list_users(&self, params: AdminPageParams) -> FrontendResult<UsersPage> {
        self.get("admin/users", Some(params)).await
    }

    pub async fn set_admin_status(&self, params: SetAdminStatusParams) -> FrontendResult<()> {
        let _: IgnoredAny = self.post("admin/users/admin-status", Some(params)).await?;
        Ok(())
    }

    /// Returns `None` if the backend has no logs for this page.
    pub async fn moderation_logs(
        &self,
        params: AdminPageParams,
    ) -> FrontendResult<Option<Vec<ModerationLog>>> {
        self.get("admin/logs", Some(params)).await
    }

    pub async fn user_stats(&self) -> FrontendResult<UserStats> {
        require_admin(self.identity().as_ref())?;
        self.get("admin/stats", None::<()>).await
    }

    pub async fn admin_delete_joke(&self, id: JokeId) -> FrontendResult<()> {
        let _: IgnoredAny = self.delete(&format!("admin/jokes/{id}"), None::<()>).await?;
        Ok(())
    }

    pub async fn admin_delete_comment(&self, id: CommentId) -> FrontendResult<()> {
        let _: IgnoredAny = self
            .delete(&format!("admin/comments/{id}"), None::<()>)
            .await?;
        Ok(())
    }

    /// Fetches the current page of the users table.
    pub async fn load_users(&self, table: &mut UsersTable) -> FrontendResult<()> {
        require_admin(self.identity().as_ref())?;
        let params = AdminPageParams {
            page: table.pager.page(),
            page_size: table.pager.page_size(),
        };
        let page = self.list_users(params).await?;
        table.replace(page);
        Ok(())
    }

    /// Flips the admin status of a user. The table is only updated after the backend confirmed.
    pub async fn toggle_admin(
        &self,
        table: &mut UsersTable,
        user_id: UserId,
    ) -> FrontendResult<bool> {
        let identity = self.identity();
        let viewer = require_admin(identity.as_ref())?;
        let user = table
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| FrontendError::new(format!("User {user_id} not found")))?;
        if !UsersTable::can_toggle_admin(viewer, user) {
            return Err(FrontendError::new("Cannot change your own admin status"));
        }
        let is_admin = !user.is_admin;
        self.set_admin_status(SetAdminStatusParams { user_id, is_admin })
            .await?;
        info!("Set admin status of {user_id} to {is_admin}");
        table.set_admin(user_id, is_admin);
        Ok(is_admin)
    }

    pub async fn load_logs(&self, table: &mut LogsTable) -> FrontendResult<()> {
        require_admin(self.identity().as_ref())?;
        let params = AdminPageParams {
            page: table.pager.page(),
            page_size: table.pager.page_size(),
        };
        let logs = self.moderation_logs(params).await?;
        table.replace(logs);
        Ok(())
    }
}
