//! Participant management panel

use super::escape;
use crate::error::AdminResult;
use crate::lifecycle::{Capabilities, Panel, PanelContext, PanelKind};
use crate::store::Store;
use crate::ui::{AdminUi, MessageLevel};
use async_trait::async_trait;
use lottery_client::{ClientError, LotteryApi};
use shared::models::{Department, User};
use shared::util::export_csv;
use std::sync::Arc;

const USER_TABLE_SECTION: &str = "userTableBody";
const DEPT_FILTER_SECTION: &str = "deptFilter";
const DEFAULT_AVATAR: &str = "assets/images/default-avatar.png";

/// Async factory invoked by the lifecycle manager on navigation
pub async fn init_user_manage(ctx: PanelContext) -> AdminResult<Box<dyn Panel>> {
    let mut panel = UserManagePanel {
        api: ctx.api,
        store: ctx.store,
        ui: ctx.ui,
        users: Vec::new(),
        departments: Vec::new(),
    };
    panel.load_data().await?;
    Ok(Box::new(panel))
}

/// Lists participants with their department filter, toggles draw-pool
/// membership, and exports the roster as CSV. No preview capability.
pub struct UserManagePanel {
    api: Arc<dyn LotteryApi>,
    store: Arc<Store>,
    ui: Arc<dyn AdminUi>,
    users: Vec<User>,
    departments: Vec<Department>,
}

impl UserManagePanel {
    async fn load_data(&mut self) -> AdminResult<()> {
        let (users, departments) =
            tokio::try_join!(self.api.list_users(), self.api.list_departments())?;
        self.users = users;
        self.departments = departments;
        self.render();
        self.render_filter();
        Ok(())
    }

    fn render(&self) {
        let rows: String = self.users.iter().map(Self::row_html).collect();
        self.ui.update_section(USER_TABLE_SECTION, &rows);
    }

    fn render_filter(&self) {
        let mut options = String::from("<option value=\"\">All departments</option>");
        for dept in &self.departments {
            options.push_str(&format!(
                "<option value=\"{}\">{}</option>",
                escape(&dept.code),
                escape(&dept.name)
            ));
        }
        self.ui.update_section(DEPT_FILTER_SECTION, &options);
    }

    fn row_html(user: &User) -> String {
        let avatar = match &user.avatar {
            Some(a) if !a.is_empty() => a.as_str(),
            _ => DEFAULT_AVATAR,
        };
        let checked = if user.participate_lottery {
            " checked"
        } else {
            ""
        };
        format!(
            "<tr>\
             <td><input type=\"checkbox\" value=\"{number}\"></td>\
             <td>{number}</td>\
             <td>{name}</td>\
             <td>{department}</td>\
             <td>{position}</td>\
             <td><img src=\"{avatar}\" alt=\"avatar\" class=\"user-avatar\"></td>\
             <td><input type=\"checkbox\" data-id=\"{id}\" class=\"participate-toggle\"{checked}></td>\
             <td>\
             <button class=\"edit-btn\" data-id=\"{id}\">Edit</button>\
             <button class=\"delete-btn\" data-id=\"{id}\">Delete</button>\
             </td>\
             </tr>",
            number = escape(&user.number),
            name = escape(&user.name),
            department = escape(&user.department),
            position = escape(user.position.as_deref().unwrap_or("-")),
            avatar = escape(avatar),
            id = escape(user.id.as_deref().unwrap_or_default()),
        )
    }

    /// Flip one participant's draw-pool membership and re-render
    pub async fn toggle_participation(&mut self, id: &str, participate: bool) -> AdminResult<()> {
        match self.api.set_participation(id, participate).await {
            Ok(updated) => {
                if let Some(user) = self.users.iter_mut().find(|u| u.id.as_deref() == Some(id)) {
                    *user = updated;
                }
                self.render();
                self.ui.show_message(MessageLevel::Success, "Updated");
                Ok(())
            }
            Err(e) => {
                // Re-render so the toggle falls back to the server state
                self.render();
                self.ui.show_message(MessageLevel::Error, "Update failed");
                Err(e.into())
            }
        }
    }

    /// Roster as CSV (client-side export, BOM-prefixed for spreadsheets)
    pub fn export_roster(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .users
            .iter()
            .map(|u| {
                vec![
                    u.number.clone(),
                    u.name.clone(),
                    u.department.clone(),
                    u.position.clone().unwrap_or_default(),
                    u.participate_lottery.to_string(),
                ]
            })
            .collect();
        export_csv(
            &["number", "name", "department", "position", "participateLottery"],
            &rows,
        )
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }
}

#[async_trait]
impl Panel for UserManagePanel {
    fn kind(&self) -> PanelKind {
        PanelKind::UserManage
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            save: true,
            preview: false,
            destroy: true,
        }
    }

    async fn refresh(&mut self) -> AdminResult<()> {
        self.load_data().await
    }

    /// Snapshot the current roster under the settings document's `users`
    /// key (full-document submit; the store replaces wholesale)
    async fn save(&mut self) -> AdminResult<()> {
        let mut settings = self
            .store
            .snapshot()
            .settings
            .clone()
            .unwrap_or_default();
        settings.set(
            "users",
            serde_json::to_value(&self.users).map_err(ClientError::Serialization)?,
        );
        self.store.update_settings(&settings).await?;
        self.ui.show_message(MessageLevel::Success, "Saved");
        Ok(())
    }

    fn destroy(&mut self) {
        self.users.clear();
        self.departments.clear();
    }
}
