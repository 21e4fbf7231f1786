//! Prize management panel

use super::escape;
use crate::error::AdminResult;
use crate::lifecycle::{Capabilities, Panel, PanelContext, PanelKind};
use crate::store::Store;
use crate::ui::{AdminUi, MessageLevel};
use async_trait::async_trait;
use lottery_client::{ClientError, LotteryApi};
use shared::models::Prize;
use std::sync::Arc;

const PRIZE_TABLE_SECTION: &str = "prizeTableBody";
const DEFAULT_PRIZE_IMAGE: &str = "assets/images/default-prize.png";

/// Async factory invoked by the lifecycle manager on navigation
pub async fn init_prize_manage(ctx: PanelContext) -> AdminResult<Box<dyn Panel>> {
    let mut panel = PrizeManagePanel {
        api: ctx.api,
        store: ctx.store,
        ui: ctx.ui,
        prizes: Vec::new(),
    };
    panel.load_data().await?;
    Ok(Box::new(panel))
}

/// Lists, edits and deletes prizes; `save` snapshots the current list into
/// the settings document
pub struct PrizeManagePanel {
    api: Arc<dyn LotteryApi>,
    store: Arc<Store>,
    ui: Arc<dyn AdminUi>,
    prizes: Vec<Prize>,
}

impl PrizeManagePanel {
    async fn load_data(&mut self) -> AdminResult<()> {
        self.prizes = self.api.list_prizes().await?;
        self.render();
        Ok(())
    }

    fn render(&self) {
        let rows: String = self.prizes.iter().map(Self::row_html).collect();
        self.ui.update_section(PRIZE_TABLE_SECTION, &rows);
    }

    fn row_html(prize: &Prize) -> String {
        let image = if prize.image.is_empty() {
            DEFAULT_PRIZE_IMAGE
        } else {
            prize.image.as_str()
        };
        format!(
            "<tr>\
             <td>{name}</td>\
             <td>{description}</td>\
             <td>{count}</td>\
             <td>{remaining}</td>\
             <td><img src=\"{image}\" alt=\"{name}\" class=\"prize-image\"></td>\
             <td>\
             <button class=\"edit-btn\" data-id=\"{id}\">Edit</button>\
             <button class=\"delete-btn\" data-id=\"{id}\">Delete</button>\
             </td>\
             </tr>",
            name = escape(&prize.name),
            description = escape(&prize.description),
            count = prize.count,
            remaining = prize.remaining,
            image = escape(image),
            id = escape(prize.id.as_deref().unwrap_or_default()),
        )
    }

    /// Delete one prize and re-render; errors re-raise for the caller's
    /// own handling after the toast
    pub async fn delete_prize(&mut self, id: &str) -> AdminResult<()> {
        match self.api.delete_prize(id).await {
            Ok(()) => {
                self.prizes.retain(|p| p.id.as_deref() != Some(id));
                self.render();
                self.ui.show_message(MessageLevel::Success, "Prize deleted");
                Ok(())
            }
            Err(e) => {
                self.ui
                    .show_message(MessageLevel::Error, "Failed to delete prize");
                Err(e.into())
            }
        }
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }
}

#[async_trait]
impl Panel for PrizeManagePanel {
    fn kind(&self) -> PanelKind {
        PanelKind::PrizeManage
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            save: true,
            preview: true,
            destroy: true,
        }
    }

    async fn refresh(&mut self) -> AdminResult<()> {
        self.load_data().await
    }

    /// Snapshot the current prize list under the settings document's
    /// `prizes` key (full-document submit; the store replaces wholesale)
    async fn save(&mut self) -> AdminResult<()> {
        let mut settings = self
            .store
            .snapshot()
            .settings
            .clone()
            .unwrap_or_default();
        settings.set(
            "prizes",
            serde_json::to_value(&self.prizes).map_err(ClientError::Serialization)?,
        );
        self.store.update_settings(&settings).await?;
        self.ui.show_message(MessageLevel::Success, "Saved");
        Ok(())
    }

    fn preview(&self) {
        self.ui.open_preview();
    }

    fn destroy(&mut self) {
        self.prizes.clear();
    }
}
