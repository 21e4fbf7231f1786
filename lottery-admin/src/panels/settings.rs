//! Settings panel

use crate::error::AdminResult;
use crate::lifecycle::{Capabilities, Panel, PanelContext, PanelKind};
use crate::store::Store;
use crate::ui::{AdminUi, MessageLevel};
use async_trait::async_trait;
use lottery_client::LotteryApi;
use shared::models::{LotterySettings, Settings, SystemSettings};
use std::sync::Arc;

const LOTTERY_FORM_SECTION: &str = "lotterySettingsForm";
const SYSTEM_FORM_SECTION: &str = "systemSettingsForm";
const THEME_SECTION: &str = "themeOptions";

const THEMES: [&str; 3] = ["festive", "gold", "dark"];

/// Async factory invoked by the lifecycle manager on navigation
pub async fn init_settings(ctx: PanelContext) -> AdminResult<Box<dyn Panel>> {
    let mut panel = SettingsPanel {
        api: ctx.api,
        store: ctx.store,
        ui: ctx.ui,
        settings: Settings::new(),
    };
    panel.load_data().await?;
    Ok(Box::new(panel))
}

/// Edits the event settings document. Edits accumulate locally and `save`
/// submits the whole document; the store replaces it wholesale.
pub struct SettingsPanel {
    api: Arc<dyn LotteryApi>,
    store: Arc<Store>,
    ui: Arc<dyn AdminUi>,
    settings: Settings,
}

impl SettingsPanel {
    async fn load_data(&mut self) -> AdminResult<()> {
        self.settings = self.api.get_settings().await?;
        self.render();
        Ok(())
    }

    fn render(&self) {
        let lottery = self.settings.lottery();
        self.ui.update_section(
            LOTTERY_FORM_SECTION,
            &format!(
                "<input type=\"range\" name=\"lotterySpeed\" value=\"{}\">\
                 <input type=\"checkbox\" name=\"showDepartment\"{}>\
                 <input type=\"checkbox\" name=\"showPosition\"{}>\
                 <input type=\"checkbox\" name=\"showNumber\"{}>\
                 <input type=\"checkbox\" name=\"showAvatar\"{}>\
                 <input type=\"checkbox\" name=\"allowRepeat\"{}>\
                 <input type=\"checkbox\" name=\"deptLimit\"{}>\
                 <input type=\"checkbox\" name=\"positionLimit\"{}>",
                lottery.speed,
                checked(lottery.show_department),
                checked(lottery.show_position),
                checked(lottery.show_number),
                checked(lottery.show_avatar),
                checked(lottery.allow_repeat),
                checked(lottery.dept_limit),
                checked(lottery.position_limit),
            ),
        );

        let system = self.settings.system();
        self.ui.update_section(
            SYSTEM_FORM_SECTION,
            &format!(
                "<input type=\"range\" name=\"bgmVolume\" value=\"{}\">\
                 <input type=\"range\" name=\"effectVolume\" value=\"{}\">\
                 <input type=\"range\" name=\"effectIntensity\" value=\"{}\">",
                system.bgm_volume, system.effect_volume, system.effect_intensity,
            ),
        );

        let active = self.settings.theme().unwrap_or(THEMES[0]);
        let options: String = THEMES
            .iter()
            .map(|theme| {
                let class = if *theme == active {
                    "theme-option active"
                } else {
                    "theme-option"
                };
                format!(
                    "<div class=\"{class}\" data-theme=\"{theme}\">{theme}</div>"
                )
            })
            .collect();
        self.ui.update_section(THEME_SECTION, &options);
    }

    /// Replace the local `lottery` sub-document
    pub fn set_lottery(&mut self, lottery: &LotterySettings) {
        self.settings.set_lottery(lottery);
        self.render();
    }

    /// Replace the local `system` sub-document
    pub fn set_system(&mut self, system: &SystemSettings) {
        self.settings.set_system(system);
        self.render();
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.settings.set_theme(theme);
        self.render();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

#[async_trait]
impl Panel for SettingsPanel {
    fn kind(&self) -> PanelKind {
        PanelKind::Settings
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

    async fn save(&mut self) -> AdminResult<()> {
        self.store.update_settings(&self.settings).await?;
        self.ui.show_message(MessageLevel::Success, "Saved");
        Ok(())
    }

    fn preview(&self) {
        self.ui.open_preview();
    }

    fn destroy(&mut self) {
        self.settings = Settings::new();
    }
}
