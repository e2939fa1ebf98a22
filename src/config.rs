//! Static site configuration with compiled-in defaults.
//!
//! Three resources are loaded once at startup: the site config, the UI text
//! strings, and the trusted-host whitelist. Each one falls back to its
//! built-in default independently when the file is missing or malformed;
//! a config load failure is never fatal.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

fn default_all() -> String {
    "All".to_string()
}

fn default_all_tools() -> String {
    "All tools".to_string()
}

fn default_expand_bio() -> String {
    "Show more".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteInfo {
    pub name: String,
    pub tagline: String,
    pub title: String,
    pub copyright: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Studio Roster".to_string(),
            tagline: "A full-service music production team".to_string(),
            title: "Studio Roster | Members".to_string(),
            copyright: "© 2026 Studio Roster. All rights reserved.".to_string(),
        }
    }
}

/// One copyable contact channel (chat handle, email address, …) with an
/// optional channel-specific "copied" toast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub copied_toast: Option<String>,
}

fn default_contacts() -> Vec<ContactEntry> {
    vec![
        ContactEntry {
            label: "WeChat".to_string(),
            value: "NerunOfficial".to_string(),
            copied_toast: Some("WeChat ID copied".to_string()),
        },
        ContactEntry {
            label: "Email".to_string(),
            value: "studio@example.com".to_string(),
            copied_toast: Some("Email copied".to_string()),
        },
    ]
}

/// Badge shown on the studio lead's card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadBadge {
    pub icon: String,
    pub text: String,
    pub border_color: String,
}

impl Default for LeadBadge {
    fn default() -> Self {
        Self {
            icon: "👑".to_string(),
            text: "Lead".to_string(),
            border_color: "#eab308".to_string(),
        }
    }
}

/// Labels for the facet bars and bio cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationText {
    #[serde(default = "default_all")]
    pub all: String,
    #[serde(default = "default_all_tools")]
    pub all_tools: String,
    #[serde(default = "default_expand_bio")]
    pub expand_bio: String,
}

impl Default for NavigationText {
    fn default() -> Self {
        Self {
            all: default_all(),
            all_tools: default_all_tools(),
            expand_bio: default_expand_bio(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub site: SiteInfo,
    #[serde(default = "default_contacts")]
    pub contact: Vec<ContactEntry>,
    pub lead: LeadBadge,
    pub navigation: NavigationText,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteInfo::default(),
            contact: default_contacts(),
            lead: LeadBadge::default(),
            navigation: NavigationText::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToastText {
    pub link_copied: String,
    pub copy_failed: String,
    pub no_homepage: String,
    pub contact_copied: String,
}

impl Default for ToastText {
    fn default() -> Self {
        Self {
            link_copied: "Link copied to clipboard".to_string(),
            copy_failed: "Copy failed, please copy manually".to_string(),
            no_homepage: "This member has no homepage link".to_string(),
            contact_copied: "Contact copied".to_string(),
        }
    }
}

/// Text for the leave-confirmation step shown before untrusted links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmText {
    pub title: String,
    pub message: String,
    pub cancel: String,
    pub copy_link: String,
    pub proceed: String,
}

impl Default for ConfirmText {
    fn default() -> Self {
        Self {
            title: "About to leave".to_string(),
            message: "This link opens in an external browser. Continue?".to_string(),
            cancel: "Cancel".to_string(),
            copy_link: "Copy link".to_string(),
            proceed: "Continue".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomepageText {
    pub title: String,
    pub cancel: String,
}

impl Default for HomepageText {
    fn default() -> Self {
        Self {
            title: "Choose a homepage to visit".to_string(),
            cancel: "Cancel".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorText {
    pub title: String,
    pub retry: String,
    pub load_failed: String,
    pub empty_title: String,
    pub empty_subtitle: String,
}

impl Default for ErrorText {
    fn default() -> Self {
        Self {
            title: "Load failed".to_string(),
            retry: "Reload".to_string(),
            load_failed: "Failed to load directory data".to_string(),
            empty_title: "No members in this category yet".to_string(),
            empty_subtitle: "More creators are on the way".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiText {
    pub toast: ToastText,
    pub confirm: ConfirmText,
    pub homepage: HomepageText,
    pub errors: ErrorText,
}

/// Trusted host substrings. A URL is trusted when its host contains any
/// entry; see [`crate::links::is_trusted`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Whitelist(pub Vec<String>);

impl Default for Whitelist {
    fn default() -> Self {
        Self(
            [
                "mp.weixin.qq.com",
                "m.tb.cn",
                "jd.com",
                "taobao.com",
                "tmall.com",
                "weibo.com",
                "qq.com",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
    }
}

impl Whitelist {
    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

/// On-disk shape of `whitelist.json`.
#[derive(Debug, Deserialize)]
struct WhitelistFile {
    domains: Whitelist,
}

/// Everything the presentation layer needs that is not member data.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub ui: UiText,
    pub whitelist: Whitelist,
}

impl AppConfig {
    /// Loads `site-config.json`, `ui-text.json` and `whitelist.json` from
    /// the data directory. Each resource independently falls back to its
    /// default on any failure.
    pub fn load(data_dir: &Path) -> Self {
        let whitelist_path = data_dir.join("whitelist.json");
        let whitelist = match try_load::<WhitelistFile>(&whitelist_path) {
            Ok(file) => file.domains,
            Err(reason) => {
                warn!(
                    resource = "whitelist",
                    path = %whitelist_path.display(),
                    %reason,
                    "Using built-in default"
                );
                Whitelist::default()
            }
        };
        Self {
            site: load_or_default(&data_dir.join("site-config.json"), "site config"),
            ui: load_or_default(&data_dir.join("ui-text.json"), "ui text"),
            whitelist,
        }
    }
}

fn load_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path, resource: &str) -> T {
    match try_load(path) {
        Ok(value) => value,
        Err(reason) => {
            warn!(%resource, path = %path.display(), %reason, "Using built-in default");
            T::default()
        }
    }
}

fn try_load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&raw).map_err(|err| err.to_string())
}
