//! Data model: members and the department → role → tool taxonomy.
//!
//! Everything here is immutable after load. The [`Roster`] is the
//! page-session snapshot the filter and renderer operate on; it is built
//! once from the JSON data files and never mutated.

use crate::error::{Result, RosterError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Members without an explicit sort order go last.
pub const DEFAULT_SORT_ORDER: u32 = 999;

/// Color used when a role id cannot be resolved in the taxonomy.
pub const FALLBACK_COLOR: &str = "#7AA2F7";

/// Label used when a role id cannot be resolved in the taxonomy.
pub const UNKNOWN_ROLE_NAME: &str = "Unknown";

/// A named outbound link on a member card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLink {
    pub label: String,
    pub url: String,
}

/// One studio member record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Some records carry the legacy singular `roleId` instead.
    #[serde(default)]
    role_ids: Vec<String>,
    #[serde(default)]
    role_id: Option<String>,
    /// Single-tool shorthand; multi-tool members use `tools`.
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub links: Vec<MemberLink>,
    #[serde(default)]
    pub sort_order: Option<u32>,
    #[serde(default)]
    pub is_lead: bool,
}

impl Member {
    /// Role identifiers, normalized across the two record shapes.
    pub fn role_ids(&self) -> Vec<&str> {
        if !self.role_ids.is_empty() {
            self.role_ids.iter().map(String::as_str).collect()
        } else {
            self.role_id.iter().map(String::as_str).collect()
        }
    }

    /// True if the member uses the given tool (singular or multi form).
    pub fn uses_tool(&self, tool_id: &str) -> bool {
        self.tool.as_deref() == Some(tool_id) || self.tools.iter().any(|t| t == tool_id)
    }

    pub fn sort_key(&self) -> u32 {
        self.sort_order.unwrap_or(DEFAULT_SORT_ORDER)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "softwares")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// The full taxonomy, with reverse lookups from a member's role/tool ids
/// back to display name and color. Lookup misses never fail a render; they
/// degrade to fixed fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    pub departments: Vec<Department>,
}

impl Taxonomy {
    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    pub fn role(&self, role_id: &str) -> Option<&Role> {
        self.departments
            .iter()
            .flat_map(|d| d.roles.iter())
            .find(|r| r.id == role_id)
    }

    pub fn role_name(&self, role_id: &str) -> &str {
        self.role(role_id)
            .map(|r| r.name.as_str())
            .unwrap_or(UNKNOWN_ROLE_NAME)
    }

    pub fn role_color(&self, role_id: &str) -> &str {
        self.role(role_id)
            .and_then(|r| r.color.as_deref())
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn tool_name(&self, tool_id: &str) -> String {
        self.departments
            .iter()
            .flat_map(|d| d.roles.iter())
            .flat_map(|r| r.tools.iter())
            .find(|t| t.id == tool_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| tool_id.to_uppercase())
    }
}

/// Immutable snapshot of the loaded directory: members pre-sorted by sort
/// key (stable, load order preserved among ties) plus the taxonomy.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub members: Vec<Member>,
    pub taxonomy: Taxonomy,
}

impl Roster {
    /// Loads `roles.json` and `members.json` from the data directory.
    ///
    /// Either file failing to read or parse is fatal to the content view:
    /// no partial population, the caller keeps its retryable error state.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let taxonomy = read_json(&data_dir.join("roles.json"), "taxonomy")?;
        let mut members: Vec<Member> = read_json(&data_dir.join("members.json"), "member")?;
        members.sort_by_key(Member::sort_key);
        Ok(Self { members, taxonomy })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, resource: &str) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|err| RosterError::DataLoad {
        resource: resource.to_string(),
        reason: err.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|err| RosterError::DataLoad {
        resource: resource.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        serde_json::from_value(serde_json::json!([
            {
                "id": "music",
                "name": "Music",
                "roles": [
                    {
                        "id": "tuning",
                        "name": "Vocal Tuning",
                        "color": "#f472b6",
                        "tools": [
                            { "id": "sv", "name": "Synthesizer V", "color": "#38bdf8" }
                        ]
                    }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn member_accepts_legacy_singular_role_id() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "name": "Aki",
            "roleId": "tuning"
        }))
        .unwrap();
        assert_eq!(member.role_ids(), vec!["tuning"]);
    }

    #[test]
    fn role_ids_prefers_plural_when_present() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "name": "Aki",
            "roleId": "old",
            "roleIds": ["tuning", "mixing"]
        }))
        .unwrap();
        assert_eq!(member.role_ids(), vec!["tuning", "mixing"]);
    }

    #[test]
    fn sort_key_defaults_to_last() {
        let member: Member =
            serde_json::from_value(serde_json::json!({ "id": "m1", "name": "Aki" })).unwrap();
        assert_eq!(member.sort_key(), DEFAULT_SORT_ORDER);
    }

    #[test]
    fn taxonomy_lookups_degrade_on_miss() {
        let tax = taxonomy();
        assert_eq!(tax.role_name("tuning"), "Vocal Tuning");
        assert_eq!(tax.role_name("nope"), UNKNOWN_ROLE_NAME);
        assert_eq!(tax.role_color("nope"), FALLBACK_COLOR);
        assert_eq!(tax.tool_name("sv"), "Synthesizer V");
        assert_eq!(tax.tool_name("cubase"), "CUBASE");
    }

    #[test]
    fn taxonomy_accepts_legacy_softwares_key() {
        let tax: Taxonomy = serde_json::from_value(serde_json::json!([
            {
                "id": "music",
                "name": "Music",
                "roles": [
                    {
                        "id": "tuning",
                        "name": "Vocal Tuning",
                        "softwares": [ { "id": "sv", "name": "Synthesizer V" } ]
                    }
                ]
            }
        ]))
        .unwrap();
        assert_eq!(tax.tool_name("sv"), "Synthesizer V");
    }

    #[test]
    fn roster_load_missing_file_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Roster::load(dir.path()).unwrap_err();
        assert!(matches!(err, RosterError::DataLoad { .. }));
    }

    #[test]
    fn roster_load_sorts_members_stably() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("roles.json"), "[]").unwrap();
        std::fs::write(
            dir.path().join("members.json"),
            serde_json::json!([
                { "id": "c", "name": "C" },
                { "id": "a", "name": "A", "sortOrder": 1 },
                { "id": "b", "name": "B" }
            ])
            .to_string(),
        )
        .unwrap();
        let roster = Roster::load(dir.path()).unwrap();
        let ids: Vec<_> = roster.members.iter().map(|m| m.id.as_str()).collect();
        // "a" first by explicit key, then load order among the defaulted pair.
        assert_eq!(ids, vec!["a", "c", "b"]);
    }
}
