//! Cascading facet filter: department → role → tool.
//!
//! The selection mutators enforce the cascade (selecting a department
//! resets role and tool, selecting a role resets tool); the derivation is
//! a pure read of whatever selection it is given.

use crate::model::{Member, Role, Taxonomy, Tool};

/// One facet axis: either unfiltered or a concrete identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Facet {
    #[default]
    All,
    Id(String),
}

impl Facet {
    pub fn id(&self) -> Option<&str> {
        match self {
            Facet::All => None,
            Facet::Id(id) => Some(id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Facet::All)
    }

    /// Parses a query-string value; empty or "all" means unfiltered.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => Facet::All,
            Some(v) if v.is_empty() || v == "all" => Facet::All,
            Some(v) => Facet::Id(v.to_string()),
        }
    }
}

/// Current facet selection. Role is only meaningful when a department is
/// selected; tool only when a role is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FacetSelection {
    department: Facet,
    role: Facet,
    tool: Facet,
}

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(&self) -> &Facet {
        &self.department
    }

    pub fn role(&self) -> &Facet {
        &self.role
    }

    pub fn tool(&self) -> &Facet {
        &self.tool
    }

    /// Selecting a department resets role and tool.
    pub fn select_department(&mut self, department: Facet) {
        self.department = department;
        self.role = Facet::All;
        self.tool = Facet::All;
    }

    /// Selecting a role resets tool.
    pub fn select_role(&mut self, role: Facet) {
        self.role = role;
        self.tool = Facet::All;
    }

    /// Tool selection never resets its parents.
    pub fn select_tool(&mut self, tool: Facet) {
        self.tool = tool;
    }

    /// Builds a selection from raw query values, applying the mutators in
    /// cascade order so the invariant holds even for hand-written URLs.
    pub fn from_query(dept: Option<&str>, role: Option<&str>, tool: Option<&str>) -> Self {
        let mut selection = Self::new();
        selection.select_department(Facet::parse(dept));
        if !selection.department.is_all() {
            selection.select_role(Facet::parse(role));
            if !selection.role.is_all() {
                selection.select_tool(Facet::parse(tool));
            }
        }
        selection
    }
}

/// Role options for the currently selected department; empty when no
/// department is selected or the id is unknown.
pub fn roles_for<'a>(selection: &FacetSelection, taxonomy: &'a Taxonomy) -> &'a [Role] {
    selection
        .department()
        .id()
        .and_then(|id| taxonomy.department(id))
        .map(|dept| dept.roles.as_slice())
        .unwrap_or(&[])
}

/// Tool options for the currently selected role; empty when no role is
/// selected or the role exposes none.
pub fn tools_for<'a>(selection: &FacetSelection, taxonomy: &'a Taxonomy) -> &'a [Tool] {
    let Some(role_id) = selection.role().id() else {
        return &[];
    };
    roles_for(selection, taxonomy)
        .iter()
        .find(|role| role.id == role_id)
        .map(|role| role.tools.as_slice())
        .unwrap_or(&[])
}

/// Derives the visible, ordered member list for a selection. Pure: the
/// same inputs always yield the same sequence, and the output is a subset
/// of `members`.
pub fn visible_members<'a>(
    selection: &FacetSelection,
    members: &'a [Member],
    taxonomy: &Taxonomy,
) -> Vec<&'a Member> {
    let mut result: Vec<&Member> = match selection.department().id() {
        None => members.iter().collect(),
        Some(dept_id) => {
            let Some(dept) = taxonomy.department(dept_id) else {
                return Vec::new();
            };
            let dept_role_ids: Vec<&str> = dept.roles.iter().map(|r| r.id.as_str()).collect();
            let mut filtered: Vec<&Member> = members
                .iter()
                .filter(|m| m.role_ids().iter().any(|rid| dept_role_ids.contains(rid)))
                .collect();
            if let Some(role_id) = selection.role().id() {
                filtered.retain(|m| m.role_ids().contains(&role_id));
                let role_tools = tools_for(selection, taxonomy);
                if !role_tools.is_empty() {
                    if let Some(tool_id) = selection.tool().id() {
                        filtered.retain(|m| m.uses_tool(tool_id));
                    }
                }
            }
            filtered
        }
    };
    result.sort_by_key(|m| m.sort_key());
    result
}
