//! The persistent section tree.
//!
//! Nodes live in an arena and refer to each other by [`SectionId`]. A node
//! is added once its section is complete (at the next header or the end of
//! the document), so its settings are known when it is attached.

use chartcfg_syntax::TextRange;

use crate::sections::SectionKind;
use crate::settings::Setting;

/// Settings resolved through the per-node scope cache.
pub const SCOPE_SETTINGS: [&str; 4] = ["type", "mode", "end-time", "timezone"];

/// Index of a node in a [`SectionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u32);

impl SectionId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a scope-cached setting is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScopeEntry {
    section: SectionId,
    setting: usize,
}

/// One section of the document.
#[derive(Debug)]
pub struct Section {
    /// Header name.
    pub name: TextRange,
    /// Section kind.
    pub kind: SectionKind,
    /// Settings declared directly in this section.
    pub settings: Vec<Setting>,
    /// Enclosing section.
    pub parent: Option<SectionId>,
    /// Child sections in document order.
    pub children: Vec<SectionId>,
    scope: [Option<ScopeEntry>; SCOPE_SETTINGS.len()],
}

impl Section {
    /// A setting declared directly in this section.
    #[must_use]
    pub fn local(&self, name: &str) -> Option<&Setting> {
        self.settings
            .iter()
            .find(|setting| setting.canonical_name() == name)
    }
}

/// Whole-document section hierarchy.
#[derive(Debug, Default)]
pub struct SectionTree {
    nodes: Vec<Section>,
    roots: Vec<SectionId>,
    last_by_depth: [Option<SectionId>; 5],
    last_added: Option<SectionId>,
}

impl SectionTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a completed section.
    ///
    /// Returns `None` when there is nowhere to attach it: every section but
    /// `configuration` needs an earlier root.
    pub fn add_section(
        &mut self,
        name: TextRange,
        kind: SectionKind,
        settings: Vec<Setting>,
    ) -> Option<SectionId> {
        let depth = kind.depth();
        let parent = if depth == 0 {
            None
        } else {
            Some(self.parent_for(kind)?)
        };

        let id = SectionId(u32::try_from(self.nodes.len()).ok()?);
        let mut scope = parent.map_or([None; SCOPE_SETTINGS.len()], |parent| {
            self.nodes[parent.index()].scope
        });
        for (setting_index, setting) in settings.iter().enumerate() {
            if let Some(slot) = SCOPE_SETTINGS
                .iter()
                .position(|name| *name == setting.canonical_name())
            {
                scope[slot] = Some(ScopeEntry {
                    section: id,
                    setting: setting_index,
                });
            }
        }

        self.nodes.push(Section {
            name,
            kind,
            settings,
            parent,
            children: Vec::new(),
            scope,
        });
        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => self.roots.push(id),
        }

        let series_under_column = kind == SectionKind::Series
            && parent.is_some_and(|parent| self.section(parent).kind == SectionKind::Column);
        if !series_under_column {
            self.last_by_depth[depth] = Some(id);
            for deeper in &mut self.last_by_depth[depth + 1..] {
                *deeper = None;
            }
        }
        self.last_added = Some(id);
        Some(id)
    }

    fn parent_for(&self, kind: SectionKind) -> Option<SectionId> {
        let depth = kind.depth();
        if self.roots.is_empty() {
            return None;
        }
        if kind == SectionKind::Series {
            if let Some(last) = self.last_added {
                if self.section(last).kind == SectionKind::Column {
                    return Some(last);
                }
            }
        }
        if depth >= 4 {
            let mut cursor = self.last_added;
            while let Some(id) = cursor {
                let candidate = self.section(id);
                if candidate.kind.depth() < 4 && kind.accepts_parent(candidate.kind) {
                    return Some(id);
                }
                cursor = candidate.parent;
            }
            return self.last_by_depth[3];
        }
        // Missing intermediate levels fall back to the deepest open ancestor.
        self.last_by_depth[..depth].iter().rev().find_map(|id| *id)
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn section(&self, id: SectionId) -> &Section {
        &self.nodes[id.index()]
    }

    /// Top-level `configuration` sections.
    #[must_use]
    pub fn roots(&self) -> &[SectionId] {
        &self.roots
    }

    /// All node ids in insertion (document) order.
    pub fn ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        (0..self.nodes.len()).filter_map(|index| u32::try_from(index).ok().map(SectionId))
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing was attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: SectionId) -> impl Iterator<Item = SectionId> + '_ {
        std::iter::successors(Some(id), move |current| self.section(*current).parent)
    }

    /// The nearest declaration of `name` visible from `id`.
    ///
    /// Scope-cached names are answered from the node's cache, which reflects
    /// the ancestors as they were when the node was attached.
    #[must_use]
    pub fn get_setting(&self, id: SectionId, name: &str) -> Option<&Setting> {
        if let Some(slot) = SCOPE_SETTINGS.iter().position(|cached| *cached == name) {
            let entry = self.section(id).scope[slot]?;
            return self.section(entry.section).settings.get(entry.setting);
        }
        self.ancestors(id)
            .find_map(|ancestor| self.section(ancestor).local(name))
    }

    /// Node that declares the setting returned by [`Self::get_setting`].
    #[must_use]
    pub fn declaring_section(&self, id: SectionId, name: &str) -> Option<SectionId> {
        self.ancestors(id)
            .find(|ancestor| self.section(*ancestor).local(name).is_some())
    }

    /// True when `name` is declared locally in any section below `id`.
    #[must_use]
    pub fn declared_below(&self, id: SectionId, name: &str) -> bool {
        let mut pending: Vec<SectionId> = self.section(id).children.clone();
        while let Some(next) = pending.pop() {
            let section = self.section(next);
            if section.local(name).is_some() {
                return true;
            }
            pending.extend_from_slice(&section.children);
        }
        false
    }

    /// The enclosing widget (or `id` itself when it is one).
    #[must_use]
    pub fn widget_of(&self, id: SectionId) -> Option<SectionId> {
        self.ancestors(id)
            .find(|ancestor| self.section(*ancestor).kind == SectionKind::Widget)
    }

    /// `type` of the enclosing widget, when there is one.
    #[must_use]
    pub fn widget_type(&self, id: SectionId) -> Option<&str> {
        let widget = self.widget_of(id)?;
        self.get_setting(widget, "type").map(Setting::raw_value)
    }
}
