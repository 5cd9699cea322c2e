//! Static section tables: nesting depth, structural parents, inheritance.

use std::fmt;

/// Every section kind the language knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// `[configuration]`, the document root.
    Configuration,
    /// `[group]`, a row set of widgets.
    Group,
    /// `[widget]`.
    Widget,
    /// `[series]` data source.
    Series,
    /// `[dropdown]` control.
    Dropdown,
    /// `[column]` of a table widget.
    Column,
    /// `[node]` of a graph widget.
    Node,
    /// `[link]` of a graph widget.
    Link,
    /// `[property]` of a property widget.
    Property,
    /// `[option]` of a dropdown.
    Option,
    /// `[properties]`, free-form key/value pairs.
    Properties,
    /// `[tags]` (also spelled `[tag]`), free-form series tags.
    Tags,
    /// `[keys]`, free-form entity keys.
    Keys,
    /// `[placeholders]`, free-form URL placeholders.
    Placeholders,
}

const SECTION_NAMES: &[(&str, SectionKind)] = &[
    ("configuration", SectionKind::Configuration),
    ("group", SectionKind::Group),
    ("widget", SectionKind::Widget),
    ("series", SectionKind::Series),
    ("dropdown", SectionKind::Dropdown),
    ("column", SectionKind::Column),
    ("node", SectionKind::Node),
    ("link", SectionKind::Link),
    ("property", SectionKind::Property),
    ("option", SectionKind::Option),
    ("properties", SectionKind::Properties),
    ("tags", SectionKind::Tags),
    ("tag", SectionKind::Tags),
    ("keys", SectionKind::Keys),
    ("placeholders", SectionKind::Placeholders),
];

impl SectionKind {
    /// Looks up a section by its header name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        SECTION_NAMES
            .iter()
            .find(|(section, _)| *section == name)
            .map(|(_, kind)| *kind)
    }

    /// Canonical header name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Group => "group",
            Self::Widget => "widget",
            Self::Series => "series",
            Self::Dropdown => "dropdown",
            Self::Column => "column",
            Self::Node => "node",
            Self::Link => "link",
            Self::Property => "property",
            Self::Option => "option",
            Self::Properties => "properties",
            Self::Tags => "tags",
            Self::Keys => "keys",
            Self::Placeholders => "placeholders",
        }
    }

    /// Required nesting depth.
    #[must_use]
    pub fn depth(self) -> usize {
        match self {
            Self::Configuration => 0,
            Self::Group => 1,
            Self::Widget => 2,
            Self::Series
            | Self::Dropdown
            | Self::Column
            | Self::Node
            | Self::Link
            | Self::Property => 3,
            Self::Option | Self::Properties | Self::Tags | Self::Keys | Self::Placeholders => 4,
        }
    }

    /// Sections that may directly contain this one, for kinds whose parent
    /// is not implied by depth alone.
    #[must_use]
    pub fn parents(self) -> &'static [SectionKind] {
        const FREE_FORM_PARENTS: &[SectionKind] = &[
            SectionKind::Configuration,
            SectionKind::Group,
            SectionKind::Widget,
            SectionKind::Series,
            SectionKind::Dropdown,
            SectionKind::Column,
            SectionKind::Node,
            SectionKind::Link,
            SectionKind::Property,
        ];
        match self {
            Self::Option => &[SectionKind::Dropdown],
            Self::Properties => &[
                SectionKind::Series,
                SectionKind::Node,
                SectionKind::Link,
                SectionKind::Property,
            ],
            Self::Placeholders => &[SectionKind::Widget, SectionKind::Series],
            Self::Tags | Self::Keys => FREE_FORM_PARENTS,
            _ => &[],
        }
    }

    /// True when this kind may be declared at any depth from
    /// [`SectionKind::min_depth`] down, attaching to whatever is open.
    #[must_use]
    pub fn is_inheritable(self) -> bool {
        matches!(self, Self::Tags | Self::Keys)
    }

    /// Shallowest depth an inheritable section may take.
    #[must_use]
    pub fn min_depth(self) -> usize {
        if self.is_inheritable() {
            1
        } else {
            self.depth()
        }
    }

    /// True for sections whose settings are arbitrary key/value pairs.
    #[must_use]
    pub fn is_free_form(self) -> bool {
        matches!(
            self,
            Self::Properties | Self::Tags | Self::Keys | Self::Placeholders
        )
    }

    /// Child sections every instance of this kind must contain.
    #[must_use]
    pub fn required_children(self) -> &'static [&'static str] {
        match self {
            Self::Configuration => &["group"],
            Self::Group => &["widget"],
            Self::Widget => &["series"],
            _ => &[],
        }
    }

    /// True if `parent` may directly contain this kind.
    #[must_use]
    pub fn accepts_parent(self, parent: SectionKind) -> bool {
        let parents = self.parents();
        parents.is_empty() || parents.contains(&parent)
    }

    /// Kinds declared at `depth`, in table order.
    pub fn at_depth(depth: usize) -> impl Iterator<Item = SectionKind> {
        SECTION_NAMES
            .iter()
            .filter(move |(name, kind)| kind.depth() == depth && *name == kind.as_str())
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
