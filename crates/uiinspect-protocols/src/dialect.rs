//! Backend attribute vocabularies.
//!
//! Each backend supplies one fixed [`Dialect`] table. The disambiguator, the
//! text codec and the resolver consume these tables generically instead of
//! branching per attribute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Internal predicate names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Role,
    Name,
    /// Name matched against a regular expression anchored at the start.
    RegexName,
    ClassName,
    Description,
    AutomationId,
    /// Comma separated state flags, compared as a set.
    States,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Name => "name",
            Self::RegexName => "regex_name",
            Self::ClassName => "class_name",
            Self::Description => "description",
            Self::AutomationId => "automation_id",
            Self::States => "states",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which accessibility backend a tree comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// OS-native UI automation (control types, class names, automation ids).
    #[default]
    WindowManager,
    /// Java access bridge (roles, descriptions, state sets).
    AccessBridge,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WindowManager => "window-manager",
            Self::AccessBridge => "access-bridge",
        }
    }

    pub fn dialect(&self) -> &'static Dialect {
        match self {
            Self::WindowManager => &WINDOW_MANAGER,
            Self::AccessBridge => &ACCESS_BRIDGE,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "window-manager" | "uia" => Ok(Self::WindowManager),
            "access-bridge" | "jab" | "java" => Ok(Self::AccessBridge),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// How a level's initial attribute set is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedRule {
    /// Take the first attribute with a non-empty value.
    FirstPresent(&'static [Attribute]),
    /// Take every attribute with a non-empty value.
    AllPresent(&'static [Attribute]),
}

/// How the tag opens a selector line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagForm {
    /// `<Button ...`
    Bare,
    /// `<java role='push button' ...`; the tag doubles as `attribute`.
    Keyword {
        keyword: &'static str,
        attribute: Attribute,
        display: &'static str,
    },
}

/// Fixed attribute table for one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    pub kind: BackendKind,
    /// Siblings with a different tag are distinct without looking further.
    pub tag_precheck: bool,
    pub seed: SeedRule,
    /// Attributes tried, in order, when a sibling still compares equal.
    pub discriminators: &'static [Attribute],
    /// Serialized names, in emission order.
    pub display_names: &'static [(Attribute, &'static str)],
    pub tag_form: TagForm,
    /// A parentless element still yields a level (located among the desktop's
    /// top-level windows) and the resolver matches it against the search root.
    pub parentless_level: bool,
}

pub static WINDOW_MANAGER: Dialect = Dialect {
    kind: BackendKind::WindowManager,
    tag_precheck: true,
    seed: SeedRule::FirstPresent(&[Attribute::Name, Attribute::ClassName, Attribute::AutomationId]),
    discriminators: &[Attribute::AutomationId, Attribute::Name, Attribute::ClassName],
    display_names: &[
        (Attribute::Name, "name"),
        (Attribute::ClassName, "cls"),
        (Attribute::AutomationId, "id"),
    ],
    tag_form: TagForm::Bare,
    parentless_level: false,
};

pub static ACCESS_BRIDGE: Dialect = Dialect {
    kind: BackendKind::AccessBridge,
    tag_precheck: false,
    seed: SeedRule::AllPresent(&[Attribute::Role, Attribute::Name]),
    discriminators: &[Attribute::Name],
    display_names: &[(Attribute::Name, "name"), (Attribute::States, "states")],
    tag_form: TagForm::Keyword {
        keyword: "java",
        attribute: Attribute::Role,
        display: "role",
    },
    parentless_level: true,
};

impl Dialect {
    /// Display name used in selector text, if the attribute is serializable.
    pub fn display_name(&self, attribute: Attribute) -> Option<&'static str> {
        self.display_names
            .iter()
            .find(|(attr, _)| *attr == attribute)
            .map(|(_, display)| *display)
    }

    /// Internal attribute for a display name.
    pub fn attribute_for(&self, display: &str) -> Option<Attribute> {
        self.display_names
            .iter()
            .find(|(_, name)| *name == display)
            .map(|(attr, _)| *attr)
    }

    /// Attribute the tag doubles as, if any.
    pub fn tag_attribute(&self) -> Option<Attribute> {
        match self.tag_form {
            TagForm::Bare => None,
            TagForm::Keyword { attribute, .. } => Some(attribute),
        }
    }
}

#[cfg(test)]
#[path = "dialect_tests.rs"]
mod tests;
