// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Structural components produced by the tree builder.

use crate::keyword::{
    KW_DAYLIGHT, KW_STANDARD, KW_VALARM, KW_VCALENDAR, KW_VEVENT, KW_VFREEBUSY, KW_VJOURNAL,
    KW_VTIMEZONE, KW_VTODO,
};
use crate::syntax::{LineParameter, find_parameter};
use crate::value::PropertyValue;

/// Kind of a structural component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ComponentKind {
    /// `VCALENDAR`
    #[strum(serialize = "VCALENDAR")]
    Calendar,

    /// `VEVENT`
    #[strum(serialize = "VEVENT")]
    Event,

    /// `VTODO`
    #[strum(serialize = "VTODO")]
    Todo,

    /// `VJOURNAL`
    #[strum(serialize = "VJOURNAL")]
    Journal,

    /// `VFREEBUSY`
    #[strum(serialize = "VFREEBUSY")]
    FreeBusy,

    /// `VTIMEZONE`
    #[strum(serialize = "VTIMEZONE")]
    Timezone,

    /// `STANDARD` sub-period of a `VTIMEZONE`
    #[strum(serialize = "STANDARD")]
    Standard,

    /// `DAYLIGHT` sub-period of a `VTIMEZONE`
    #[strum(serialize = "DAYLIGHT")]
    Daylight,

    /// `VALARM`
    #[strum(serialize = "VALARM")]
    Alarm,

    /// Any other component, including `X-` and IANA extensions
    #[strum(disabled)]
    Other,
}

impl ComponentKind {
    /// The canonical keyword, or `None` for [`ComponentKind::Other`].
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Calendar => Some(KW_VCALENDAR),
            Self::Event => Some(KW_VEVENT),
            Self::Todo => Some(KW_VTODO),
            Self::Journal => Some(KW_VJOURNAL),
            Self::FreeBusy => Some(KW_VFREEBUSY),
            Self::Timezone => Some(KW_VTIMEZONE),
            Self::Standard => Some(KW_STANDARD),
            Self::Daylight => Some(KW_DAYLIGHT),
            Self::Alarm => Some(KW_VALARM),
            Self::Other => None,
        }
    }
}

/// A component built from a `BEGIN:<name>` ... `END:<name>` block.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralNode {
    /// Kind resolved by the component factory
    pub kind: ComponentKind,

    /// Name as written in the `BEGIN` line
    pub name: String,

    /// Properties in source order
    pub properties: Vec<Property>,

    /// Nested components in source order
    pub children: Vec<StructuralNode>,
}

impl StructuralNode {
    /// Create an empty node.
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First property with the given name, case-insensitively.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// All properties with the given name, case-insensitively.
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Values of every property with the given name, flattened.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PropertyValue> {
        self.properties_named(name).flat_map(|p| p.values.iter())
    }

    /// Direct children of the given kind.
    pub fn children_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &StructuralNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }
}

/// A property with its typed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name, upper-cased
    pub name: String,

    /// Parameters in source order
    pub parameters: Vec<LineParameter>,

    /// Typed values; one per comma-separated item for list types
    pub values: Vec<PropertyValue>,
}

impl Property {
    /// Find the first parameter with the given name, case-insensitively.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&LineParameter> {
        find_parameter(&self.parameters, name)
    }

    /// The first value.
    #[must_use]
    pub fn value(&self) -> Option<&PropertyValue> {
        self.values.first()
    }
}
