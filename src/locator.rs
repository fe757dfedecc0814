//! Element locators
//!
//! A [`Locator`] describes how to find one UI element: either a raw selector
//! (strategy kind + value) that the driver resolves, or an already-resolved
//! element handle reused as-is.

use std::fmt;

use crate::error::{Error, Result};
use crate::protocol::types::ElementHandle;

/// Selector strategy kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Id,
    Css,
    XPath,
    Name,
    ClassName,
    TagName,
    LinkText,
    PartialLinkText,
    JQuery,
}

/// A description of how to find one UI element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A raw selector resolved by the driver per action
    Raw { kind: SelectorKind, value: String },
    /// An element handle already resolved by a previous action
    Resolved(ElementHandle),
}

impl Locator {
    pub fn id<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::Id,
            value: value.into(),
        }
    }

    pub fn css<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::Css,
            value: value.into(),
        }
    }

    pub fn xpath<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::XPath,
            value: value.into(),
        }
    }

    pub fn name<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::Name,
            value: value.into(),
        }
    }

    pub fn class_name<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::ClassName,
            value: value.into(),
        }
    }

    pub fn tag_name<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::TagName,
            value: value.into(),
        }
    }

    pub fn link_text<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::LinkText,
            value: value.into(),
        }
    }

    pub fn partial_link_text<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::PartialLinkText,
            value: value.into(),
        }
    }

    pub fn jquery<S: Into<String>>(value: S) -> Self {
        Locator::Raw {
            kind: SelectorKind::JQuery,
            value: value.into(),
        }
    }

    pub fn resolved(handle: ElementHandle) -> Self {
        Locator::Resolved(handle)
    }

    /// Translate to a W3C `(using, value)` pair.
    ///
    /// ID, NAME and CLASS_NAME have no wire strategy of their own and are
    /// rewritten as CSS attribute/class selectors. JQuery selectors pass
    /// through as CSS; constructs outside the CSS subset are rejected by the
    /// driver as invalid selectors.
    pub fn to_wire(&self) -> Result<(&'static str, String)> {
        match self {
            Locator::Raw { kind, value } => Ok(match kind {
                SelectorKind::Css | SelectorKind::JQuery => ("css selector", value.clone()),
                SelectorKind::Id => ("css selector", format!("[id=\"{}\"]", value)),
                SelectorKind::Name => ("css selector", format!("[name=\"{}\"]", value)),
                SelectorKind::ClassName => ("css selector", format!(".{}", value)),
                SelectorKind::TagName => ("tag name", value.clone()),
                SelectorKind::LinkText => ("link text", value.clone()),
                SelectorKind::PartialLinkText => ("partial link text", value.clone()),
                SelectorKind::XPath => ("xpath", value.clone()),
            }),
            Locator::Resolved(handle) => Err(Error::internal(format!(
                "Locator {} is already resolved and has no wire form",
                handle
            ))),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Raw { kind, value } => write!(f, "{:?}={}", kind, value),
            Locator::Resolved(handle) => write!(f, "element:{}", handle),
        }
    }
}
