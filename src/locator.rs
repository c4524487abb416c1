//! Declarative element locators resolved lazily against the live DOM
//!
//! A `LocatorSpec` is a pure description of how to find an element; it says
//! nothing about whether the element currently exists. Resolution is a single
//! non-waiting probe - the wait engine layers polling on top of it.

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How to find a UI element, independent of its current existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum LocatorSpec {
    /// ARIA role plus accessible name (trimmed, case-insensitive full match).
    Role { role: String, name: String },
    /// Visible text content. `exact` requires trimmed equality; otherwise
    /// a substring match is enough.
    Text {
        text: String,
        #[serde(default)]
        exact: bool,
    },
    /// Form control associated with a `<label>` carrying this text.
    Label { label: String },
    /// Raw CSS selector.
    Css { selector: String },
}

impl LocatorSpec {
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    pub fn text_exact(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: true,
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Label {
            label: label.into(),
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    /// Perform one DOM query pass. Returns `None` when nothing matches right
    /// now; CDP-level query failures are folded into `None` as well, since
    /// from the caller's perspective the element is equally unavailable and
    /// the wait engine will probe again.
    pub async fn resolve(&self, page: &Page) -> Option<Element> {
        match self {
            LocatorSpec::Css { selector } => page.find_element(selector.as_str()).await.ok(),
            LocatorSpec::Role { role, name } => {
                let candidates = page
                    .find_elements(role_selector(role).as_str())
                    .await
                    .unwrap_or_default();
                for el in candidates {
                    if let Some(accessible) = accessible_name(&el).await {
                        if accessible.trim().eq_ignore_ascii_case(name.trim()) {
                            return Some(el);
                        }
                    }
                }
                None
            }
            LocatorSpec::Text { text, exact } => {
                let candidates = page
                    .find_elements(TEXT_BEARING_SELECTOR)
                    .await
                    .unwrap_or_default();
                // innerText includes descendants, so ancestors of the real
                // target also match. Keep the tightest match (shortest text).
                let mut best: Option<(usize, Element)> = None;
                for el in candidates {
                    let Ok(Some(inner)) = el.inner_text().await else {
                        continue;
                    };
                    let trimmed = inner.trim();
                    let matches = if *exact {
                        trimmed == text
                    } else {
                        trimmed.contains(text.as_str())
                    };
                    if matches && best.as_ref().is_none_or(|(len, _)| trimmed.len() < *len) {
                        best = Some((trimmed.len(), el));
                    }
                }
                best.map(|(_, el)| el)
            }
            LocatorSpec::Label { label } => {
                let labels = page.find_elements("label").await.unwrap_or_default();
                for el in labels {
                    let Ok(Some(inner)) = el.inner_text().await else {
                        continue;
                    };
                    if !inner.trim().eq_ignore_ascii_case(label.trim()) {
                        continue;
                    }
                    // Prefer the explicit for= association, fall back to a
                    // control nested inside the label.
                    if let Ok(Some(target_id)) = el.attribute("for").await {
                        if let Ok(control) =
                            page.find_element(format!("[id='{target_id}']").as_str()).await
                        {
                            return Some(control);
                        }
                    }
                    if let Ok(control) = el.find_element("input, textarea, select").await {
                        return Some(control);
                    }
                }
                None
            }
        }
    }
}

impl fmt::Display for LocatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorSpec::Role { role, name } => write!(f, "role={role}[name=\"{name}\"]"),
            LocatorSpec::Text { text, exact } => {
                if *exact {
                    write!(f, "text=\"{text}\" (exact)")
                } else {
                    write!(f, "text=\"{text}\"")
                }
            }
            LocatorSpec::Label { label } => write!(f, "label=\"{label}\""),
            LocatorSpec::Css { selector } => write!(f, "css={selector}"),
        }
    }
}

/// Elements worth scanning for a text match. Bounded on purpose - scanning
/// every node via CDP round-trips is too slow for a 100ms poll cadence.
const TEXT_BEARING_SELECTOR: &str =
    "a, button, label, span, p, li, td, th, h1, h2, h3, h4, h5, h6, div, [role]";

/// Expand an ARIA role into the CSS union of elements that carry it, either
/// implicitly (native elements) or explicitly (role= attribute).
fn role_selector(role: &str) -> String {
    match role {
        "button" => {
            "button, [role='button'], input[type='button'], input[type='submit']".to_string()
        }
        "link" => "a[href], [role='link']".to_string(),
        "textbox" => "input:not([type]), input[type='text'], input[type='email'], \
             input[type='password'], input[type='search'], textarea, [role='textbox']"
            .to_string(),
        "checkbox" => "input[type='checkbox'], [role='checkbox']".to_string(),
        "heading" => "h1, h2, h3, h4, h5, h6, [role='heading']".to_string(),
        other => format!("[role='{other}']"),
    }
}

/// Approximate the accessible name: innerText, then aria-label, then value.
async fn accessible_name(el: &Element) -> Option<String> {
    if let Ok(Some(inner)) = el.inner_text().await {
        if !inner.trim().is_empty() {
            return Some(inner);
        }
    }
    if let Ok(Some(aria)) = el.attribute("aria-label").await {
        if !aria.trim().is_empty() {
            return Some(aria);
        }
    }
    el.attribute("value").await.ok().flatten()
}

/// Check whether an element is actually rendered: non-zero box and not
/// hidden via computed style. Mirrors what a user (and a screenshot) sees.
pub async fn is_visible(el: &Element) -> bool {
    let probe = el
        .call_js_fn(
            "function() { \
                const rect = this.getBoundingClientRect(); \
                const style = window.getComputedStyle(this); \
                return rect.width > 0 && rect.height > 0 \
                    && style.visibility !== 'hidden' \
                    && style.display !== 'none'; \
            }",
            false,
        )
        .await;

    match probe {
        Ok(ret) => ret
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        Err(_) => false,
    }
}
