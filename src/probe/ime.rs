//! Input-method status probe
//!
//! There is no toolkit-independent query for "is the IME popup open", so
//! activity is derived from the session's input-method configuration:
//! the same environment variables the toolkits read to pick their IM
//! module. Everything is re-read on every call, nothing is cached.

use std::env;

/// Composition frameworks that count as an active input method.
const COMPOSITION_FRAMEWORKS: &[&str] = &["fcitx", "fcitx5", "ibus", "scim", "uim"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImeStatus {
    pub active: bool,
    pub framework: Option<String>,
    pub locale: String,
}

impl ImeStatus {
    /// The single status line rendered under the test fields.
    pub fn status_line(&self) -> String {
        match (self.active, self.framework.as_deref()) {
            (true, Some(name)) => {
                format!("Input method: active ({}), locale: {}", name, self.locale)
            }
            _ => format!("Input method: inactive, locale: {}", self.locale),
        }
    }
}

/// Query the current input-method configuration and locale.
pub fn probe() -> ImeStatus {
    let framework = framework_from(
        env::var("GTK_IM_MODULE").ok().as_deref(),
        env::var("QT_IM_MODULE").ok().as_deref(),
        env::var("XMODIFIERS").ok().as_deref(),
    );
    let locale = locale_from(
        env::var("LC_ALL").ok().as_deref(),
        env::var("LC_MESSAGES").ok().as_deref(),
        env::var("LANG").ok().as_deref(),
    );

    let active = framework
        .as_deref()
        .map(is_composition_framework)
        .unwrap_or(false);

    ImeStatus {
        active,
        framework,
        locale,
    }
}

fn framework_from(
    gtk_im: Option<&str>,
    qt_im: Option<&str>,
    xmodifiers: Option<&str>,
) -> Option<String> {
    if let Some(name) = gtk_im.filter(|s| !s.is_empty()) {
        return Some(name.to_string());
    }

    if let Some(name) = qt_im.filter(|s| !s.is_empty()) {
        return Some(name.to_string());
    }

    xmodifiers
        .and_then(im_from_xmodifiers)
        .map(|name| name.to_string())
}

fn im_from_xmodifiers(value: &str) -> Option<&str> {
    value
        .split_whitespace()
        .find_map(|token| token.strip_prefix("@im="))
        .filter(|name| !name.is_empty())
}

fn is_composition_framework(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    COMPOSITION_FRAMEWORKS.iter().any(|known| name == *known)
}

fn locale_from(
    lc_all: Option<&str>,
    lc_messages: Option<&str>,
    lang: Option<&str>,
) -> String {
    [lc_all, lc_messages, lang]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or("C")
        .to_string()
}
