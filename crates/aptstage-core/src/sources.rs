//! Well-known paths and rendered fragments for the target's apt layout.

use crate::CoreError;
use chrono::{DateTime, Utc};

/// Where the installation media is bound inside the for-install view.
pub const MEDIA_MOUNTPOINT: &str = "cdrom";

/// Subtree holding all apt configuration, relative to a root.
pub const APT_CONFIG_DIR: &str = "etc/apt";

/// Package index cache, refreshed by update runs.
pub const APT_LIST_CACHE: &str = "var/lib/apt/lists";

pub const SOURCES_LIST: &str = "etc/apt/sources.list";

/// Where the pre-existing sources file is parked while the media source is
/// in effect, so apt still sees it as a fragment.
pub const ORIGINAL_LIST: &str = "etc/apt/sources.list.d/original.list";

/// Proxy fragment written by the mirror configuration step. Useless without
/// network, so it is dropped from offline for-install views.
pub const PROXY_FRAGMENT: &str = "etc/apt/apt.conf.d/90curtin-aptproxy";

/// Record of the mirror intent, relative to the installer log root.
pub const INTENT_LOG_PATH: &str = "var/log/installer/aptstage-apt.conf";

/// Source line pointing apt at the pool on the bound installation media.
/// Media builds can postdate their release files, hence `check-date=no`.
pub fn media_source_line(codename: &str) -> String {
    format!("deb [check-date=no] file:///cdrom {codename} main restricted\n")
}

/// Render the mirror intent document recorded alongside the install.
pub fn render_intent(
    mirror: &toml::Value,
    generated_at: DateTime<Utc>,
) -> Result<String, CoreError> {
    let mut doc = toml::value::Table::new();
    doc.insert("apt".to_owned(), mirror.clone());
    let body = toml::to_string(&toml::Value::Table(doc))?;
    Ok(format!(
        "# Autogenerated by aptstage: {} UTC\n{body}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ))
}
