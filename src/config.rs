use std::time::Duration;

use serde::Deserialize;

/// Cursor behavior when `next`/`prev` runs past a list boundary.
///
/// The two observed revisions of this feature disagree: the earlier one
/// wrapped modulo the list length, the later one saturates. Both are kept
/// selectable; [`MotionPolicy::Clamp`] is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionPolicy {
    /// Saturate at the first/last entry.
    #[default]
    Clamp,
    /// Wrap around modulo the list length.
    Wrap,
}

/// When to recompute the highlight after a mutation-driven refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RehighlightPolicy {
    /// Re-apply the highlight after every refresh.
    Always,
    /// Re-apply only when the previous list length was at or below the
    /// cursor, i.e. new content arrived at or after it. Leaves an in-range
    /// highlight undisturbed so unrelated mutations don't cause flicker.
    #[default]
    OnOverflow,
}

/// Tunables for container discovery, extraction, and cursor behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Element id of the results container.
    pub container_id: String,
    /// Heading tag used as the anchor point for each result.
    pub heading_tag: String,
    /// Tags accepted as a self-contained result block. An ancestor carrying
    /// a `lang` attribute whose tag is not in this set is treated as an
    /// inline wrapper and skipped.
    pub block_tags: Vec<String>,
    /// Class name applied to the selected entry.
    pub marker_class: String,
    pub motion: MotionPolicy,
    pub rehighlight: RehighlightPolicy,
    /// Window in milliseconds for the `gg` double press.
    pub double_press_ms: u64,
    /// Collapse repeated blocks when several headings resolve to the same
    /// ancestor. `false` keeps one entry per heading.
    pub dedupe_blocks: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            container_id: "search".into(),
            heading_tag: "h3".into(),
            block_tags: vec!["div".into()],
            marker_class: "serpnav-selected".into(),
            motion: MotionPolicy::default(),
            rehighlight: RehighlightPolicy::default(),
            double_press_ms: 1000,
            dedupe_blocks: true,
        }
    }
}

impl NavConfig {
    pub fn is_block_tag(&self, tag: &str) -> bool {
        self.block_tags
            .iter()
            .any(|block| block.eq_ignore_ascii_case(tag))
    }

    pub fn double_press_window(&self) -> Duration {
        Duration::from_millis(self.double_press_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_observed_page() {
        let config = NavConfig::default();
        assert_eq!(config.container_id, "search");
        assert_eq!(config.heading_tag, "h3");
        assert!(config.is_block_tag("div"));
        assert!(config.is_block_tag("DIV"));
        assert!(!config.is_block_tag("span"));
        assert_eq!(config.motion, MotionPolicy::Clamp);
        assert_eq!(config.rehighlight, RehighlightPolicy::OnOverflow);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: NavConfig = serde_json::from_str(r#"{"motion": "wrap"}"#).unwrap();
        assert_eq!(config.motion, MotionPolicy::Wrap);
        assert_eq!(config.double_press_ms, 1000);
    }
}
