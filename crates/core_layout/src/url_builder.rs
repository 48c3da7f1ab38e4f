//! Draft state for the URL group builder.

use serde::{Deserialize, Serialize};

const INITIAL_BROWSERS: [&str; 3] = ["Chrome", "Edge", "Firefox"];

/// How grouped URLs should be opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlOpenMode {
    /// All URLs in a single window.
    #[default]
    Single,
    /// One window per tab group.
    PerGroup,
    /// One window per URL.
    PerUrl,
}

/// A titled group of URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlGroup {
    pub id: String,
    pub title: String,
    pub urls: Vec<String>,
}

impl UrlGroup {
    fn numbered(n: u32) -> Self {
        Self {
            id: format!("g{}", n),
            title: String::new(),
            urls: vec![String::new(), String::new()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlBuilderDraft {
    pub browser: Option<String>,
    pub tab_groups: Vec<UrlGroup>,
    pub open_mode: UrlOpenMode,
}

impl Default for UrlBuilderDraft {
    fn default() -> Self {
        Self {
            browser: None,
            tab_groups: vec![UrlGroup::numbered(1), UrlGroup::numbered(2)],
            open_mode: UrlOpenMode::Single,
        }
    }
}

/// URL builder: the draft plus the list of known browsers.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    draft: UrlBuilderDraft,
    browsers: Vec<String>,
    /// Highest group number handed out so far.
    group_seed: u32,
}

impl Default for UrlBuilder {
    fn default() -> Self {
        Self {
            draft: UrlBuilderDraft::default(),
            browsers: INITIAL_BROWSERS.iter().map(|b| b.to_string()).collect(),
            group_seed: 2,
        }
    }
}

impl UrlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft (what both "save" and "preview" hand out).
    pub fn draft(&self) -> &UrlBuilderDraft {
        &self.draft
    }

    pub fn browsers(&self) -> &[String] {
        &self.browsers
    }

    pub fn set_browser(&mut self, browser: Option<String>) {
        self.draft.browser = browser;
    }

    pub fn set_open_mode(&mut self, mode: UrlOpenMode) {
        self.draft.open_mode = mode;
    }

    /// Add a browser name unless it is already listed.
    pub fn add_browser(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.browsers.iter().any(|b| b == name) {
            return false;
        }
        self.browsers.push(name.to_string());
        true
    }

    /// Append an empty group and return its id.
    pub fn add_tab_group(&mut self) -> String {
        self.group_seed += 1;
        let group = UrlGroup::numbered(self.group_seed);
        let id = group.id.clone();
        self.draft.tab_groups.push(group);
        id
    }

    fn group_mut(&mut self, group_id: &str) -> Option<&mut UrlGroup> {
        self.draft.tab_groups.iter_mut().find(|g| g.id == group_id)
    }

    pub fn set_tab_title(&mut self, group_id: &str, title: &str) -> bool {
        match self.group_mut(group_id) {
            Some(group) => {
                group.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace one URL line. Unknown groups and indexes are ignored.
    pub fn set_url_line(&mut self, group_id: &str, index: usize, value: &str) -> bool {
        match self
            .group_mut(group_id)
            .and_then(|group| group.urls.get_mut(index))
        {
            Some(line) => {
                *line = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn add_url_line(&mut self, group_id: &str) -> bool {
        match self.group_mut(group_id) {
            Some(group) => {
                group.urls.push(String::new());
                true
            }
            None => false,
        }
    }

    /// Reset the draft. The browser list and group numbering are kept.
    pub fn reset(&mut self) {
        self.draft = UrlBuilderDraft::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_draft() {
        let builder = UrlBuilder::new();
        let draft = builder.draft();
        assert_eq!(draft.browser, None);
        assert_eq!(draft.open_mode, UrlOpenMode::Single);
        assert_eq!(draft.tab_groups.len(), 2);
        assert_eq!(draft.tab_groups[0].id, "g1");
        assert_eq!(draft.tab_groups[1].urls, vec!["", ""]);
        assert_eq!(builder.browsers(), &["Chrome", "Edge", "Firefox"]);
    }

    #[test]
    fn test_add_browser_dedupes() {
        let mut builder = UrlBuilder::new();
        assert!(builder.add_browser("Brave"));
        assert!(!builder.add_browser("Brave"));
        assert!(!builder.add_browser("Chrome"));
        assert!(!builder.add_browser("  "));
        assert_eq!(builder.browsers().len(), 4);
    }

    #[test]
    fn test_tab_groups_and_lines() {
        let mut builder = UrlBuilder::new();
        let id = builder.add_tab_group();
        assert_eq!(id, "g3");
        assert_eq!(builder.add_tab_group(), "g4");

        assert!(builder.set_tab_title("g3", "Docs"));
        assert!(builder.set_url_line("g3", 1, "https://docs.rs"));
        assert!(builder.add_url_line("g3"));

        let group = &builder.draft().tab_groups[2];
        assert_eq!(group.title, "Docs");
        assert_eq!(group.urls, vec!["", "https://docs.rs", ""]);

        assert!(!builder.set_url_line("g3", 9, "x"));
        assert!(!builder.set_tab_title("g99", "x"));
        assert!(!builder.add_url_line("g99"));
    }

    #[test]
    fn test_reset_keeps_browsers() {
        let mut builder = UrlBuilder::new();
        builder.add_browser("Brave");
        builder.set_browser(Some("Brave".to_string()));
        builder.set_open_mode(UrlOpenMode::PerGroup);
        builder.add_tab_group();

        builder.reset();
        assert_eq!(builder.draft(), &UrlBuilderDraft::default());
        assert_eq!(builder.browsers().len(), 4);
        // Numbering continues after reset
        assert_eq!(builder.add_tab_group(), "g4");
    }

    #[test]
    fn test_draft_serialization_shape() {
        let json = serde_json::to_string(UrlBuilder::new().draft()).unwrap();
        assert!(json.contains("\"tabGroups\""));
        assert!(json.contains("\"openMode\":\"single\""));
    }
}
