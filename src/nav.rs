//! Navigation and card state, kept free of DOM types so it can be tested natively
//!
//! - MenuState: collapsible mobile menu
//! - active_flags: which navbar links match the section in view
//! - CardState: expandable project-detail card

/// Class toggled on the hamburger and the link list while the menu is open
pub const OPEN_CLASS: &str = "open";
/// Class on the navbar link for the section in view
pub const ACTIVE_CLASS: &str = "active";
/// Class on an expanded project card
pub const EXPANDED_CLASS: &str = "expanded";

/// Active-section band: only sections crossing the 40% line from the top count
pub const SECTION_ROOT_MARGIN: &str = "-40% 0px -60% 0px";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    pub open: bool,
}

impl MenuState {
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Following a link always closes the menu
    pub fn close(&mut self) {
        self.open = false;
    }
}

/// In-page anchor for a section id
pub fn section_anchor(id: &str) -> String {
    format!("#{id}")
}

/// One flag per link: true exactly for links pointing at `section_id`
pub fn active_flags<'a, I>(hrefs: I, section_id: &str) -> Vec<bool>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let anchor = section_anchor(section_id);
    hrefs
        .into_iter()
        .map(|href| href == Some(anchor.as_str()))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardState {
    pub expanded: bool,
}

impl CardState {
    /// Recover state from the card's class list
    pub fn from_class_present(expanded: bool) -> Self {
        Self { expanded }
    }

    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    /// Value for the toggle button's `aria-expanded`
    pub fn aria_expanded(&self) -> &'static str {
        if self.expanded {
            "true"
        } else {
            "false"
        }
    }
}
