//! Admin area state.
//!
//! DESIGN
//! ======
//! Each tab owns one [`panel::AdminPanel`]. Panels are plain state machines
//! driven by the view layer; network calls happen outside and report back
//! through `submit_succeeded` / `submit_failed`.

pub mod panel;

pub use panel::{AdminPanel, PanelError, PanelMode, TOAST_DURATION_MS, Toast};

/// Tabs of the admin area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Cases,
    Reviews,
    Requests,
    Members,
}

impl AdminTab {
    pub const ALL: [Self; 4] = [Self::Cases, Self::Reviews, Self::Requests, Self::Members];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cases => "Cases",
            Self::Reviews => "Reviews",
            Self::Requests => "Requests",
            Self::Members => "Members",
        }
    }

    #[must_use]
    pub fn admin_only(self) -> bool {
        matches!(self, Self::Members)
    }

    /// Tabs shown to a member with the given role.
    #[must_use]
    pub fn visible(is_admin: bool) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|tab| is_admin || !tab.admin_only())
            .collect()
    }
}

/// `ceil(total / limit)`, never less than 1.
#[must_use]
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 1;
    }
    ((total + limit - 1) / limit).max(1)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
