//! Page format, page budget and pagination configuration.
//!
//! All lengths are CSS pixels at 96 DPI, the unit the height probes report in.

use serde::{Deserialize, Serialize};

use crate::pagination::extract::{AtomicityPolicy, GroupMode};

/// Millimetres to CSS pixels at 96 DPI.
pub const MM_TO_PX: f32 = 3.779_527_6;

/// Subtracted from every page budget to absorb sub-pixel rounding in the renderer.
pub const SAFETY_MARGIN_PX: f32 = 1.0;

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageFormat {
    pub const A4: PageFormat = PageFormat {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    pub fn width_px(&self) -> f32 {
        self.width_mm * MM_TO_PX
    }

    pub fn height_px(&self) -> f32 {
        self.height_mm * MM_TO_PX
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

/// Maximum rendered height of one page. Constant for a pagination pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBudget {
    pub max_height_px: f32,
}

impl PageBudget {
    /// Page height minus the safety margin and the fixed padding charged once per page.
    pub fn for_format(format: &PageFormat, page_padding_px: f32) -> Self {
        Self {
            max_height_px: (format.height_px() - SAFETY_MARGIN_PX - page_padding_px).max(0.0),
        }
    }

    pub fn fits(&self, height_px: f32) -> bool {
        height_px <= self.max_height_px
    }
}

/// Everything a pagination pass needs besides the tree and the probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub format: PageFormat,
    /// Vertical padding the page container adds outside the measured content.
    pub page_padding_px: f32,
    pub policy: AtomicityPolicy,
    /// Drop containers that receive no block on a page, together with their headings.
    /// Off by default: a section heading is repeated on every page, as the browser
    /// preview renders it.
    pub omit_empty_containers: bool,
}

impl PaginationConfig {
    pub fn budget(&self) -> PageBudget {
        PageBudget::for_format(&self.format, self.page_padding_px)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            page_padding_px: 0.0,
            policy: AtomicityPolicy::default(),
            omit_empty_containers: false,
        }
    }
}

/// Default config for resume previews on A4.
///
/// A company with several positions is one block unless `split_company_groups`
/// is set, in which case its positions may fall on different pages and the
/// company heading follows them. `omit_empty_sections` hides section headings on
/// pages that carry none of the section's entries.
pub fn default_pagination_config(
    page_padding_px: f32,
    split_company_groups: bool,
    omit_empty_sections: bool,
) -> PaginationConfig {
    let mode = if split_company_groups {
        GroupMode::SplitChildren
    } else {
        GroupMode::KeepTogether
    };
    PaginationConfig {
        page_padding_px,
        policy: AtomicityPolicy::default().with_kind("experience", mode),
        omit_empty_containers: omit_empty_sections,
        ..PaginationConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_in_pixels() {
        let a4 = PageFormat::A4;
        assert!((a4.height_px() - 1122.52).abs() < 0.01);
        assert!((a4.width_px() - 793.70).abs() < 0.01);
    }

    #[test]
    fn test_budget_subtracts_margin_and_padding() {
        let budget = PageBudget::for_format(&PageFormat::A4, 20.0);
        assert!((budget.max_height_px - (1122.52 - 1.0 - 20.0)).abs() < 0.01);
        assert!(budget.fits(budget.max_height_px));
        assert!(!budget.fits(budget.max_height_px + 0.5));
    }

    #[test]
    fn test_budget_never_negative() {
        let budget = PageBudget::for_format(&PageFormat::A4, 5000.0);
        assert_eq!(budget.max_height_px, 0.0);
    }

    #[test]
    fn test_default_config_sanity() {
        let config = default_pagination_config(0.0, false, false);
        assert_eq!(config.format, PageFormat::A4);
        assert!(!config.omit_empty_containers);
        assert!(!PaginationConfig::default().omit_empty_containers);
        assert_eq!(config.policy.default, GroupMode::KeepTogether);
        assert_eq!(
            config.policy.by_kind.get("experience"),
            Some(&GroupMode::KeepTogether)
        );
    }

    #[test]
    fn test_split_company_groups_switches_experience_kind() {
        let config = default_pagination_config(0.0, true, true);
        assert_eq!(
            config.policy.by_kind.get("experience"),
            Some(&GroupMode::SplitChildren)
        );
        assert!(config.omit_empty_containers);
    }
}
