//! Template configuration registry.
//!
//! A template is a closed enum tag plus one flat configuration record. There
//! is no inheritance between records: shared defaults are copied by value
//! from [`BASE`] and overridden field by field, so editing one template can
//! never change another. Adding a template means adding an enum case and
//! one `match` arm in [`resolve`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Configuration record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutArchetype {
    Standard,
    SidebarLeft,
    SidebarRight,
    HeaderBlock,
    Grid,
    Minimal,
}

impl LayoutArchetype {
    pub const ALL: [LayoutArchetype; 6] = [
        LayoutArchetype::Standard,
        LayoutArchetype::SidebarLeft,
        LayoutArchetype::SidebarRight,
        LayoutArchetype::HeaderBlock,
        LayoutArchetype::Grid,
        LayoutArchetype::Minimal,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStyle {
    Striped,
    Simple,
    Bordered,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderAlignment {
    Left,
    Right,
    Center,
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoPosition {
    Left,
    Right,
    Center,
    TopLeft,
}

/// A background fill expressed in palette tokens (`"blue-600"`,
/// `"blue-50/50"` for 50 % opacity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fill {
    Solid(&'static str),
    /// Left-to-right gradient between two tokens.
    Gradient(&'static str, &'static str),
}

/// Colour roles, each a palette token understood by the style resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRoles {
    /// Headings and accents.
    pub primary: &'static str,
    /// Light backgrounds (stripes, totals panel).
    pub secondary: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub header_bg: Option<Fill>,
    pub sidebar_bg: Option<&'static str>,
    /// Foreground on the sidebar or on a coloured header band.
    pub sidebar_text: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleRoles {
    pub table: TableStyle,
    pub header_alignment: HeaderAlignment,
    pub logo_position: LogoPosition,
    pub uppercase_titles: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateConfig {
    pub layout: LayoutArchetype,
    pub colors: ColorRoles,
    pub styles: StyleRoles,
}

/// Neutral slate defaults, also the fallback for unrecognised names.
pub const BASE: TemplateConfig = TemplateConfig {
    layout: LayoutArchetype::Standard,
    colors: ColorRoles {
        primary: "slate-800",
        secondary: "slate-50",
        text: "slate-600",
        border: "slate-200",
        header_bg: None,
        sidebar_bg: None,
        sidebar_text: None,
    },
    styles: StyleRoles {
        table: TableStyle::Striped,
        header_alignment: HeaderAlignment::Split,
        logo_position: LogoPosition::Left,
        uppercase_titles: true,
    },
};

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesignFamily {
    Standard,
    Sidebar,
    BoldHeader,
    Minimal,
    Executive,
    Grid,
    Creative,
    Specialized,
    ModernBusiness,
    Timeless,
    International,
}

impl DesignFamily {
    pub fn label(self) -> &'static str {
        match self {
            DesignFamily::Standard => "Standard",
            DesignFamily::Sidebar => "Sidebar",
            DesignFamily::BoldHeader => "Bold Header",
            DesignFamily::Minimal => "Minimal",
            DesignFamily::Executive => "Executive",
            DesignFamily::Grid => "Grid",
            DesignFamily::Creative => "Creative",
            DesignFamily::Specialized => "Specialized",
            DesignFamily::ModernBusiness => "Modern Business",
            DesignFamily::Timeless => "Timeless",
            DesignFamily::International => "International",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateSelector {
    StandardBlue,
    StandardSlate,
    StandardEmerald,
    StandardCrimson,

    SidebarNavy,
    SidebarDark,
    SidebarTeal,
    SidebarIndigo,
    SidebarGold,
    SidebarRightGray,

    BoldHeaderBlue,
    BoldHeaderBlack,
    BoldHeaderPurple,
    BoldHeaderOrange,

    MinimalClean,
    MinimalMono,
    MinimalFramed,
    MinimalDivider,

    ExecutiveClassic,
    ExecutiveElegant,
    ExecutiveOfficial,

    GridTech,
    GridModern,
    GridAccent,

    CreativeCoral,
    CreativeMint,
    CreativeGradient,

    CompactDense,
    ConsultantFlat,
    ServiceSimple,
    ImpactRed,

    ModernBoldBlack,
    ModernStripBlue,

    TimelessCentered,

    InternationalStruct,
}

impl Default for TemplateSelector {
    fn default() -> Self {
        TemplateSelector::StandardBlue
    }
}

impl TemplateSelector {
    pub const ALL: [TemplateSelector; 35] = [
        TemplateSelector::StandardBlue,
        TemplateSelector::StandardSlate,
        TemplateSelector::StandardEmerald,
        TemplateSelector::StandardCrimson,
        TemplateSelector::SidebarNavy,
        TemplateSelector::SidebarDark,
        TemplateSelector::SidebarTeal,
        TemplateSelector::SidebarIndigo,
        TemplateSelector::SidebarGold,
        TemplateSelector::SidebarRightGray,
        TemplateSelector::BoldHeaderBlue,
        TemplateSelector::BoldHeaderBlack,
        TemplateSelector::BoldHeaderPurple,
        TemplateSelector::BoldHeaderOrange,
        TemplateSelector::MinimalClean,
        TemplateSelector::MinimalMono,
        TemplateSelector::MinimalFramed,
        TemplateSelector::MinimalDivider,
        TemplateSelector::ExecutiveClassic,
        TemplateSelector::ExecutiveElegant,
        TemplateSelector::ExecutiveOfficial,
        TemplateSelector::GridTech,
        TemplateSelector::GridModern,
        TemplateSelector::GridAccent,
        TemplateSelector::CreativeCoral,
        TemplateSelector::CreativeMint,
        TemplateSelector::CreativeGradient,
        TemplateSelector::CompactDense,
        TemplateSelector::ConsultantFlat,
        TemplateSelector::ServiceSimple,
        TemplateSelector::ImpactRed,
        TemplateSelector::ModernBoldBlack,
        TemplateSelector::ModernStripBlue,
        TemplateSelector::TimelessCentered,
        TemplateSelector::InternationalStruct,
    ];

    /// Picker order: featured designs first, then one or more per series.
    pub const FEATURED: [TemplateSelector; 21] = [
        TemplateSelector::ModernBoldBlack,
        TemplateSelector::TimelessCentered,
        TemplateSelector::ModernStripBlue,
        TemplateSelector::InternationalStruct,
        TemplateSelector::StandardBlue,
        TemplateSelector::StandardSlate,
        TemplateSelector::StandardEmerald,
        TemplateSelector::StandardCrimson,
        TemplateSelector::SidebarNavy,
        TemplateSelector::SidebarDark,
        TemplateSelector::SidebarTeal,
        TemplateSelector::SidebarRightGray,
        TemplateSelector::BoldHeaderBlue,
        TemplateSelector::BoldHeaderBlack,
        TemplateSelector::MinimalClean,
        TemplateSelector::MinimalMono,
        TemplateSelector::MinimalFramed,
        TemplateSelector::ExecutiveClassic,
        TemplateSelector::ExecutiveOfficial,
        TemplateSelector::GridTech,
        TemplateSelector::GridModern,
    ];

    /// Stable identifier, e.g. `STANDARD_BLUE`.
    pub fn name(self) -> &'static str {
        match self {
            TemplateSelector::StandardBlue => "STANDARD_BLUE",
            TemplateSelector::StandardSlate => "STANDARD_SLATE",
            TemplateSelector::StandardEmerald => "STANDARD_EMERALD",
            TemplateSelector::StandardCrimson => "STANDARD_CRIMSON",
            TemplateSelector::SidebarNavy => "SIDEBAR_NAVY",
            TemplateSelector::SidebarDark => "SIDEBAR_DARK",
            TemplateSelector::SidebarTeal => "SIDEBAR_TEAL",
            TemplateSelector::SidebarIndigo => "SIDEBAR_INDIGO",
            TemplateSelector::SidebarGold => "SIDEBAR_GOLD",
            TemplateSelector::SidebarRightGray => "SIDEBAR_RIGHT_GRAY",
            TemplateSelector::BoldHeaderBlue => "BOLD_HEADER_BLUE",
            TemplateSelector::BoldHeaderBlack => "BOLD_HEADER_BLACK",
            TemplateSelector::BoldHeaderPurple => "BOLD_HEADER_PURPLE",
            TemplateSelector::BoldHeaderOrange => "BOLD_HEADER_ORANGE",
            TemplateSelector::MinimalClean => "MINIMAL_CLEAN",
            TemplateSelector::MinimalMono => "MINIMAL_MONO",
            TemplateSelector::MinimalFramed => "MINIMAL_FRAMED",
            TemplateSelector::MinimalDivider => "MINIMAL_DIVIDER",
            TemplateSelector::ExecutiveClassic => "EXECUTIVE_CLASSIC",
            TemplateSelector::ExecutiveElegant => "EXECUTIVE_ELEGANT",
            TemplateSelector::ExecutiveOfficial => "EXECUTIVE_OFFICIAL",
            TemplateSelector::GridTech => "GRID_TECH",
            TemplateSelector::GridModern => "GRID_MODERN",
            TemplateSelector::GridAccent => "GRID_ACCENT",
            TemplateSelector::CreativeCoral => "CREATIVE_CORAL",
            TemplateSelector::CreativeMint => "CREATIVE_MINT",
            TemplateSelector::CreativeGradient => "CREATIVE_GRADIENT",
            TemplateSelector::CompactDense => "COMPACT_DENSE",
            TemplateSelector::ConsultantFlat => "CONSULTANT_FLAT",
            TemplateSelector::ServiceSimple => "SERVICE_SIMPLE",
            TemplateSelector::ImpactRed => "IMPACT_RED",
            TemplateSelector::ModernBoldBlack => "MODERN_BOLD_BLACK",
            TemplateSelector::ModernStripBlue => "MODERN_STRIP_BLUE",
            TemplateSelector::TimelessCentered => "TIMELESS_CENTERED",
            TemplateSelector::InternationalStruct => "INTERNATIONAL_STRUCT",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateSelector::StandardBlue => "Standard Blue",
            TemplateSelector::StandardSlate => "Standard Slate",
            TemplateSelector::StandardEmerald => "Standard Green",
            TemplateSelector::StandardCrimson => "Standard Red",
            TemplateSelector::SidebarNavy => "Sidebar Navy",
            TemplateSelector::SidebarDark => "Sidebar Dark",
            TemplateSelector::SidebarTeal => "Sidebar Teal",
            TemplateSelector::SidebarIndigo => "Sidebar Indigo",
            TemplateSelector::SidebarGold => "Sidebar Gold",
            TemplateSelector::SidebarRightGray => "Sidebar Right",
            TemplateSelector::BoldHeaderBlue => "Bold Blue",
            TemplateSelector::BoldHeaderBlack => "Bold Black",
            TemplateSelector::BoldHeaderPurple => "Bold Purple",
            TemplateSelector::BoldHeaderOrange => "Bold Orange",
            TemplateSelector::MinimalClean => "Minimal Clean",
            TemplateSelector::MinimalMono => "Minimal Mono",
            TemplateSelector::MinimalFramed => "Framed",
            TemplateSelector::MinimalDivider => "Minimal Divider",
            TemplateSelector::ExecutiveClassic => "Executive Serif",
            TemplateSelector::ExecutiveElegant => "Executive Elegant",
            TemplateSelector::ExecutiveOfficial => "Official Box",
            TemplateSelector::GridTech => "Tech Grid",
            TemplateSelector::GridModern => "Modern Grid",
            TemplateSelector::GridAccent => "Accent Grid",
            TemplateSelector::CreativeCoral => "Creative Coral",
            TemplateSelector::CreativeMint => "Creative Mint",
            TemplateSelector::CreativeGradient => "Gradient",
            TemplateSelector::CompactDense => "Compact Dense",
            TemplateSelector::ConsultantFlat => "Consultant Flat",
            TemplateSelector::ServiceSimple => "Service Simple",
            TemplateSelector::ImpactRed => "Impact Red",
            TemplateSelector::ModernBoldBlack => "Modern Bold",
            TemplateSelector::ModernStripBlue => "Corporate Strip",
            TemplateSelector::TimelessCentered => "Timeless Serif",
            TemplateSelector::InternationalStruct => "Global Structure",
        }
    }

    pub fn family(self) -> DesignFamily {
        use TemplateSelector::*;
        match self {
            StandardBlue | StandardSlate | StandardEmerald | StandardCrimson => {
                DesignFamily::Standard
            }
            SidebarNavy | SidebarDark | SidebarTeal | SidebarIndigo | SidebarGold
            | SidebarRightGray => DesignFamily::Sidebar,
            BoldHeaderBlue | BoldHeaderBlack | BoldHeaderPurple | BoldHeaderOrange => {
                DesignFamily::BoldHeader
            }
            MinimalClean | MinimalMono | MinimalFramed | MinimalDivider => DesignFamily::Minimal,
            ExecutiveClassic | ExecutiveElegant | ExecutiveOfficial => DesignFamily::Executive,
            GridTech | GridModern | GridAccent => DesignFamily::Grid,
            CreativeCoral | CreativeMint | CreativeGradient => DesignFamily::Creative,
            CompactDense | ConsultantFlat | ServiceSimple | ImpactRed => DesignFamily::Specialized,
            ModernBoldBlack | ModernStripBlue => DesignFamily::ModernBusiness,
            TimelessCentered => DesignFamily::Timeless,
            InternationalStruct => DesignFamily::International,
        }
    }

    pub fn config(self) -> TemplateConfig {
        resolve(self)
    }
}

impl fmt::Display for TemplateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateSelector {
    type Err = Error;

    /// Strict parse; accepts `STANDARD_BLUE`, `standard_blue` or
    /// `standard-blue`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_uppercase();
        TemplateSelector::ALL
            .iter()
            .copied()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| Error::UnknownTemplate(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a template name, falling back to [`BASE`] when the name is not
/// recognised. Never fails.
pub fn resolve_name(name: &str) -> TemplateConfig {
    match name.parse::<TemplateSelector>() {
        Ok(selector) => resolve(selector),
        Err(_) => {
            log::warn!("Unknown template {name:?}, using the default configuration");
            BASE
        }
    }
}

/// Map a selector to its configuration record.
pub fn resolve(selector: TemplateSelector) -> TemplateConfig {
    use LayoutArchetype as L;
    use TableStyle as T;
    use TemplateSelector::*;

    let c = BASE.colors;
    let s = BASE.styles;

    match selector {
        // Modern business
        ModernBoldBlack => TemplateConfig {
            layout: L::Minimal,
            colors: ColorRoles { primary: "black", border: "black", ..c },
            styles: StyleRoles { table: T::Simple, ..s },
        },
        ModernStripBlue => TemplateConfig {
            layout: L::HeaderBlock,
            colors: ColorRoles {
                header_bg: Some(Fill::Solid("blue-600")),
                sidebar_text: Some("white"),
                primary: "blue-600",
                secondary: "blue-50",
                ..c
            },
            styles: s,
        },

        // Timeless
        TimelessCentered => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "stone-900", border: "stone-200", ..c },
            styles: StyleRoles {
                table: T::Bordered,
                header_alignment: HeaderAlignment::Center,
                logo_position: LogoPosition::Center,
                ..s
            },
        },

        // International
        InternationalStruct => TemplateConfig {
            layout: L::Grid,
            colors: ColorRoles {
                primary: "slate-800",
                border: "slate-300",
                header_bg: Some(Fill::Solid("slate-100")),
                ..c
            },
            styles: StyleRoles {
                table: T::Bordered,
                header_alignment: HeaderAlignment::Left,
                uppercase_titles: false,
                ..s
            },
        },

        // Standard
        StandardBlue => TemplateConfig {
            colors: ColorRoles { primary: "blue-600", border: "blue-100", secondary: "blue-50/50", ..c },
            ..BASE
        },
        StandardSlate => TemplateConfig {
            colors: ColorRoles { primary: "slate-800", border: "slate-200", ..c },
            ..BASE
        },
        StandardEmerald => TemplateConfig {
            colors: ColorRoles { primary: "emerald-600", secondary: "emerald-50", border: "emerald-100", ..c },
            ..BASE
        },
        StandardCrimson => TemplateConfig {
            colors: ColorRoles { primary: "red-700", secondary: "red-50", border: "red-100", ..c },
            ..BASE
        },

        // Sidebar
        SidebarNavy => sidebar(L::SidebarLeft, "blue-900", "blue-900", "blue-100", "blue-50/30", T::Simple),
        SidebarDark => sidebar(L::SidebarLeft, "slate-900", "slate-900", "slate-200", "slate-100", T::Simple),
        SidebarTeal => sidebar(L::SidebarLeft, "teal-700", "teal-700", "teal-50", "teal-50", T::Striped),
        SidebarIndigo => sidebar(L::SidebarLeft, "indigo-700", "indigo-700", "indigo-50", "indigo-50", T::Striped),
        SidebarGold => sidebar(L::SidebarLeft, "amber-700", "amber-600", "white", "amber-50", T::Bordered),
        SidebarRightGray => sidebar(L::SidebarRight, "gray-700", "gray-100", "gray-800", "gray-50", T::Simple),

        // Bold header
        BoldHeaderBlue => header_block(Fill::Solid("blue-700"), "blue-700", "blue-50", T::Striped),
        BoldHeaderBlack => header_block(Fill::Solid("black"), "black", "gray-100", T::Simple),
        BoldHeaderPurple => header_block(Fill::Solid("purple-700"), "purple-700", "purple-50", T::Striped),
        BoldHeaderOrange => header_block(Fill::Solid("orange-600"), "orange-700", "orange-50", T::Simple),

        // Minimal
        MinimalClean => TemplateConfig {
            layout: L::Minimal,
            colors: ColorRoles { primary: "black", border: "transparent", ..c },
            styles: StyleRoles {
                table: T::Minimal,
                header_alignment: HeaderAlignment::Left,
                uppercase_titles: false,
                ..s
            },
        },
        MinimalMono => TemplateConfig {
            layout: L::Minimal,
            colors: ColorRoles { primary: "slate-800", border: "slate-800", ..c },
            styles: StyleRoles {
                table: T::Simple,
                header_alignment: HeaderAlignment::Right,
                uppercase_titles: true,
                ..s
            },
        },
        MinimalFramed => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "black", border: "black", ..c },
            styles: StyleRoles {
                table: T::Bordered,
                header_alignment: HeaderAlignment::Center,
                logo_position: LogoPosition::Center,
                ..s
            },
        },
        MinimalDivider => TemplateConfig {
            layout: L::Minimal,
            colors: ColorRoles { primary: "gray-900", border: "gray-900", ..c },
            styles: StyleRoles { table: T::Minimal, header_alignment: HeaderAlignment::Split, ..s },
        },

        // Executive
        ExecutiveClassic => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "stone-800", border: "stone-400", secondary: "stone-50", ..c },
            styles: StyleRoles {
                table: T::Bordered,
                header_alignment: HeaderAlignment::Center,
                logo_position: LogoPosition::TopLeft,
                ..s
            },
        },
        ExecutiveElegant => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "stone-900", border: "stone-200", ..c },
            styles: StyleRoles { table: T::Simple, header_alignment: HeaderAlignment::Split, ..s },
        },
        ExecutiveOfficial => TemplateConfig {
            layout: L::Grid,
            colors: ColorRoles {
                primary: "slate-800",
                border: "slate-400",
                header_bg: Some(Fill::Solid("slate-100")),
                ..c
            },
            styles: StyleRoles { table: T::Bordered, header_alignment: HeaderAlignment::Left, ..s },
        },

        // Grid
        GridTech => grid("cyan-700", "cyan-200", "cyan-50", T::Bordered),
        GridModern => grid("sky-700", "sky-100", "sky-50", T::Striped),
        GridAccent => grid("rose-700", "rose-200", "white", T::Simple),

        // Creative
        CreativeCoral => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "rose-500", secondary: "rose-50", border: "rose-100", ..c },
            styles: StyleRoles {
                table: T::Striped,
                header_alignment: HeaderAlignment::Right,
                logo_position: LogoPosition::Left,
                ..s
            },
        },
        CreativeMint => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "emerald-500", secondary: "emerald-50", border: "emerald-100", ..c },
            styles: StyleRoles {
                table: T::Simple,
                header_alignment: HeaderAlignment::Left,
                logo_position: LogoPosition::Right,
                ..s
            },
        },
        CreativeGradient => header_block(
            Fill::Gradient("blue-600", "purple-600"),
            "purple-600",
            "purple-50",
            T::Striped,
        ),

        // Specialized
        CompactDense => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "gray-800", border: "gray-300", ..c },
            styles: StyleRoles { table: T::Bordered, ..s },
        },
        ConsultantFlat => TemplateConfig {
            layout: L::Minimal,
            colors: ColorRoles { primary: "blue-600", border: "blue-200", ..c },
            styles: StyleRoles { table: T::Simple, header_alignment: HeaderAlignment::Left, ..s },
        },
        ServiceSimple => TemplateConfig {
            layout: L::Standard,
            colors: ColorRoles { primary: "indigo-600", secondary: "indigo-50/50", ..c },
            styles: StyleRoles { table: T::Striped, ..s },
        },
        ImpactRed => header_block(Fill::Solid("red-800"), "red-900", "red-50", T::Bordered),
    }
}

fn sidebar(
    layout: LayoutArchetype,
    primary: &'static str,
    sidebar_bg: &'static str,
    sidebar_text: &'static str,
    secondary: &'static str,
    table: TableStyle,
) -> TemplateConfig {
    TemplateConfig {
        layout,
        colors: ColorRoles {
            primary,
            sidebar_bg: Some(sidebar_bg),
            sidebar_text: Some(sidebar_text),
            secondary,
            ..BASE.colors
        },
        styles: StyleRoles { table, ..BASE.styles },
    }
}

fn header_block(
    header_bg: Fill,
    primary: &'static str,
    secondary: &'static str,
    table: TableStyle,
) -> TemplateConfig {
    TemplateConfig {
        layout: LayoutArchetype::HeaderBlock,
        colors: ColorRoles {
            header_bg: Some(header_bg),
            sidebar_text: Some("white"),
            primary,
            secondary,
            ..BASE.colors
        },
        styles: StyleRoles { table, ..BASE.styles },
    }
}

fn grid(
    primary: &'static str,
    border: &'static str,
    header_bg: &'static str,
    table: TableStyle,
) -> TemplateConfig {
    TemplateConfig {
        layout: LayoutArchetype::Grid,
        colors: ColorRoles {
            primary,
            border,
            header_bg: Some(Fill::Solid(header_bg)),
            ..BASE.colors
        },
        styles: StyleRoles { table, ..BASE.styles },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_selector_resolves() {
        for t in TemplateSelector::ALL {
            let cfg = resolve(t);
            assert!(LayoutArchetype::ALL.contains(&cfg.layout), "{t}");
            assert!(!cfg.colors.primary.is_empty());
        }
    }

    #[test]
    fn names_round_trip() {
        for t in TemplateSelector::ALL {
            assert_eq!(t.name().parse::<TemplateSelector>().unwrap(), t);
        }
        assert_eq!(
            "sidebar-right-gray".parse::<TemplateSelector>().unwrap(),
            TemplateSelector::SidebarRightGray
        );
    }

    #[test]
    fn unknown_name_falls_back() {
        let cfg = resolve_name("NOT_A_TEMPLATE");
        assert_eq!(cfg, BASE);
        assert_eq!(cfg.layout, LayoutArchetype::Standard);
        assert_eq!(cfg.styles.table, TableStyle::Striped);
        assert_eq!(cfg.styles.header_alignment, HeaderAlignment::Split);
        assert!("NOT_A_TEMPLATE".parse::<TemplateSelector>().is_err());
    }

    #[test]
    fn families_cover_all_eleven() {
        let families: std::collections::HashSet<_> =
            TemplateSelector::ALL.iter().map(|t| t.family()).collect();
        assert_eq!(families.len(), 11);
    }

    #[test]
    fn records_are_independent() {
        // Two templates sharing the base still differ only where overridden.
        let blue = resolve(TemplateSelector::StandardBlue);
        let slate = resolve(TemplateSelector::StandardSlate);
        assert_eq!(blue.styles, slate.styles);
        assert_ne!(blue.colors.primary, slate.colors.primary);
        assert_eq!(BASE.colors.primary, "slate-800");
    }

    #[test]
    fn sidebar_variants() {
        assert_eq!(
            resolve(TemplateSelector::SidebarRightGray).layout,
            LayoutArchetype::SidebarRight
        );
        assert_eq!(resolve(TemplateSelector::SidebarGold).colors.sidebar_bg, Some("amber-600"));
    }
}
