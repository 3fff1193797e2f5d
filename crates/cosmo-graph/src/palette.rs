//! Node colouring and label display rules

use cosmo_core::RELATED_LABEL;

/// Edge labels too generic to print
const SUPPRESSED_EDGE_LABELS: [&str; 3] = [RELATED_LABEL, "be", "have"];

const MAX_LABEL_CHARS: usize = 15;
const TRUNCATED_LABEL_CHARS: usize = 12;

/// Colour category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Satellite,
    Ocean,
    Location,
    Weather,
    TemperatureData,
    Other,
}

impl NodeCategory {
    /// Legend order
    pub const ALL: [NodeCategory; 6] = [
        Self::Satellite,
        Self::Ocean,
        Self::Location,
        Self::Weather,
        Self::TemperatureData,
        Self::Other,
    ];

    pub fn hex(&self) -> &'static str {
        match self {
            Self::Satellite => "#4A90E2",
            Self::Ocean => "#7ED321",
            Self::Location => "#F5A623",
            Self::Weather => "#BD10E0",
            Self::TemperatureData => "#FF6B6B",
            Self::Other => "#50E3C2",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Satellite => (0x4A, 0x90, 0xE2),
            Self::Ocean => (0x7E, 0xD3, 0x21),
            Self::Location => (0xF5, 0xA6, 0x23),
            Self::Weather => (0xBD, 0x10, 0xE0),
            Self::TemperatureData => (0xFF, 0x6B, 0x6B),
            Self::Other => (0x50, 0xE3, 0xC2),
        }
    }

    pub fn legend_name(&self) -> &'static str {
        match self {
            Self::Satellite => "Satellites",
            Self::Ocean => "Ocean/Sea",
            Self::Location => "Locations",
            Self::Weather => "Weather",
            Self::TemperatureData => "Temperature/Data",
            Self::Other => "Other",
        }
    }
}

/// Keywords that select a category
#[derive(Debug, Clone)]
pub struct ColorRule {
    pub keywords: Vec<String>,
    pub category: NodeCategory,
}

/// Ordered keyword rules; the first rule with a keyword inside the
/// lowercased label wins
#[derive(Debug, Clone)]
pub struct ColorRules {
    rules: Vec<ColorRule>,
}

impl Default for ColorRules {
    fn default() -> Self {
        Self::empty()
            .with_rule(NodeCategory::Satellite, &["satellite", "insat", "scatsat", "oceansat"])
            .with_rule(NodeCategory::Ocean, &["ocean", "sea", "bay", "arabian"])
            .with_rule(NodeCategory::Location, &["bengal", "indian", "coast"])
            .with_rule(NodeCategory::Weather, &["weather", "wind", "forecast"])
            .with_rule(NodeCategory::TemperatureData, &["temperature", "data"])
    }
}

impl ColorRules {
    /// No rules: everything is `Other`
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule with the lowest priority so far
    pub fn with_rule(mut self, category: NodeCategory, keywords: &[&str]) -> Self {
        self.rules.push(ColorRule {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            category,
        });
        self
    }

    pub fn rules(&self) -> &[ColorRule] {
        &self.rules
    }

    pub fn classify(&self, label: &str) -> NodeCategory {
        let lower = label.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|rule| rule.category)
            .unwrap_or(NodeCategory::Other)
    }
}

/// Label shown on a node; identity is unaffected
pub fn display_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let head: String = label.chars().take(TRUNCATED_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

/// Whether an edge label is printed
pub fn shows_edge_label(label: &str) -> bool {
    !SUPPRESSED_EDGE_LABELS.contains(&label)
}
