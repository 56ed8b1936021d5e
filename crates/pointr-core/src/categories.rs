// Business categories: one place decides which tag gets which color and icon,
// so the map, the legend, the table filter and exports never disagree.

use crate::color::{Color, HuePalette};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Name of the catch-all category
pub const OTHER: &str = "Other";

/// Color the styling layer falls back to for tags no category claims
pub const UNMATCHED_TAG_COLOR: Color = Color::rgb(0xffffff);

const HAZARD_COLOR: Color = Color::rgb(0xef4444);
const NOTE_COLOR: Color = Color::rgb(0xeab308);
const OTHER_COLOR: Color = Color::rgb(0x9ca3af);

/// A named grouping of type tags sharing a color and icon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
    pub color: Color,
    /// SVG markup drawn inside a 32x32 viewBox with white strokes
    pub icon: Option<String>,
    pub types: Vec<String>,
}

impl Category {
    pub fn new(name: &str, color: Color, icon: Option<&str>, types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            color,
            icon: icon.map(str::to_string),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Image id the map layer registers this category's icon under
    pub fn icon_id(&self) -> String {
        format!("poi-icon-{}", self.name)
    }
}

/// Ordered `(key, value)` pairs plus a default, the shape a map style
/// `match` expression wants
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchTable<V> {
    pub entries: Vec<(String, V)>,
    pub default: V,
}

/// Immutable, ordered set of categories with a catch-all fallback
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    fallback: Category,
    by_type: HashMap<String, usize>,
}

impl CategoryRegistry {
    /// Build a registry, rejecting duplicate names and overlapping tags
    pub fn new(categories: Vec<Category>, fallback: Category) -> Result<Self> {
        let mut names = HashSet::new();
        for category in categories.iter().chain(std::iter::once(&fallback)) {
            if !names.insert(category.name.as_str()) {
                return Err(Error::InvalidCategories(format!(
                    "category '{}' declared twice",
                    category.name
                )));
            }
        }

        if !fallback.types.is_empty() {
            return Err(Error::InvalidCategories(format!(
                "fallback category '{}' must not claim any types",
                fallback.name
            )));
        }

        let mut by_type: HashMap<String, usize> = HashMap::new();
        for (idx, category) in categories.iter().enumerate() {
            for tag in &category.types {
                if let Some(&owner) = by_type.get(tag) {
                    return Err(Error::InvalidCategories(format!(
                        "type '{}' claimed by both '{}' and '{}'",
                        tag, categories[owner].name, category.name
                    )));
                }
                by_type.insert(tag.clone(), idx);
            }
        }

        Ok(Self {
            categories,
            fallback,
            by_type,
        })
    }

    /// The built-in business categories, built once per process
    pub fn builtin() -> Arc<CategoryRegistry> {
        static REGISTRY: OnceLock<Arc<CategoryRegistry>> = OnceLock::new();
        REGISTRY
            .get_or_init(|| Arc::new(build_builtin()))
            .clone()
    }

    /// Category for a type tag, or the fallback when nothing claims it
    pub fn category_for_type(&self, tag: &str) -> &Category {
        self.by_type
            .get(tag)
            .map(|&idx| &self.categories[idx])
            .unwrap_or(&self.fallback)
    }

    /// Same as [`category_for_type`](Self::category_for_type) but tolerates
    /// a missing tag
    pub fn category_for(&self, tag: Option<&str>) -> &Category {
        match tag {
            Some(tag) => self.category_for_type(tag),
            None => &self.fallback,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.iter().find(|c| c.name == name)
    }

    /// Declared categories followed by the fallback
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().chain(std::iter::once(&self.fallback))
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn fallback(&self) -> &Category {
        &self.fallback
    }

    /// Every claimed tag with its category color, in declaration order
    pub fn color_expression_table(&self) -> MatchTable<Color> {
        let entries = self
            .categories
            .iter()
            .flat_map(|c| c.types.iter().map(move |t| (t.clone(), c.color)))
            .collect();

        MatchTable {
            entries,
            default: UNMATCHED_TAG_COLOR,
        }
    }

    /// Category name to icon image id, in declaration order
    pub fn icon_expression_table(&self) -> MatchTable<String> {
        MatchTable {
            entries: self.iter().map(|c| (c.name.clone(), c.icon_id())).collect(),
            default: self.fallback.icon_id(),
        }
    }
}

fn build_builtin() -> CategoryRegistry {
    let generated = HuePalette::CATEGORY.colors(10);

    let categories = vec![
        Category::new(
            "Food & Dining",
            generated[0],
            Some(icons::FOOD),
            &[
                "restaurant", "cafe", "fast_food", "bar", "pub", "food_court", "bakery",
                "butcher",
            ],
        ),
        Category::new(
            "Retail",
            generated[1],
            Some(icons::RETAIL),
            &[
                "supermarket", "convenience", "clothes", "fashion", "shoes", "books", "gift",
                "jewelry", "toys", "sports", "electronics", "mobile_phone", "computer",
                "furniture", "hardware", "mall", "department_store", "marketplace",
            ],
        ),
        Category::new(
            "Healthcare",
            generated[2],
            Some(icons::HEALTHCARE),
            &[
                "pharmacy", "clinic", "doctors", "dentist", "hospital", "veterinary",
                "greengrocer", "florist", "garden_centre", "chemist", "optician",
            ],
        ),
        Category::new(
            "Services",
            generated[3],
            Some(icons::SERVICES),
            &["bank", "bureau_de_change", "hairdresser", "beauty"],
        ),
        Category::new(
            "Government",
            generated[4],
            Some(icons::GOVERNMENT),
            &[
                "townhall", "courthouse", "police", "fire_station", "post_office",
                "community_centre", "social_facility", "public_building", "government",
                "parliament", "legislative", "legislature", "ministry", "public_service",
                "administrative", "regional", "local", "national", "embassy", "prison",
                "ranger_station", "public_bath", "library", "archive", "tax",
                "social_security", "register_office", "customs", "bailiff", "prosecutor",
                "presidency",
            ],
        ),
        Category::new(
            "Offices",
            generated[5],
            Some(icons::OFFICES),
            &["office", "business"],
        ),
        Category::new(
            "Transportation",
            generated[6],
            Some(icons::TRANSPORTATION),
            &["station", "bus_station", "halt", "ferry_terminal"],
        ),
        Category::new(
            "Infrastructure",
            generated[7],
            Some(icons::INFRASTRUCTURE),
            &[
                // aviation
                "aerodrome", "terminal", "heliport", "hangar",
                // telecom
                "telecommunication", "mast", "communications_tower",
                // utilities
                "energy", "water_utility", "plant", "substation", "generator", "water_tower",
                "water_works", "wastewater_plant",
                // transport companies
                "transport", "railway", "airline", "logistics",
                // postal
                "post_depot", "courier", "delivery",
                "port", "industrial", "it", "company",
            ],
        ),
        Category::new(
            "Automotive",
            generated[8],
            Some(icons::AUTOMOTIVE),
            &["fuel", "car_rental", "car_wash"],
        ),
        Category::new(
            "Historic & Tourism",
            generated[9],
            Some(icons::HISTORIC),
            &[
                "castle", "castle:palace", "palace", "fort", "monument", "memorial", "manor",
                "citywalls", "attraction", "museum", "school", "university", "college",
                "kindergarten",
            ],
        ),
        // Semantic colors, deliberately outside the generated palette
        Category::new("Hazard", HAZARD_COLOR, Some(icons::HAZARD), &["hazard"]),
        Category::new("Note", NOTE_COLOR, Some(icons::NOTE), &["note"]),
    ];

    let fallback = Category::new(OTHER, OTHER_COLOR, Some(icons::OTHER), &[]);

    CategoryRegistry {
        by_type: index_types(&categories),
        categories,
        fallback,
    }
}

/// Tag to category index. A tag claimed twice stays with its earliest owner.
fn index_types(categories: &[Category]) -> HashMap<String, usize> {
    let mut by_type = HashMap::new();
    for (idx, category) in categories.iter().enumerate() {
        for tag in &category.types {
            by_type.entry(tag.clone()).or_insert(idx);
        }
    }
    by_type
}

mod icons {
    pub const FOOD: &str = r#"<path d="M10 7v8M8 7v5a2 2 0 004 0V7M20 7v18M22 7v5c0 1.1-.9 2-2 2" stroke="white" stroke-width="2" fill="none" stroke-linecap="round"/>"#;
    pub const RETAIL: &str = r#"<path d="M8 12h16l-1.5 11H9.5L8 12zM11 12V9.5a5 5 0 0110 0V12" stroke="white" stroke-width="2" fill="none" stroke-linecap="round" stroke-linejoin="round"/>"#;
    pub const HEALTHCARE: &str = r#"<path d="M16 8v16M8 16h16" stroke="white" stroke-width="3.5" stroke-linecap="round"/>"#;
    pub const SERVICES: &str = r#"<circle cx="12" cy="12" r="3.5" stroke="white" stroke-width="2" fill="none"/><circle cx="20" cy="12" r="3.5" stroke="white" stroke-width="2" fill="none"/><line x1="14" y1="14" x2="22" y2="24" stroke="white" stroke-width="2" stroke-linecap="round"/><line x1="18" y1="14" x2="10" y2="24" stroke="white" stroke-width="2" stroke-linecap="round"/>"#;
    pub const GOVERNMENT: &str = r#"<path d="M5 25h22M7 25V16M14 25V16M25 25V16M16 6l10 10H6z" stroke="white" stroke-width="2" fill="none" stroke-linecap="round" stroke-linejoin="round"/>"#;
    pub const OFFICES: &str = r#"<rect x="6" y="13" width="20" height="14" rx="2" stroke="white" stroke-width="2" fill="none"/><path d="M12 13V10a4 4 0 018 0v3" stroke="white" stroke-width="2" fill="none" stroke-linecap="round"/><line x1="6" y1="20" x2="26" y2="20" stroke="white" stroke-width="1.5"/>"#;
    pub const TRANSPORTATION: &str = r#"<rect x="4" y="10" width="24" height="14" rx="3" stroke="white" stroke-width="2" fill="none"/><line x1="4" y1="16" x2="28" y2="16" stroke="white" stroke-width="1.5"/><rect x="7" y="12" width="6" height="3" rx="1" stroke="white" stroke-width="1.5" fill="none"/><rect x="19" y="12" width="6" height="3" rx="1" stroke="white" stroke-width="1.5" fill="none"/>"#;
    pub const INFRASTRUCTURE: &str = r#"<line x1="16" y1="6" x2="16" y2="26" stroke="white" stroke-width="2.5" stroke-linecap="round"/><line x1="9" y1="11" x2="23" y2="11" stroke="white" stroke-width="2" stroke-linecap="round"/><line x1="11" y1="16" x2="21" y2="16" stroke="white" stroke-width="2" stroke-linecap="round"/><line x1="7" y1="26" x2="25" y2="26" stroke="white" stroke-width="2" stroke-linecap="round"/>"#;
    pub const AUTOMOTIVE: &str = r#"<rect x="4" y="14" width="24" height="9" rx="2" stroke="white" stroke-width="2" fill="none"/><path d="M7 14l3-6h12l3 6" stroke="white" stroke-width="2" fill="none" stroke-linecap="round" stroke-linejoin="round"/><circle cx="10" cy="24" r="2.5" stroke="white" stroke-width="2" fill="none"/><circle cx="22" cy="24" r="2.5" stroke="white" stroke-width="2" fill="none"/>"#;
    pub const HISTORIC: &str = r#"<path d="M16 7l-9 18h18L16 7z" stroke="white" stroke-width="2" fill="none" stroke-linecap="round" stroke-linejoin="round"/><line x1="8" y1="19" x2="24" y2="19" stroke="white" stroke-width="1.5"/>"#;
    pub const HAZARD: &str = r#"<path d="M16 7l-9 18h18L16 7z" stroke="white" stroke-width="2.5" fill="none" stroke-linecap="round" stroke-linejoin="round"/><line x1="16" y1="13" x2="16" y2="19" stroke="white" stroke-width="2.5" stroke-linecap="round"/><circle cx="16" cy="22.5" r="1.5" fill="white"/>"#;
    pub const NOTE: &str = r#"<path d="M9 7h14v14l-4 4H9a2 2 0 01-2-2V9a2 2 0 012-2z" stroke="white" stroke-width="2" fill="none" stroke-linecap="round" stroke-linejoin="round"/><path d="M19 21v-4h4" stroke="white" stroke-width="1.5" fill="none" stroke-linecap="round"/><line x1="12" y1="12" x2="20" y2="12" stroke="white" stroke-width="1.5" stroke-linecap="round"/><line x1="12" y1="16" x2="17" y2="16" stroke="white" stroke-width="1.5" stroke-linecap="round"/>"#;
    pub const OTHER: &str = r#"<path d="M12 12a4 4 0 118 0c0 3-4 4-4 7" stroke="white" stroke-width="2.5" fill="none" stroke-linecap="round"/><circle cx="16" cy="24" r="2" fill="white"/>"#;
}
