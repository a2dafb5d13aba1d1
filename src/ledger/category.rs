use serde::{Deserialize, Serialize};

/// Category carried by income rows; excluded from budgets.
pub const INCOME_CATEGORY: &str = "Pemasukan";
/// Catch-all category for rows nobody tagged.
pub const DEFAULT_CATEGORY: &str = "Lainnya";
/// Installment and debt repayments.
pub const DEBT_CATEGORY: &str = "Cicilan";
/// Leisure spending.
pub const ENTERTAINMENT_CATEGORY: &str = "Hiburan";

/// A tag rows can be filed under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

const BUILT_IN: [(&str, &str); 7] = [
    (INCOME_CATEGORY, "#d1fae5"),
    ("Kebutuhan Pokok", "#dbeafe"),
    ("Tagihan", "#ffedd5"),
    (ENTERTAINMENT_CATEGORY, "#f3e8ff"),
    ("Tabungan", "#ccfbf1"),
    (DEBT_CATEGORY, "#fee2e2"),
    (DEFAULT_CATEGORY, "#f4f4f5"),
];

/// Named swatch offered when creating a custom category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPreset {
    pub label: &'static str,
    pub hex: &'static str,
}

pub const COLOR_PRESETS: [ColorPreset; 10] = [
    ColorPreset { label: "Hijau", hex: "#d1fae5" },
    ColorPreset { label: "Biru", hex: "#dbeafe" },
    ColorPreset { label: "Oranye", hex: "#ffedd5" },
    ColorPreset { label: "Merah", hex: "#fee2e2" },
    ColorPreset { label: "Ungu", hex: "#f3e8ff" },
    ColorPreset { label: "Teal", hex: "#ccfbf1" },
    ColorPreset { label: "Abu-Abu", hex: "#f4f4f5" },
    ColorPreset { label: "Kuning", hex: "#fef9c3" },
    ColorPreset { label: "Pink", hex: "#fce7f3" },
    ColorPreset { label: "Indigo", hex: "#e0e7ff" },
];

/// The built-in categories in display order.
pub fn built_in_categories() -> Vec<Category> {
    BUILT_IN
        .iter()
        .map(|(name, color)| Category::new(*name, *color))
        .collect()
}

pub fn is_built_in(name: &str) -> bool {
    BUILT_IN.iter().any(|(built_in, _)| *built_in == name)
}

/// Built-in tags merged with the user's own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    custom: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(custom: Vec<Category>) -> Self {
        Self { custom }
    }

    pub fn custom(&self) -> &[Category] {
        &self.custom
    }

    /// Built-ins first, then custom categories that do not shadow a built-in name.
    pub fn all(&self) -> Vec<Category> {
        let mut merged = built_in_categories();
        let shadowed = |name: &str| {
            BUILT_IN
                .iter()
                .any(|(built_in, _)| built_in.eq_ignore_ascii_case(name))
        };
        merged.extend(
            self.custom
                .iter()
                .filter(|category| !shadowed(&category.name))
                .cloned(),
        );
        merged
    }

    /// Category names in catalog order.
    pub fn names(&self) -> Vec<String> {
        self.all().into_iter().map(|category| category.name).collect()
    }

    /// Adds a custom category; returns `false` for blank or duplicate names.
    pub fn add_custom(&mut self, name: &str, color: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return false;
        }
        let duplicate = self
            .all()
            .iter()
            .any(|category| category.name.eq_ignore_ascii_case(trimmed));
        if duplicate {
            return false;
        }
        self.custom.push(Category::new(trimmed, color));
        true
    }

    /// Removes a custom category; built-ins cannot be removed.
    pub fn remove_custom(&mut self, name: &str) -> bool {
        if is_built_in(name) {
            return false;
        }
        let before = self.custom.len();
        self.custom.retain(|category| category.name != name);
        self.custom.len() != before
    }

    pub fn color_of(&self, name: &str) -> Option<String> {
        self.all()
            .into_iter()
            .find(|category| category.name == name)
            .map(|category| category.color)
    }
}
