use serde::{Deserialize, Serialize};

use super::transaction::TransactionKind;

/// Colour shared by every income category.
pub const INCOME_COLOR: &str = "#0A84FF";

/// Colour for categories outside the catalogue.
pub const NEUTRAL_COLOR: &str = "#8E8E93";

/// A ledger category tag.
///
/// Serialized as its raw key (`"food"`, `"salary"`, ...). Keys outside the
/// catalogue survive a load/save round-trip as `Unknown` and are displayed
/// with their raw key and the neutral colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    // Income
    Salary,
    Bonus,
    Investment,
    // Expense
    Communication,
    Transportation,
    Savings,
    Living,
    Food,
    Medical,
    Etc,
    /// Anything read from storage or a backend that is not in the catalogue.
    Unknown(String),
}

/// Display name and colour for legend/chart rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub color: String,
}

impl Category {
    /// Every catalogue entry, income first.
    pub const ALL: [Category; 10] = [
        Category::Salary,
        Category::Bonus,
        Category::Investment,
        Category::Communication,
        Category::Transportation,
        Category::Savings,
        Category::Living,
        Category::Food,
        Category::Medical,
        Category::Etc,
    ];

    /// Look up a catalogue key. Case-insensitive; `None` for unknown keys.
    pub fn from_key(key: &str) -> Option<Category> {
        let k = key.trim().to_lowercase();
        Category::ALL.iter().find(|c| c.key() == k).cloned()
    }

    pub fn key(&self) -> &str {
        match self {
            Category::Salary => "salary",
            Category::Bonus => "bonus",
            Category::Investment => "investment",
            Category::Communication => "communication",
            Category::Transportation => "transportation",
            Category::Savings => "savings",
            Category::Living => "living",
            Category::Food => "food",
            Category::Medical => "medical",
            Category::Etc => "etc",
            Category::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Unknown(_))
    }

    /// The ledger side this category is offered on. Unknown keys have none.
    pub fn natural_kind(&self) -> Option<TransactionKind> {
        match self {
            Category::Salary | Category::Bonus | Category::Investment => {
                Some(TransactionKind::Income)
            }
            Category::Unknown(_) => None,
            _ => Some(TransactionKind::Expense),
        }
    }

    pub fn info(&self) -> CategoryInfo {
        let (name, color) = match self {
            Category::Salary => ("Salary", INCOME_COLOR),
            Category::Bonus => ("Bonus", INCOME_COLOR),
            Category::Investment => ("Investment", INCOME_COLOR),
            Category::Communication => ("Communication", "#32D74B"),
            Category::Transportation => ("Transportation", "#A964E8"),
            Category::Savings => ("Savings", "#5856D6"),
            Category::Living => ("Living", "#FF9500"),
            Category::Food => ("Food", "#FF453A"),
            Category::Medical => ("Medical", "#FF2D55"),
            Category::Etc => ("Etc", NEUTRAL_COLOR),
            Category::Unknown(raw) => (raw.as_str(), NEUTRAL_COLOR),
        };
        CategoryInfo {
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    pub fn display_name(&self) -> String {
        self.info().name
    }

    pub fn color(&self) -> String {
        self.info().color
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Category::from_key(&raw).unwrap_or(Category::Unknown(raw))
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Category::from(raw.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.key().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
