use serde::{Deserialize, Serialize};

/// The fixed set of categories that the tally server accepts for both expenses and incomes.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Category {
    #[value(name = "Food")]
    Food,
    #[value(name = "Entertainment")]
    Entertainment,
    #[value(name = "Shopping")]
    Shopping,
    #[value(name = "Bills")]
    Bills,
    #[value(name = "Other")]
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Every allowed category, in the order they are presented to the user.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Entertainment,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }

    /// Exact, case-sensitive lookup. `"food"` and `" Food"` are not categories.
    pub fn from_exact(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// The allowed categories joined with `", "`.
    pub fn allowed_list() -> String {
        Category::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
