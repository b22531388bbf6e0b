use serde::{Deserialize, Serialize};

/// Which listing a spreadsheet belongs to. Expenses and incomes share the same import format and
/// differ only in the endpoints they are sent to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    Expenses,
    Incomes,
}

serde_plain::derive_display_from_serialize!(Domain);
serde_plain::derive_fromstr_from_deserialize!(Domain);

impl Domain {
    /// The path of the listing endpoint, e.g. `/api/expenses`.
    pub fn listing_path(&self) -> &'static str {
        match self {
            Domain::Expenses => "/api/expenses",
            Domain::Incomes => "/api/incomes",
        }
    }

    /// The path of the bulk-create endpoint, e.g. `/api/expenses/bulk`.
    pub fn bulk_path(&self) -> &'static str {
        match self {
            Domain::Expenses => "/api/expenses/bulk",
            Domain::Incomes => "/api/incomes/bulk",
        }
    }

    /// The path of the delete endpoint, which takes a single id.
    pub fn delete_path(&self) -> &'static str {
        match self {
            Domain::Expenses => "/api/expenses/delete",
            Domain::Incomes => "/api/incomes/delete",
        }
    }

    pub fn bulk_delete_path(&self) -> &'static str {
        match self {
            Domain::Expenses => "/api/expenses/bulk-delete",
            Domain::Incomes => "/api/incomes/bulk-delete",
        }
    }

    /// `expense` or `income`.
    pub fn singular(&self) -> &'static str {
        match self {
            Domain::Expenses => "expense",
            Domain::Incomes => "income",
        }
    }

    /// The key under which the bulk-create response lists the created records.
    pub(crate) fn response_key(&self) -> &'static str {
        match self {
            Domain::Expenses => "expenses",
            Domain::Incomes => "incomes",
        }
    }

    pub fn template_file_name(&self) -> &'static str {
        match self {
            Domain::Expenses => "expense_template.xlsx",
            Domain::Incomes => "income_template.xlsx",
        }
    }

    /// The message shown when an upload fails and the server did not say why.
    pub fn upload_fallback_message(&self) -> String {
        format!("Failed to upload {}", self.response_key())
    }

    pub fn add_fallback_message(&self) -> String {
        format!("Failed to add {}", self.singular())
    }

    pub fn delete_fallback_message(&self) -> String {
        format!("Failed to delete {}", self.singular())
    }

    pub fn bulk_delete_fallback_message(&self) -> String {
        format!("Failed to delete {}", self.response_key())
    }

    /// The warning shown when a bulk delete is asked for with nothing selected.
    pub fn none_selected_message(&self) -> String {
        format!("No {} selected", self.response_key())
    }

    /// The message shown when the listing cannot be fetched and the server did not say why.
    pub fn load_fallback_message(&self) -> String {
        format!("Failed to load {}", self.response_key())
    }
}
