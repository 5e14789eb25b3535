use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The closed set of content categories an entry can belong to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum Category {
    Blog,
    Docs,
    #[serde(rename = "FAQs")]
    Faqs,
    Pricing,
    Legal,
    Company,
    Product,
    Support,
    Features,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Blog,
        Category::Docs,
        Category::Faqs,
        Category::Pricing,
        Category::Legal,
        Category::Company,
        Category::Product,
        Category::Support,
        Category::Features,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Blog => "Blog",
            Category::Docs => "Docs",
            Category::Faqs => "FAQs",
            Category::Pricing => "Pricing",
            Category::Legal => "Legal",
            Category::Company => "Company",
            Category::Product => "Product",
            Category::Support => "Support",
            Category::Features => "Features",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the exact, case-sensitive category name.
impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// A searchable piece of site content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: Category,
    pub url: String,
    pub page: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Static importance from 1 to 10; 5 is neutral.
    pub priority: u8,
}
