//! Product domain entity

use crate::shared::Money;

pub const MAX_NAME_LENGTH: usize = 30;
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
/// Highest unit price a seller may list, 1,000,000.00
pub const MAX_PRICE: Money = Money::from_cents(100_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    Food,
    Drinks,
    Alcohol,
    Cigarettes,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Drinks => "Drinks",
            Self::Alcohol => "Alcohol",
            Self::Cigarettes => "Cigarettes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Food" => Some(Self::Food),
            "Drinks" => Some(Self::Drinks),
            "Alcohol" => Some(Self::Alcohol),
            "Cigarettes" => Some(Self::Cigarettes),
            _ => None,
        }
    }

    /// Categories that only adult buyers may order
    pub fn is_age_restricted(&self) -> bool {
        matches!(self, Self::Alcohol | Self::Cigarettes)
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Money,
    /// Units in stock
    pub amount: i32,
    pub description: Option<String>,
    pub image: Option<Vec<u8>>,
    pub category: ProductCategory,
    pub seller_id: i32,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.amount > 0
    }

    pub fn is_owned_by(&self, seller_id: i32) -> bool {
        self.seller_id == seller_id
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub amount: i32,
    pub description: Option<String>,
    pub image: Option<Vec<u8>>,
    pub category: ProductCategory,
    pub seller_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_categories() {
        assert!(ProductCategory::Alcohol.is_age_restricted());
        assert!(ProductCategory::Cigarettes.is_age_restricted());
        assert!(!ProductCategory::Food.is_age_restricted());
        assert!(!ProductCategory::Drinks.is_age_restricted());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(ProductCategory::from_str("Drinks"), Some(ProductCategory::Drinks));
        assert_eq!(ProductCategory::from_str("Weapons"), None);
    }
}
