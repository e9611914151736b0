// Food catalog: static reference data for the diet model
// Bundled tables plus JSON loading with contiguity checks on food groups

use crate::domain::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::ops::Range;

/// Partition of the catalog used for minimum-variety constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodGroup {
    Fruits,
    Veggies,
    Dairy,
    Grains,
    Meat,
}

impl FoodGroup {
    pub const ALL: [FoodGroup; 5] = [
        FoodGroup::Fruits,
        FoodGroup::Veggies,
        FoodGroup::Dairy,
        FoodGroup::Grains,
        FoodGroup::Meat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FoodGroup::Fruits => "fruits",
            FoodGroup::Veggies => "veggies",
            FoodGroup::Dairy => "dairy",
            FoodGroup::Grains => "grains",
            FoodGroup::Meat => "meat",
        }
    }
}

impl fmt::Display for FoodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Macronutrients tracked per serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Protein,
    Carbohydrate,
    Fat,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Protein, Nutrient::Carbohydrate, Nutrient::Fat];

    pub fn name(&self) -> &'static str {
        match self {
            Nutrient::Protein => "protein",
            Nutrient::Carbohydrate => "carbohydrate",
            Nutrient::Fat => "fat",
        }
    }
}

/// One food item, all amounts per standard serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    /// Greenhouse-gas impact (kg CO2-eq)
    pub ghg_impact: f64,
    pub cost: f64,
    /// Grams of protein
    pub protein: f64,
    /// Grams of carbohydrate
    pub carbohydrate: f64,
    /// Grams of fat
    pub fat: f64,
    pub group: FoodGroup,
}

impl FoodItem {
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrate => self.carbohydrate,
            Nutrient::Fat => self.fat,
        }
    }
}

type Row = (&'static str, f64, f64, f64, f64, f64, FoodGroup);

// name, ghg, cost, protein, carbohydrate, fat, group
const SAMPLE_ROWS: [Row; 11] = [
    ("Banana", 0.0826, 0.205, 1.0, 27.0, 0.0, FoodGroup::Fruits),
    ("Apples", 0.0522, 0.574, 0.0, 19.0, 0.0, FoodGroup::Fruits),
    ("Potato", 0.0624, 0.452, 3.0, 34.0, 0.0, FoodGroup::Veggies),
    ("Milk", 0.774, 0.648, 9.0, 12.0, 5.0, FoodGroup::Dairy),
    ("Cheese", 1.05, 0.634, 12.0, 1.0, 17.0, FoodGroup::Dairy),
    ("Soymilk", 0.139, 0.540, 7.0, 4.0, 4.0, FoodGroup::Dairy),
    ("Bread", 0.049, 0.2023, 3.0, 18.0, 0.0, FoodGroup::Grains),
    ("White Rice", 0.332, 0.345, 2.0, 24.0, 0.0, FoodGroup::Grains),
    ("Chicken", 0.45, 0.996, 19.0, 0.0, 7.0, FoodGroup::Meat),
    ("Beef", 4.5, 1.135, 26.0, 0.0, 10.0, FoodGroup::Meat),
    ("Eggs", 0.225, 0.288, 6.0, 1.0, 5.0, FoodGroup::Meat),
];

const EXTENDED_ROWS: [Row; 18] = [
    ("Banana", 0.0826, 0.205, 1.0, 27.0, 0.0, FoodGroup::Fruits),
    ("Apples", 0.0522, 0.574, 0.0, 19.0, 0.0, FoodGroup::Fruits),
    ("Potato", 0.0624, 0.452, 3.0, 34.0, 0.0, FoodGroup::Veggies),
    ("Peas", 0.081, 0.20, 4.0, 11.0, 0.0, FoodGroup::Veggies),
    ("Avocado", 0.02121, 0.75, 2.0, 9.0, 15.0, FoodGroup::Veggies),
    ("Spinach", 0.0736, 0.352, 1.0, 1.0, 0.0, FoodGroup::Veggies),
    ("Tomatoes", 0.1722, 0.246, 1.0, 5.0, 0.0, FoodGroup::Veggies),
    ("Milk", 0.774, 0.648, 9.0, 12.0, 5.0, FoodGroup::Dairy),
    ("Margarine", 0.0165, 0.0315, 0.0, 0.0, 4.0, FoodGroup::Dairy),
    ("Butter", 0.0605, 0.0547, 0.0, 0.0, 4.0, FoodGroup::Dairy),
    ("Cheese", 1.05, 0.634, 12.0, 1.0, 17.0, FoodGroup::Dairy),
    ("Soymilk", 0.139, 0.540, 7.0, 4.0, 4.0, FoodGroup::Dairy),
    ("Bread", 0.049, 0.2023, 3.0, 18.0, 0.0, FoodGroup::Grains),
    ("White Rice", 0.332, 0.345, 2.0, 24.0, 0.0, FoodGroup::Grains),
    ("Chicken", 0.45, 0.996, 19.0, 0.0, 7.0, FoodGroup::Meat),
    ("Beef", 4.5, 1.135, 26.0, 0.0, 10.0, FoodGroup::Meat),
    ("Eggs", 0.225, 0.288, 6.0, 1.0, 5.0, FoodGroup::Meat),
    ("Tofu", 0.474, 1.06, 21.0, 3.0, 11.0, FoodGroup::Meat),
];

/// Read-only table of food items, indexed 0..N-1
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FoodCatalog {
    items: Vec<FoodItem>,
}

impl FoodCatalog {
    pub fn new(items: Vec<FoodItem>) -> Result<Self, ConfigurationError> {
        let catalog = Self { items };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The 11-item daily reference catalog
    pub fn sample() -> Self {
        Self::from_rows(&SAMPLE_ROWS)
    }

    /// The 18-item catalog with additional vegetables, fats and tofu
    pub fn extended() -> Self {
        Self::from_rows(&EXTENDED_ROWS)
    }

    /// Load a catalog from a JSON array of food items
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let items: Vec<FoodItem> = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::CatalogFormat(e.to_string()))?;
        Self::new(items)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigurationError> {
        let items: Vec<FoodItem> = serde_json::from_reader(reader)
            .map_err(|e| ConfigurationError::CatalogFormat(e.to_string()))?;
        Self::new(items)
    }

    fn from_rows(rows: &[Row]) -> Self {
        let items = rows
            .iter()
            .map(
                |&(name, ghg_impact, cost, protein, carbohydrate, fat, group)| FoodItem {
                    name: name.to_string(),
                    ghg_impact,
                    cost,
                    protein,
                    carbohydrate,
                    fat,
                    group,
                },
            )
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|i| i.name.clone()).collect()
    }

    pub fn ghg_impacts(&self) -> Vec<f64> {
        self.items.iter().map(|i| i.ghg_impact).collect()
    }

    pub fn costs(&self) -> Vec<f64> {
        self.items.iter().map(|i| i.cost).collect()
    }

    pub fn nutrient(&self, nutrient: Nutrient) -> Vec<f64> {
        self.items.iter().map(|i| i.nutrient(nutrient)).collect()
    }

    /// 1.0 for items in `group`, 0.0 elsewhere
    pub fn group_indicator(&self, group: FoodGroup) -> Vec<f64> {
        self.items
            .iter()
            .map(|i| if i.group == group { 1.0 } else { 0.0 })
            .collect()
    }

    /// Index range occupied by `group`, `None` when the catalog has no such item
    pub fn group_range(&self, group: FoodGroup) -> Option<Range<usize>> {
        let start = self.items.iter().position(|i| i.group == group)?;
        let len = self.items[start..]
            .iter()
            .take_while(|i| i.group == group)
            .count();
        Some(start..start + len)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.items.is_empty() {
            return Err(ConfigurationError::EmptyCatalog);
        }
        for item in &self.items {
            let attributes = [
                ("ghg_impact", item.ghg_impact),
                ("cost", item.cost),
                ("protein", item.protein),
                ("carbohydrate", item.carbohydrate),
                ("fat", item.fat),
            ];
            for (attribute, value) in attributes {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigurationError::InvalidFoodAttribute {
                        name: item.name.clone(),
                        attribute,
                        value,
                    });
                }
            }
        }
        for group in FoodGroup::ALL {
            if let Some(range) = self.group_range(group) {
                let members = self.items.iter().filter(|i| i.group == group).count();
                if members != range.len() {
                    return Err(ConfigurationError::NonContiguousGroup(group.to_string()));
                }
            }
        }
        Ok(())
    }
}
