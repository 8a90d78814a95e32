use std::collections::BTreeMap;

use serde::Serialize;

const KNOWN_TYPES: [&str; 8] = [
    "Ride",
    "VirtualRide",
    "Run",
    "Hike",
    "Walk",
    "Swim",
    "NordicSki",
    "Ski",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub color: &'static str,
    pub icon: &'static str,
    pub process: bool,
    pub subcategories: Vec<(&'static str, u32)>,
}

impl Category {
    pub fn get(activity_type: &str) -> Option<Self> {
        match activity_type {
            "Ride" => Some(Self::new(
                "red",
                "bicycle",
                vec![("Ride", 0), ("GravelRide", 10), ("MountainBikeRide", 20)],
            )),
            "VirtualRide" => Some(Self::new("red", "bicycle", vec![("VirtualRide", 0)])),
            "Run" => Some(Self::new("green", "person", vec![("Run", 0)])),
            "Hike" => Some(Self::new("purple", "person", vec![("Hike", 0)])),
            "Walk" => Some(Self::new("purple", "person", vec![("Walk", 0)])),
            "Swim" => Some(Self::new("blue", "water", vec![("Swim", 0)])),
            "NordicSki" => Some(Self::new("lightblue", "ski", vec![("NordicSki", 0)])),
            "Ski" => Some(Self::new("orange", "person-skiing", vec![("Ski", 0)])),
            _ => None,
        }
    }

    fn new(color: &'static str, icon: &'static str, subcategories: Vec<(&'static str, u32)>) -> Self {
        Self {
            color,
            icon,
            process: true,
            subcategories,
        }
    }

    /// Dash pattern for the route line; subtypes outside the table draw solid.
    pub fn dash_for(&self, subtype: &str) -> u32 {
        self.subcategories
            .iter()
            .find(|(name, _)| *name == subtype)
            .map(|(_, dash)| *dash)
            .unwrap_or(0)
    }

    pub fn style_for(&self, subtype: &str) -> CategoryStyle {
        CategoryStyle {
            color: self.color,
            icon: self.icon,
            dash: self.dash_for(subtype),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    pub color: &'static str,
    pub icon: &'static str,
    pub dash: u32,
}

#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: BTreeMap<String, Category>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let entries = KNOWN_TYPES
            .iter()
            .filter_map(|name| Category::get(name).map(|category| (name.to_string(), category)))
            .collect();
        Self { entries }
    }
}

impl CategoryTable {
    pub fn with_processing_disabled<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for activity_type in types {
            if let Some(category) = self.entries.get_mut(activity_type.as_ref()) {
                category.process = false;
            } else {
                tracing::warn!(
                    "Cannot disable unknown activity type {}",
                    activity_type.as_ref()
                );
            }
        }
        self
    }

    pub fn get(&self, activity_type: &str) -> Option<&Category> {
        self.entries.get(activity_type)
    }

    /// Every subtype named in the table, in table order.
    pub fn subtypes(&self) -> Vec<&'static str> {
        self.entries
            .values()
            .flat_map(|category| category.subcategories.iter().map(|(name, _)| *name))
            .collect()
    }
}
