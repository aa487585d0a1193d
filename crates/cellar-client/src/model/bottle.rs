// Bottle model types

use serde::{Deserialize, Serialize};

/// Wine color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BottleColor {
    Red,
    White,
    Rose,
    Yellow,
    Sparkling,
}

/// Body of the bottle create and update actions.
///
/// Every field is optional; the server owns validation (length, range and
/// enum constraints), the client sends what it is given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BottlePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<BottleColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    /// 1 (dry) to 5 (sweet)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweetness: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub varietal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vineyard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vintage: Option<i32>,
}

/// Body of the bottle rate action
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePayload {
    /// Rating of bottle between 1 and 5
    pub rating: i32,
}

impl RatePayload {
    pub fn new(rating: i32) -> Self {
        Self { rating }
    }
}
