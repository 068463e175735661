//! Resource ledger.
//!
//! Five real-valued stockpiles with an additive `credit` and an
//! all-or-nothing `debit`. Values are never rounded internally; flooring
//! only happens in [`ResourceView`] for display.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five tracked resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Currency.
    Credits,
    /// Raw materials.
    Minerals,
    /// Power.
    Energy,
    /// Food stock.
    Food,
    /// Colonists available for new colonies.
    Population,
}

impl ResourceKind {
    /// All kinds in ledger order.
    pub const ALL: [Self; 5] = [
        Self::Credits,
        Self::Minerals,
        Self::Energy,
        Self::Food,
        Self::Population,
    ];

    /// Lowercase name used in logs and the wire protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credits => "credits",
            Self::Minerals => "minerals",
            Self::Energy => "energy",
            Self::Food => "food",
            Self::Population => "population",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial resource map used for costs, production and event effects.
///
/// Absent fields count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDelta {
    /// Credits change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    /// Minerals change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minerals: Option<f64>,
    /// Energy change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    /// Food change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food: Option<f64>,
    /// Population change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
}

impl ResourceDelta {
    /// A delta with no fields present.
    pub const EMPTY: Self = Self {
        credits: None,
        minerals: None,
        energy: None,
        food: None,
        population: None,
    };

    /// Create an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Builder: set one field.
    #[must_use]
    pub fn with(mut self, kind: ResourceKind, amount: f64) -> Self {
        *self.slot_mut(kind) = Some(amount);
        self
    }

    /// Value of one field, if present.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Option<f64> {
        match kind {
            ResourceKind::Credits => self.credits,
            ResourceKind::Minerals => self.minerals,
            ResourceKind::Energy => self.energy,
            ResourceKind::Food => self.food,
            ResourceKind::Population => self.population,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut Option<f64> {
        match kind {
            ResourceKind::Credits => &mut self.credits,
            ResourceKind::Minerals => &mut self.minerals,
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Food => &mut self.food,
            ResourceKind::Population => &mut self.population,
        }
    }

    /// Iterate the fields that are present, in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        ResourceKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|amount| (kind, amount)))
    }

    /// True when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Stockpile of the five resources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Currency.
    pub credits: f64,
    /// Raw materials.
    pub minerals: f64,
    /// Power.
    pub energy: f64,
    /// Food stock.
    pub food: f64,
    /// Colonists available for new colonies.
    pub population: f64,
}

impl Resources {
    /// All stockpiles empty.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0);

    /// Balance a new game starts with.
    pub const STARTING: Self = Self::new(1000.0, 500.0, 100.0, 200.0, 100.0);

    /// Create a stockpile from explicit values.
    #[must_use]
    pub const fn new(credits: f64, minerals: f64, energy: f64, food: f64, population: f64) -> Self {
        Self {
            credits,
            minerals,
            energy,
            food,
            population,
        }
    }

    /// Current balance of one resource.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Credits => self.credits,
            ResourceKind::Minerals => self.minerals,
            ResourceKind::Energy => self.energy,
            ResourceKind::Food => self.food,
            ResourceKind::Population => self.population,
        }
    }

    fn get_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Credits => &mut self.credits,
            ResourceKind::Minerals => &mut self.minerals,
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Food => &mut self.food,
            ResourceKind::Population => &mut self.population,
        }
    }

    /// Add every present field of `delta`. Always succeeds.
    ///
    /// Negative fields are applied as-is, so a credit can take a balance
    /// below zero. Use [`Resources::debit`] for checked spending.
    pub fn credit(&mut self, delta: &ResourceDelta) {
        for (kind, amount) in delta.iter() {
            *self.get_mut(kind) += amount;
        }
    }

    /// First resource that cannot cover `cost`, as `(kind, required, available)`.
    #[must_use]
    pub fn shortfall(&self, cost: &ResourceDelta) -> Option<(ResourceKind, f64, f64)> {
        cost.iter().find_map(|(kind, required)| {
            let available = self.get(kind);
            (available < required).then_some((kind, required, available))
        })
    }

    /// Check if every field of `cost` is covered.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceDelta) -> bool {
        self.shortfall(cost).is_none()
    }

    /// Spend `cost` if it is fully covered.
    ///
    /// Returns true if the transaction succeeded. On failure no field changes.
    pub fn debit(&mut self, cost: &ResourceDelta) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (kind, amount) in cost.iter() {
            *self.get_mut(kind) -= amount;
        }
        true
    }

    /// Floored copy for presentation.
    #[must_use]
    pub fn view(&self) -> ResourceView {
        ResourceView::from(self)
    }
}

/// Integer-floored resources, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceView {
    /// Floored credits.
    pub credits: i64,
    /// Floored minerals.
    pub minerals: i64,
    /// Floored energy.
    pub energy: i64,
    /// Floored food.
    pub food: i64,
    /// Floored population.
    pub population: i64,
}

impl From<&Resources> for ResourceView {
    #[allow(clippy::cast_possible_truncation)]
    fn from(r: &Resources) -> Self {
        Self {
            credits: r.credits.floor() as i64,
            minerals: r.minerals.floor() as i64,
            energy: r.energy.floor() as i64,
            food: r.food.floor() as i64,
            population: r.population.floor() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_adds_present_fields_only() {
        let mut r = Resources::STARTING;
        r.credit(&ResourceDelta::new().with(ResourceKind::Credits, 25.5));
        assert_eq!(r.credits, 1025.5);
        assert_eq!(r.minerals, 500.0);
        assert_eq!(r.population, 100.0);
    }

    #[test]
    fn test_credit_can_go_negative() {
        let mut r = Resources::ZERO;
        r.credit(&ResourceDelta::new().with(ResourceKind::Food, -10.0));
        assert_eq!(r.food, -10.0);
    }

    #[test]
    fn test_debit_exact_balance_succeeds() {
        let mut r = Resources::new(200.0, 0.0, 50.0, 0.0, 0.0);
        let cost = ResourceDelta::new()
            .with(ResourceKind::Credits, 200.0)
            .with(ResourceKind::Energy, 50.0);
        assert!(r.debit(&cost));
        assert_eq!(r, Resources::ZERO);
    }

    #[test]
    fn test_debit_is_all_or_nothing() {
        let mut r = Resources::new(499.0, 1000.0, 0.0, 0.0, 100.0);
        let before = r;
        let cost = ResourceDelta::new()
            .with(ResourceKind::Credits, 500.0)
            .with(ResourceKind::Minerals, 300.0)
            .with(ResourceKind::Population, 50.0);
        assert!(!r.debit(&cost));
        assert_eq!(r, before);
    }

    #[test]
    fn test_shortfall_reports_first_missing_resource() {
        let r = Resources::new(10.0, 0.0, 0.0, 0.0, 0.0);
        let cost = ResourceDelta::new()
            .with(ResourceKind::Credits, 5.0)
            .with(ResourceKind::Minerals, 3.0);
        assert_eq!(
            r.shortfall(&cost),
            Some((ResourceKind::Minerals, 3.0, 0.0))
        );
    }

    #[test]
    fn test_empty_cost_is_always_affordable() {
        let mut r = Resources::new(-5.0, 0.0, 0.0, 0.0, 0.0);
        assert!(r.debit(&ResourceDelta::EMPTY));
        assert_eq!(r.credits, -5.0);
    }

    #[test]
    fn test_view_floors_values() {
        let r = Resources::new(10.9, 0.2, -0.5, 99.999, 100.0);
        let v = r.view();
        assert_eq!(v.credits, 10);
        assert_eq!(v.minerals, 0);
        assert_eq!(v.energy, -1);
        assert_eq!(v.food, 99);
        assert_eq!(v.population, 100);
    }

    #[test]
    fn test_delta_serializes_only_present_fields() {
        let delta = ResourceDelta::new().with(ResourceKind::Energy, 50.0);
        let json = serde_json::to_string(&delta).unwrap();
        assert_eq!(json, r#"{"energy":50.0}"#);
        let back: ResourceDelta = serde_json::from_str(r#"{"credits":1}"#).unwrap();
        assert_eq!(back.credits, Some(1.0));
        assert!(back.minerals.is_none());
    }
}
