use std::collections::BTreeMap;
use std::fmt;

use contracts::GameState;

/// Tagged description of what an upgrade does. New upgrade kinds are new
/// variants here plus an arm in `Economy::apply_effect`; nothing else in the
/// accrual path changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeEffect {
    /// Applied once at purchase: raises the base mining rate.
    AdditiveRateBonus { amount: f64 },
    /// Applied once at purchase: rescales the next replication price.
    ReplicationCostScale { factor: f64 },
    /// Passive: multiplies every accrual while the upgrade is owned.
    AccrualMultiplier { factor: f64 },
}

/// Immutable one-time purchasable modifier.
#[derive(Debug, Clone)]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub prerequisite: Option<String>,
    pub effect: UpgradeEffect,
}

impl Upgrade {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: f64,
        prerequisite: Option<&str>,
        effect: UpgradeEffect,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            prerequisite: prerequisite.map(str::to_string),
            effect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogConfigError {
    DuplicateUpgrade(String),
    UnknownPrerequisite { upgrade: String, prerequisite: String },
    InvalidCost(String),
}

impl fmt::Display for CatalogConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateUpgrade(id) => write!(f, "duplicate upgrade id: {id}"),
            Self::UnknownPrerequisite {
                upgrade,
                prerequisite,
            } => write!(f, "upgrade {upgrade} requires unknown upgrade {prerequisite}"),
            Self::InvalidCost(id) => write!(f, "upgrade {id} must have a finite cost >= 0"),
        }
    }
}

impl std::error::Error for CatalogConfigError {}

/// Static set of one-time purchasable modifiers. Pure lookup surface;
/// purchase itself goes through `Economy::purchase_upgrade`.
#[derive(Debug, Clone)]
pub struct UpgradeCatalog {
    upgrades: BTreeMap<String, Upgrade>,
}

impl UpgradeCatalog {
    pub fn new(upgrades: Vec<Upgrade>) -> Result<Self, CatalogConfigError> {
        let mut by_id = BTreeMap::new();

        for upgrade in upgrades {
            if !upgrade.cost.is_finite() || upgrade.cost < 0.0 {
                return Err(CatalogConfigError::InvalidCost(upgrade.id));
            }
            let id = upgrade.id.clone();
            if by_id.insert(id.clone(), upgrade).is_some() {
                return Err(CatalogConfigError::DuplicateUpgrade(id));
            }
        }

        for (id, upgrade) in &by_id {
            if let Some(prerequisite) = &upgrade.prerequisite {
                if !by_id.contains_key(prerequisite) {
                    return Err(CatalogConfigError::UnknownPrerequisite {
                        upgrade: id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        Ok(Self { upgrades: by_id })
    }

    /// The builtin upgrade line.
    pub fn default_catalog() -> Self {
        let upgrades = vec![
            Upgrade::new(
                "mining1",
                "Enhanced Mining",
                500.0,
                None,
                UpgradeEffect::AdditiveRateBonus { amount: 1.0 },
            ),
            Upgrade::new(
                "efficiency1",
                "Efficient Replication",
                1000.0,
                None,
                UpgradeEffect::ReplicationCostScale { factor: 0.9 },
            ),
            Upgrade::new(
                "mining2",
                "Advanced Mining",
                2500.0,
                Some("mining1"),
                UpgradeEffect::AdditiveRateBonus { amount: 2.0 },
            ),
            Upgrade::new(
                "automation1",
                "Basic Automation",
                5000.0,
                None,
                UpgradeEffect::AccrualMultiplier { factor: 2.0 },
            ),
        ];

        Self::new(upgrades).expect("builtin upgrade catalog is valid")
    }

    pub fn get(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.upgrades.contains_key(id)
    }

    /// True iff the upgrade exists, is not yet purchased, and its
    /// prerequisite (if any) is already purchased. Chains resolve one
    /// purchase at a time; there is no bulk shortcut.
    pub fn is_available(&self, state: &GameState, id: &str) -> bool {
        let Some(upgrade) = self.upgrades.get(id) else {
            return false;
        };
        if state.is_purchased(id) {
            return false;
        }
        match &upgrade.prerequisite {
            Some(prerequisite) => state.is_purchased(prerequisite),
            None => true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.values()
    }
}
