use std::collections::BTreeMap;
use std::fmt;

use contracts::{GameState, START_LOCATION};

/// Immutable location configuration. Connections are undirected: every edge
/// must be declared from both endpoints or construction fails.
#[derive(Debug, Clone)]
pub struct LocationNode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mining_multiplier: f64,
    pub unlock_cost: f64,
    pub connections: Vec<String>,
}

impl LocationNode {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        mining_multiplier: f64,
        unlock_cost: f64,
        connections: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            mining_multiplier,
            unlock_cost,
            connections: connections.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// An asymmetric or otherwise malformed declaration is a configuration error
/// surfaced at construction, never a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphConfigError {
    DuplicateNode(String),
    MissingStart(String),
    UnknownNeighbor { node: String, neighbor: String },
    AsymmetricEdge { from: String, to: String },
    InvalidMultiplier(String),
    InvalidUnlockCost(String),
}

impl fmt::Display for GraphConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode(id) => write!(f, "duplicate location id: {id}"),
            Self::MissingStart(id) => write!(f, "start location is not in the graph: {id}"),
            Self::UnknownNeighbor { node, neighbor } => {
                write!(f, "location {node} connects to unknown location {neighbor}")
            }
            Self::AsymmetricEdge { from, to } => {
                write!(f, "edge {from} -> {to} is not declared in both directions")
            }
            Self::InvalidMultiplier(id) => {
                write!(f, "location {id} must have a finite mining multiplier > 0")
            }
            Self::InvalidUnlockCost(id) => {
                write!(f, "location {id} must have a finite unlock cost >= 0")
            }
        }
    }
}

impl std::error::Error for GraphConfigError {}

/// Static node set with per-node accrual multiplier, unlock cost, and a
/// symmetric adjacency relation restricting travel. Pure lookup surface; all
/// graph-related mutation goes through `Economy::travel`.
#[derive(Debug, Clone)]
pub struct LocationGraph {
    nodes: BTreeMap<String, LocationNode>,
    start: String,
}

impl LocationGraph {
    pub fn new(
        start: impl Into<String>,
        nodes: Vec<LocationNode>,
    ) -> Result<Self, GraphConfigError> {
        let start = start.into();
        let mut by_id = BTreeMap::new();

        for node in nodes {
            if !node.mining_multiplier.is_finite() || node.mining_multiplier <= 0.0 {
                return Err(GraphConfigError::InvalidMultiplier(node.id));
            }
            if !node.unlock_cost.is_finite() || node.unlock_cost < 0.0 {
                return Err(GraphConfigError::InvalidUnlockCost(node.id));
            }
            let id = node.id.clone();
            if by_id.insert(id.clone(), node).is_some() {
                return Err(GraphConfigError::DuplicateNode(id));
            }
        }

        if !by_id.contains_key(&start) {
            return Err(GraphConfigError::MissingStart(start));
        }

        for (id, node) in &by_id {
            for neighbor in &node.connections {
                let Some(other) = by_id.get(neighbor) else {
                    return Err(GraphConfigError::UnknownNeighbor {
                        node: id.clone(),
                        neighbor: neighbor.clone(),
                    });
                };
                if !other.connections.iter().any(|back| back == id) {
                    return Err(GraphConfigError::AsymmetricEdge {
                        from: id.clone(),
                        to: neighbor.clone(),
                    });
                }
            }
        }

        Ok(Self { nodes: by_id, start })
    }

    /// The builtin solar-system catalog.
    pub fn default_catalog() -> Self {
        let nodes = vec![
            LocationNode::new(
                "earth",
                "Earth",
                "Home base. The journey begins here.",
                1.0,
                0.0,
                &["asteroid-belt", "mars", "venus"],
            ),
            LocationNode::new(
                "asteroid-belt",
                "Asteroid Belt",
                "Rich in raw materials. Mining efficiency +50%.",
                1.5,
                500.0,
                &["earth", "mars", "jupiter"],
            ),
            LocationNode::new(
                "mars",
                "Mars",
                "The Red Planet. Mining efficiency +25%.",
                1.25,
                300.0,
                &["earth", "asteroid-belt"],
            ),
            LocationNode::new(
                "jupiter",
                "Jupiter",
                "Gas giant with resource-rich moons. Mining efficiency +100%.",
                2.0,
                2000.0,
                &["asteroid-belt", "saturn"],
            ),
            LocationNode::new(
                "saturn",
                "Saturn",
                "Ringed beauty with abundant resources. Mining efficiency +150%.",
                2.5,
                5000.0,
                &["jupiter", "sun"],
            ),
            LocationNode::new(
                "sun",
                "Sol",
                "The ultimate power source. Mining efficiency +300%.",
                4.0,
                20000.0,
                &["saturn", "mercury"],
            ),
            LocationNode::new(
                "mercury",
                "Mercury",
                "Dense with metals. Mining efficiency +75%.",
                1.75,
                1000.0,
                &["venus", "sun"],
            ),
            LocationNode::new(
                "venus",
                "Venus",
                "Harsh environment, rich rewards. Mining efficiency +60%.",
                1.6,
                800.0,
                &["earth", "mercury"],
            ),
        ];

        // The builtin catalog goes through the same construction-time checks
        // as user-supplied configuration; a failure here is a programming error.
        Self::new(START_LOCATION, nodes).expect("builtin location catalog is valid")
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&LocationNode> {
        self.nodes.get(id)
    }

    pub fn multiplier_of(&self, id: &str) -> Option<f64> {
        self.nodes.get(id).map(|node| node.mining_multiplier)
    }

    pub fn unlock_cost_of(&self, id: &str) -> Option<f64> {
        self.nodes.get(id).map(|node| node.unlock_cost)
    }

    /// Empty for unknown ids.
    pub fn neighbors_of(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|node| node.connections.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_unlocked(&self, state: &GameState, id: &str) -> bool {
        self.contains(id) && state.unlocked_locations.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationNode> {
        self.nodes.values()
    }
}
