//! Core agent types shared by population, network, and adoption code.

/// Dense agent index, unique within one population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub usize);

/// The two agent kinds in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Household,
    Firm,
}

/// Position in the abstract settlement plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One household or firm: immutable attributes plus sticky adoption state.
///
/// Adoption is an absorbing state. The only way to change it is
/// [`Agent::mark_adopted`], which ignores every call after the first, so an
/// adopter can never revert and its adoption year never moves.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    /// Liquid wealth, on the scale of the annual energy costs.
    pub wealth: f64,
    /// Environmental awareness in [0, 1].
    pub awareness: f64,
    pub location: Point,
    adopted: bool,
    adoption_year: Option<u16>,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, wealth: f64, awareness: f64, location: Point) -> Self {
        Self {
            id,
            kind,
            wealth,
            awareness,
            location,
            adopted: false,
            adoption_year: None,
        }
    }

    /// Whether the agent has adopted the technology.
    pub fn adopted(&self) -> bool {
        self.adopted
    }

    /// Year of adoption, if any.
    pub fn adoption_year(&self) -> Option<u16> {
        self.adoption_year
    }

    /// Marks the agent adopted in `year`. Later calls keep the first year.
    pub(crate) fn mark_adopted(&mut self, year: u16) {
        if !self.adopted {
            self.adopted = true;
            self.adoption_year = Some(year);
        }
    }
}
