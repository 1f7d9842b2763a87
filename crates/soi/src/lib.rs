//! Sphere-of-influence hierarchy.
//!
//! The tree is built once per scenario from a flat mass list and reused for
//! per-tick lookups. Lookups always test against the bodies' *current*
//! positions, since bodies keep moving after construction.

use orrery_core::mass::find;
use orrery_core::{Mass, Vector3};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Fraction of the remaining parent headroom a clamped child may occupy.
const CONTAINMENT_MARGIN: f64 = 0.999;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SoiError {
    #[error("cannot build a sphere-of-influence tree from an empty mass list")]
    Empty,
    #[error("body '{0}' appears more than once in the mass list")]
    DuplicateBody(String),
    #[error("tree was built for scenario '{expected}' but queried for '{found}'")]
    StaleReference { expected: String, found: String },
    #[error("tree references body '{0}' which is absent from the mass list")]
    StaleBody(String),
    #[error("body '{0}' is not part of the sphere-of-influence tree")]
    UnknownBody(String),
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
}

/// One body and the bodies it dominates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoiNode {
    pub name: String,
    pub soi_radius: f64,
    /// Position at construction time.
    pub position: Vector3,
    pub m: f64,
    pub children: Vec<SoiNode>,
}

/// Result of a lookup: the dominant body with its current state.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSoi {
    pub mass: Mass,
    pub soi_radius: f64,
    /// Zero for the root.
    pub depth: usize,
}

/// Dominance hierarchy tied to the scenario it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct SoiTree {
    scenario: String,
    root: SoiNode,
}

/// Sphere-of-influence radius of `secondary` about `primary`: `a (m / M)^(2/5)`.
///
/// `a` comes from the relative orbit via vis-viva; an unbound relative orbit
/// falls back to the current separation.
pub fn radius_soi(primary: &Mass, secondary: &Mass, g: f64) -> Result<f64, SoiError> {
    if !(primary.m > 0.0) || !(g > 0.0) {
        return Err(SoiError::DegenerateGeometry(
            "primary mass and gravitational constant must be positive",
        ));
    }
    let relative = secondary.relative_to(primary);
    let separation = relative.position.norm();
    if separation == 0.0 {
        return Err(SoiError::DegenerateGeometry("bodies coincide"));
    }

    let mu = g * primary.m;
    let inverse_a = 2.0 / separation - relative.velocity.norm_squared() / mu;
    let a = if inverse_a > 0.0 { 1.0 / inverse_a } else { separation };

    Ok(a * (secondary.m / primary.m).powf(0.4))
}

/// Walk down from `node`, following every child whose sphere contains
/// `point`, and return the deepest match (smallest radius on ties).
fn descend<'t, F>(
    node: &'t SoiNode,
    point: Vector3,
    depth: usize,
    locate: &F,
) -> Result<(&'t SoiNode, usize), SoiError>
where
    F: Fn(&SoiNode) -> Result<Vector3, SoiError>,
{
    let mut best = (node, depth);
    for child in &node.children {
        if locate(child)?.distance_to(point) >= child.soi_radius {
            continue;
        }
        let candidate = descend(child, point, depth + 1, locate)?;
        let deeper = candidate.1 > best.1;
        let tighter = candidate.1 == best.1 && candidate.0.soi_radius < best.0.soi_radius;
        if deeper || tighter {
            best = candidate;
        }
    }
    Ok(best)
}

impl SoiNode {
    fn leaf(mass: &Mass, soi_radius: f64) -> Self {
        Self {
            name: mass.name.clone(),
            soi_radius,
            position: mass.position,
            m: mass.m,
            children: Vec::new(),
        }
    }

    fn find(&self, name: &str) -> Option<&SoiNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut SoiNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    fn parent_of(&self, name: &str) -> Option<&SoiNode> {
        if self.children.iter().any(|child| child.name == name) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.parent_of(name))
    }

    fn collect<'t>(&'t self, depth: usize, out: &mut Vec<(usize, &'t SoiNode)>) {
        out.push((depth, self));
        for child in &self.children {
            child.collect(depth + 1, out);
        }
    }
}

impl SoiTree {
    /// Build the hierarchy for `scenario`.
    ///
    /// The spacecraft should not be part of `masses`. Bodies are placed in
    /// decreasing mass order; the heaviest is the root. Each later body nests
    /// under the innermost already-placed sphere containing it, and its own
    /// radius is clamped to stay strictly inside that parent sphere.
    pub fn construct(scenario: impl Into<String>, masses: &[Mass], g: f64) -> Result<Self, SoiError> {
        let mut ordered: Vec<&Mass> = masses.iter().collect();
        ordered.sort_by(|a, b| b.m.total_cmp(&a.m));
        let (primary, rest) = ordered.split_first().ok_or(SoiError::Empty)?;

        let mut root = SoiNode::leaf(primary, f64::INFINITY);
        let locate = |node: &SoiNode| -> Result<Vector3, SoiError> { Ok(node.position) };

        for body in rest {
            if root.find(&body.name).is_some() {
                return Err(SoiError::DuplicateBody(body.name.clone()));
            }

            let (parent, _) = descend(&root, body.position, 0, &locate)?;
            let parent_mass = find(masses, &parent.name)
                .ok_or_else(|| SoiError::StaleBody(parent.name.clone()))?;
            let headroom = parent.soi_radius - parent.position.distance_to(body.position);

            let mut radius = radius_soi(parent_mass, body, g)?;
            if radius >= headroom {
                debug!(body = %body.name, parent = %parent.name, radius, headroom, "clamping sphere of influence");
                radius = headroom * CONTAINMENT_MARGIN;
            }
            debug!(body = %body.name, parent = %parent.name, radius, "placed body in soi tree");

            let parent_name = parent.name.clone();
            if let Some(node) = root.find_mut(&parent_name) {
                node.children.push(SoiNode::leaf(body, radius));
            }
        }

        Ok(Self {
            scenario: scenario.into(),
            root,
        })
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn root(&self) -> &SoiNode {
        &self.root
    }

    pub fn node(&self, name: &str) -> Option<&SoiNode> {
        self.root.find(name)
    }

    /// The node `name` is nested under, i.e. the body it orbits.
    pub fn primary_of(&self, name: &str) -> Result<&SoiNode, SoiError> {
        if self.root.find(name).is_none() {
            return Err(SoiError::UnknownBody(name.to_string()));
        }
        self.root
            .parent_of(name)
            .ok_or_else(|| SoiError::UnknownBody(name.to_string()))
    }

    /// Depth-first listing of `(depth, node)` pairs, root first.
    pub fn nodes(&self) -> Vec<(usize, &SoiNode)> {
        let mut out = Vec::new();
        self.root.collect(0, &mut out);
        out
    }

    /// Classify which body dominates `point`, using current positions from `masses`.
    pub fn find_current_soi(
        &self,
        scenario: &str,
        point: Vector3,
        masses: &[Mass],
    ) -> Result<CurrentSoi, SoiError> {
        if scenario != self.scenario {
            return Err(SoiError::StaleReference {
                expected: self.scenario.clone(),
                found: scenario.to_string(),
            });
        }

        let locate = |node: &SoiNode| -> Result<Vector3, SoiError> {
            find(masses, &node.name)
                .map(|mass| mass.position)
                .ok_or_else(|| SoiError::StaleBody(node.name.clone()))
        };
        let (node, depth) = descend(&self.root, point, 0, &locate)?;
        let mass = find(masses, &node.name)
            .ok_or_else(|| SoiError::StaleBody(node.name.clone()))?;

        Ok(CurrentSoi {
            mass: mass.clone(),
            soi_radius: node.soi_radius,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 39.5;

    fn circular(name: &str, m: f64, around: &Mass, r: f64) -> Mass {
        let speed = (G * around.m / r).sqrt();
        Mass::new(
            name,
            m,
            around.position.plus(Vector3::new(r, 0.0, 0.0)),
            around.velocity.plus(Vector3::new(0.0, speed, 0.0)),
        )
    }

    #[test]
    fn radius_matches_laplace_approximation() {
        let sun = Mass::new("Sun", 1.0, Vector3::ZERO, Vector3::ZERO);
        let earth = circular("Earth", 3.003e-6, &sun, 1.0);
        let r = radius_soi(&sun, &earth, G).unwrap();
        // ~0.00620 AU, about 925 000 km
        assert!((r - 3.003e-6f64.powf(0.4)).abs() < 1e-9, "{r}");
    }

    #[test]
    fn unbound_secondary_falls_back_to_separation() {
        let sun = Mass::new("Sun", 1.0, Vector3::ZERO, Vector3::ZERO);
        let rogue = Mass::new("Rogue", 1e-3, Vector3::new(2.0, 0.0, 0.0), Vector3::new(0.0, 50.0, 0.0));
        let r = radius_soi(&sun, &rogue, G).unwrap();
        assert!((r - 2.0 * 1e-3f64.powf(0.4)).abs() < 1e-12);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let sun = Mass::new("Sun", 1.0, Vector3::ZERO, Vector3::ZERO);
        let a = circular("Earth", 3e-6, &sun, 1.0);
        let b = circular("Earth", 3e-7, &sun, 2.0);
        assert_eq!(
            SoiTree::construct("dup", &[sun, a, b], G).unwrap_err(),
            SoiError::DuplicateBody("Earth".into())
        );
    }

    #[test]
    fn empty_mass_list_is_rejected() {
        assert_eq!(SoiTree::construct("none", &[], G).unwrap_err(), SoiError::Empty);
    }
}
