//! Body records shared by every crate.

use serde::{Deserialize, Serialize};

use crate::vector::{Vector3, VectorError};

/// A body's identity, mass, and full state.
///
/// Display or scenario-specific extras do not belong here; scenarios keep them
/// in a side table keyed by [`Mass::name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mass {
    pub name: String,
    /// Mass in solar masses; `g * m` gives the gravitational parameter.
    pub m: f64,
    pub position: Vector3,
    pub velocity: Vector3,
}

/// Position and velocity pair, typically relative to a primary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StateVector {
    pub position: Vector3,
    pub velocity: Vector3,
}

impl Mass {
    pub fn new(name: impl Into<String>, m: f64, position: Vector3, velocity: Vector3) -> Self {
        Self {
            name: name.into(),
            m,
            position,
            velocity,
        }
    }

    pub fn state(&self) -> StateVector {
        StateVector {
            position: self.position,
            velocity: self.velocity,
        }
    }

    /// Copy of this body with its state expressed relative to `reference`.
    pub fn relative_to(&self, reference: &Mass) -> Mass {
        Mass {
            name: self.name.clone(),
            m: self.m,
            position: self.position.minus(reference.position),
            velocity: self.velocity.minus(reference.velocity),
        }
    }

    /// Overwrite position and velocity from a state vector.
    pub fn set_state(&mut self, state: StateVector) {
        self.position = state.position;
        self.velocity = state.velocity;
    }
}

/// Find a body by exact name.
pub fn find<'a>(masses: &'a [Mass], name: &str) -> Option<&'a Mass> {
    masses.iter().find(|mass| mass.name == name)
}

/// Mass-weighted centre of a set of bodies.
///
/// Zero total mass (including an empty slice) is a `ZeroDivisor` error.
pub fn barycenter(masses: &[Mass]) -> Result<Mass, VectorError> {
    let mut position = Vector3::ZERO;
    let mut velocity = Vector3::ZERO;
    let mut scratch = Vector3::ZERO;
    let mut system_mass = 0.0;

    for mass in masses {
        position.add(*scratch.set(mass.position).multiply_by_scalar(mass.m));
        velocity.add(*scratch.set(mass.velocity).multiply_by_scalar(mass.m));
        system_mass += mass.m;
    }

    position.divide_by_scalar(system_mass)?;
    velocity.divide_by_scalar(system_mass)?;

    Ok(Mass::new("Barycenter", system_mass, position, velocity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barycenter_weights_by_mass() {
        let masses = [
            Mass::new("A", 3.0, Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)),
            Mass::new("B", 1.0, Vector3::new(4.0, 0.0, 0.0), Vector3::new(0.0, -3.0, 0.0)),
        ];
        let bc = barycenter(&masses).unwrap();
        assert_eq!(bc.m, 4.0);
        assert_eq!(bc.position, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(bc.velocity, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn barycenter_of_nothing_is_an_error() {
        assert_eq!(barycenter(&[]).unwrap_err(), VectorError::ZeroDivisor);
    }

    #[test]
    fn relative_state_subtracts_reference() {
        let sun = Mass::new("Sun", 1.0, Vector3::new(1.0, 1.0, 0.0), Vector3::new(0.1, 0.0, 0.0));
        let earth = Mass::new("Earth", 3e-6, Vector3::new(2.0, 1.0, 0.0), Vector3::new(0.1, 6.28, 0.0));
        let rel = earth.relative_to(&sun);
        assert_eq!(rel.position, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(rel.velocity, Vector3::new(0.0, 6.28, 0.0));
        assert_eq!(rel.name, "Earth");
    }
}
