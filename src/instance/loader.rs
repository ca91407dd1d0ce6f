//! JSON instance documents.
//!
//! ```json
//! {
//!   "nodes": { "0": { "position": [[0, 1], [0, 2]], "demand": 2, "buffer": 1 } },
//!   "aps": { "position": [0, 0] },
//!   "scenario": { "duration": 2 }
//! }
//! ```
//!
//! A coordinate is an array of numbers or a bare number (one axis). The
//! access point position is one coordinate or an array of coordinates, one
//! per timestep. Unknown fields are ignored.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use super::{AccessPoint, Instance, InstanceError, Position, Scenario, User};

#[derive(Debug, Deserialize)]
struct InstanceDoc {
    nodes: BTreeMap<String, NodeDoc>,
    aps: ApDoc,
    scenario: ScenarioDoc,
}

#[derive(Debug, Deserialize)]
struct NodeDoc {
    position: Vec<CoordDoc>,
    demand: f64,
    buffer: f64,
}

#[derive(Debug, Deserialize)]
struct ApDoc {
    position: ApPositionDoc,
}

#[derive(Debug, Deserialize)]
struct ScenarioDoc {
    duration: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordDoc {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl From<CoordDoc> for Position {
    fn from(doc: CoordDoc) -> Self {
        match doc {
            CoordDoc::Scalar(x) => Position::new(vec![x]),
            CoordDoc::Vector(xs) => Position::new(xs),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApPositionDoc {
    Static(CoordDoc),
    Trajectory(Vec<CoordDoc>),
}

/// Reads an instance from a JSON file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Instance, InstanceError> {
    Instance::from_path(path)
}

impl Instance {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
        let path = path.as_ref();
        log::debug!("loading instance from {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InstanceError> {
        let doc: InstanceDoc = serde_json::from_reader(reader)?;
        Self::from_doc(doc)
    }

    pub fn from_json_str(text: &str) -> Result<Self, InstanceError> {
        let doc: InstanceDoc = serde_json::from_str(text)?;
        Self::from_doc(doc)
    }

    fn from_doc(doc: InstanceDoc) -> Result<Self, InstanceError> {
        let users = doc
            .nodes
            .into_iter()
            .map(|(key, node)| {
                let demand = whole_number(node.demand)
                    .filter(|d| (0..=i64::from(u32::MAX)).contains(d))
                    .ok_or_else(|| {
                        InstanceError::malformed(format!(
                            "node `{key}`: demand must be a non-negative integer, got {}",
                            node.demand
                        ))
                    })?;
                let buffer = whole_number(node.buffer).ok_or_else(|| {
                    InstanceError::malformed(format!(
                        "node `{key}`: buffer must be an integer, got {}",
                        node.buffer
                    ))
                })?;
                let positions = node.position.into_iter().map(Position::from).collect();
                Ok(User::new(key, positions, demand as u32, buffer))
            })
            .collect::<Result<Vec<_>, InstanceError>>()?;

        let access_point = match doc.aps.position {
            ApPositionDoc::Static(p) => AccessPoint::fixed(p.into()),
            ApPositionDoc::Trajectory(ps) => {
                AccessPoint::moving(ps.into_iter().map(Position::from).collect())
            }
        };

        let duration = whole_number(doc.scenario.duration)
            .filter(|&d| d > 0)
            .ok_or_else(|| {
                InstanceError::malformed(format!(
                    "scenario duration must be a positive integer, got {}",
                    doc.scenario.duration
                ))
            })?;

        let instance = Instance::new(users, access_point, Scenario::new(duration as usize))?;
        log::info!(
            "loaded instance: {} users, {} timesteps",
            instance.users().len(),
            instance.scenario().duration()
        );
        Ok(instance)
    }
}

/// `Some(n)` when `x` is finite, integral and fits an `i64`.
fn whole_number(x: f64) -> Option<i64> {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 9.0e15 {
        Some(x as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::ApPosition;

    const TWO_USERS: &str = r#"{
        "nodes": {
            "1": { "position": [[4, 0], [4, 0]], "demand": 1, "buffer": 1 },
            "0": { "position": [[1, 0], [1, 0]], "demand": 2, "buffer": 1, "label": "near" }
        },
        "aps": { "position": [0, 0] },
        "scenario": { "duration": 2 }
    }"#;

    fn malformed(text: &str) -> bool {
        matches!(
            Instance::from_json_str(text),
            Err(InstanceError::MalformedInstance(_))
        )
    }

    #[test]
    fn parses_document() {
        let inst = Instance::from_json_str(TWO_USERS).unwrap();
        assert_eq!(inst.users().len(), 2);
        assert_eq!(inst.scenario().duration(), 2);

        let u0 = &inst.users()[0];
        assert_eq!(u0.key().as_str(), "0");
        assert_eq!(u0.demand(), 2);
        assert_eq!(u0.buffer_capacity(), 1);
        assert_eq!(u0.positions()[0], Position::new(vec![1.0, 0.0]));
        assert_eq!(
            inst.access_point().position(),
            &ApPosition::Static(Position::new(vec![0.0, 0.0]))
        );
    }

    #[test]
    fn parses_trajectory_and_scalar_coordinates() {
        // Bare numbers are 1-D coordinates; a nested array is an access point
        // trajectory.
        let text = r#"{
            "nodes": { "a": { "position": [1.5, 2.5], "demand": 1.0, "buffer": -2 } },
            "aps": { "position": [[0], [1]] },
            "scenario": { "duration": 2 }
        }"#;
        let inst = Instance::from_json_str(text).unwrap();
        assert_eq!(inst.users()[0].buffer_capacity(), -2);
        assert_eq!(inst.users()[0].positions()[1], Position::new(vec![2.5]));
        assert!(matches!(
            inst.access_point().position(),
            ApPosition::Trajectory(ps) if ps.len() == 2
        ));
        assert_eq!(
            inst.access_point().position_at(1),
            Some(&Position::new(vec![1.0]))
        );
    }

    #[test]
    fn mixed_dimensions_are_malformed() {
        assert!(malformed(
            r#"{ "nodes": { "a": { "position": [1.5, 2.5], "demand": 1, "buffer": 1 } },
                 "aps": { "position": [0, 1] }, "scenario": { "duration": 2 } }"#
        ));
    }

    #[test]
    fn missing_fields_are_malformed() {
        assert!(malformed(r#"{ "aps": { "position": [0] }, "scenario": { "duration": 1 } }"#));
        assert!(malformed(
            r#"{ "nodes": { "0": { "position": [[0]], "demand": 1 } },
                 "aps": { "position": [0] }, "scenario": { "duration": 1 } }"#
        ));
        assert!(malformed(
            r#"{ "nodes": { "0": { "position": [[0]], "demand": 1, "buffer": 1 } },
                 "aps": {}, "scenario": { "duration": 1 } }"#
        ));
    }

    #[test]
    fn wrong_shapes_are_malformed() {
        assert!(malformed("not json"));
        assert!(malformed(
            r#"{ "nodes": [], "aps": { "position": [0] }, "scenario": { "duration": 1 } }"#
        ));
        assert!(malformed(
            r#"{ "nodes": { "0": { "position": "here", "demand": 1, "buffer": 1 } },
                 "aps": { "position": [0] }, "scenario": { "duration": 1 } }"#
        ));
    }

    #[test]
    fn invalid_numbers_are_malformed() {
        let with = |demand: &str, buffer: &str, duration: &str| {
            format!(
                r#"{{ "nodes": {{ "0": {{ "position": [[0]], "demand": {demand}, "buffer": {buffer} }} }},
                     "aps": {{ "position": [0] }}, "scenario": {{ "duration": {duration} }} }}"#
            )
        };
        assert!(!malformed(&with("1", "1", "1")));
        assert!(malformed(&with("-1", "1", "1")));
        assert!(malformed(&with("1.5", "1", "1")));
        assert!(malformed(&with("1", "0.5", "1")));
        assert!(malformed(&with("1", "1", "0")));
        assert!(malformed(&with("1", "1", "2.5")));
    }

    #[test]
    fn empty_nodes_are_malformed() {
        assert!(malformed(
            r#"{ "nodes": {}, "aps": { "position": [0] }, "scenario": { "duration": 1 } }"#
        ));
    }

    #[test]
    fn loads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instance.json");
        std::fs::write(&path, TWO_USERS).unwrap();
        let inst = load(&path).unwrap();
        assert_eq!(inst.users().len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, InstanceError::Io(_)));
    }
}
