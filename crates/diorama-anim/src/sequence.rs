//! Sequence definitions and the built-in scripted sequences.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use diorama_scene::{ModelRef, transform};

use crate::curve::PathCurve;
use crate::phase::{Effect, Phase, TimeWindow};

pub const PLANET: &str = "planet";
pub const ROCK: &str = "rock";
pub const DOGGO: &str = "doggo";

/// Initial placement of one private instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDef {
    /// Index into [`SequenceDef::assets`].
    pub asset: usize,
    pub transform: Mat4,
    /// Post-multiplied when drawing; phases never touch it.
    pub display: Mat4,
}

impl InstanceDef {
    pub fn new(asset: usize, transform: Mat4) -> Self {
        Self {
            asset,
            transform,
            display: Mat4::IDENTITY,
        }
    }

    pub fn with_display(mut self, display: Mat4) -> Self {
        self.display = display;
        self
    }
}

/// A self-contained scripted sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDef {
    pub name: String,
    pub duration: f32,
    /// Catalog ids resolved when the sequence starts.
    pub assets: Vec<String>,
    pub instances: Vec<InstanceDef>,
    /// Applied in order every tick.
    pub phases: Vec<Phase>,
}

/// A private instance owned by a running sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceInstance {
    pub model: ModelRef,
    pub transform: Mat4,
    pub display: Mat4,
}

impl SequenceInstance {
    pub fn draw_transform(&self) -> Mat4 {
        self.transform * self.display
    }
}

fn deg(d: f32) -> f32 {
    d.to_radians()
}

impl SequenceDef {
    /// A spinning planet ringed by five rocks. The rocks orbit, then fly
    /// off; the planet shrinks, turns into a dog and grows back.
    pub fn planet_burst() -> Self {
        const PLANET_SLOT: usize = 0;
        const ROCK_SLOT: usize = 1;
        const DOGGO_SLOT: usize = 2;

        let base = transform::scale(Mat4::IDENTITY, Vec3::splat(0.1));
        let ring = |from: Mat4, offset: Vec3| {
            transform::scale(transform::translate(from, offset), Vec3::splat(0.5))
        };

        let rock1 = transform::rotate(
            transform::rotate(ring(base, Vec3::new(-7.5, 0.0, 0.0)), deg(90.0), Vec3::Z),
            deg(90.0),
            Vec3::Y,
        );
        let rock2 = transform::rotate(ring(base, Vec3::new(0.0, 7.5, 0.0)), deg(90.0), Vec3::Y);
        let rock3 = transform::rotate(ring(base, Vec3::new(0.0, -7.5, 0.0)), deg(180.0), Vec3::X);

        let planet = transform::rotate(
            transform::translate(base, Vec3::new(-0.5, 0.0, 0.0)),
            deg(45.0),
            Vec3::NEG_Z,
        );
        let rock4 = transform::rotate(
            transform::rotate(ring(planet, Vec3::new(0.0, 0.0, 7.5)), deg(90.0), Vec3::Z),
            deg(90.0),
            Vec3::X,
        );
        let rock5 = transform::rotate(ring(planet, Vec3::new(0.0, 0.0, -7.5)), deg(90.0), Vec3::NEG_X);

        let dog = transform::rotate(
            transform::rotate(
                transform::scale(planet, Vec3::splat(0.01)),
                deg(45.0),
                Vec3::Z,
            ),
            deg(15.0),
            Vec3::X,
        );

        let rocks = vec![1, 2, 3, 4, 5];
        Self {
            name: "planet burst".into(),
            duration: 10.0,
            assets: vec![PLANET.into(), ROCK.into(), DOGGO.into()],
            instances: vec![
                InstanceDef::new(PLANET_SLOT, planet),
                InstanceDef::new(ROCK_SLOT, rock1),
                InstanceDef::new(ROCK_SLOT, rock2),
                InstanceDef::new(ROCK_SLOT, rock3),
                InstanceDef::new(ROCK_SLOT, rock4),
                InstanceDef::new(ROCK_SLOT, rock5),
            ],
            phases: vec![
                Phase::new(
                    TimeWindow::Always,
                    [0],
                    Effect::Rotate { rate: PI, axis: Vec3::Y },
                ),
                Phase::new(
                    TimeWindow::Before(4.5),
                    rocks.clone(),
                    Effect::Orbit {
                        rate: PI,
                        axis: Vec3::Z,
                        offset_rate: Vec3::new(-90.0, 0.0, 0.0),
                    },
                ),
                Phase::new(
                    TimeWindow::After(3.5),
                    rocks,
                    Effect::Translate {
                        velocity: Vec3::splat(300.0),
                    },
                ),
                Phase::new(
                    TimeWindow::Between(3.25, 4.0),
                    [0],
                    Effect::Scale { rate: -6.0 },
                ),
                Phase::new(
                    TimeWindow::After(4.5),
                    [0],
                    Effect::Swap {
                        asset: DOGGO_SLOT,
                        transform: dog,
                    },
                )
                .once(),
                Phase::new(
                    TimeWindow::Between(5.5, 6.0),
                    [0],
                    Effect::Scale { rate: 11.0 },
                ),
            ],
        }
    }

    /// A planet flying along a cubic path past four small markers placed at
    /// the curve's control points.
    pub fn spline_flight() -> Self {
        let points = [
            Vec3::new(-1.5, 0.0, 0.0),
            Vec3::new(-1.0, 0.5, -0.5),
            Vec3::new(1.0, -0.5, -0.5),
            Vec3::new(1.5, -0.5, 0.0),
        ];

        let mut instances: Vec<InstanceDef> = points
            .iter()
            .map(|&p| {
                let marker = transform::scale(
                    transform::translate(Mat4::IDENTITY, p),
                    Vec3::splat(0.01),
                );
                InstanceDef::new(0, marker)
            })
            .collect();
        let mover = instances.len();
        instances.push(
            InstanceDef::new(
                0,
                transform::translate(Mat4::IDENTITY, Vec3::new(-20.0, 0.0, 0.0)),
            )
            .with_display(Mat4::from_scale(Vec3::splat(0.04))),
        );

        Self {
            name: "spline flight".into(),
            duration: 5.0,
            assets: vec![PLANET.into()],
            instances,
            phases: vec![Phase::new(
                TimeWindow::Always,
                [mover],
                Effect::FollowPath {
                    curve: PathCurve::Cubic(points),
                },
            )],
        }
    }
}

/// Sequences bound to the run keys, in key order.
pub fn builtin_sequences() -> Vec<SequenceDef> {
    vec![SequenceDef::planet_burst(), SequenceDef::spline_flight()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_definitions_are_consistent() {
        for def in builtin_sequences() {
            assert!(def.duration > 0.0, "{}", def.name);
            for instance in &def.instances {
                assert!(instance.asset < def.assets.len(), "{}", def.name);
            }
            for phase in &def.phases {
                assert!(
                    phase.targets.iter().all(|&t| t < def.instances.len()),
                    "{}",
                    def.name
                );
                if let Effect::Swap { asset, .. } = phase.effect {
                    assert!(asset < def.assets.len());
                }
            }
        }
    }

    #[test]
    fn planet_burst_places_rocks_around_planet() {
        let def = SequenceDef::planet_burst();
        assert_eq!(def.instances.len(), 6);

        let rock1 = transform::position(&def.instances[1].transform);
        assert!((rock1 - Vec3::new(-0.75, 0.0, 0.0)).length() < 1e-5);
        let rock2 = transform::position(&def.instances[2].transform);
        assert!((rock2 - Vec3::new(0.0, 0.75, 0.0)).length() < 1e-5);
    }

    #[test]
    fn spline_flight_displays_mover_smaller() {
        let def = SequenceDef::spline_flight();
        let mover = def.instances.last().unwrap();
        assert_eq!(mover.display, Mat4::from_scale(Vec3::splat(0.04)));
        assert_eq!(
            transform::position(&mover.transform),
            Vec3::new(-20.0, 0.0, 0.0)
        );
    }
}
