use super::bubble::{Attachment, Bubble, BubbleId, BubbleSpec};
use super::params::{LoadError, SimParams};
use super::world::World;
use bevy::math::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

/// Saved spring of a bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StickToRepr")]
pub struct StickTo {
    pub target: BubbleId,
    pub length: f32,
}

/// Older saves store only the target id
#[derive(Deserialize)]
#[serde(untagged)]
enum StickToRepr {
    Bare(BubbleId),
    Full {
        target: BubbleId,
        #[serde(default)]
        length: f32,
    },
}

impl From<StickToRepr> for StickTo {
    fn from(repr: StickToRepr) -> Self {
        match repr {
            StickToRepr::Bare(target) => StickTo {
                target,
                length: 0.0,
            },
            StickToRepr::Full { target, length } => StickTo { target, length },
        }
    }
}

fn default_color() -> String {
    BubbleSpec::default().color
}

fn one() -> f32 {
    1.0
}

/// Persistent fields of a bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleRecord {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default = "one")]
    pub weight: f32,
    #[serde(default = "one")]
    pub bounce: f32,
    #[serde(default)]
    pub gravity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<BubbleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stick_to: Option<StickTo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popped_at: Option<u64>,
}

/// Saved coordinates keep three decimals
fn round3(v: f32) -> f32 {
    (v * 1000.0).round() / 1000.0
}

impl From<&Bubble> for BubbleRecord {
    fn from(bubble: &Bubble) -> Self {
        let stick_to = match &bubble.attachment {
            Attachment::None => None,
            Attachment::SpringTo { target, length } => Some(StickTo {
                target: target.clone(),
                length: *length,
            }),
        };
        BubbleRecord {
            x: round3(bubble.pos.x),
            y: round3(bubble.pos.y),
            r: round3(bubble.r()),
            color: bubble.color.clone(),
            text: bubble.text().to_string(),
            fixed: bubble.fixed,
            weight: bubble.weight,
            bounce: bubble.bounce,
            gravity: bubble.gravity,
            uuid: Some(bubble.id().clone()),
            stick_to,
            created_at: Some(bubble.created_at),
            popped_at: bubble.popped_at,
        }
    }
}

impl BubbleRecord {
    pub fn to_spec(&self) -> BubbleSpec {
        BubbleSpec {
            pos: Vec2::new(self.x, self.y),
            r: self.r,
            color: self.color.clone(),
            text: self.text.clone(),
            fixed: self.fixed,
            weight: self.weight,
            bounce: self.bounce,
            gravity: self.gravity,
            id: self.uuid.clone(),
            stick_to: self
                .stick_to
                .as_ref()
                .map(|s| (s.target.clone(), s.length)),
        }
    }

    /// Rebuild a live bubble; transient state starts fresh
    pub fn to_bubble(&self, params: &SimParams) -> Bubble {
        let mut bubble = Bubble::new(self.to_spec(), params);
        if let Some(created_at) = self.created_at {
            bubble.created_at = created_at;
        }
        bubble
    }
}

/// A saved world: live bubbles, the popped archive and optional physics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(deserialize_with = "skip_nulls")]
    pub bubbles: Vec<BubbleRecord>,
    #[serde(default, deserialize_with = "skip_nulls")]
    pub popped: Vec<BubbleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<SimParams>,
}

/// Saves may contain `null` holes where bubbles were deleted
fn skip_nulls<'de, D>(deserializer: D) -> Result<Vec<BubbleRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<Option<BubbleRecord>>> = Option::deserialize(deserializer)?;
    Ok(entries.unwrap_or_default().into_iter().flatten().collect())
}

impl WorldSnapshot {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let snapshot: WorldSnapshot = serde_json::from_str(json).map_err(LoadError::Parse)?;
        if let Some(params) = &snapshot.world {
            params.validate()?;
        }
        for record in &snapshot.bubbles {
            if !(record.x.is_finite() && record.y.is_finite() && record.r.is_finite()) {
                return Err(LoadError::Invalid(format!(
                    "bubble {:?} has a non-finite position or radius",
                    record.text
                )));
            }
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Capture a world, optionally with the physics it runs under
    pub fn from_world(world: &World, params: Option<&SimParams>) -> Self {
        WorldSnapshot {
            bubbles: world
                .bubbles()
                .iter()
                .filter(|b| !b.is_popping())
                .map(BubbleRecord::from)
                .collect(),
            popped: world.popped.clone(),
            world: params.cloned(),
        }
    }

    /// Build a world from this snapshot.
    ///
    /// Records reusing an id are skipped, and springs to bubbles that
    /// aren't in the snapshot are dropped.
    pub fn to_world(&self, params: &SimParams) -> World {
        let mut world = World::new();
        for record in &self.bubbles {
            let mut bubble = record.to_bubble(params);
            if bubble.attachment.targets(bubble.id()) {
                bubble.attachment = Attachment::None;
            }
            if let Err(e) = world.add(bubble) {
                log::warn!("Skipping saved bubble: {}", e);
            }
        }

        let stale: Vec<BubbleId> = world
            .bubbles()
            .iter()
            .filter(|b| {
                b.attachment
                    .target()
                    .is_some_and(|target| world.get(target).is_none())
            })
            .map(|b| b.id().clone())
            .collect();
        for id in &stale {
            log::debug!("Dropping spring of {} to a missing bubble", id);
            world.unstick(id);
        }

        world.popped = self.popped.clone();
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_bare_stick_to() {
        let json = r#"{
            "bubbles": [
                { "x": 0, "y": 0, "r": 40, "uuid": "a" },
                { "x": 100, "y": 0, "r": 40, "uuid": "b", "stick_to": "a" },
                { "x": 200, "y": 0, "r": 40, "uuid": "c", "stick_to": { "target": "a", "length": 25 } }
            ]
        }"#;

        let snapshot = WorldSnapshot::from_json(json).unwrap();

        assert_eq!(
            snapshot.bubbles[1].stick_to,
            Some(StickTo {
                target: BubbleId::from("a"),
                length: 0.0
            })
        );
        assert_eq!(snapshot.bubbles[2].stick_to.as_ref().map(|s| s.length), Some(25.0));
        assert!(snapshot.popped.is_empty());
        assert!(snapshot.world.is_none());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let snapshot = WorldSnapshot::from_json(r#"{ "bubbles": [ { "x": 1, "y": 2, "r": 30 } ] }"#)
            .unwrap();
        let record = &snapshot.bubbles[0];

        assert_eq!(record.weight, 1.0);
        assert_eq!(record.bounce, 1.0);
        assert_eq!(record.gravity, 0.0);
        assert!(!record.fixed);
        assert_eq!(record.color, "cornflowerblue");
    }

    #[test]
    fn test_null_entries_are_skipped() {
        let snapshot =
            WorldSnapshot::from_json(r#"{ "bubbles": [ null, { "x": 1, "y": 2, "r": 30 } ], "popped": null }"#)
                .unwrap();

        assert_eq!(snapshot.bubbles.len(), 1);
        assert!(snapshot.popped.is_empty());
    }

    #[test]
    fn test_invalid_snapshots_are_rejected() {
        assert!(matches!(
            WorldSnapshot::from_json(r#"{ "bubbles": 3 }"#),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            WorldSnapshot::from_json(r#"{ "bubbles": [], "world": { "pop_decay": 2.0 } }"#),
            Err(LoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_world_survives_a_save() {
        let params = SimParams::default();
        let mut world = World::new();
        let a = world
            .add(Bubble::new(
                BubbleSpec {
                    text: "anchor".into(),
                    gravity: 3.0,
                    ..BubbleSpec::new(Vec2::new(10.12345, -4.0), 60.0)
                },
                &params,
            ))
            .unwrap()
            .clone();
        let b = world
            .add(Bubble::new(BubbleSpec::new(Vec2::new(200.0, 0.0), 30.0), &params))
            .unwrap()
            .clone();
        world.stick(&b, &a, 80.0).unwrap();
        world.get_mut(&b).unwrap().vel = Vec2::new(5.0, 5.0);

        let json = WorldSnapshot::from_world(&world, Some(&params)).to_json().unwrap();
        let restored = WorldSnapshot::from_json(&json).unwrap().to_world(&params);

        let anchor = restored.get(&a).unwrap();
        assert_eq!(anchor.text(), "anchor");
        assert_eq!(anchor.gravity, 3.0);
        assert!((anchor.pos.x - 10.123).abs() < 1e-4);
        let follower = restored.get(&b).unwrap();
        assert_eq!(
            follower.attachment,
            Attachment::SpringTo {
                target: a.clone(),
                length: 80.0
            }
        );
        assert_eq!(follower.vel, Vec2::ZERO);
        assert_eq!(follower.created_at, world.get(&b).unwrap().created_at);
    }

    #[test]
    fn test_loading_drops_dangling_springs_and_duplicates() {
        let json = r#"{
            "bubbles": [
                { "x": 0, "y": 0, "r": 40, "uuid": "a", "stick_to": "gone" },
                { "x": 50, "y": 0, "r": 40, "uuid": "a" },
                { "x": 90, "y": 0, "r": 40, "uuid": "self", "stick_to": "self" }
            ]
        }"#;

        let world = WorldSnapshot::from_json(json)
            .unwrap()
            .to_world(&SimParams::default());

        assert_eq!(world.len(), 2);
        assert_eq!(world.get(&BubbleId::from("a")).unwrap().pos, Vec2::ZERO);
        assert!(world.bubbles().iter().all(|b| b.attachment == Attachment::None));
    }
}
