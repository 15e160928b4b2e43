use crate::sim::{Bubble, BubbleSpec, SimParams, World};
use bevy::math::Vec2;
use rand::Rng;

/// Named colors offered for bubbles
pub const PALETTE: [(&str, [u8; 3]); 27] = [
    ("black", [0, 0, 0]),
    ("gray", [128, 128, 128]),
    ("red", [255, 0, 0]),
    ("crimson", [220, 20, 60]),
    ("deeppink", [255, 20, 147]),
    ("maroon", [128, 0, 0]),
    ("orange", [255, 165, 0]),
    ("darkorange", [255, 140, 0]),
    ("goldenrod", [218, 165, 32]),
    ("brown", [165, 42, 42]),
    ("yellow", [255, 255, 0]),
    ("gold", [255, 215, 0]),
    ("greenyellow", [173, 255, 47]),
    ("green", [0, 128, 0]),
    ("limegreen", [50, 205, 50]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkseagreen", [143, 188, 143]),
    ("darkturquoise", [0, 206, 209]),
    ("darkcyan", [0, 139, 139]),
    ("aqua", [0, 255, 255]),
    ("blue", [0, 0, 255]),
    ("cornflowerblue", [100, 149, 237]),
    ("royalblue", [65, 105, 225]),
    ("darkslateblue", [72, 61, 139]),
    ("slateblue", [106, 90, 205]),
    ("purple", [128, 0, 128]),
    ("darkviolet", [148, 0, 211]),
];

/// Random bubbles appear within this distance of the origin on each axis
const SPAWN_EXTENT: f32 = 450.0;
const SPAWN_RADIUS: (f32, f32) = (20.0, 100.0);

/// Bubbles spawned around the title bubble when demo mode starts
pub const DEMO_START_COUNT: usize = 25;
/// Demo mode stops adding bubbles at this count
pub const DEMO_MAX_BUBBLES: usize = 40;
/// Demo mode stops popping bubbles at this count
pub const DEMO_MIN_BUBBLES: usize = 10;
/// Chance per demo tick to add, and separately to pop, a bubble
pub const DEMO_EVENT_CHANCE: f64 = 0.1;

const TITLE_RADIUS: f32 = 140.0;

/// RGB of a palette name or a `#rrggbb` string
pub fn color_rgb(name: &str) -> Option<[u8; 3]> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some([channel(0)?, channel(2)?, channel(4)?]);
    }
    PALETTE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, rgb)| *rgb)
}

/// A bubble with random position, size and color, near the origin
pub fn random_bubble(rng: &mut impl Rng, params: &SimParams) -> Bubble {
    let pos = Vec2::new(
        rng.random_range(-SPAWN_EXTENT..SPAWN_EXTENT),
        rng.random_range(-SPAWN_EXTENT..SPAWN_EXTENT),
    );
    let r = rng.random_range(SPAWN_RADIUS.0..SPAWN_RADIUS.1);
    let (color, _) = PALETTE[rng.random_range(0..PALETTE.len())];
    Bubble::new(
        BubbleSpec {
            color: color.to_string(),
            ..BubbleSpec::new(pos, r)
        },
        params,
    )
}

/// The pinned bubble shown in an otherwise empty world
pub fn intro_bubble(params: &SimParams) -> Bubble {
    Bubble::new(
        BubbleSpec {
            color: "blue".to_string(),
            text: "click to select, drag to throw\nspace adds a bubble".to_string(),
            fixed: true,
            gravity: 5.0,
            ..BubbleSpec::new(Vec2::ZERO, TITLE_RADIUS)
        },
        params,
    )
}

/// A pinned title bubble surrounded by random ones; pops aren't archived
pub fn demo_scene(rng: &mut impl Rng, params: &SimParams) -> World {
    let mut world = World::new();
    world.archive_popped = false;

    let title = Bubble::new(
        BubbleSpec {
            color: "blue".to_string(),
            text: "bubbles!".to_string(),
            fixed: true,
            ..BubbleSpec::new(Vec2::ZERO, TITLE_RADIUS)
        },
        params,
    );
    let bubbles = std::iter::once(title)
        .chain((0..DEMO_START_COUNT).map(|_| random_bubble(rng, params)));
    for bubble in bubbles {
        if let Err(e) = world.add(bubble) {
            log::warn!("Demo bubble rejected: {}", e);
        }
    }
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_bubbles_stay_in_range() {
        let params = SimParams::default();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let bubble = random_bubble(&mut rng, &params);
            assert!(bubble.pos.x >= -SPAWN_EXTENT && bubble.pos.x < SPAWN_EXTENT);
            assert!(bubble.pos.y >= -SPAWN_EXTENT && bubble.pos.y < SPAWN_EXTENT);
            assert!(bubble.r() >= 20.0 && bubble.r() < 100.0);
            assert!(color_rgb(&bubble.color).is_some());
            assert!(bubble.text().is_empty());
        }
    }

    #[test]
    fn test_demo_scene_layout() {
        let params = SimParams::default();
        let mut rng = StdRng::seed_from_u64(1);

        let world = demo_scene(&mut rng, &params);

        assert_eq!(world.len(), DEMO_START_COUNT + 1);
        assert!(!world.archive_popped);
        let title = &world.bubbles()[0];
        assert_eq!(title.text(), "bubbles!");
        assert!(title.fixed);
        assert_eq!(title.r(), 140.0);
    }

    #[test]
    fn test_color_lookup() {
        assert_eq!(color_rgb("cornflowerblue"), Some([100, 149, 237]));
        assert_eq!(color_rgb("DarkViolet"), Some([148, 0, 211]));
        assert_eq!(color_rgb("#ff8000"), Some([255, 128, 0]));
        assert_eq!(color_rgb("#ff80"), None);
        assert_eq!(color_rgb("chartreuse"), None);
    }
}
