//! Movement and collision constants shared across the chassis code.
//!
//! Tuning values that vary per actor live in [`crate::chassis::ChassisLimits`];
//! these are the fixed numbers the algorithms are built around.

/// Height reported for "no terrain here". Kept for consumers that still want
/// a number; the probe code itself uses [`crate::probe::Altitude`].
pub const MIN_ALTITUDE: f32 = -100.0;
/// Default downward acceleration in metres per second squared.
pub const DEFAULT_GRAVITY: f32 = -9.8;
/// Density relative to water. Above 1.0 sinks, below floats.
pub const DEFAULT_DENSITY: f32 = 2.0;
/// Fallback mass used when an actor has no sensible mass configured.
pub const DEFAULT_MASS: f32 = 1.0;
/// Smallest acceptable mass to avoid numerically unstable exchanges.
pub const MIN_MASS: f32 = 1e-6;

/// Longest frame the speed-clamp blend is valid for.
pub const MAX_FRAME_SECONDS: f32 = 0.2;
/// Blend rate toward max speed; `dt * rate` must stay within `0..=1`.
pub const SPEED_CLAMP_BLEND_RATE: f32 = 4.0;
/// Below this speed target seeking goes straight at the target.
pub const ORBIT_SPEED_THRESHOLD: f32 = 0.1;
/// Heading error under which auto-turn simply stops rotating.
pub const HEADING_SNAP_EPSILON: f32 = 0.01;
/// `k` in `k^dt` at friction 1.0: 10% of speed left after 0.1 s.
pub const FRICTION_BASE: f32 = 1e-10;

/// Distance a corrected position is pushed off a wall.
pub const WALL_PUSH_OFF: f32 = 0.01;
/// Cushion used when deciding whether a terrain-on-contact chassis touches ground.
pub const TERRAIN_CONTACT_EPSILON: f32 = 0.1;
/// Impact speed above which a collision sound is "hard".
pub const HARD_HIT_SPEED: f32 = 2.0;

/// Mass multiplier for user-controlled actors so they are hard to push.
pub const USER_MASS_MULTIPLIER: f32 = 100_000.0;
/// Fraction of the bounced velocity re-applied after hitting an immobile actor.
pub const IMMOBILE_NUDGE: f32 = 0.1;

/// Squared speed under which a bouncing prop counts as resting.
pub const SETTLE_SPEED_SQ: f32 = 0.01;
/// Consecutive resting bounces before a prop stops simulating.
pub const SETTLE_FRAMES: u32 = 12;
/// Friction used for tangential decay when props hit the ground.
pub const PROP_GROUND_FRICTION: f32 = 0.99;

/// Vertical speed under which a jumping hover counts as at the apex.
pub const DOUBLE_JUMP_APEX_SPEED: f32 = 0.15;
/// Double jumps are this much stronger than the first jump.
pub const DOUBLE_JUMP_BOOST: f32 = 1.5;
/// Upward hover lift may be this many times the linear acceleration.
pub const HOVER_LIFT_MULTIPLIER: f32 = 10.0;
/// Extra damping on a hover that scrapes the ground.
pub const HOVER_GROUND_DAMPING: f32 = 0.2;
/// Hovers below this height relative to their floor are left to fall.
pub const HOVER_FALL_THRESHOLD: f32 = -1.0;

/// Sphere-vs-ground bounces only apply above this penetration depth.
pub const GROUND_PENETRATION_LIMIT: f32 = -2.0;
/// Slack allowing props to sink slightly into the ground without sticking.
pub const PROP_GROUND_SLACK: f32 = 2.0;
/// Props deeper than this under the surface do not pop back up.
pub const PROP_BURIED_LIMIT: f32 = -0.5;
/// Slope push applied to saucers standing on steep ground.
pub const SAUCER_SLOPE_PUSH: f32 = 10.0;
/// Rate at which saucers settle toward their cruising altitude.
pub const SAUCER_CRUISE_RATE: f32 = 3.0;
/// Lift added when settling a resting prop on the surface.
pub const PROP_REST_LIFT: f32 = 1e-4;
/// Fraction of the remaining restitution tumbling props keep sideways.
pub const TUMBLE_XY_BLEND: f32 = 0.8;
/// Rate at which water drags a submerged prop's velocity toward zero.
pub const WATER_DRAG_RATE: f32 = 2.0;
/// Light props shallower than this under the surface count as floating.
pub const FLOAT_DEPTH: f32 = 0.5;
/// Smallest slope-induced speed change applied to hovers.
pub const SLOPE_MIN_SPEED: f32 = 0.01;
