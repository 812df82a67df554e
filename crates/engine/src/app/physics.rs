use super::scene::{EntityId, Vec2};

/// Arcade-style world settings. The y axis grows downward, so gravity is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub gravity: f32,
    pub ground_thickness: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 3200.0,
            height: 768.0,
            gravity: 600.0,
            ground_thickness: 3.0,
        }
    }
}

impl WorldConfig {
    pub fn ground_top(&self) -> f32 {
        self.height - self.ground_thickness
    }
}

#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub allow_gravity: bool,
    pub collide_world_bounds: bool,
    pub collide_ground: bool,
    pub debug_name: &'static str,
}

impl BodyDesc {
    pub fn new(debug_name: &'static str, position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::default(),
            half_extents,
            allow_gravity: true,
            collide_world_bounds: false,
            collide_ground: false,
            debug_name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub allow_gravity: bool,
    pub collide_world_bounds: bool,
    pub collide_ground: bool,
    /// Disabled bodies neither move nor report contacts.
    pub enabled: bool,
    pub grounded: bool,
    pub tint: Option<u32>,
    pub debug_name: &'static str,
}

impl Body {
    pub(crate) fn from_desc(id: EntityId, desc: BodyDesc) -> Self {
        Self {
            id,
            position: desc.position,
            velocity: desc.velocity,
            half_extents: desc.half_extents,
            allow_gravity: desc.allow_gravity,
            collide_world_bounds: desc.collide_world_bounds,
            collide_ground: desc.collide_ground,
            enabled: true,
            grounded: false,
            tint: None,
            debug_name: desc.debug_name,
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x - self.half_extents.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.half_extents.x
    }

    pub fn top(&self) -> f32 {
        self.position.y - self.half_extents.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.half_extents.y
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Ids are ordered so the lower id comes first.
    Overlap(EntityId, EntityId),
    Ground(EntityId),
    LeftWorld(EntityId),
}

pub(crate) fn step_bodies(bodies: &mut [Body], config: &WorldConfig, fixed_dt_seconds: f32) {
    let ground_top = config.ground_top();
    for body in bodies.iter_mut().filter(|body| body.enabled) {
        if body.allow_gravity {
            body.velocity.y += config.gravity * fixed_dt_seconds;
        }
        body.position.x += body.velocity.x * fixed_dt_seconds;
        body.position.y += body.velocity.y * fixed_dt_seconds;
        body.grounded = false;

        if body.collide_ground && body.bottom() >= ground_top && body.velocity.y >= 0.0 {
            body.position.y = ground_top - body.half_extents.y;
            body.velocity.y = 0.0;
            body.grounded = true;
        }

        if body.collide_world_bounds {
            clamp_to_world(body, config);
        }
    }
}

fn clamp_to_world(body: &mut Body, config: &WorldConfig) {
    if body.left() < 0.0 {
        body.position.x = body.half_extents.x;
        body.velocity.x = body.velocity.x.max(0.0);
    } else if body.right() > config.width {
        body.position.x = config.width - body.half_extents.x;
        body.velocity.x = body.velocity.x.min(0.0);
    }

    if body.top() < 0.0 {
        body.position.y = body.half_extents.y;
        body.velocity.y = body.velocity.y.max(0.0);
    } else if body.bottom() > config.height {
        body.position.y = config.height - body.half_extents.y;
        body.velocity.y = body.velocity.y.min(0.0);
        body.grounded = true;
    }
}

pub(crate) fn collect_contacts(bodies: &[Body], config: &WorldConfig) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let ground_top = config.ground_top();
    let enabled = bodies
        .iter()
        .filter(|body| body.enabled)
        .collect::<Vec<_>>();

    for (index, body) in enabled.iter().enumerate() {
        for other in &enabled[index + 1..] {
            if body.overlaps(other) {
                let (a, b) = if body.id.0 < other.id.0 {
                    (body.id, other.id)
                } else {
                    (other.id, body.id)
                };
                contacts.push(Contact::Overlap(a, b));
            }
        }
    }

    for body in &enabled {
        if body.bottom() >= ground_top {
            contacts.push(Contact::Ground(body.id));
        }
        if !body.collide_world_bounds && (body.right() < 0.0 || body.left() > config.width) {
            contacts.push(Contact::LeftWorld(body.id));
        }
    }

    contacts
}
