//! # Snapshot Demo
//!
//! Walks every entity with a tag, a transform and a rigidbody, and writes
//! them out as a TOML document.
//!
//! Usage: `snapshot_demo [config.toml] [output.toml]`

use serde::Serialize;
use tessera::core::{Entity, Registry};
use tessera::demo;
use tessera::scene::Vector3;

struct Tag(String);

#[derive(Clone, Copy)]
struct Transform {
    position: Vector3,
    rotation: Vector3,
    scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Clone, Copy)]
struct RigidBody {
    is_active: bool,
    velocity: Vector3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            is_active: true,
            velocity: Vector3::ZERO,
        }
    }
}

#[derive(Serialize)]
struct TransformRecord {
    position: Vector3,
    rotation: Vector3,
    scale: Vector3,
}

impl From<&Transform> for TransformRecord {
    fn from(transform: &Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }
}

#[derive(Serialize)]
struct RigidBodyRecord {
    is_active: bool,
    velocity: Vector3,
}

impl From<&RigidBody> for RigidBodyRecord {
    fn from(body: &RigidBody) -> Self {
        Self {
            is_active: body.is_active,
            velocity: body.velocity,
        }
    }
}

#[derive(Serialize)]
struct EntityRecord {
    entity: String,
    tag: String,
    transform: TransformRecord,
    rigidbody: RigidBodyRecord,
}

#[derive(Serialize)]
struct Snapshot {
    entities: Vec<EntityRecord>,
}

fn spawn(registry: &mut Registry, tag: &str, position: Vector3) -> Result<Entity, Box<dyn std::error::Error>> {
    let entity = registry.create_entity();
    registry.add_component(entity, Tag(tag.to_owned()))?;
    registry.add_component(
        entity,
        Transform {
            position,
            ..Transform::default()
        },
    )?;
    registry.add_component(entity, RigidBody::default())?;
    Ok(entity)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demo::init_tracing();
    let config = demo::config_from_args()?;
    let mut registry = Registry::with_config(&config);

    spawn(&mut registry, "entity1", Vector3::new(0.0, 0.0, 0.0))?;
    let second = spawn(&mut registry, "entity2", Vector3::new(1.0, 0.0, 0.0))?;
    spawn(&mut registry, "entity3", Vector3::new(2.0, 0.0, 0.0))?;

    // Untagged, so the view skips it.
    let loose = registry.create_entity();
    registry.add_component(loose, Transform::default())?;

    registry.get_component_mut::<RigidBody>(second)?.velocity = Vector3::new(0.0, -9.8, 0.0);

    let view = registry.create_view::<(Tag, Transform, RigidBody)>()?;
    let mut snapshot = Snapshot {
        entities: Vec::with_capacity(view.driver_len()),
    };
    view.each(|entity, (tag, transform, body): (&Tag, &Transform, &RigidBody)| {
        snapshot.entities.push(EntityRecord {
            entity: entity.to_string(),
            tag: tag.0.clone(),
            transform: transform.into(),
            rigidbody: body.into(),
        });
    });

    let document = toml::to_string_pretty(&snapshot)?;
    println!("{document}");

    if let Some(path) = std::env::args().nth(2) {
        std::fs::write(&path, &document)?;
        tracing::info!("wrote {} entities to {path}", snapshot.entities.len());
    }

    Ok(())
}
