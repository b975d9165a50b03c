//! # Scene Demo
//!
//! A player walking forward and a camera following it, driven through
//! initialize, a few updates and terminate.

use tessera::core::Entity;
use tessera::demo;
use tessera::scene::{Scene, Script, ScriptContext, Vector3};

/// Keeps the camera at a fixed offset from its target.
struct CameraController {
    target: Entity,
    offset: Vector3,
}

impl Script for CameraController {
    fn on_create(&mut self, ctx: &mut ScriptContext<'_>) {
        println!("camera_controller::on_create({})", ctx.entity());
    }

    fn on_update(&mut self, ctx: &mut ScriptContext<'_>, delta_time: f32) {
        let target = ctx.registry().try_get_component::<Vector3>(self.target).copied();
        let mut position = ctx.component::<Vector3>();
        if let (Some(target), Some(position)) = (target, position.get_mut()) {
            *position = target + self.offset;
            println!(
                "camera_controller::on_update({delta_time}) -> ({}, {}, {})",
                position.x, position.y, position.z
            );
        }
    }

    fn on_destroy(&mut self, _ctx: &mut ScriptContext<'_>) {
        println!("camera_controller::on_destroy()");
    }
}

/// Moves the player along its heading.
struct PlayerController {
    velocity: Vector3,
}

impl Script for PlayerController {
    fn on_update(&mut self, ctx: &mut ScriptContext<'_>, delta_time: f32) {
        if let Some(position) = ctx.component::<Vector3>().get_mut() {
            *position += self.velocity * delta_time;
            println!(
                "player_controller::on_update({delta_time}) -> ({}, {}, {})",
                position.x, position.y, position.z
            );
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demo::init_tracing();
    let config = demo::config_from_args()?;
    let mut scene = Scene::with_config(&config);

    let player = scene.create_node(Vector3::ZERO)?;
    scene.add_script(
        player,
        PlayerController {
            velocity: Vector3::new(1.0, 0.0, 2.0),
        },
    )?;

    let camera = scene.create_node(Vector3::new(0.0, 3.0, -6.0))?;
    scene.add_script(
        camera,
        CameraController {
            target: player.entity(),
            offset: Vector3::new(0.0, 3.0, -6.0),
        },
    )?;

    scene.initialize();
    for _ in 0..3 {
        scene.update(1.0 / 60.0);
    }
    scene.terminate();

    Ok(())
}
