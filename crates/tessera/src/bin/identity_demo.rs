//! # Identity Demo
//!
//! Entities are never equal to each other, and a recycled slot comes back
//! with a new version so old handles stay dead.

use tessera::core::Registry;
use tessera::demo;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demo::init_tracing();
    let config = demo::config_from_args()?;
    let mut registry = Registry::with_config(&config);

    let first = registry.create_entity();
    let second = registry.create_entity();
    println!("first  = {first}");
    println!("second = {second}");
    println!("first == second: {}", first == second);

    registry.destroy_entity(first);
    let recycled = registry.create_entity();
    println!();
    println!("destroyed {first}, next entity is {recycled}");
    println!("{first} valid: {}", registry.is_valid(first));
    println!("{recycled} valid: {}", registry.is_valid(recycled));

    Ok(())
}
