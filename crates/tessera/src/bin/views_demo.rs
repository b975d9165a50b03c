//! # Views Demo
//!
//! Ten entities with a `Data` component, walked through a view and read
//! back with random access.

use tessera::core::Registry;
use tessera::demo;

struct Data {
    value: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demo::init_tracing();
    let config = demo::config_from_args()?;
    let mut registry = Registry::with_config(&config);

    for value in 0..10 {
        let entity = registry.create_entity();
        registry.add_component(entity, Data { value })?;
    }

    let view = registry.create_view::<(Data,)>()?;
    let mut line = String::new();
    for entity in view.entities() {
        if let Some(data) = view.get::<Data>(entity) {
            line.push_str(&data.value.to_string());
        }
    }
    println!("{line}");

    let total: u32 = view.iter().map(|(_, (data,))| data.value).sum();
    tracing::info!("{} entities, sum {total}", view.len());

    Ok(())
}
