//! Define command implementation.

use super::Session;
use xrmlink_core::SchemaSynchronizer;

/// Creates a definition for an entity choice.
pub fn run(
    session: &Session,
    connection: &str,
    entity: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let connection = session.connection(connection)?;
    let synchronizer = SchemaSynchronizer::new(session.store.clone(), session.connector.clone());
    let id = synchronizer.save_definition(connection.id(), entity)?;
    session.save()?;

    if let Some(definition) = session.store.definition(id) {
        println!(
            "Defined {} ({}) with {} fields",
            definition.display_name(),
            definition.entity_name(),
            definition.catalog().len()
        );
        println!("  id: {id}");
    }
    Ok(())
}
