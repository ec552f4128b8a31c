//! Sync command implementation.

use super::Session;
use xrmlink_core::SchemaSynchronizer;

/// Regenerates one or every definition of a connection.
///
/// Every definition is attempted; the command fails if any of them did.
pub fn run(
    session: &Session,
    connection: &str,
    entity: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let definitions = match entity {
        Some(entity) => vec![session.definition(connection, entity)?],
        None => session
            .store
            .definitions_for(session.connection(connection)?.id()),
    };

    let synchronizer = SchemaSynchronizer::new(session.store.clone(), session.connector.clone());
    let mut failed = 0usize;
    for definition in &definitions {
        match synchronizer.regenerate(definition.id()) {
            Ok(()) => println!("✓ {}", definition.entity_name()),
            Err(e) => {
                failed += 1;
                println!("✗ {}: {e}", definition.entity_name());
            }
        }
    }
    session.save()?;

    if failed > 0 {
        return Err(format!("{failed} of {} definitions failed to sync", definitions.len()).into());
    }
    Ok(())
}
