//! Entities command implementation.

use super::Session;

/// Refreshes a connection's entity list and prints the choices.
pub fn run(session: &Session, connection: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id = session.connection(connection)?.id();
    let refreshed = session
        .store
        .refresh_entity_list(id, session.connector.as_ref());
    // The cleared list is persisted even when the fetch fails.
    session.save()?;
    refreshed?;

    let connection = session.connection(connection)?;
    for choice in connection.entity_choices() {
        println!("{choice}");
    }
    Ok(())
}
