//! Connection commands.

use super::Session;
use xrmlink_core::{ConnectionSettings, Credential};

/// Saves a connection, replacing the one with the same name if any.
pub fn add(
    session: &Session,
    name: String,
    url: String,
    domain: Option<String>,
    user: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let existing = session.store.connection_by_name(&name).map(|c| c.id());

    let mut settings = ConnectionSettings::new(name, url).user(user, Credential::new(password));
    if let Some(domain) = domain {
        settings = settings.domain(domain);
    }

    let id = session
        .store
        .save_connection(existing, settings, session.connector.as_ref())?;
    session.save()?;

    if let Some(connection) = session.store.connection(id) {
        println!("Saved {connection}");
        println!("  {} entities available", connection.entities().len());
    }
    Ok(())
}

/// Lists saved connections.
pub fn list(session: &Session) {
    let connections = session.store.connections();
    if connections.is_empty() {
        println!("No connections");
        return;
    }
    for connection in connections {
        let definitions = session.store.definitions_for(connection.id()).len();
        println!("{connection}");
        println!("  id:          {}", connection.id());
        println!("  entities:    {}", connection.entities().len());
        println!("  definitions: {definitions}");
    }
}
