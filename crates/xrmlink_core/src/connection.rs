//! Connections to a remote organization service.

use crate::ids::ConnectionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use xrmlink_service::EntitySummary;
use zeroize::Zeroizing;

/// A secret used to authenticate a connection.
///
/// Zeroized on drop. Never printed, logged or written to a snapshot.
#[derive(Clone)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Wraps a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Returns the secret.
    ///
    /// Only hand this to the transport.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no secret is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        *self.0 == *other.0
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Operator-edited connection fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Connection name. Unique across connections.
    pub name: String,
    /// Organization service URL.
    pub url: String,
    /// Authentication domain, if any.
    pub domain: Option<String>,
    /// User name.
    pub user: String,
    /// Secret.
    pub credential: Credential,
}

impl ConnectionSettings {
    /// Creates settings with a name and URL.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the user and secret.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>, credential: Credential) -> Self {
        self.user = user.into();
        self.credential = credential;
        self
    }
}

/// A saved connection and its cached list of remote entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    id: ConnectionId,
    name: String,
    url: String,
    #[serde(default)]
    domain: Option<String>,
    user: String,
    #[serde(skip)]
    credential: Credential,
    #[serde(default)]
    entities: Vec<EntitySummary>,
}

impl Connection {
    /// Creates a connection with an empty entity list.
    pub fn new(id: ConnectionId, settings: ConnectionSettings) -> Self {
        Self {
            id,
            name: settings.name,
            url: settings.url,
            domain: settings.domain,
            user: settings.user,
            credential: settings.credential,
            entities: Vec::new(),
        }
    }

    /// Connection ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Connection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Organization service URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Authentication domain.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// User name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Secret. Empty after loading from a snapshot.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Replaces the secret.
    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = credential;
    }

    /// Cached remote entity list.
    pub fn entities(&self) -> &[EntitySummary] {
        &self.entities
    }

    pub(crate) fn set_entities(&mut self, entities: Vec<EntitySummary>) {
        self.entities = entities;
    }

    /// The entity list as operator choices, `"Display Name (logical_name)"`.
    pub fn entity_choices(&self) -> Vec<String> {
        self.entities.iter().map(entity_choice).collect()
    }

    /// Finds the entity whose choice string matches exactly.
    pub fn resolve_choice(&self, choice: &str) -> Option<&EntitySummary> {
        self.entities.iter().find(|e| entity_choice(e) == choice)
    }

    /// Finds an entity by logical name.
    pub fn find_entity(&self, logical_name: &str) -> Option<&EntitySummary> {
        self.entities
            .iter()
            .find(|e| e.logical_name == logical_name)
    }
}

/// Formats one entity as an operator choice.
pub fn entity_choice(entity: &EntitySummary) -> String {
    format!("{} ({})", entity.label(), entity.logical_name)
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  ({} at {})",
            or_placeholder(&self.name, "(no name)"),
            or_placeholder(&self.user, "(no user)"),
            or_placeholder(&self.url, "(no url)")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> Connection {
        let settings = ConnectionSettings::new("Sales", "https://crm.example.com/Sales")
            .domain("CORP")
            .user("jdoe", Credential::new("hunter2"));
        let mut conn = Connection::new(ConnectionId::new(), settings);
        conn.set_entities(vec![
            EntitySummary::new("contact", Some("Contact".into())),
            EntitySummary::new("new_widget", None),
        ]);
        conn
    }

    #[test]
    fn credential_is_redacted() {
        let conn = connection();
        let debug = format!("{conn:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(conn.credential().expose(), "hunter2");
    }

    #[test]
    fn display_format() {
        let conn = connection();
        assert_eq!(conn.to_string(), "Sales  (jdoe at https://crm.example.com/Sales)");

        let blank = Connection::new(ConnectionId::new(), ConnectionSettings::default());
        assert_eq!(blank.to_string(), "(no name)  ((no user) at (no url))");
    }

    #[test]
    fn entity_choices() {
        let conn = connection();
        assert_eq!(
            conn.entity_choices(),
            vec!["Contact (contact)".to_string(), "new_widget (new_widget)".to_string()]
        );
        assert_eq!(
            conn.resolve_choice("Contact (contact)").map(|e| e.logical_name.as_str()),
            Some("contact")
        );
        assert!(conn.resolve_choice("contact").is_none());
        assert!(conn.find_entity("new_widget").is_some());
    }
}
