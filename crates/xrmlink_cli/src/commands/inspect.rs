//! Inspect command implementation.

use super::Session;
use serde::Serialize;
use xrmlink_codec::FieldDescriptor;
use xrmlink_core::EntityDefinition;

/// One definition as printed by `inspect`.
#[derive(Debug, Serialize)]
pub struct DefinitionView {
    /// Definition id.
    pub id: String,
    /// Connection name.
    pub connection: String,
    /// Logical entity name.
    pub entity: String,
    /// Entity display name.
    pub display_name: String,
    /// Last synchronization, RFC 3339.
    pub synced_at: String,
    /// Number of catalog fields.
    pub field_count: usize,
    /// Catalog fields (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldView>>,
}

/// One catalog field.
#[derive(Debug, Serialize)]
pub struct FieldView {
    /// Logical name.
    pub name: String,
    /// Display name.
    pub display_name: String,
    /// Field type.
    pub field_type: String,
    /// Canonical value type.
    pub value_type: String,
    /// Required on create.
    pub required: bool,
    /// Writable on create and update.
    pub updatable: bool,
    /// Option labels of a choice field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl From<&FieldDescriptor> for FieldView {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name().to_string(),
            display_name: field.display_name().to_string(),
            field_type: field.field_type().to_string(),
            value_type: field.value_type().to_string(),
            required: field.required(),
            updatable: field.updatable(),
            options: field
                .option_set()
                .map(|o| o.labels().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

/// Runs the inspect command.
pub fn run(session: &Session, show_fields: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let views: Vec<DefinitionView> = session
        .store
        .definitions()
        .iter()
        .map(|d| view(session, d, show_fields))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No entity definitions");
        return Ok(());
    }
    for view in &views {
        print_text_output(view);
    }
    Ok(())
}

fn view(session: &Session, definition: &EntityDefinition, show_fields: bool) -> DefinitionView {
    let connection = session
        .store
        .connection(definition.connection_id())
        .map(|c| c.name().to_string())
        .unwrap_or_default();
    let catalog = definition.catalog();
    DefinitionView {
        id: definition.id().to_string(),
        connection,
        entity: definition.entity_name().to_string(),
        display_name: definition.display_name().to_string(),
        synced_at: definition.synced_at().to_rfc3339(),
        field_count: catalog.len(),
        fields: show_fields.then(|| catalog.fields().iter().map(FieldView::from).collect()),
    }
}

fn print_text_output(view: &DefinitionView) {
    println!("{} ({}) on {}", view.display_name, view.entity, view.connection);
    println!("  id:        {}", view.id);
    println!("  synced at: {}", view.synced_at);
    println!("  fields:    {}", view.field_count);

    if let Some(fields) = &view.fields {
        println!();
        println!(
            "  {:<24} {:<10} {:<10} {:>8} {:>9}",
            "Field", "Type", "Value", "Required", "Updatable"
        );
        println!("  {}", "-".repeat(65));
        for field in fields {
            println!(
                "  {:<24} {:<10} {:<10} {:>8} {:>9}",
                field.name, field.field_type, field.value_type, field.required, field.updatable
            );
            if !field.options.is_empty() {
                println!("    options: {}", field.options.join(", "));
            }
        }
    }
    println!();
}
