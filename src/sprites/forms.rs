//! Form name enumeration from the pokesprite form database.

use serde_json::Value;

use super::error::SpriteError;

/// Form key for a pokemon's default form.
const DEFAULT_FORM: &str = "$";

/// Parse `pokemon.json` bytes and list every form name.
pub fn parse_forms(database: &[u8]) -> Result<Vec<String>, SpriteError> {
    let value: Value = serde_json::from_slice(database)?;
    Ok(pokemon_forms(&value))
}

/// List every gen-8 form name in database order.
///
/// The default form (`$`) is named by the pokemon's english slug, every
/// other form by `<slug>-<form>`. Aliases of other forms are skipped, as
/// are entries missing the slug or the form table.
pub fn pokemon_forms(database: &Value) -> Vec<String> {
    let Some(entries) = database.as_object() else {
        log::warn!("Form database is not a JSON object");
        return Vec::new();
    };

    let mut forms = Vec::new();
    for (key, pokemon) in entries {
        let slug = pokemon.pointer("/slug/eng").and_then(Value::as_str);
        let form_table = pokemon.pointer("/gen-8/forms").and_then(Value::as_object);
        let (Some(slug), Some(form_table)) = (slug, form_table) else {
            log::warn!("Skipping form database entry '{}': missing slug or gen-8 forms", key);
            continue;
        };

        for (form_name, form_info) in form_table {
            if form_info.get("is_alias_of").is_some() {
                continue;
            }
            if form_name == DEFAULT_FORM {
                forms.push(slug.to_string());
            } else {
                forms.push(format!("{}-{}", slug, form_name));
            }
        }
    }

    forms
}
