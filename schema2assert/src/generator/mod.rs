mod assert_gen;
mod class_gen;

use heck::ToSnakeCase;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use syn::Ident;

use crate::error::RenderError;
use crate::parser::ProtoMap;

/// Renders every entity of the model to a struct definition, keyed by entity
/// name, in model order.
pub fn render_classes(protos: &ProtoMap) -> Result<IndexMap<String, String>, RenderError> {
    class_gen::generate_code(protos)
}

/// Renders every entity of the model to its constraint block, keyed by entity
/// name, in model order.
pub fn render_asserts(protos: &ProtoMap) -> Result<IndexMap<String, String>, RenderError> {
    assert_gen::generate_code(protos)
}

lazy_static! {
    /// Keywords that collide with snake_cased property names; these render in
    /// raw-identifier form.
    static ref KEYWORDS: [&'static str; 47] = [
        "as", "async", "await", "box", "break", "const", "continue", "do", "dyn", "else", "enum",
        "extern", "false", "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro",
        "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return", "static",
        "struct", "trait", "true", "try", "type", "typeof", "unsafe", "use", "virtual", "where",
        "while", "yield", "abstract", "become", "unsized",
    ];
    /// Keywords with no raw form; these get a trailing underscore instead.
    static ref RAW_FORBIDDEN: [&'static str; 3] = ["crate", "self", "super"];
}

/// Validates an entity name as a type identifier.
pub(crate) fn type_ident(name: &str) -> Result<Ident, RenderError> {
    syn::parse_str(name).map_err(|_| RenderError::InvalidIdentifier(name.to_string()))
}

/// Turns a property key into a field identifier; the original key survives in
/// a serde rename attribute.
pub(crate) fn field_ident(name: &str) -> Result<Ident, RenderError> {
    let snake = name.to_snake_case();
    let candidate = if RAW_FORBIDDEN.contains(&snake.as_str()) {
        format!("{}_", snake)
    } else if KEYWORDS.contains(&snake.as_str()) {
        format!("r#{}", snake)
    } else {
        snake
    };
    syn::parse_str(&candidate).map_err(|_| RenderError::InvalidIdentifier(name.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_ident() {
        assert_eq!(field_ident("photoUrls").unwrap().to_string(), "photo_urls");
        assert_eq!(field_ident("type").unwrap().to_string(), "r#type");
        assert_eq!(field_ident("self").unwrap().to_string(), "self_");
    }

    #[test]
    fn test_invalid_identifier() {
        assert_eq!(
            type_ident("not a name").unwrap_err(),
            RenderError::InvalidIdentifier("not a name".to_string())
        );
        assert!(field_ident("").is_err());
    }
}
