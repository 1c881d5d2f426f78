use indexmap::IndexMap;

use super::type_ident;
use crate::error::RenderError;
use crate::parser::{Primitive, ProtoClass, ProtoMap, ProtoType};

pub fn generate_code(protos: &ProtoMap) -> Result<IndexMap<String, String>, RenderError> {
    protos
        .values()
        .map(|class| Ok((class.name.clone(), generate_entity(class)?)))
        .collect()
}

/// One constraint line per property, in class-renderer order:
/// `<key>: required|optional, type=<primitive>` or `instance=<Entity>`.
fn generate_entity(class: &ProtoClass) -> Result<String, RenderError> {
    let mut lines = Vec::with_capacity(class.fields.len());
    for field in &class.fields {
        let presence = if field.required { "required" } else { "optional" };
        lines.push(format!(
            "{}: {}, {}",
            field.name,
            presence,
            constraint(&field.field_type)?
        ));
    }
    Ok(lines.join("\n"))
}

fn constraint(field_type: &ProtoType) -> Result<String, RenderError> {
    Ok(match field_type {
        ProtoType::Entity(name) => {
            type_ident(name)?;
            format!("instance={}", name)
        }
        ProtoType::Array(_) => format!("type={}", bare(field_type)?),
        ProtoType::Simple(primitive) => format!("type={}", primitive_name(*primitive)),
    })
}

fn bare(field_type: &ProtoType) -> Result<String, RenderError> {
    Ok(match field_type {
        ProtoType::Entity(name) => {
            type_ident(name)?;
            name.clone()
        }
        ProtoType::Array(Some(item)) => format!("array<{}>", bare(item)?),
        ProtoType::Array(None) => "array".to_string(),
        ProtoType::Simple(primitive) => primitive_name(*primitive).to_string(),
    })
}

fn primitive_name(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::String => "string",
        Primitive::Int => "int",
        Primitive::Long => "long",
        Primitive::Float => "float",
        Primitive::Double => "double",
        Primitive::Bool => "bool",
        Primitive::Uuid => "uuid",
        Primitive::Bytes => "bytes",
    }
}
