use indexmap::IndexMap;
use proc_macro2::TokenStream;
use quote::quote;

use super::{field_ident, type_ident};
use crate::error::RenderError;
use crate::parser::{Primitive, ProtoClass, ProtoMap, ProtoType};

pub fn generate_code(protos: &ProtoMap) -> Result<IndexMap<String, String>, RenderError> {
    protos
        .values()
        .map(|class| Ok((class.name.clone(), generate_entity(class)?)))
        .collect()
}

fn generate_entity(class: &ProtoClass) -> Result<String, RenderError> {
    let identifier = type_ident(&class.name)?;
    let mut fields = Vec::with_capacity(class.fields.len());
    for field in &class.fields {
        let field_name = field_ident(&field.name)?;
        let rename = &field.name;
        let field_type = expand_field_type(&field.field_type, &class.name)?;
        fields.push(if field.required {
            quote! {
                #[serde(rename = #rename)]
                pub #field_name: #field_type
            }
        } else {
            quote! {
                #[serde(rename = #rename)]
                pub #field_name: Option<#field_type>
            }
        });
    }
    let code = quote! {
        #[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
        pub struct #identifier {
            #(#fields),*
        }
    };
    Ok(code.to_string())
}

/// Expands a type descriptor to source tokens; a reference back to the
/// enclosing entity is boxed to keep the type finite.
fn expand_field_type(field_type: &ProtoType, enclosing: &str) -> Result<TokenStream, RenderError> {
    Ok(match field_type {
        ProtoType::Entity(name) => {
            let identifier = type_ident(name)?;
            if name == enclosing {
                quote! { Box<#identifier> }
            } else {
                quote! { #identifier }
            }
        }
        ProtoType::Array(Some(item)) => {
            let item = expand_field_type(item, enclosing)?;
            quote! { Vec<#item> }
        }
        ProtoType::Array(None) => quote! { Vec<serde_json::Value> },
        ProtoType::Simple(primitive) => match primitive {
            Primitive::String => quote! { String },
            Primitive::Int => quote! { i32 },
            Primitive::Long => quote! { i64 },
            Primitive::Float => quote! { f32 },
            Primitive::Double => quote! { f64 },
            Primitive::Bool => quote! { bool },
            Primitive::Uuid => quote! { uuid::Uuid },
            Primitive::Bytes => quote! { Vec<u8> },
        },
    })
}
