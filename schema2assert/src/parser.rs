use std::rc::Rc;

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::context::{BuildContext, CamelConcatJoin, JoinStrategy, Names};
use crate::deserializer::{
    DirectionSchemas, Format, PropertySchema, Schema, SchemaDef, SchemaDocument, SchemaRef,
};
use crate::error::GenerateError;
use crate::target::Target;

/// Primitive type of a generated field.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Primitive {
    Int,
    Long,
    Float,
    Double,
    String,
    Bool,
    Uuid,
    Bytes,
}

/// Type descriptor for a generated field. `Entity` references a sibling
/// entity of the same model by name instead of inlining its definition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProtoType {
    Simple(Primitive),
    Entity(String),
    Array(Option<Box<ProtoType>>),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProtoField {
    pub name: String,
    pub field_type: ProtoType,
    pub required: bool,
}

/// The intermediate representation of one generated entity; consumed
/// read-only by both renderers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProtoClass {
    pub name: String,
    pub fields: Vec<ProtoField>,
}

/// Entity name -> intermediate class, in registration order.
pub type ProtoMap = IndexMap<String, ProtoClass>;

/// Payload of a generation pass: one model, or one model per direction label.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Generation {
    Single(ProtoMap),
    PerDirection(IndexMap<String, ProtoMap>),
}

/// Walks `tree` under the default naming strategy.
pub fn generate(
    tree: &Value,
    target: Target,
    object_name: Option<&str>,
) -> Result<Generation, GenerateError> {
    generate_with_strategy(tree, target, object_name, Rc::new(CamelConcatJoin))
}

/// Walks `tree` under a caller-provided Name-Join Strategy.
pub fn generate_with_strategy(
    tree: &Value,
    target: Target,
    object_name: Option<&str>,
    join_strategy: Rc<dyn JoinStrategy>,
) -> Result<Generation, GenerateError> {
    match target {
        Target::Full => {
            let doc = parse_document(tree)?;
            let ctx = BuildContext::new(doc.schemas(), Names::empty(), join_strategy);
            run_pass(&ctx, None)?;
            Ok(Generation::Single(ctx.into_classes()))
        }
        Target::Object => {
            let name = object_name
                .filter(|name| !name.is_empty())
                .ok_or(GenerateError::MissingObjectName)?;
            let doc = parse_document(tree)?;
            if !doc.schemas().contains_key(name) {
                return Err(GenerateError::ObjectNotFound(name.to_string()));
            }
            let ctx = BuildContext::new(doc.schemas(), Names::empty(), join_strategy);
            run_pass(&ctx, Some(name))?;
            Ok(Generation::Single(ctx.into_classes()))
        }
        Target::Http => {
            let directions: DirectionSchemas = serde_yaml::from_value(tree.clone())
                .map_err(|e| GenerateError::InvalidDocument(e.to_string()))?;
            let mut result = IndexMap::new();
            for (direction, schemas) in &directions {
                // Directions share no registry state: same-named entities may
                // have different shapes per direction.
                let ctx = BuildContext::new(schemas, Names::empty(), Rc::clone(&join_strategy))
                    .with_groups([direction.clone()]);
                run_pass(&ctx, None)?;
                result.insert(direction.clone(), ctx.into_classes());
            }
            Ok(Generation::PerDirection(result))
        }
    }
}

fn parse_document(tree: &Value) -> Result<SchemaDocument, GenerateError> {
    serde_yaml::from_value(tree.clone()).map_err(|e| GenerateError::InvalidDocument(e.to_string()))
}

fn run_pass(ctx: &BuildContext, only: Option<&str>) -> Result<(), GenerateError> {
    for (raw_name, def) in ctx.schema() {
        if only.is_some_and(|only| only != raw_name.as_str()) {
            continue;
        }
        build_definition(ctx, raw_name, def)?;
    }
    Ok(())
}

/// Builds one top-level definition. Non-object definitions never become
/// entities of their own; they are resolved where they are referenced.
fn build_definition(
    ctx: &BuildContext,
    raw_name: &str,
    def: &SchemaDef,
) -> Result<(), GenerateError> {
    let scoped = ctx.with_names(Names::root(raw_name));
    match def {
        SchemaDef::Object {
            properties,
            required,
            ..
        } => {
            build_object(&scoped, properties.as_ref(), required)?;
        }
        SchemaDef::AllOf { all_of, .. } => {
            build_all_of(&scoped, all_of)?;
        }
        _ => log::debug!("skipping non-object definition '{}'", raw_name),
    }
    Ok(())
}

/// Builds the entity for the current chain. The candidate name is registered
/// before the properties are walked so that cyclic and repeated references
/// resolve against the in-progress entry instead of recursing.
fn build_object(
    ctx: &BuildContext,
    properties: Option<&IndexMap<String, PropertySchema>>,
    required: &[String],
) -> Result<String, GenerateError> {
    let name = ctx.joined_name();
    if ctx.is_known(&name) {
        log::debug!("reusing known object '{}'", name);
        return Ok(name);
    }
    ctx.register(&name);
    let fields = match properties {
        Some(properties) => build_fields(ctx, properties, required)?,
        None => Vec::new(),
    };
    ctx.fill(&name, fields);
    Ok(name)
}

/// Flattens an `allOf` definition into a single entity: the object parts'
/// properties and required sets merge in part order.
fn build_all_of(ctx: &BuildContext, parts: &[Schema]) -> Result<String, GenerateError> {
    let name = ctx.joined_name();
    if ctx.is_known(&name) {
        return Ok(name);
    }
    ctx.register(&name);
    let mut properties = IndexMap::new();
    let mut required = Vec::new();
    let mut visited = Vec::new();
    collect_parts(ctx, parts, &mut properties, &mut required, &mut visited)?;
    let fields = build_fields(ctx, &properties, &required)?;
    ctx.fill(&name, fields);
    Ok(name)
}

fn collect_parts(
    ctx: &BuildContext,
    parts: &[Schema],
    properties: &mut IndexMap<String, PropertySchema>,
    required: &mut Vec<String>,
    visited: &mut Vec<String>,
) -> Result<(), GenerateError> {
    for part in parts {
        let def = match part {
            Schema::Ref(schema_ref) => {
                let raw = schema_ref.schema_name();
                // A part chain may refer back to itself; each named part is
                // expanded at most once.
                if visited.iter().any(|seen| seen == raw) {
                    continue;
                }
                visited.push(raw.to_string());
                ctx.schema()
                    .get(raw)
                    .ok_or_else(|| GenerateError::UnknownReference(raw.to_string()))?
            }
            Schema::Def(def) => def,
        };
        match def {
            SchemaDef::Object {
                properties: part_properties,
                required: part_required,
                ..
            } => {
                if let Some(part_properties) = part_properties {
                    for (key, prop) in part_properties {
                        properties.insert(key.clone(), prop.clone());
                    }
                }
                for key in part_required {
                    if !required.contains(key) {
                        required.push(key.clone());
                    }
                }
            }
            SchemaDef::AllOf { all_of, .. } => {
                collect_parts(ctx, all_of, properties, required, visited)?
            }
            _ => return Err(GenerateError::UnsupportedShape(ctx.joined_name())),
        }
    }
    Ok(())
}

fn build_fields(
    ctx: &BuildContext,
    properties: &IndexMap<String, PropertySchema>,
    required: &[String],
) -> Result<Vec<ProtoField>, GenerateError> {
    let mut fields = Vec::with_capacity(properties.len());
    for (key, prop) in properties {
        if !ctx.property_included(&prop.groups) {
            log::debug!("property '{}' filtered out by serialization groups", key);
            continue;
        }
        let child = ctx.with_names(ctx.names().child(key));
        let field_type = resolve_schema(&child, &prop.schema)?;
        fields.push(ProtoField {
            name: key.clone(),
            field_type,
            required: required.iter().any(|r| r == key),
        });
    }
    Ok(fields)
}

/// Resolves a property schema to its type descriptor, generating nested and
/// referenced entities along the way.
fn resolve_schema(ctx: &BuildContext, schema: &Schema) -> Result<ProtoType, GenerateError> {
    match schema {
        Schema::Ref(schema_ref) => resolve_ref(ctx, schema_ref),
        Schema::Def(def) => resolve_def(ctx, def),
    }
}

/// A reference is generated under its own top-level name, not under the
/// referencing chain; a reference to a primitive definition resolves to that
/// primitive instead of an entity.
fn resolve_ref(ctx: &BuildContext, schema_ref: &SchemaRef) -> Result<ProtoType, GenerateError> {
    let raw = schema_ref.schema_name();
    let def = ctx
        .schema()
        .get(raw)
        .ok_or_else(|| GenerateError::UnknownReference(raw.to_string()))?;
    let scoped = ctx.with_names(Names::root(raw));
    resolve_def(&scoped, def)
}

fn resolve_def(ctx: &BuildContext, def: &SchemaDef) -> Result<ProtoType, GenerateError> {
    match def {
        SchemaDef::Object {
            properties,
            required,
            ..
        } => {
            let name = build_object(ctx, properties.as_ref(), required)?;
            Ok(ProtoType::Entity(name))
        }
        SchemaDef::AllOf { all_of, .. } => {
            let name = build_all_of(ctx, all_of)?;
            Ok(ProtoType::Entity(name))
        }
        SchemaDef::String { format, .. } => Ok(ProtoType::Simple(match format {
            Some(Format::Uuid) => Primitive::Uuid,
            Some(Format::Byte) | Some(Format::Binary) => Primitive::Bytes,
            _ => Primitive::String,
        })),
        SchemaDef::Integer { format, .. } => Ok(ProtoType::Simple(match format {
            Some(Format::Int64) => Primitive::Long,
            _ => Primitive::Int,
        })),
        SchemaDef::Number { format, .. } => Ok(ProtoType::Simple(match format {
            Some(Format::Double) => Primitive::Double,
            _ => Primitive::Float,
        })),
        SchemaDef::Boolean { .. } => Ok(ProtoType::Simple(Primitive::Bool)),
        SchemaDef::Array { items, .. } => match items {
            Some(items) => Ok(ProtoType::Array(Some(Box::new(resolve_schema(
                ctx, items,
            )?)))),
            None => Ok(ProtoType::Array(None)),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn yaml(content: &str) -> Value {
        serde_yaml::from_str(content).unwrap()
    }

    fn single(generation: Generation) -> ProtoMap {
        match generation {
            Generation::Single(map) => map,
            Generation::PerDirection(_) => panic!("Expected a single model"),
        }
    }

    #[test]
    fn test_generate_full_petstore() {
        let tree = yaml(include_str!("../resources/petstore.yaml"));
        let protos = single(generate(&tree, Target::Full, None).unwrap());

        assert_eq!(
            protos.keys().collect::<Vec<_>>(),
            vec!["Pet", "Person", "PetAttributes", "Order", "AuditBase"]
        );

        let pet = &protos["Pet"];
        assert_eq!(
            pet.fields
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>(),
            vec!["name", "tag", "owner", "attributes", "photoUrls"]
        );
        assert_eq!(pet.fields[0].field_type, ProtoType::Simple(Primitive::String));
        assert!(pet.fields[0].required);
        assert_eq!(pet.fields[2].field_type, ProtoType::Entity("Person".to_string()));
        assert!(!pet.fields[2].required);
        assert_eq!(
            pet.fields[3].field_type,
            ProtoType::Entity("PetAttributes".to_string())
        );
        assert_eq!(
            pet.fields[4].field_type,
            ProtoType::Array(Some(Box::new(ProtoType::Simple(Primitive::String))))
        );

        // The self-referential Person terminates with a reference descriptor.
        let person = &protos["Person"];
        assert_eq!(
            person.fields[1].field_type,
            ProtoType::Entity("Person".to_string())
        );

        // allOf flattens the referenced base's properties before its own.
        let order = &protos["Order"];
        assert_eq!(
            order
                .fields
                .iter()
                .map(|f| (f.name.as_str(), f.required))
                .collect::<Vec<_>>(),
            vec![("createdAt", true), ("pet", true)]
        );
    }

    #[test]
    fn test_referenced_entity_generated_once() {
        let tree = yaml(
            r#"
            Pet:
              type: object
              properties:
                owner:
                  $ref: '#/definitions/Person'
                sitter:
                  $ref: '#/definitions/Person'
            Person:
              type: object
              properties:
                name:
                  type: string
        "#,
        );
        let protos = single(generate(&tree, Target::Full, None).unwrap());
        assert_eq!(protos.keys().filter(|k| *k == "Person").count(), 1);
        assert_eq!(protos["Pet"].fields.len(), 2);
    }

    #[test]
    fn test_repeated_joined_name_deduplicates() {
        // Both paths join to "PetMeta"; one intermediate entry results.
        let tree = yaml(
            r#"
            Pet:
              type: object
              properties:
                meta:
                  type: object
                  properties:
                    note:
                      type: string
            PetMeta:
              type: object
              properties:
                note:
                  type: string
        "#,
        );
        let protos = single(generate(&tree, Target::Full, None).unwrap());
        assert_eq!(protos.keys().collect::<Vec<_>>(), vec!["Pet", "PetMeta"]);
    }

    #[test]
    fn test_object_target_yields_closure_only() {
        let tree = yaml(include_str!("../resources/petstore.yaml"));
        let protos = single(generate(&tree, Target::Object, Some("Order")).unwrap());
        assert_eq!(
            protos.keys().collect::<Vec<_>>(),
            vec!["Order", "Pet", "Person", "PetAttributes"]
        );
    }

    #[test]
    fn test_object_target_requires_name() {
        let tree = yaml("Pet: {type: object}");
        assert_eq!(
            generate(&tree, Target::Object, None).unwrap_err(),
            GenerateError::MissingObjectName
        );
        assert_eq!(
            generate(&tree, Target::Object, Some("")).unwrap_err(),
            GenerateError::MissingObjectName
        );
    }

    #[test]
    fn test_object_target_unknown_name() {
        let tree = yaml("Pet: {type: object}");
        assert_eq!(
            generate(&tree, Target::Object, Some("Ghost")).unwrap_err(),
            GenerateError::ObjectNotFound("Ghost".to_string())
        );
    }

    #[test]
    fn test_unknown_reference_fails() {
        let tree = yaml(
            r#"
            Pet:
              type: object
              properties:
                owner:
                  $ref: '#/definitions/Ghost'
        "#,
        );
        assert_eq!(
            generate(&tree, Target::Full, None).unwrap_err(),
            GenerateError::UnknownReference("Ghost".to_string())
        );
    }

    #[test]
    fn test_http_directions_are_independent() {
        let tree = yaml(
            r#"
            request:
              Login:
                type: object
                properties:
                  password:
                    type: string
                required:
                  - password
            response:
              Login:
                type: object
                properties:
                  token:
                    type: string
        "#,
        );
        let Generation::PerDirection(directions) =
            generate(&tree, Target::Http, None).unwrap()
        else {
            panic!("Expected per-direction models");
        };
        assert_eq!(
            directions.keys().collect::<Vec<_>>(),
            vec!["request", "response"]
        );
        assert_eq!(directions["request"]["Login"].fields[0].name, "password");
        assert_eq!(directions["response"]["Login"].fields[0].name, "token");
    }

    #[test]
    fn test_http_direction_activates_groups() {
        let tree = yaml(
            r#"
            request:
              Account:
                type: object
                properties:
                  password:
                    type: string
                    x-groups: [request]
                  id:
                    type: string
                  secret:
                    type: string
                    x-groups: [internal]
        "#,
        );
        let Generation::PerDirection(directions) =
            generate(&tree, Target::Http, None).unwrap()
        else {
            panic!("Expected per-direction models");
        };
        assert_eq!(
            directions["request"]["Account"]
                .fields
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>(),
            vec!["password", "id"]
        );
    }

    #[test]
    fn test_groups_are_inactive_outside_http() {
        let tree = yaml(
            r#"
            Account:
              type: object
              properties:
                password:
                  type: string
                  x-groups: [request]
        "#,
        );
        let protos = single(generate(&tree, Target::Full, None).unwrap());
        assert_eq!(protos["Account"].fields.len(), 1);
    }

    #[test]
    fn test_all_of_self_reference_terminates() {
        let tree = yaml(
            r#"
            Node:
              allOf:
                - $ref: '#/definitions/Node'
                - type: object
                  properties:
                    label:
                      type: string
        "#,
        );
        let protos = single(generate(&tree, Target::Full, None).unwrap());
        assert_eq!(
            protos["Node"]
                .fields
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>(),
            vec!["label"]
        );
    }

    #[test]
    fn test_primitive_alias_reference() {
        let tree = yaml(
            r#"
            Pet:
              type: object
              properties:
                id:
                  $ref: '#/definitions/PetId'
            PetId:
              type: string
              format: uuid
        "#,
        );
        let protos = single(generate(&tree, Target::Full, None).unwrap());
        assert_eq!(
            protos["Pet"].fields[0].field_type,
            ProtoType::Simple(Primitive::Uuid)
        );
        assert_eq!(protos.keys().collect::<Vec<_>>(), vec!["Pet"]);
    }

    #[test]
    fn test_custom_join_strategy() {
        let tree = yaml(
            r#"
            Pet:
              type: object
              properties:
                meta:
                  type: object
                  properties:
                    note:
                      type: string
        "#,
        );
        let generation = generate_with_strategy(
            &tree,
            Target::Full,
            None,
            Rc::new(crate::context::DelimiterJoin { delimiter: '_' }),
        )
        .unwrap();
        let protos = single(generation);
        assert_eq!(protos.keys().collect::<Vec<_>>(), vec!["Pet", "Pet_Meta"]);
    }

    #[test]
    fn test_invalid_document_fails() {
        let tree = yaml("[1, 2, 3]");
        assert!(matches!(
            generate(&tree, Target::Full, None).unwrap_err(),
            GenerateError::InvalidDocument(_)
        ));
    }
}
