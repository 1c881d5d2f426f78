use indexmap::IndexMap;
use monostate::MustBe;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub schema_path: String,
}

impl SchemaRef {
    pub fn schema_name(&self) -> &str {
        self.schema_path
            .split('/')
            .last()
            .expect("Incorrect Ref Path")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Format {
    Int32,
    Int64,
    Float,
    Double,
    Byte,
    Binary,
    Date,
    Uuid,
    #[serde(rename = "date-time")]
    DateTime,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
#[serde(untagged)]
pub enum SchemaDef {
    Object {
        title: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("object"),
        properties: Option<IndexMap<String, PropertySchema>>,
        #[serde(default)]
        required: Vec<String>,
    },
    String {
        #[serde(rename = "type")]
        schema_type: MustBe!("string"),
        format: Option<Format>,
    },
    Integer {
        #[serde(rename = "type")]
        schema_type: MustBe!("integer"),
        format: Option<Format>,
    },
    Number {
        #[serde(rename = "type")]
        schema_type: MustBe!("number"),
        format: Option<Format>,
    },
    Boolean {
        #[serde(rename = "type")]
        schema_type: MustBe!("boolean"),
    },
    Array {
        #[serde(rename = "type")]
        schema_type: MustBe!("array"),
        items: Option<Box<Schema>>,
    },
    AllOf {
        title: Option<String>,
        #[serde(rename = "allOf")]
        all_of: Vec<Schema>,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
/// A Schema can either be a $ref to another Schema or a Definition of a Schema.
pub enum Schema {
    Ref(SchemaRef),
    Def(SchemaDef),
}

/// A property slot of an object definition: the property's schema plus its
/// serialization-group tags (`x-groups` vendor extension). An untagged
/// property belongs to every group.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PropertySchema {
    #[serde(default, rename = "x-groups", skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(flatten)]
    pub schema: Schema,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Components {
    pub schemas: IndexMap<String, SchemaDef>,
}

/// Document shapes accepted by the `full` and `object` targets: OpenAPI v3
/// (`components.schemas`), Swagger v2 (`definitions`), or a bare
/// name-to-schema mapping.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SchemaDocument {
    V3 { components: Components },
    V2 { definitions: IndexMap<String, SchemaDef> },
    Bare(IndexMap<String, SchemaDef>),
}

impl SchemaDocument {
    pub fn schemas(&self) -> &IndexMap<String, SchemaDef> {
        match self {
            SchemaDocument::V3 { components } => &components.schemas,
            SchemaDocument::V2 { definitions } => definitions,
            SchemaDocument::Bare(schemas) => schemas,
        }
    }
}

/// Direction label -> entity map, the document shape expected by the `http`
/// target. Each direction is generated as an independent pass.
pub type DirectionSchemas = IndexMap<String, IndexMap<String, SchemaDef>>;
