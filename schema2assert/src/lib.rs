pub mod context;
pub mod deserializer;
pub mod error;
pub mod generator;
pub mod parser;
pub mod target;

pub use context::{BuildContext, CamelConcatJoin, DelimiterJoin, JoinStrategy, KnownObjects, Names};
pub use error::{GenerateError, RenderError};
pub use generator::{render_asserts, render_classes};
pub use parser::{
    generate, generate_with_strategy, Generation, Primitive, ProtoClass, ProtoField, ProtoMap,
    ProtoType,
};
pub use target::Target;
