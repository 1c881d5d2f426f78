use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use heck::ToUpperCamelCase;
use indexmap::IndexMap;

use crate::deserializer::SchemaDef;
use crate::parser::{ProtoClass, ProtoField};

/// Ordered naming-scope chain, e.g. `["Pet", "owner"]` while visiting the
/// `owner` property of `Pet`. A chain is never mutated; `child` derives an
/// extended copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Names {
    chain: Vec<String>,
}

impl Names {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn root(name: impl Into<String>) -> Self {
        Self {
            chain: vec![name.into()],
        }
    }

    pub fn child(&self, key: &str) -> Self {
        let mut chain = self.chain.clone();
        chain.push(key.to_string());
        Self { chain }
    }

    pub fn segments(&self) -> &[String] {
        &self.chain
    }
}

/// Derives a candidate entity name from a scope chain. Swapping the strategy
/// changes the naming convention without touching the generator.
pub trait JoinStrategy {
    fn join(&self, names: &Names) -> String;
}

/// Concatenates UpperCamelCase segments: `["Pet", "owner"]` -> `PetOwner`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelConcatJoin;

impl JoinStrategy for CamelConcatJoin {
    fn join(&self, names: &Names) -> String {
        names
            .segments()
            .iter()
            .map(|segment| segment.to_upper_camel_case())
            .collect()
    }
}

/// Joins UpperCamelCase segments with a delimiter: `["Pet", "owner"]` ->
/// `Pet_Owner` for `'_'`.
#[derive(Debug, Clone)]
pub struct DelimiterJoin {
    pub delimiter: char,
}

impl JoinStrategy for DelimiterJoin {
    fn join(&self, names: &Names) -> String {
        names
            .segments()
            .iter()
            .map(|segment| segment.to_upper_camel_case())
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string())
    }
}

/// Dedup and cycle-breaking store keyed by resolved entity name. Exactly one
/// instance lives per top-level generation pass; every descendant context
/// holds a handle to it. Entries keep registration order.
#[derive(Debug, Clone, Default)]
pub struct KnownObjects {
    entries: IndexMap<String, ProtoClass>,
}

impl KnownObjects {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registers a placeholder entry. Idempotent: an already-registered name
    /// keeps its existing entry.
    pub fn register(&mut self, name: &str) {
        if !self.entries.contains_key(name) {
            self.entries.insert(
                name.to_string(),
                ProtoClass {
                    name: name.to_string(),
                    fields: Vec::new(),
                },
            );
        }
    }

    /// Completes a placeholder with the walked field list.
    pub fn fill(&mut self, name: &str, fields: Vec<ProtoField>) {
        if let Some(class) = self.entries.get_mut(name) {
            class.fields = fields;
        }
    }

    pub fn classes(&self) -> &IndexMap<String, ProtoClass> {
        &self.entries
    }

    pub fn into_classes(self) -> IndexMap<String, ProtoClass> {
        self.entries
    }
}

/// Scoped state threaded through the schema walk: the resolvable schema map,
/// the current naming chain, the join strategy, the active serialization
/// groups, and the shared Known-Objects registry. `with_names` derives child
/// contexts; registering entities is the only mutation in the pipeline.
pub struct BuildContext<'s> {
    schema: &'s IndexMap<String, SchemaDef>,
    names: Names,
    join_strategy: Rc<dyn JoinStrategy>,
    serialization_groups: Rc<BTreeSet<String>>,
    known_objects: Rc<RefCell<KnownObjects>>,
}

impl<'s> BuildContext<'s> {
    pub fn new(
        schema: &'s IndexMap<String, SchemaDef>,
        names: Names,
        join_strategy: Rc<dyn JoinStrategy>,
    ) -> Self {
        Self {
            schema,
            names,
            join_strategy,
            serialization_groups: Rc::new(BTreeSet::new()),
            known_objects: Rc::new(RefCell::new(KnownObjects::default())),
        }
    }

    /// Installs the active serialization groups for this pass.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = String>) -> Self {
        self.serialization_groups = Rc::new(groups.into_iter().collect());
        self
    }

    /// Derives a child context with a new naming chain. The schema, the join
    /// strategy, the group set, and the registry handle are shared with the
    /// receiver.
    pub fn with_names(&self, names: Names) -> Self {
        Self {
            schema: self.schema,
            names,
            join_strategy: Rc::clone(&self.join_strategy),
            serialization_groups: Rc::clone(&self.serialization_groups),
            known_objects: Rc::clone(&self.known_objects),
        }
    }

    pub fn schema(&self) -> &'s IndexMap<String, SchemaDef> {
        self.schema
    }

    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn join_strategy(&self) -> &dyn JoinStrategy {
        self.join_strategy.as_ref()
    }

    pub fn serialization_groups(&self) -> &BTreeSet<String> {
        &self.serialization_groups
    }

    /// Candidate entity name for the current chain.
    pub fn joined_name(&self) -> String {
        self.join_strategy.join(&self.names)
    }

    /// A tagged property is kept only when the active set is empty or
    /// intersects its tags; an untagged property is always kept.
    pub fn property_included(&self, tags: &[String]) -> bool {
        if self.serialization_groups.is_empty() || tags.is_empty() {
            return true;
        }
        tags.iter().any(|tag| self.serialization_groups.contains(tag))
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known_objects.borrow().contains(name)
    }

    pub fn register(&self, name: &str) {
        self.known_objects.borrow_mut().register(name);
    }

    pub fn fill(&self, name: &str, fields: Vec<ProtoField>) {
        self.known_objects.borrow_mut().fill(name, fields);
    }

    /// Consumes the pass and yields the registry contents in registration
    /// order.
    pub fn into_classes(self) -> IndexMap<String, ProtoClass> {
        let Self { known_objects, .. } = self;
        match Rc::try_unwrap(known_objects) {
            Ok(cell) => cell.into_inner().into_classes(),
            Err(shared) => shared.borrow().clone().into_classes(),
        }
    }
}
