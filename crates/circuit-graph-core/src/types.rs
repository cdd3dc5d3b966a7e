//! Node type registry with a pre-computed subtype relation.
//!
//! The engine never asks the host about types at query time: every registered
//! type stores the transitive set of its supertype ids, so `is_subtype_of` is
//! a single hash probe. Two types are built in, the lattice root `Node` and
//! `ModuleInterface`, the type the path finder searches between.

use std::collections::HashSet;
use std::fmt;

use crate::error::{GraphError, GraphResult};

/// Opaque handle to a registered node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(pub(crate) u32);

impl TypeTag {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// A registered node type: its name plus the transitive supertype id set.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    tag: TypeTag,
    name: String,
    /// Transitive supertype tags, including the type's own tag.
    supertypes: HashSet<TypeTag>,
    /// Cached: `ModuleInterface` is in `supertypes`. Queried on the BFS hot
    /// path for every visited path.
    moduleinterface: bool,
}

impl TypeInfo {
    /// The type's own tag.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Host-supplied type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// O(1) average subtype test. A type is a subtype of itself.
    #[must_use]
    pub fn is_subtype_of(&self, other: TypeTag) -> bool {
        self.supertypes.contains(&other)
    }

    /// True if the type is a subtype of any of the given tags.
    #[must_use]
    pub fn is_subtype_of_any(&self, others: &[TypeTag]) -> bool {
        others.iter().any(|t| self.supertypes.contains(t))
    }

    /// True if the type is (a subtype of) `ModuleInterface`.
    #[must_use]
    pub fn is_moduleinterface(&self) -> bool {
        self.moduleinterface
    }
}

/// Registry of node types, populated by the host before building graphs.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
    node_tag: TypeTag,
    module_interface_tag: TypeTag,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding the two built-in types: `Node` (the lattice
    /// root) and `ModuleInterface` (subtype of `Node`).
    #[must_use]
    pub fn new() -> Self {
        let node_tag = TypeTag(0);
        let module_interface_tag = TypeTag(1);
        let node = TypeInfo {
            tag: node_tag,
            name: "Node".to_string(),
            supertypes: HashSet::from([node_tag]),
            moduleinterface: false,
        };
        let module_interface = TypeInfo {
            tag: module_interface_tag,
            name: "ModuleInterface".to_string(),
            supertypes: HashSet::from([node_tag, module_interface_tag]),
            moduleinterface: true,
        };
        Self {
            types: vec![node, module_interface],
            node_tag,
            module_interface_tag,
        }
    }

    /// The built-in lattice root. Passing this tag in a type filter list
    /// short-circuits to "no type filter".
    #[must_use]
    pub fn node_tag(&self) -> TypeTag {
        self.node_tag
    }

    /// The built-in `ModuleInterface` tag.
    #[must_use]
    pub fn module_interface_tag(&self) -> TypeTag {
        self.module_interface_tag
    }

    /// Register a type under `name` with the given direct supertypes.
    ///
    /// The stored [`TypeInfo`] owns the transitive supertype set (union of
    /// the direct supertypes' sets plus the direct tags), so later subtype
    /// tests never walk the lattice.
    pub fn register(&mut self, name: &str, supertypes: &[TypeTag]) -> GraphResult<TypeTag> {
        let tag = TypeTag(self.types.len() as u32);
        let mut transitive = HashSet::from([tag, self.node_tag]);
        for s in supertypes {
            let info = self
                .types
                .get(s.index())
                .ok_or(GraphError::UnknownType { tag: s.0 })?;
            transitive.extend(info.supertypes.iter().copied());
        }
        let moduleinterface = transitive.contains(&self.module_interface_tag);
        self.types.push(TypeInfo {
            tag,
            name: name.to_string(),
            supertypes: transitive,
            moduleinterface,
        });
        Ok(tag)
    }

    /// Look up a registered type.
    ///
    /// # Panics
    /// Panics if `tag` was not produced by this registry.
    #[must_use]
    pub fn info(&self, tag: TypeTag) -> &TypeInfo {
        &self.types[tag.index()]
    }

    /// Name of a registered type.
    #[must_use]
    pub fn name(&self, tag: TypeTag) -> &str {
        self.info(tag).name()
    }

    /// O(1) average subtype test between two registered tags.
    #[must_use]
    pub fn is_subtype_of(&self, tag: TypeTag, other: TypeTag) -> bool {
        self.info(tag).is_subtype_of(other)
    }

    /// True if `tag` is a subtype of any tag in `others`.
    #[must_use]
    pub fn is_subtype_of_any(&self, tag: TypeTag, others: &[TypeTag]) -> bool {
        self.info(tag).is_subtype_of_any(others)
    }

    /// True if `tag` is (a subtype of) `ModuleInterface`.
    #[must_use]
    pub fn is_moduleinterface(&self, tag: TypeTag) -> bool {
        self.info(tag).is_moduleinterface()
    }
}
