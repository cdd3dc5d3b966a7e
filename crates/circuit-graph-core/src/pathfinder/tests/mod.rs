//! Tests for the path finder.

mod scenarios;

use crate::graph::{GraphStore, InterfaceId, InterfaceKind, Link, NodeId};
use crate::types::TypeTag;

/// Store with a module-interface leaf type and a composite pair type.
pub(crate) fn test_store() -> (GraphStore, TypeTag, TypeTag) {
    let mut store = GraphStore::new();
    let mi = store.types().module_interface_tag();
    let electrical = store
        .register_type("Electrical", &[mi])
        .expect("register leaf type");
    let pair = store
        .register_type("DifferentialPair", &[mi])
        .expect("register pair type");
    (store, electrical, pair)
}

/// Node of the given type with one attached module connection named `mc`.
pub(crate) fn module_node(store: &mut GraphStore, tag: TypeTag) -> (NodeId, InterfaceId) {
    let node = store.add_node();
    store.assign_type(node, tag).expect("assign type");
    let mc = store.add_interface(InterfaceKind::ModuleConnection);
    store.attach_interface(node, mc, "mc").expect("attach mc");
    (node, mc)
}

/// Composite node with one module-interface child per name, each carrying
/// a module connection.
pub(crate) fn composite_node(
    store: &mut GraphStore,
    tag: TypeTag,
    child_tag: TypeTag,
    child_names: &[&str],
) -> (NodeId, Vec<(NodeId, InterfaceId)>) {
    let node = store.add_node();
    store.assign_type(node, tag).expect("assign type");
    let mut children = Vec::new();
    for name in child_names {
        let (child, mc) = module_node(store, child_tag);
        store
            .connect_with(
                store.parent_interface(child),
                store.children_interface(node),
                Link::named_parent(*name),
            )
            .expect("adopt child");
        children.push((child, mc));
    }
    (node, children)
}
