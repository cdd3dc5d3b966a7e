//! Tests for the graph data model.

mod connect;
mod merge;

use super::{GraphStore, InterfaceId, InterfaceKind, NodeId};
use crate::types::TypeTag;

/// Store with one registered module-interface type.
pub(crate) fn typed_store() -> (GraphStore, TypeTag) {
    let mut store = GraphStore::new();
    let mi = store.types().module_interface_tag();
    let electrical = store
        .register_type("Electrical", &[mi])
        .expect("register type");
    (store, electrical)
}

/// Node of the given type with one attached module connection named `mc`.
pub(crate) fn module_node(
    store: &mut GraphStore,
    tag: TypeTag,
) -> (NodeId, InterfaceId) {
    let node = store.add_node();
    store.assign_type(node, tag).expect("assign type");
    let mc = store.add_interface(InterfaceKind::ModuleConnection);
    store.attach_interface(node, mc, "mc").expect("attach mc");
    (node, mc)
}

/// Wire `child` under `parent` with a named parent link.
pub(crate) fn adopt(store: &mut GraphStore, parent: NodeId, child: NodeId, name: &str) {
    let parent_side = store.children_interface(parent);
    let child_side = store.parent_interface(child);
    store
        .connect_with(child_side, parent_side, super::Link::named_parent(name))
        .expect("adopt child");
}
