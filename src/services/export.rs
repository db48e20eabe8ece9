use crate::domain::models::{GroupDocument, InventoryDocument, MetaDocument};
use crate::inventory::{vars, Inventory, ALL};
use indexmap::IndexMap;

/// Reshapes a loaded inventory into the `--list` document. `all` is never
/// emitted; every host ends up in `_meta.hostvars`.
pub fn to_document(inventory: &Inventory) -> InventoryDocument {
    let groups: IndexMap<String, GroupDocument> = inventory
        .groups()
        .filter(|g| g.name != ALL)
        .map(|g| {
            (
                g.name.clone(),
                GroupDocument {
                    children: g.children.clone(),
                    hosts: g.hosts.clone(),
                    vars: g.vars.clone(),
                },
            )
        })
        .collect();

    let mut hostvars = IndexMap::new();
    for host in inventory.hosts() {
        let entry = hostvars.entry(host.name.clone()).or_default();
        vars::merge_vars(entry, host.vars.clone());
    }

    InventoryDocument {
        groups,
        meta: MetaDocument { hostvars },
    }
}
