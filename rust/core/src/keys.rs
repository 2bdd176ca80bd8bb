// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage.
//!
//! Render handles, rooms and wall objects are all addressed through
//! `slotmap` keys. Keys stay valid (and never alias a newer entity) after
//! other entries are removed, which lets the selection and scene managers
//! hold non-owning references that can be checked for staleness.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node in the renderer's scene hierarchy (group, mesh or
    /// line segments).
    pub struct NodeKey;

    /// Handle to a geometry buffer owned by the renderer.
    pub struct GeometryKey;

    /// Key for a room in the scene manager.
    pub struct RoomKey;

    /// Key for a wall object within its room.
    pub struct WallObjectKey;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn removed_keys_do_not_alias_new_entries() {
        let mut rooms: SlotMap<RoomKey, &str> = SlotMap::with_key();
        let first = rooms.insert("kitchen");
        rooms.remove(first);
        let second = rooms.insert("hall");

        assert_ne!(first, second);
        assert!(rooms.get(first).is_none());
        assert_eq!(rooms.get(second), Some(&"hall"));
    }
}
