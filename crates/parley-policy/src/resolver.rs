// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room policy resolution.

use parley_core::{AutomationPolicy, RoomRef};

/// Whether automated replies are active for `room` under `policy`.
///
/// With the room's global toggle on, the disabled list holds the
/// exceptions; with it off, the enabled list does.
pub fn resolve(room: &RoomRef, policy: &AutomationPolicy) -> bool {
    if policy.global_enabled(room.kind()) {
        !policy.disabled_rooms.contains(&room.room_id)
    } else {
        policy.enabled_rooms.contains(&room.room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{ChatKind, RoomId};
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Membership {
        Enabled,
        Disabled,
        Neither,
    }

    fn policy(single: bool, group: bool, room: &RoomRef, membership: Membership) -> AutomationPolicy {
        let mut policy = AutomationPolicy {
            single_chat_global_enabled: single,
            group_chat_global_enabled: group,
            ..Default::default()
        };
        match membership {
            Membership::Enabled => {
                policy.enabled_rooms.insert(room.room_id.clone(), room.kind());
            }
            Membership::Disabled => {
                policy.disabled_rooms.insert(room.room_id.clone(), room.kind());
            }
            Membership::Neither => {}
        }
        policy
    }

    #[test]
    fn every_combination_matches_the_exception_rule() {
        for is_group in [false, true] {
            for single in [false, true] {
                for group in [false, true] {
                    for membership in [Membership::Enabled, Membership::Disabled, Membership::Neither] {
                        let room = RoomRef::new("R1", is_group);
                        let p = policy(single, group, &room, membership);
                        let global = if is_group { group } else { single };
                        let expected = match (global, membership) {
                            (true, Membership::Disabled) => false,
                            (true, _) => true,
                            (false, Membership::Enabled) => true,
                            (false, _) => false,
                        };
                        assert_eq!(
                            resolve(&room, &p),
                            expected,
                            "is_group={is_group} single={single} group={group} {membership:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn other_kind_toggle_is_ignored() {
        let room = RoomRef::new("G1", true);
        let p = AutomationPolicy {
            single_chat_global_enabled: true,
            ..Default::default()
        };
        assert!(!resolve(&room, &p));
    }

    #[test]
    fn inconsistent_lists_follow_the_global_toggle() {
        let room = RoomRef::new("R2", true);
        let mut p = AutomationPolicy::default();
        p.enabled_rooms.insert(RoomId::from("R2"), ChatKind::Group);
        p.disabled_rooms.insert(RoomId::from("R2"), ChatKind::Group);
        assert!(resolve(&room, &p));
        p.group_chat_global_enabled = true;
        assert!(!resolve(&room, &p));
    }

    proptest! {
        #[test]
        fn resolve_is_total(
            room_id in "[A-Za-z0-9@._-]{0,24}",
            is_group in any::<bool>(),
            single in any::<bool>(),
            group in any::<bool>(),
            enabled in proptest::collection::vec("[A-Z][0-9]{1,2}", 0..6),
            disabled in proptest::collection::vec("[A-Z][0-9]{1,2}", 0..6),
        ) {
            let mut p = AutomationPolicy {
                single_chat_global_enabled: single,
                group_chat_global_enabled: group,
                ..Default::default()
            };
            for id in enabled {
                p.enabled_rooms.insert(RoomId(id), ChatKind::Single);
            }
            for id in disabled {
                p.disabled_rooms.insert(RoomId(id), ChatKind::Group);
            }
            let room = RoomRef::new(room_id, is_group);
            let active = resolve(&room, &p);
            let global = p.global_enabled(room.kind());
            if global {
                prop_assert_eq!(active, !p.disabled_rooms.contains(&room.room_id));
            } else {
                prop_assert_eq!(active, p.enabled_rooms.contains(&room.room_id));
            }
        }
    }
}
