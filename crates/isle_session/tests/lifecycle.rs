mod common;

use approx::assert_abs_diff_eq;
use common::*;
use glam::Vec3;
use isle_core::{
    CollisionGroups, EntityKind, NoticeKind, PlayerId, UiMessage, ZoneUnlockFlag, ZoneWorld,
};
use isle_session::SessionError;

#[test]
fn test_join_spawns_session_and_sends_initial_state() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");

    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let world = fx.meadow.lock();
    let avatar = world.avatar_of(&ada).unwrap();
    assert_eq!(world.position(avatar), Some(Vec3::new(0.0, 20.0, 0.0)));
    assert_eq!(world.emitters().len(), 1);
    assert_eq!(world.overlay_count(), 1);
    assert_eq!(world.playing_audio(), 1);

    let ui = world.ui_for(&ada);
    assert_eq!(ui[0], &UiMessage::Balance { coins: 0 });
    assert_eq!(
        ui[1],
        &UiMessage::Cosmetics {
            owned: vec!["sparkle".to_string()],
            selected: "sparkle".to_string(),
        }
    );
    assert_eq!(
        ui[2],
        &UiMessage::ZoneUnlocks {
            zones: vec![
                ZoneUnlockFlag {
                    zone: meadow_id(),
                    unlocked: true
                },
                ZoneUnlockFlag {
                    zone: volcano_id(),
                    unlocked: false
                },
            ],
        }
    );

    assert_eq!(fx.service.zone_of_player(&ada), Some(&meadow_id()));
    assert_eq!(fx.service.sessions().len(), 1);
}

#[test]
fn test_avatars_ignore_each_other_but_hit_the_world() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let world = fx.meadow.lock();
    let avatar = world.avatar_of(&ada).unwrap();
    let groups = world.entity(avatar).unwrap().spec.groups;

    assert!(!groups.can_collide(&groups));
    assert!(groups.can_collide(&CollisionGroups::environment()));
}

#[test]
fn test_second_join_does_not_reload_content() {
    let mut fx = fixture();
    fx.service
        .join(&PlayerId::new("ada"), "Ada", &meadow_id())
        .unwrap();
    let spawned = fx.meadow.lock().spawn_count();

    fx.service
        .join(&PlayerId::new("bob"), "Bob", &meadow_id())
        .unwrap();

    let world = fx.meadow.lock();
    assert_eq!(world.models("rock").len(), 1);
    assert_eq!(world.despawn_count(), 0);
    // avatar + emitter for the second player only
    assert_eq!(world.spawn_count(), spawned + 2);
    assert_eq!(world.loaded_maps(), &["maps/meadow".to_string()]);
}

#[test]
fn test_rejoining_current_zone_is_a_no_op() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    let avatar = fx.avatar(&ada);

    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    assert_eq!(fx.avatar(&ada), avatar);
    assert_eq!(fx.meadow.lock().despawn_count(), 0);
}

#[test]
fn test_join_unknown_zone_fails() {
    let mut fx = fixture();
    let result = fx
        .service
        .join(&PlayerId::new("ada"), "Ada", &isle_core::ZoneId::new("atlantis"));

    assert!(matches!(result, Err(SessionError::UnknownZone(_))));
    assert!(fx.service.sessions().is_empty());
}

#[test]
fn test_leave_is_idempotent() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    assert!(fx.service.leave(&ada));
    assert!(!fx.service.leave(&ada));

    let world = fx.meadow.lock();
    assert!(world.avatar_of(&ada).is_none());
    assert!(world.emitters().is_empty());
    assert_eq!(world.overlay_count(), 0);
    assert_eq!(world.playing_audio(), 0);
    assert_eq!(fx.service.audio().count(&ada), 0);
}

#[test]
fn test_leave_tolerates_entities_already_gone() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let avatar = fx.avatar(&ada);
    fx.meadow.lock().remove_silently(avatar);

    assert!(fx.service.leave(&ada));
    assert!(fx.meadow.lock().emitters().is_empty());
    assert!(fx.service.session(&ada).is_none());
}

#[test]
fn test_locked_switch_is_rejected_without_side_effects() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    let avatar = fx.avatar(&ada);
    fx.meadow.lock().clear_ui();

    let result = fx.service.switch_zone(&ada, &volcano_id());

    assert!(matches!(result, Err(SessionError::ZoneLocked(_))));
    assert_eq!(fx.service.zone_of_player(&ada), Some(&meadow_id()));
    assert_eq!(fx.avatar(&ada), avatar);
    assert!(fx.service.drain_transfers().is_empty());

    let world = fx.meadow.lock();
    assert_eq!(world.despawn_count(), 0);
    let ui = world.ui_for(&ada);
    assert_eq!(ui.len(), 1);
    assert_eq!(count_notices(&ui, NoticeKind::Error), 1);
}

#[test]
fn test_switch_unknown_zone_sends_one_notice() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.meadow.lock().clear_ui();

    let result = fx
        .service
        .switch_zone(&ada, &isle_core::ZoneId::new("atlantis"));

    assert!(matches!(result, Err(SessionError::UnknownZone(_))));
    assert_eq!(count_notices(&fx.meadow.lock().ui_for(&ada), NoticeKind::Error), 1);
    assert!(fx.service.session(&ada).is_some());
}

#[test]
fn test_switch_tears_down_then_welcomes_on_join() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.touch(&meadow_id(), "c3", &ada);

    fx.service.switch_zone(&ada, &volcano_id()).unwrap();

    // torn down before the transfer is performed
    assert!(fx.service.session(&ada).is_none());
    assert!(fx.meadow.lock().avatar_of(&ada).is_none());
    assert_eq!(fx.meadow.lock().overlay_count(), 0);
    assert!(fx.service.pending().has_pending(&ada));
    assert_eq!(
        fx.service.progression().load(&ada).unwrap().selected_zone,
        Some(volcano_id())
    );

    let transfers = fx.service.drain_transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, meadow_id());
    assert_eq!(transfers[0].to, volcano_id());
    assert_eq!(transfers[0].name, "Ada");

    fx.service.complete_transfer(&transfers[0]).unwrap();

    assert!(fx.volcano.lock().avatar_of(&ada).is_some());
    assert_eq!(fx.service.zone_of_player(&ada), Some(&volcano_id()));
    assert!(!fx.service.pending().has_pending(&ada));

    let world = fx.volcano.lock();
    let welcomes: Vec<_> = world
        .ui_for(&ada)
        .into_iter()
        .filter(|m| **m == UiMessage::success("Welcome to Volcano Isle!"))
        .collect();
    assert_eq!(welcomes.len(), 1);
}

#[test]
fn test_failed_transfer_returns_player_to_origin() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.touch(&meadow_id(), "c3", &ada);
    fx.volcano.lock().refuse_avatars(true);

    fx.service.switch_zone(&ada, &volcano_id()).unwrap();
    fx.meadow.lock().clear_ui();
    let transfers = fx.service.drain_transfers();
    assert_eq!(transfers.len(), 1);

    let result = fx.service.complete_transfer(&transfers[0]);

    assert!(matches!(result, Err(SessionError::Host(_))));
    assert!(fx.volcano.lock().avatar_of(&ada).is_none());
    assert_eq!(fx.service.zone_of_player(&ada), Some(&meadow_id()));
    assert!(fx.meadow.lock().avatar_of(&ada).is_some());
    assert!(!fx.service.pending().has_pending(&ada));
    assert_eq!(
        fx.service.progression().load(&ada).unwrap().selected_zone,
        Some(meadow_id())
    );

    let world = fx.meadow.lock();
    let messages = world.ui_for(&ada);
    assert_eq!(count_notices(&messages, NoticeKind::Error), 1);
    assert_eq!(count_notices(&messages, NoticeKind::Success), 0);
}

#[test]
fn test_switch_to_current_zone_keeps_session() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    fx.service.switch_zone(&ada, &meadow_id()).unwrap();

    assert!(fx.service.session(&ada).is_some());
    assert!(fx.service.drain_transfers().is_empty());
}

#[test]
fn test_disconnect_drops_queued_transfer_and_welcome() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.touch(&meadow_id(), "c3", &ada);
    fx.service.switch_zone(&ada, &volcano_id()).unwrap();

    fx.service.disconnect(&ada);

    assert!(fx.service.drain_transfers().is_empty());
    assert!(!fx.service.pending().has_pending(&ada));
}

#[test]
fn test_connect_resumes_selected_zone() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.touch(&meadow_id(), "c3", &ada);
    fx.service.switch_zone(&ada, &volcano_id()).unwrap();
    fx.service.disconnect(&ada);

    let zone = fx.service.connect(&ada, "Ada").unwrap();

    assert_eq!(zone, volcano_id());
    assert!(fx.volcano.lock().avatar_of(&ada).is_some());
}

#[test]
fn test_connect_new_player_lands_in_first_zone() {
    let mut fx = fixture();
    let zone = fx.service.connect(&PlayerId::new("ada"), "Ada").unwrap();
    assert_eq!(zone, meadow_id());
}

#[test]
fn test_fallen_player_returned_within_one_poll() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.give(&ada, 4);

    let avatar = fx.avatar(&ada);
    let meadow = fx.handle(&meadow_id());
    fx.meadow
        .lock()
        .set_position(avatar, Vec3::new(2.0, -100.0, 0.0));

    fx.service.tick_zone(meadow, 600.0);
    let position = fx.meadow.lock().position(avatar).unwrap();
    assert_abs_diff_eq!(position.distance(Vec3::new(2.0, -100.0, 0.0)), 0.0, epsilon = 1e-4);

    fx.service.tick_zone(meadow, 600.0);
    let position = fx.meadow.lock().position(avatar).unwrap();
    assert_abs_diff_eq!(position.distance(Vec3::new(0.0, 20.0, 0.0)), 0.0, epsilon = 1e-4);
    assert_eq!(fx.balance(&ada), 4);
}

#[test]
fn test_zone_fall_threshold_overrides_default() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.touch(&meadow_id(), "c3", &ada);
    fx.service.switch_zone(&ada, &volcano_id()).unwrap();
    for transfer in fx.service.drain_transfers() {
        fx.service.complete_transfer(&transfer).unwrap();
    }

    let avatar = fx.avatar(&ada);
    fx.volcano
        .lock()
        .set_position(avatar, Vec3::new(0.0, -30.0, 0.0));
    fx.service.tick_all(1000.0);

    let position = fx.volcano.lock().position(avatar).unwrap();
    assert_abs_diff_eq!(position.distance(Vec3::new(0.0, 30.0, 0.0)), 0.0, epsilon = 1e-4);
}

#[test]
fn test_teleport_to_platform() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    let avatar = fx.avatar(&ada);

    fx.service.teleport_to_platform(&ada, "summit").unwrap();
    let position = fx.meadow.lock().position(avatar).unwrap();
    assert_abs_diff_eq!(position.distance(Vec3::new(10.0, 40.0, 0.0)), 0.0, epsilon = 1e-4);

    fx.meadow.lock().clear_ui();
    let result = fx.service.teleport_to_platform(&ada, "nowhere");
    assert!(matches!(result, Err(SessionError::UnknownPlatform(_))));
    assert_eq!(count_notices(&fx.meadow.lock().ui_for(&ada), NoticeKind::Error), 1);
}

#[test]
fn test_emitter_follows_selected_cosmetic() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let world = fx.meadow.lock();
    let emitter = world.emitters()[0];
    let kind = &world.entity(emitter).unwrap().spec.kind;
    assert!(matches!(
        kind,
        EntityKind::Emitter { effect, attached_to } if effect == "fx/sparkle" && *attached_to == fx.avatar(&ada)
    ));
}
