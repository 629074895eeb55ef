mod common;

use common::*;
use isle_core::{ContactEvent, EntityKind, NoticeKind, PlayerId, UiMessage, ZoneWorld};
use isle_progress::{EconomyError, Purchase};
use isle_session::{SessionConfig, SessionError, ZoneEvent};

#[test]
fn test_collecting_grants_currency_and_hides_item() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.meadow.lock().clear_ui();

    fx.touch(&meadow_id(), "c1", &ada);

    assert_eq!(fx.balance(&ada), 1);
    assert!(fx.sensor(&meadow_id(), "c1").is_none());
    assert!(fx
        .meadow
        .lock()
        .ui_for(&ada)
        .contains(&&UiMessage::Balance { coins: 1 }));

    let record = fx.service.progression().load(&ada).unwrap();
    assert!(record.has_collected("meadow/c1"));
}

#[test]
fn test_contact_end_is_ignored() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let sensor = fx.sensor(&meadow_id(), "c1").unwrap();
    let avatar = fx.avatar(&ada);
    let meadow = fx.handle(&meadow_id());
    fx.service
        .dispatch(meadow, ZoneEvent::Contact(ContactEvent::end(sensor, avatar)));

    assert_eq!(fx.balance(&ada), 0);
    assert_eq!(fx.sensor(&meadow_id(), "c1"), Some(sensor));
}

#[test]
fn test_contact_while_cooling_down_is_a_no_op() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let sensor = fx.sensor(&meadow_id(), "c1").unwrap();
    let avatar = fx.avatar(&ada);
    let meadow = fx.handle(&meadow_id());
    fx.service
        .dispatch(meadow, ZoneEvent::Contact(ContactEvent::begin(sensor, avatar)));
    fx.service
        .dispatch(meadow, ZoneEvent::Contact(ContactEvent::begin(sensor, avatar)));

    assert_eq!(fx.balance(&ada), 1);
}

#[test]
fn test_non_avatar_contact_is_ignored() {
    let mut fx = fixture();
    fx.service
        .join(&PlayerId::new("ada"), "Ada", &meadow_id())
        .unwrap();

    let sensor = fx.sensor(&meadow_id(), "c1").unwrap();
    let rock = fx.meadow.lock().models("rock")[0];
    let meadow = fx.handle(&meadow_id());
    fx.service
        .dispatch(meadow, ZoneEvent::Contact(ContactEvent::begin(sensor, rock)));

    assert_eq!(fx.sensor(&meadow_id(), "c1"), Some(sensor));
}

#[test]
fn test_world_contacts_are_dispatched_by_tick() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let sensor = fx.sensor(&meadow_id(), "c2").unwrap();
    let avatar = fx.avatar(&ada);
    fx.meadow
        .lock()
        .push_contact(ContactEvent::begin(sensor, avatar));
    let meadow = fx.handle(&meadow_id());
    fx.service.tick_zone(meadow, 16.0);

    assert_eq!(fx.balance(&ada), 1);
}

#[test]
fn test_item_respawns_with_new_sensor_after_cooldown() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    let first = fx.sensor(&meadow_id(), "c1").unwrap();
    fx.touch(&meadow_id(), "c1", &ada);

    let meadow = fx.handle(&meadow_id());
    fx.service.tick_zone(meadow, 5_000.0);
    assert!(fx.sensor(&meadow_id(), "c1").is_none());

    fx.service.tick_zone(meadow, 5_000.0);
    let second = fx.sensor(&meadow_id(), "c1").unwrap();
    assert_ne!(first, second);
    assert!(fx.meadow.lock().contains(second));

    fx.touch(&meadow_id(), "c1", &ada);
    assert_eq!(fx.balance(&ada), 2);
}

#[test]
fn test_last_collectible_admits_once() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    let meadow = fx.handle(&meadow_id());

    fx.touch(&meadow_id(), "c3", &ada);
    fx.service.tick_zone(meadow, 10_000.0);
    fx.touch(&meadow_id(), "c3", &ada);

    assert_eq!(fx.balance(&ada), 2);
    let entries = fx.service.get_leaderboard(&meadow_id()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].player_id, ada);
    assert_eq!(entries[0].name, "Ada");

    let congratulations = count_notices(&fx.meadow.lock().ui_for(&ada), NoticeKind::Success);
    assert_eq!(congratulations, 1);
}

#[test]
fn test_admission_refreshes_boards() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    let bob = PlayerId::new("bob");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.service.join(&bob, "Bob", &meadow_id()).unwrap();
    let meadow = fx.handle(&meadow_id());

    fx.touch(&meadow_id(), "c3", &bob);
    fx.service.tick_zone(meadow, 10_000.0);
    fx.touch(&meadow_id(), "c3", &ada);

    let board = fx.service.zones().get(meadow).unwrap().loader.boards()[0];
    let world = fx.meadow.lock();
    assert_eq!(
        world.display_lines(board),
        Some(&["1. Bob".to_string(), "2. Ada".to_string()][..])
    );
}

#[test]
fn test_board_rows_are_capped() {
    let mut fx = fixture_with(SessionConfig {
        leaderboard_rows: 1,
        ..SessionConfig::default()
    });
    let meadow = fx.handle(&meadow_id());

    for name in ["ada", "bob"] {
        let player = PlayerId::new(name);
        fx.service.join(&player, name, &meadow_id()).unwrap();
        fx.touch(&meadow_id(), "c3", &player);
        fx.service.tick_zone(meadow, 10_000.0);
    }

    let board = fx.service.zones().get(meadow).unwrap().loader.boards()[0];
    assert_eq!(
        fx.meadow.lock().display_lines(board).map(|l| l.len()),
        Some(1)
    );
}

#[test]
fn test_failed_admission_is_retried_on_next_finish() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    let meadow = fx.handle(&meadow_id());

    fx.set_global_failure(true);
    fx.touch(&meadow_id(), "c3", &ada);

    // the pickup stands even though admission failed
    assert_eq!(fx.balance(&ada), 1);
    assert!(fx.sensor(&meadow_id(), "c3").is_none());
    assert!(fx.service.get_leaderboard(&meadow_id()).unwrap().is_empty());
    assert!(fx.service.gate().has_pending_admission(&meadow_id(), &ada));

    fx.set_global_failure(false);
    fx.service.tick_zone(meadow, 10_000.0);
    fx.touch(&meadow_id(), "c3", &ada);

    assert_eq!(fx.service.get_leaderboard(&meadow_id()).unwrap().len(), 1);
    assert!(!fx.service.gate().has_pending_admission(&meadow_id(), &ada));
}

#[test]
fn test_unlock_follows_first_admission_and_survives_reset() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    assert!(!fx.service.has_unlocked(&ada, &volcano_id()).unwrap());
    fx.touch(&meadow_id(), "c3", &ada);
    assert!(fx.service.has_unlocked(&ada, &volcano_id()).unwrap());

    let record = fx.service.reset_progress(&ada).unwrap();
    assert_eq!(record.balance, 0);
    assert_eq!(record.selected_zone, Some(meadow_id()));
    assert!(fx.service.has_unlocked(&ada, &volcano_id()).unwrap());
}

#[test]
fn test_finishing_pushes_unlock_flags() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.meadow.lock().clear_ui();

    fx.touch(&meadow_id(), "c3", &ada);

    let world = fx.meadow.lock();
    let flags = world.ui_for(&ada).into_iter().find_map(|m| match m {
        UiMessage::ZoneUnlocks { zones } => Some(zones.clone()),
        _ => None,
    });
    assert!(flags.unwrap().iter().all(|f| f.unlocked));
}

#[test]
fn test_default_cosmetic_is_never_charged() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    for coins in [0, 3, 100] {
        fx.give(&ada, coins);
        let outcome = fx.service.purchase(&ada, "sparkle").unwrap();
        assert_eq!(outcome, Purchase::AlreadyOwned { balance: coins });
        assert_eq!(fx.balance(&ada), coins);
    }
}

#[test]
fn test_insufficient_funds_changes_nothing() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.give(&ada, 3);
    let emitter = fx.service.session(&ada).unwrap().emitter;
    fx.meadow.lock().clear_ui();

    let result = fx.service.equip_cosmetic(&ada, "comet");

    assert!(matches!(
        result,
        Err(SessionError::Economy(EconomyError::InsufficientFunds {
            price: 50,
            balance: 3
        }))
    ));
    let record = fx.service.progression().load(&ada).unwrap();
    assert_eq!(record.balance, 3);
    assert!(!record.owns("comet"));
    assert_eq!(record.selected_cosmetic, "sparkle");
    assert_eq!(fx.service.session(&ada).unwrap().emitter, emitter);
    assert_eq!(count_notices(&fx.meadow.lock().ui_for(&ada), NoticeKind::Error), 1);
}

#[test]
fn test_purchase_then_repurchase_charges_once() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.give(&ada, 7);

    let first = fx.service.purchase(&ada, "flames").unwrap();
    let second = fx.service.purchase(&ada, "flames").unwrap();

    assert_eq!(first, Purchase::Purchased { balance: 2 });
    assert_eq!(second, Purchase::AlreadyOwned { balance: 2 });
    assert!(fx
        .meadow
        .lock()
        .ui_for(&ada)
        .contains(&&UiMessage::Balance { coins: 2 }));
}

#[test]
fn test_equip_respawns_emitter() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.give(&ada, 5);
    let old = fx.service.session(&ada).unwrap().emitter.unwrap();

    fx.service.equip_cosmetic(&ada, "flames").unwrap();

    let new = fx.service.session(&ada).unwrap().emitter.unwrap();
    let world = fx.meadow.lock();
    assert!(!world.contains(old));
    assert_eq!(world.emitters(), vec![new]);
    assert!(matches!(
        &world.entity(new).unwrap().spec.kind,
        EntityKind::Emitter { effect, .. } if effect == "fx/flames"
    ));

    let record = fx.service.progression().load(&ada).unwrap();
    assert_eq!(record.balance, 0);
    assert_eq!(record.selected_cosmetic, "flames");
}

#[test]
fn test_unknown_cosmetic_is_rejected() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();

    let result = fx.service.purchase(&ada, "halo");
    assert!(matches!(
        result,
        Err(SessionError::Economy(EconomyError::UnknownCosmetic(_)))
    ));
}

#[test]
fn test_reset_leaderboard_clears_boards() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.touch(&meadow_id(), "c3", &ada);

    fx.service.reset_leaderboard(&meadow_id()).unwrap();

    assert!(fx.service.get_leaderboard(&meadow_id()).unwrap().is_empty());
    let meadow = fx.handle(&meadow_id());
    let board = fx.service.zones().get(meadow).unwrap().loader.boards()[0];
    assert_eq!(fx.meadow.lock().display_lines(board), Some(&[][..]));
}

#[test]
fn test_show_leaderboard_sends_rows() {
    let mut fx = fixture();
    let ada = PlayerId::new("ada");
    fx.service.join(&ada, "Ada", &meadow_id()).unwrap();
    fx.touch(&meadow_id(), "c3", &ada);

    fx.service.show_leaderboard(&ada, &meadow_id()).unwrap();

    assert!(fx.meadow.lock().ui_for(&ada).contains(&&UiMessage::Leaderboard {
        zone: meadow_id(),
        rows: vec!["1. Ada".to_string()],
    }));
}
