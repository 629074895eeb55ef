#![allow(dead_code)]

use glam::Vec3;
use isle_core::testing::SharedMockWorld;
use isle_core::{ContactEvent, EntityId, PlayerId, UiMessage, ZoneId};
use isle_progress::{
    Cosmetic, CosmeticCatalog, KeyValueStore, MemoryStore, Scope, SharedStore, StoreError,
    StoreResult,
};
use isle_session::{PlayerSessionService, SessionConfig, ZoneEvent};
use isle_zones::{ZoneDescriptor, ZoneHandle, ZoneRegistry};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Memory store whose global writes can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_global_writes: AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, scope: Scope, key: &str) -> StoreResult<Option<Value>> {
        self.inner.get(scope, key)
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> StoreResult<()> {
        if scope == Scope::Global && self.fail_global_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("global scope offline".into()));
        }
        self.inner.set(scope, key, value)
    }

    fn remove(&self, scope: Scope, key: &str) -> StoreResult<()> {
        self.inner.remove(scope, key)
    }
}

pub struct Fixture {
    pub service: PlayerSessionService,
    pub meadow: SharedMockWorld,
    pub volcano: SharedMockWorld,
    pub store: Arc<FlakyStore>,
}

pub fn meadow_id() -> ZoneId {
    ZoneId::new("meadow")
}

pub fn volcano_id() -> ZoneId {
    ZoneId::new("volcano")
}

pub fn descriptors() -> Vec<ZoneDescriptor> {
    vec![
        ZoneDescriptor::new("meadow", "maps/meadow", Vec3::new(0.0, 20.0, 0.0))
            .with_name("Meadow Isle")
            .with_obstacle("rock", isle_core::Transform::at(Vec3::new(3.0, 0.0, 0.0)))
            .with_collectible("c1", Vec3::new(1.0, 1.0, 0.0))
            .with_collectible("c2", Vec3::new(2.0, 1.0, 0.0))
            .with_collectible("c3", Vec3::new(3.0, 1.0, 0.0))
            .with_board(Vec3::new(0.0, 2.0, 5.0))
            .with_platform("summit", Vec3::new(10.0, 40.0, 0.0))
            .with_music("music/meadow"),
        ZoneDescriptor::new("volcano", "maps/volcano", Vec3::new(0.0, 30.0, 0.0))
            .with_name("Volcano Isle")
            .with_fall_threshold(-20.0)
            .with_collectible("v1", Vec3::new(1.0, 1.0, 0.0)),
    ]
}

pub fn catalog() -> CosmeticCatalog {
    CosmeticCatalog::new(vec![
        Cosmetic::new("sparkle", "fx/sparkle", 0)
            .with_name("Sparkle")
            .as_default(),
        Cosmetic::new("flames", "fx/flames", 5).with_name("Flames"),
        Cosmetic::new("comet", "fx/comet", 50).with_name("Comet Trail"),
    ])
}

pub fn fixture() -> Fixture {
    fixture_with(SessionConfig::default())
}

pub fn fixture_with(config: SessionConfig) -> Fixture {
    let meadow = SharedMockWorld::new();
    let volcano = SharedMockWorld::new();
    let store = Arc::new(FlakyStore::default());

    let zones = ZoneRegistry::initialize(descriptors(), |d| {
        if d.id.as_str() == "meadow" {
            meadow.boxed()
        } else {
            volcano.boxed()
        }
    })
    .unwrap();

    let shared: SharedStore = store.clone();
    let service = PlayerSessionService::new(config, zones, shared, catalog());

    Fixture {
        service,
        meadow,
        volcano,
        store,
    }
}

impl Fixture {
    pub fn handle(&self, zone: &ZoneId) -> ZoneHandle {
        self.service.zones().zone_for_id(zone).unwrap()
    }

    pub fn avatar(&self, player: &PlayerId) -> EntityId {
        self.service.session(player).unwrap().avatar
    }

    pub fn sensor(&self, zone: &ZoneId, collectible: &str) -> Option<EntityId> {
        let handle = self.handle(zone);
        self.service
            .zones()
            .get(handle)
            .unwrap()
            .loader
            .collectibles()
            .entity_of(collectible)
    }

    /// Feed a contact-begin between a collectible and a player's avatar
    pub fn touch(&mut self, zone: &ZoneId, collectible: &str, player: &PlayerId) {
        let sensor = self.sensor(zone, collectible).unwrap();
        let avatar = self.avatar(player);
        let handle = self.handle(zone);
        self.service
            .dispatch(handle, ZoneEvent::Contact(ContactEvent::begin(sensor, avatar)));
    }

    pub fn balance(&self, player: &PlayerId) -> u64 {
        self.service.progression().load(player).unwrap().balance
    }

    pub fn give(&self, player: &PlayerId, coins: u64) {
        self.service
            .progression()
            .update(player, |r| r.balance = coins)
            .unwrap();
    }

    pub fn set_global_failure(&self, fail: bool) {
        self.store.fail_global_writes.store(fail, Ordering::SeqCst);
    }
}

pub fn count_notices(messages: &[&UiMessage], kind: isle_core::NoticeKind) -> usize {
    messages.iter().filter(|m| m.is_notice(kind)).count()
}
