//! Zone registry
//!
//! Built once at startup from the zone catalogue. The id ↔ handle maps are
//! never changed afterwards; only the zone instances themselves mutate.

use crate::descriptor::ZoneDescriptor;
use crate::error::{Result, ZoneError};
use crate::loader::{LoadOutcome, ZoneContentLoader};
use isle_core::{ZoneId, ZoneWorld};
use std::collections::HashMap;

/// Stable handle to a zone instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneHandle(usize);

impl ZoneHandle {
    /// Position in catalogue order
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One isolated zone world and its content
pub struct ZoneInstance {
    pub descriptor: ZoneDescriptor,
    pub world: Box<dyn ZoneWorld>,
    pub loader: ZoneContentLoader,
}

impl ZoneInstance {
    /// Create the world's instance and load its map asset
    pub fn create(descriptor: ZoneDescriptor, mut world: Box<dyn ZoneWorld>) -> Result<Self> {
        descriptor.validate()?;
        world.load_map(&descriptor.map)?;
        log::info!("Created zone {} from {}", descriptor.id, descriptor.map);

        Ok(Self {
            descriptor,
            world,
            loader: ZoneContentLoader::new(),
        })
    }

    pub fn id(&self) -> &ZoneId {
        &self.descriptor.id
    }

    /// Load this zone's content; idempotent
    pub fn load_content(&mut self) -> Result<LoadOutcome> {
        self.loader.load(self.world.as_mut(), &self.descriptor)
    }

    /// Split borrow of the world and the loader
    pub fn parts_mut(&mut self) -> (&mut dyn ZoneWorld, &mut ZoneContentLoader, &ZoneDescriptor) {
        (self.world.as_mut(), &mut self.loader, &self.descriptor)
    }
}

/// Every zone of the process
pub struct ZoneRegistry {
    zones: Vec<ZoneInstance>,
    by_id: HashMap<ZoneId, ZoneHandle>,
}

impl ZoneRegistry {
    /// Create one instance per descriptor, in catalogue order.
    ///
    /// `make_world` builds the isolated world for each zone. A duplicate id
    /// or an invalid descriptor aborts initialization.
    pub fn initialize(
        descriptors: Vec<ZoneDescriptor>,
        mut make_world: impl FnMut(&ZoneDescriptor) -> Box<dyn ZoneWorld>,
    ) -> Result<Self> {
        let mut zones = Vec::with_capacity(descriptors.len());
        let mut by_id = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if by_id.contains_key(&descriptor.id) {
                return Err(ZoneError::DuplicateZone(descriptor.id));
            }

            let handle = ZoneHandle(zones.len());
            by_id.insert(descriptor.id.clone(), handle);

            let world = make_world(&descriptor);
            zones.push(ZoneInstance::create(descriptor, world)?);
        }

        log::info!("Initialized {} zones", zones.len());
        Ok(Self { zones, by_id })
    }

    pub fn zone_for_id(&self, id: &ZoneId) -> Option<ZoneHandle> {
        self.by_id.get(id).copied()
    }

    pub fn id_for_zone(&self, handle: ZoneHandle) -> Option<&ZoneId> {
        self.zones.get(handle.0).map(|z| z.id())
    }

    /// All zones in catalogue order
    pub fn all_zones(&self) -> Vec<(ZoneHandle, &ZoneId)> {
        self.zones
            .iter()
            .enumerate()
            .map(|(i, z)| (ZoneHandle(i), z.id()))
            .collect()
    }

    /// Resolve an id, or fail with `UnknownZone`
    pub fn require(&self, id: &ZoneId) -> Result<ZoneHandle> {
        self.zone_for_id(id)
            .ok_or_else(|| ZoneError::UnknownZone(id.clone()))
    }

    pub fn get(&self, handle: ZoneHandle) -> Option<&ZoneInstance> {
        self.zones.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: ZoneHandle) -> Option<&mut ZoneInstance> {
        self.zones.get_mut(handle.0)
    }

    pub fn descriptor(&self, handle: ZoneHandle) -> Option<&ZoneDescriptor> {
        self.get(handle).map(|z| &z.descriptor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneInstance> {
        self.zones.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ZoneInstance> {
        self.zones.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn first(&self) -> Option<&ZoneId> {
        self.zones.first().map(|z| z.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use isle_core::testing::MockWorld;

    fn descriptors() -> Vec<ZoneDescriptor> {
        vec![
            ZoneDescriptor::new("meadow", "maps/meadow", Vec3::ZERO).with_collectible("c1", Vec3::X),
            ZoneDescriptor::new("volcano", "maps/volcano", Vec3::ZERO),
        ]
    }

    #[test]
    fn test_bidirectional_lookup() {
        let zones = ZoneRegistry::initialize(descriptors(), |_| Box::new(MockWorld::new())).unwrap();

        let volcano = zones.zone_for_id(&ZoneId::new("volcano")).unwrap();
        assert_eq!(zones.id_for_zone(volcano), Some(&ZoneId::new("volcano")));
        assert_eq!(volcano.index(), 1);
        assert_eq!(zones.all_zones().len(), 2);
        assert_eq!(zones.first(), Some(&ZoneId::new("meadow")));
        assert!(zones.zone_for_id(&ZoneId::new("moon")).is_none());
        assert!(matches!(
            zones.require(&ZoneId::new("moon")),
            Err(ZoneError::UnknownZone(_))
        ));
    }

    #[test]
    fn test_duplicate_zone_is_rejected() {
        let mut d = descriptors();
        d.push(ZoneDescriptor::new("meadow", "maps/other", Vec3::ZERO));
        assert!(matches!(
            ZoneRegistry::initialize(d, |_| Box::new(MockWorld::new())),
            Err(ZoneError::DuplicateZone(_))
        ));
    }

    #[test]
    fn test_each_zone_gets_its_own_world() {
        let mut created = 0;
        let mut zones = ZoneRegistry::initialize(descriptors(), |_| {
            created += 1;
            Box::new(MockWorld::new())
        })
        .unwrap();
        assert_eq!(created, 2);

        let meadow = zones.zone_for_id(&ZoneId::new("meadow")).unwrap();
        let zone = zones.get_mut(meadow).unwrap();
        assert_eq!(zone.load_content().unwrap(), LoadOutcome::Loaded { spawned: 1 });
        assert_eq!(zone.load_content().unwrap(), LoadOutcome::AlreadyLoaded);

        let volcano = zones.zone_for_id(&ZoneId::new("volcano")).unwrap();
        assert!(zones.get(volcano).unwrap().loader.current().is_none());
    }
}
