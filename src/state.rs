use std::sync::Arc;

use dashmap::DashMap;

use crate::pipeline::aggregate::GearLedger;
use crate::sources::GearLookup;
use crate::types::gear::Gear;

/// Gear nicknames for the lifetime of the process. Each id is looked up at most once;
/// a failed lookup is remembered as unresolved.
#[derive(Clone, Default)]
pub struct GearNames {
    cache: Arc<DashMap<String, Option<String>>>,
}

impl GearNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(&self, gear_id: &str, lookup: &dyn GearLookup) -> Option<String> {
        if let Some(entry) = self.cache.get(gear_id) {
            return entry.value().clone();
        }

        let nickname = match lookup.nickname(gear_id).await {
            Ok(nickname) => Some(nickname),
            Err(err) => {
                tracing::warn!("Gear lookup for {} failed, reporting by id: {}", gear_id, err);
                None
            }
        };
        self.cache.insert(gear_id.to_string(), nickname.clone());
        nickname
    }

    pub async fn resolve_all(&self, ledger: &GearLedger, lookup: &dyn GearLookup) -> Vec<Gear> {
        let mut gears = Vec::new();
        for gear_id in ledger.gear_ids() {
            let nickname = self.resolve(gear_id, lookup).await;
            gears.push(Gear {
                id: gear_id.to_string(),
                nickname,
            });
        }
        tracing::info!("Resolved {} gear entries, cache size {}", gears.len(), self.cache.len());
        gears
    }

    pub fn get(&self, gear_id: &str) -> Option<Gear> {
        self.cache.get(gear_id).map(|entry| Gear {
            id: gear_id.to_string(),
            nickname: entry.value().clone(),
        })
    }
}
