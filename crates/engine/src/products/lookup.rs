//! Product lookup chain.
//!
//! A product key may be a UUID, an id inherited from the previous catalog or
//! a product code, and the row may only exist in the mirror. Each strategy
//! answers one of those cases; [`resolve`] tries them in [`LOOKUP_CHAIN`]
//! order and returns the first hit. Mirror rows of deleted products are
//! skipped.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use super::{ProductRecord, RecordSource, mirror, primary, tombstone};
use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupStrategy {
    PrimaryById,
    PrimaryByLegacyId,
    PrimaryByCode,
    MirrorById,
    MirrorByLegacyId,
}

pub const LOOKUP_CHAIN: [LookupStrategy; 5] = [
    LookupStrategy::PrimaryById,
    LookupStrategy::PrimaryByLegacyId,
    LookupStrategy::PrimaryByCode,
    LookupStrategy::MirrorById,
    LookupStrategy::MirrorByLegacyId,
];

impl LookupStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryById => "primary_by_id",
            Self::PrimaryByLegacyId => "primary_by_legacy_id",
            Self::PrimaryByCode => "primary_by_code",
            Self::MirrorById => "mirror_by_id",
            Self::MirrorByLegacyId => "mirror_by_legacy_id",
        }
    }

    /// Whether the key has the shape this strategy searches for.
    pub fn applies_to(self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() {
            return false;
        }
        match self {
            Self::PrimaryById | Self::MirrorById => Uuid::parse_str(key).is_ok(),
            Self::PrimaryByLegacyId | Self::PrimaryByCode | Self::MirrorByLegacyId => {
                Uuid::parse_str(key).is_err()
            }
        }
    }

    /// Runs the strategy. Keys of the wrong shape return `None` without a
    /// query.
    pub async fn run<P, M>(
        self,
        primary_db: &P,
        mirror_db: &M,
        key: &str,
    ) -> ResultEngine<Option<ProductRecord>>
    where
        P: ConnectionTrait,
        M: ConnectionTrait,
    {
        if !self.applies_to(key) {
            return Ok(None);
        }
        let key = key.trim();

        let record = match self {
            Self::PrimaryById => primary::Entity::find_by_id(key.to_string())
                .one(primary_db)
                .await?
                .map(ProductRecord::from),
            Self::PrimaryByLegacyId => primary::Entity::find()
                .filter(primary::Column::LegacyId.eq(key))
                .one(primary_db)
                .await?
                .map(ProductRecord::from),
            Self::PrimaryByCode => primary::Entity::find()
                .filter(primary::Column::Code.eq(key))
                .one(primary_db)
                .await?
                .map(ProductRecord::from),
            Self::MirrorById => mirror::Entity::find_by_id(key.to_string())
                .one(mirror_db)
                .await?
                .map(ProductRecord::from),
            Self::MirrorByLegacyId => mirror::Entity::find()
                .filter(mirror::Column::LegacyId.eq(key))
                .one(mirror_db)
                .await?
                .map(ProductRecord::from),
        };

        // A mirror row may outlive a delete; the primary store's tombstone wins.
        if let Some(found) = &record
            && found.source == RecordSource::Mirror
            && tombstone::Entity::find_by_id(found.id.clone())
                .one(primary_db)
                .await?
                .is_some()
        {
            tracing::debug!(id = %found.id, "mirror row of a deleted product ignored");
            return Ok(None);
        }
        Ok(record)
    }
}

/// Tries every strategy in order.
///
/// A failing strategy is logged and the chain goes on; the error is only
/// returned when no later strategy finds the product.
pub async fn resolve<P, M>(
    primary_db: &P,
    mirror_db: &M,
    key: &str,
) -> ResultEngine<Option<ProductRecord>>
where
    P: ConnectionTrait,
    M: ConnectionTrait,
{
    let mut last_error: Option<EngineError> = None;
    for strategy in LOOKUP_CHAIN {
        match strategy.run(primary_db, mirror_db, key).await {
            Ok(Some(record)) => {
                tracing::debug!(key, strategy = strategy.as_str(), "product found");
                return Ok(Some(record));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(key, strategy = strategy.as_str(), "product lookup failed: {err}");
                last_error = Some(err);
            }
        }
    }
    match last_error {
        Some(err) => Err(err),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_keys_only_hit_id_strategies() {
        let key = Uuid::new_v4().to_string();
        let applicable: Vec<LookupStrategy> = LOOKUP_CHAIN
            .into_iter()
            .filter(|s| s.applies_to(&key))
            .collect();
        assert_eq!(
            applicable,
            vec![LookupStrategy::PrimaryById, LookupStrategy::MirrorById]
        );
    }

    #[test]
    fn other_keys_hit_legacy_and_code_strategies() {
        let applicable: Vec<LookupStrategy> = LOOKUP_CHAIN
            .into_iter()
            .filter(|s| s.applies_to("1042"))
            .collect();
        assert_eq!(
            applicable,
            vec![
                LookupStrategy::PrimaryByLegacyId,
                LookupStrategy::PrimaryByCode,
                LookupStrategy::MirrorByLegacyId,
            ]
        );
    }

    #[test]
    fn blank_keys_hit_nothing() {
        assert!(LOOKUP_CHAIN.into_iter().all(|s| !s.applies_to("   ")));
    }

    #[test]
    fn primary_is_tried_before_mirror() {
        let first_mirror = LOOKUP_CHAIN
            .iter()
            .position(|s| matches!(s, LookupStrategy::MirrorById))
            .unwrap();
        assert!(LOOKUP_CHAIN[..first_mirror].iter().all(|s| !matches!(
            s,
            LookupStrategy::MirrorById | LookupStrategy::MirrorByLegacyId
        )));
    }
}
