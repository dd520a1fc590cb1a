//! Tagged form of a treatment's scope.
//!
//! Storage keeps a flat row (`scope_level`, nullable `farm_id`, parcel join
//! rows); everything above the storage boundary works with [`TreatmentScope`],
//! which cannot represent a mismatched combination.

use super::models::ScopeLevel;
use crate::common::errors::{BusinessError, BusinessResult};
use crate::validation_error;
use std::collections::HashSet;
use uuid::Uuid;

impl ScopeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeLevel::Client => "client",
            ScopeLevel::Farm => "farm",
            ScopeLevel::Parcels => "parcels",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreatmentScope {
    Client,
    Farm(Uuid),
    /// Non-empty, duplicate-free, in the order given
    Parcels(Vec<Uuid>),
}

impl TreatmentScope {
    /// Builds the scope from request fields, rejecting references that do not
    /// belong to the chosen level
    pub fn from_request(
        level: ScopeLevel,
        farm_id: Option<Uuid>,
        parcel_ids: &[Uuid],
    ) -> BusinessResult<Self> {
        match level {
            ScopeLevel::Client => {
                if farm_id.is_some() {
                    return Err(validation_error!(
                        "farm_id",
                        "must not be set for a client-scoped treatment"
                    ));
                }
                if !parcel_ids.is_empty() {
                    return Err(validation_error!(
                        "parcel_ids",
                        "must be empty for a client-scoped treatment"
                    ));
                }
                Ok(Self::Client)
            }
            ScopeLevel::Farm => {
                if !parcel_ids.is_empty() {
                    return Err(validation_error!(
                        "parcel_ids",
                        "must be empty for a farm-scoped treatment"
                    ));
                }
                farm_id
                    .map(Self::Farm)
                    .ok_or_else(|| {
                        validation_error!("farm_id", "is required for a farm-scoped treatment")
                    })
            }
            ScopeLevel::Parcels => {
                if farm_id.is_some() {
                    return Err(validation_error!(
                        "farm_id",
                        "must not be set for a parcel-scoped treatment"
                    ));
                }
                let mut seen = HashSet::new();
                let unique: Vec<Uuid> = parcel_ids
                    .iter()
                    .copied()
                    .filter(|id| seen.insert(*id))
                    .collect();
                if unique.is_empty() {
                    return Err(validation_error!(
                        "parcel_ids",
                        "at least one parcel is required for a parcel-scoped treatment"
                    ));
                }
                Ok(Self::Parcels(unique))
            }
        }
    }

    /// Rebuilds the scope from a stored row. A mismatch here means the data
    /// was written around the service layer.
    pub fn from_stored(
        level: ScopeLevel,
        farm_id: Option<Uuid>,
        parcel_ids: Vec<Uuid>,
    ) -> BusinessResult<Self> {
        match (level, farm_id, parcel_ids.is_empty()) {
            (ScopeLevel::Client, None, true) => Ok(Self::Client),
            (ScopeLevel::Farm, Some(farm_id), true) => Ok(Self::Farm(farm_id)),
            (ScopeLevel::Parcels, None, false) => Ok(Self::Parcels(parcel_ids)),
            (level, farm_id, _) => Err(BusinessError::InternalError {
                message: format!(
                    "stored treatment scope is inconsistent: \
                     level {level:?}, farm {farm_id:?}, {} parcels",
                    parcel_ids.len()
                ),
            }),
        }
    }

    pub fn level(&self) -> ScopeLevel {
        match self {
            Self::Client => ScopeLevel::Client,
            Self::Farm(_) => ScopeLevel::Farm,
            Self::Parcels(_) => ScopeLevel::Parcels,
        }
    }

    pub fn farm_id(&self) -> Option<Uuid> {
        match self {
            Self::Farm(farm_id) => Some(*farm_id),
            _ => None,
        }
    }

    pub fn parcel_ids(&self) -> &[Uuid] {
        match self {
            Self::Parcels(ids) => ids,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_client_scope() {
        let scope = TreatmentScope::from_request(ScopeLevel::Client, None, &[]).unwrap();
        assert_eq!(scope, TreatmentScope::Client);
        assert_eq!(scope.farm_id(), None);
        assert!(scope.parcel_ids().is_empty());
    }

    #[test]
    fn test_farm_scope() {
        let scope = TreatmentScope::from_request(ScopeLevel::Farm, Some(id(7)), &[]).unwrap();
        assert_eq!(scope, TreatmentScope::Farm(id(7)));
        assert_eq!(scope.level(), ScopeLevel::Farm);
    }

    #[test]
    fn test_parcel_scope_dedupes_and_keeps_order() {
        let scope = TreatmentScope::from_request(
            ScopeLevel::Parcels,
            None,
            &[id(3), id(1), id(3), id(2), id(1)],
        )
        .unwrap();
        assert_eq!(scope.parcel_ids(), &[id(3), id(1), id(2)]);
    }

    #[rstest]
    #[case::client_with_farm(ScopeLevel::Client, Some(1), vec![], "farm_id")]
    #[case::client_with_parcels(ScopeLevel::Client, None, vec![1], "parcel_ids")]
    #[case::farm_missing(ScopeLevel::Farm, None, vec![], "farm_id")]
    #[case::farm_with_parcels(ScopeLevel::Farm, Some(1), vec![2], "parcel_ids")]
    #[case::parcels_empty(ScopeLevel::Parcels, None, vec![], "parcel_ids")]
    #[case::parcels_with_farm(ScopeLevel::Parcels, Some(1), vec![2], "farm_id")]
    fn test_mismatched_references_rejected(
        #[case] level: ScopeLevel,
        #[case] farm: Option<u128>,
        #[case] parcels: Vec<u128>,
        #[case] expected_field: &str,
    ) {
        let parcels: Vec<Uuid> = parcels.into_iter().map(id).collect();
        match TreatmentScope::from_request(level, farm.map(id), &parcels) {
            Err(BusinessError::ValidationError { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_inconsistent_stored_row_is_internal_error() {
        let result = TreatmentScope::from_stored(ScopeLevel::Parcels, None, vec![]);
        assert!(matches!(result, Err(BusinessError::InternalError { .. })));

        let result = TreatmentScope::from_stored(ScopeLevel::Farm, Some(id(1)), vec![]);
        assert_eq!(result.unwrap(), TreatmentScope::Farm(id(1)));
    }
}
