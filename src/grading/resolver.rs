//! Grade hierarchy resolution
//!
//! A `GradeBook` is a read-only snapshot of the grade registry, mapping each
//! grade id to its product and rank. The classification engine only sees
//! ranks; this is where ids become ranks, and where a dangling reference
//! turns into a typed error instead of a bogus comparison.

use std::collections::HashMap;

use crate::core::identity::EntityId;
use crate::entities::grade::Grade;
use crate::grading::classify::{Classification, Rank};
use crate::grading::GradingError;

/// Resolved view of one grade: which hierarchy it belongs to and where
#[derive(Debug, Clone)]
pub struct GradeRef {
    pub product: EntityId,
    pub rank: Rank,
    pub name: String,
}

/// Read-only rank lookup table built from the loaded grade registry
#[derive(Debug, Default)]
pub struct GradeBook {
    by_id: HashMap<EntityId, GradeRef>,
}

impl GradeBook {
    /// Build a book from loaded grade entities
    pub fn from_grades(grades: &[Grade]) -> Self {
        let by_id = grades
            .iter()
            .map(|g| {
                (
                    g.id.clone(),
                    GradeRef {
                        product: g.product.clone(),
                        rank: g.rank,
                        name: g.name.clone(),
                    },
                )
            })
            .collect();
        Self { by_id }
    }

    /// Resolve a grade id to its product and rank
    pub fn resolve(&self, id: &EntityId) -> Result<&GradeRef, GradingError> {
        self.by_id
            .get(id)
            .ok_or_else(|| GradingError::GradeNotFound { id: id.to_string() })
    }

    /// Resolve a grade id to its rank
    pub fn rank(&self, id: &EntityId) -> Result<Rank, GradingError> {
        self.resolve(id).map(|r| r.rank)
    }

    /// Classify one piece from its two grade ids.
    ///
    /// A lookup failure on either side fails the whole call with
    /// `InvalidGradeReference`; no classification is produced and no other
    /// piece is affected. Both grades are expected to belong to the same
    /// product hierarchy - callers enforce that before getting here.
    pub fn classify_pair(
        &self,
        inspector_grade: &EntityId,
        scanner_grade: &EntityId,
    ) -> Result<Classification, GradingError> {
        let inspector = self.rank(inspector_grade).map_err(|_| {
            GradingError::InvalidGradeReference {
                id: inspector_grade.to_string(),
            }
        })?;
        let scanner =
            self.rank(scanner_grade)
                .map_err(|_| GradingError::InvalidGradeReference {
                    id: scanner_grade.to_string(),
                })?;

        Ok(Classification::classify(inspector, scanner))
    }

    /// Check that a grade belongs to the expected product hierarchy
    pub fn check_product(
        &self,
        grade: &EntityId,
        expected_product: &EntityId,
    ) -> Result<(), GradingError> {
        let resolved = self.resolve(grade)?;
        if &resolved.product != expected_product {
            return Err(GradingError::ProductMismatch {
                grade: grade.to_string(),
                expected: expected_product.to_string(),
            });
        }
        Ok(())
    }

    /// Number of grades in the book
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when no grades are loaded
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    fn sample_grades() -> (Vec<Grade>, EntityId) {
        let product = EntityId::new(EntityPrefix::Prod);
        let grades = vec![
            Grade::new("Clear".to_string(), product.clone(), 1, "test".to_string()),
            Grade::new("Standard".to_string(), product.clone(), 2, "test".to_string()),
            Grade::new("Economy".to_string(), product.clone(), 3, "test".to_string()),
        ];
        (grades, product)
    }

    #[test]
    fn test_rank_lookup() {
        let (grades, _) = sample_grades();
        let book = GradeBook::from_grades(&grades);

        assert_eq!(book.rank(&grades[0].id).unwrap(), 1);
        assert_eq!(book.rank(&grades[2].id).unwrap(), 3);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_unknown_grade_is_not_found() {
        let (grades, _) = sample_grades();
        let book = GradeBook::from_grades(&grades);

        let missing = EntityId::new(EntityPrefix::Grd);
        let err = book.rank(&missing).unwrap_err();
        assert!(matches!(err, GradingError::GradeNotFound { .. }));
    }

    #[test]
    fn test_classify_pair() {
        let (grades, _) = sample_grades();
        let book = GradeBook::from_grades(&grades);

        // Inspector rank 2, scanner rank 1: scanner rated it better
        assert_eq!(
            book.classify_pair(&grades[1].id, &grades[0].id).unwrap(),
            Classification::Overgrade
        );
        // Inspector rank 1, scanner rank 2: scanner rated it worse
        assert_eq!(
            book.classify_pair(&grades[0].id, &grades[1].id).unwrap(),
            Classification::Undergrade
        );
        assert_eq!(
            book.classify_pair(&grades[2].id, &grades[2].id).unwrap(),
            Classification::Match
        );
    }

    #[test]
    fn test_classify_pair_dangling_reference() {
        let (grades, _) = sample_grades();
        let book = GradeBook::from_grades(&grades);
        let missing = EntityId::new(EntityPrefix::Grd);

        let err = book.classify_pair(&grades[0].id, &missing).unwrap_err();
        match err {
            GradingError::InvalidGradeReference { id } => {
                assert_eq!(id, missing.to_string());
            }
            other => panic!("expected InvalidGradeReference, got {other:?}"),
        }

        let err = book.classify_pair(&missing, &grades[0].id).unwrap_err();
        assert!(matches!(err, GradingError::InvalidGradeReference { .. }));
    }

    #[test]
    fn test_check_product() {
        let (grades, product) = sample_grades();
        let book = GradeBook::from_grades(&grades);

        assert!(book.check_product(&grades[0].id, &product).is_ok());

        let other_product = EntityId::new(EntityPrefix::Prod);
        let err = book.check_product(&grades[0].id, &other_product).unwrap_err();
        assert!(matches!(err, GradingError::ProductMismatch { .. }));
    }

    #[test]
    fn test_tied_ranks_compare_equal() {
        let product = EntityId::new(EntityPrefix::Prod);
        let a = Grade::new("Shop A".to_string(), product.clone(), 2, "test".to_string());
        let b = Grade::new("Shop B".to_string(), product.clone(), 2, "test".to_string());
        let book = GradeBook::from_grades(&[a.clone(), b.clone()]);

        assert_eq!(
            book.classify_pair(&a.id, &b.id).unwrap(),
            Classification::Match
        );
    }
}
