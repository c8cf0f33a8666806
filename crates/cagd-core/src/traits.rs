use crate::error::Result;

/// Validate structural integrity of a geometric entity.
pub trait Validate {
    fn validate(&self) -> Result<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Compute an axis-aligned bounding box.
pub trait BoundingBox {
    type Point;

    /// `None` when the entity has no points to bound.
    fn bounding_box(&self) -> Option<(Self::Point, Self::Point)>;
}
