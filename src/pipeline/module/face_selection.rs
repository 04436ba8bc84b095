use std::cmp::Ordering;
use crate::pipeline::processing::rect::Rect;

#[derive(Debug, Clone, Default)]
pub struct FaceSelection {}

impl FaceSelection {
    pub fn new() -> Self {
        FaceSelection {}
    }

    fn compare(a: &Rect, b: &Rect) -> Ordering {
        // Larger area wins; on a tie the top-most, then left-most rectangle wins.
        a.area()
            .cmp(&b.area())
            .then_with(|| b.y.cmp(&a.y))
            .then_with(|| b.x.cmp(&a.x))
    }

    /// Pick the biggest face, or `None` when the detector found nothing.
    pub fn call(&self, faces: &[Rect]) -> Option<Rect> {
        faces.iter().copied().max_by(Self::compare)
    }
}
