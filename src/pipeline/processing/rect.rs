/// Axis-aligned pixel rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersect with `[0, width) x [0, height)`. Out-of-range rectangles collapse to zero area.
    pub fn clamp_to(&self, width: u32, height: u32) -> Rect {
        let x1 = self.x.min(width);
        let y1 = self.y.min(height);
        let x2 = self.right().min(width);
        let y2 = self.bottom().min(height);

        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Grow by `margin_x` / `margin_y` on every side, clamped to the given bounds.
    pub fn expand(&self, margin_x: u32, margin_y: u32, width: u32, height: u32) -> Rect {
        let x1 = self.x.saturating_sub(margin_x);
        let y1 = self.y.saturating_sub(margin_y);
        let x2 = self.right().saturating_add(margin_x);
        let y2 = self.bottom().saturating_add(margin_y);

        Rect::new(x1, y1, x2 - x1, y2 - y1).clamp_to(width, height)
    }

    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}


#[cfg(test)]
mod tests {
    use crate::pipeline::processing::rect::Rect;

    #[test]
    fn test_area() {
        assert_eq!(Rect::new(3, 4, 10, 20).area(), 200);
        assert!(Rect::new(3, 4, 0, 20).is_empty());
    }

    #[test]
    fn test_clamp_to() {
        let rect = Rect::new(90, 40, 30, 30);
        assert_eq!(rect.clamp_to(100, 50), Rect::new(90, 40, 10, 10));

        let outside = Rect::new(120, 10, 5, 5);
        assert!(outside.clamp_to(100, 50).is_empty());
    }

    #[test]
    fn test_expand_is_clamped() {
        let rect = Rect::new(5, 10, 20, 20);
        let expanded = rect.expand(8, 12, 30, 100);

        assert_eq!(expanded, Rect::new(0, 0, 30, 42));
    }

    #[test]
    fn test_contains_point() {
        let rect = Rect::new(10, 10, 5, 5);
        assert!(rect.contains_point(10, 14));
        assert!(!rect.contains_point(15, 12));
    }
}
