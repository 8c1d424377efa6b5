/// Canvas placement for lab nodes: rows of nodes left to right, wrapping
/// to the next row once x passes the right edge.
#[derive(Debug, Clone)]
pub struct GridLayout {
    x: i32,
    y: i32,
}

const START_X: i32 = -1000;
const START_Y: i32 = -500;
const STEP_X: i32 = 200;
const STEP_Y: i32 = 250;
const MAX_X: i32 = 800;

impl Default for GridLayout {
    fn default() -> Self {
        Self { x: START_X, y: START_Y }
    }
}

impl Iterator for GridLayout {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        let here = (self.x, self.y);
        self.x += STEP_X;
        if self.x > MAX_X {
            self.x = START_X;
            self.y += STEP_Y;
        }
        Some(here)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_after_ten_nodes() {
        let slots: Vec<(i32, i32)> = GridLayout::default().take(12).collect();
        assert_eq!(slots[0], (-1000, -500));
        assert_eq!(slots[1], (-800, -500));
        assert_eq!(slots[9], (800, -500));
        assert_eq!(slots[10], (-1000, -250));
        assert_eq!(slots[11], (-800, -250));
    }
}
