use crate::detection::Detection;

/// One frame of detector output. An empty detection list is a valid frame
/// (the upstream detector simply missed everything).
pub struct Frame {
    pub index: usize,
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(index: usize, detections: Vec<Detection>) -> Self {
        Self { index, detections }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
