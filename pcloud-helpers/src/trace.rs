use crate::{Float, Gesture, TracePoint};

/// Accumulates samples while a pointer or touch is down.
///
/// Every call to [`GestureBuilder::begin_stroke`] opens a new pen-down
/// segment; stroke ids are numbered from 0 in the order strokes are begun.
/// Samples pushed before any stroke was begun belong to stroke 0.
#[derive(Debug, Clone, Default)]
pub struct GestureBuilder<F>
where
    F: Float,
{
    points: Vec<TracePoint<F>>,
    current_stroke: Option<i32>,
}

impl<F> GestureBuilder<F>
where
    F: Float,
{
    pub fn new() -> Self {
        GestureBuilder {
            points: Vec::new(),
            current_stroke: None,
        }
    }

    /// Opens a new stroke and returns its id.
    pub fn begin_stroke(&mut self) -> i32 {
        let next = self.current_stroke.map_or(0, |id| id + 1);
        self.current_stroke = Some(next);
        next
    }

    pub fn push(&mut self, x: F, y: F) {
        let stroke_id = match self.current_stroke {
            Some(id) => id,
            None => self.begin_stroke(),
        };
        self.points.push(TracePoint::new(x, y, stroke_id));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drops all samples and restarts stroke numbering.
    pub fn clear(&mut self) {
        self.points.clear();
        self.current_stroke = None;
    }

    pub fn finish(self, label: impl Into<String>) -> Gesture<F> {
        Gesture::new(label, self.points)
    }
}
