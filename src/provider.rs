use crate::ir::{MeasuredElement, Rect, Scene};

/// Read access to the rendered canvas.
///
/// A browser host implements this over the DOM (bounding client rects,
/// computed styles and data attributes); tests and the CLI use
/// [`SceneProvider`]. All rectangles are viewport pixels.
pub trait RectProvider {
    /// Bounding rect of the canvas root element.
    fn canvas_rect(&self) -> Rect;

    /// Every container element currently rendered under the canvas root, in
    /// document order.
    fn elements(&self) -> Vec<MeasuredElement>;

    /// Current rect and flags for the element with `key`.
    fn element(&self, key: &str) -> Option<MeasuredElement> {
        self.elements()
            .into_iter()
            .find(|element| element.key.as_deref() == Some(key))
    }
}

/// In-memory provider backed by a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct SceneProvider {
    canvas: Rect,
    elements: Vec<MeasuredElement>,
}

impl SceneProvider {
    pub fn new(canvas: Rect, elements: Vec<MeasuredElement>) -> Self {
        Self { canvas, elements }
    }

    pub fn from_scene(scene: &Scene) -> Self {
        Self::new(scene.canvas, scene.elements.clone())
    }

    pub fn push(&mut self, element: MeasuredElement) {
        self.elements.push(element);
    }

    pub fn remove(&mut self, key: &str) -> Option<MeasuredElement> {
        let idx = self
            .elements
            .iter()
            .position(|element| element.key.as_deref() == Some(key))?;
        Some(self.elements.remove(idx))
    }

    pub fn element_mut(&mut self, key: &str) -> Option<&mut MeasuredElement> {
        self.elements
            .iter_mut()
            .find(|element| element.key.as_deref() == Some(key))
    }

    pub fn set_rect(&mut self, key: &str, rect: Rect) -> bool {
        match self.element_mut(key) {
            Some(element) => {
                element.rect = rect;
                true
            }
            None => false,
        }
    }
}

impl RectProvider for SceneProvider {
    fn canvas_rect(&self) -> Rect {
        self.canvas
    }

    fn elements(&self) -> Vec<MeasuredElement> {
        self.elements.clone()
    }

    fn element(&self, key: &str) -> Option<MeasuredElement> {
        self.elements
            .iter()
            .find(|element| element.key.as_deref() == Some(key))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_and_moves_elements() {
        let mut provider = SceneProvider::new(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            vec![MeasuredElement::new("a", Rect::new(10.0, 10.0, 20.0, 20.0))],
        );
        assert!(provider.element("a").is_some());
        assert!(provider.element("missing").is_none());
        assert!(provider.set_rect("a", Rect::new(40.0, 10.0, 20.0, 20.0)));
        assert_eq!(provider.element("a").unwrap().rect.left, 40.0);
        assert!(provider.remove("a").is_some());
        assert!(provider.elements().is_empty());
    }
}
