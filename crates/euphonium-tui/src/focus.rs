//! FocusRing: keyboard focus cycling between the panes currently on screen.

use crate::action::ComponentId;

pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn items(&self) -> &[ComponentId] {
        &self.items
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = if self.current == 0 {
            self.items.len() - 1
        } else {
            self.current - 1
        };
        self.current()
    }

    /// Focus `id` if it is part of the ring.
    pub fn set(&mut self, id: ComponentId) -> bool {
        match self.items.iter().position(|&x| x == id) {
            Some(pos) => {
                self.current = pos;
                true
            }
            None => false,
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }

    /// Replace the ring contents, keeping the focused id when it survives.
    pub fn set_items(&mut self, items: Vec<ComponentId>) {
        let old = self.current();
        self.items = items;
        self.current = old
            .and_then(|id| self.items.iter().position(|&x| x == id))
            .unwrap_or(0);
    }

    /// Focus the Nth item (0-indexed). No-op if out of bounds.
    pub fn set_by_position(&mut self, pos: usize) -> Option<ComponentId> {
        if pos < self.items.len() {
            self.current = pos;
            self.current()
        } else {
            None
        }
    }
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_both_ways() {
        let mut ring = FocusRing::new(vec![
            ComponentId::Sidebar,
            ComponentId::Content,
            ComponentId::PlaybackBar,
        ]);
        assert_eq!(ring.current(), Some(ComponentId::Sidebar));
        assert_eq!(ring.prev(), Some(ComponentId::PlaybackBar));
        assert_eq!(ring.next(), Some(ComponentId::Sidebar));
        assert_eq!(ring.next(), Some(ComponentId::Content));
    }

    #[test]
    fn test_set_items_keeps_focus_when_possible() {
        let mut ring = FocusRing::new(vec![ComponentId::Sidebar, ComponentId::Content]);
        ring.set(ComponentId::Content);
        ring.set_items(vec![ComponentId::Content, ComponentId::PlaybackBar]);
        assert_eq!(ring.current(), Some(ComponentId::Content));
        ring.set_items(vec![ComponentId::PlaybackBar]);
        assert_eq!(ring.current(), Some(ComponentId::PlaybackBar));
        assert!(!ring.set(ComponentId::Sidebar));
    }

    #[test]
    fn test_empty_ring() {
        let mut ring = FocusRing::default();
        assert_eq!(ring.next(), None);
        assert_eq!(ring.set_by_position(2), None);
    }
}
