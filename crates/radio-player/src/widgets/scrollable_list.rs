//! Cursor + scroll bookkeeping for a fixed-length list.

pub struct ScrollableList {
    len: usize,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl ScrollableList {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            selected: 0,
            scroll_offset: 0,
        }
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.len == 0 {
            return;
        }
        self.selected = (self.selected + n).min(self.len - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }

    pub fn selected_index(&self) -> Option<usize> {
        (self.selected < self.len).then_some(self.selected)
    }

    /// Index range visible in `height` rows.  Call `ensure_visible` first.
    pub fn visible_range(&self, height: usize) -> std::ops::Range<usize> {
        let start = self.scroll_offset.min(self.len);
        start..(start + height).min(self.len)
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// Move the cursor to the clicked `row` (relative to the first visible
    /// row).  Returns the index hit, if any.
    pub fn handle_click(&mut self, row: usize) -> Option<usize> {
        let target = self.scroll_offset + row;
        if target < self.len {
            self.selected = target;
            Some(target)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut list = ScrollableList::new(3);
        list.select_up(1);
        assert_eq!(list.selected_index(), Some(0));
        list.select_down(10);
        assert_eq!(list.selected_index(), Some(2));

        let mut empty = ScrollableList::new(0);
        empty.select_down(1);
        assert_eq!(empty.selected_index(), None);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut list = ScrollableList::new(10);
        list.select_down(7);
        list.ensure_visible(4);
        assert_eq!(list.scroll_offset, 4);
        assert_eq!(list.visible_range(4), 4..8);

        list.select_first();
        list.ensure_visible(4);
        assert_eq!(list.visible_range(4), 0..4);
    }

    #[test]
    fn test_click_past_end_misses() {
        let mut list = ScrollableList::new(10);
        list.select_last();
        list.ensure_visible(4);
        assert_eq!(list.handle_click(0), Some(6));
        assert_eq!(list.handle_click(4), None);
        assert_eq!(list.selected_index(), Some(6));
    }
}
