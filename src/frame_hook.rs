use std::cell::RefCell;
use std::rc::Rc;

/// A replaceable callback shared between the page and the frame loop.
///
/// [`FrameHook::get`] hands out a clone and releases the cell, so a running
/// callback may replace or clear itself.
pub struct FrameHook<F> {
    slot: Rc<RefCell<Option<F>>>,
}

impl<F> Clone for FrameHook<F> {
    fn clone(&self) -> Self {
        Self { slot: self.slot.clone() }
    }
}

impl<F> Default for FrameHook<F> {
    fn default() -> Self {
        Self { slot: Rc::new(RefCell::new(None)) }
    }
}

impl<F: Clone> FrameHook<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, callback: Option<F>) {
        self.slot.replace(callback);
    }

    pub fn get(&self) -> Option<F> {
        self.slot.borrow().clone()
    }
}
