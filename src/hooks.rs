//! Capabilities the host injects into the simulation.
//!
//! The core never looks inside a [`Sprite`] and never knows what a
//! [`Notifier`] does; it only decides when to hand them over or fire them.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Optional zero-argument callback (sound effects and the like).
#[derive(Default)]
pub struct Notifier(Option<Box<dyn FnMut()>>);

impl Notifier {
    pub fn new(f: impl FnMut() + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Fire the callback, or do nothing if none was installed.
    pub fn notify(&mut self) {
        if let Some(f) = self.0.as_mut() {
            f();
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_set() { "Notifier(set)" } else { "Notifier(none)" })
    }
}

/// Opaque drawable handle, only interpreted by the renderer that made it.
#[derive(Clone)]
pub struct Sprite(Rc<dyn Any>);

impl Sprite {
    pub fn new<T: Any>(drawable: T) -> Self {
        Self(Rc::new(drawable))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sprite(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_unset_notifier_is_noop() {
        let mut n = Notifier::none();
        n.notify();
        assert!(!n.is_set());
    }

    #[test]
    fn test_notifier_fires_each_time() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let mut n = Notifier::new(move || c.set(c.get() + 1));
        n.notify();
        n.notify();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_sprite_round_trips_its_payload() {
        let sprite = Sprite::new(42u32);
        assert_eq!(sprite.downcast_ref::<u32>(), Some(&42));
        assert!(sprite.downcast_ref::<String>().is_none());
    }
}
