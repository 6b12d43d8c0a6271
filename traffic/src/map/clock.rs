use crate::map::LightController;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Default)]
struct ClockInner {
    controllers: Vec<Weak<RefCell<LightController>>>,
    ticks: u64,
}

/// Advances every registered light controller by one second per tick.
///
/// Cloning a clock yields another handle to the same registry, so several networks can
/// share one clock. Controllers are held weakly: replacing or dropping them is enough to
/// stop them from being ticked.
#[derive(Clone, Default)]
pub struct Clock {
    inner: Rc<RefCell<ClockInner>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, controller: &Rc<RefCell<LightController>>) {
        self.inner
            .borrow_mut()
            .controllers
            .push(Rc::downgrade(controller));
    }

    /// Ticks all live controllers in registration order
    pub fn tick(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.controllers.retain(|c| c.strong_count() > 0);
        for c in &inner.controllers {
            let c = unwrap_cont!(c.upgrade());
            c.borrow_mut().one_second();
        }
        inner.ticks += 1;
        trace!(
            "tick {} over {} controllers",
            inner.ticks,
            inner.controllers.len()
        );
    }

    /// Number of ticks since the clock was created
    pub fn ticks(&self) -> u64 {
        self.inner.borrow().ticks
    }

    /// Number of controllers still alive
    pub fn n_controllers(&self) -> usize {
        self.inner
            .borrow()
            .controllers
            .iter()
            .filter(|c| c.strong_count() > 0)
            .count()
    }

    pub fn same_clock(&self, other: &Clock) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("ticks", &self.ticks())
            .field("controllers", &self.n_controllers())
            .finish()
    }
}
