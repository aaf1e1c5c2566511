use std::cell::RefCell;
use std::rc::Rc;
use crate::cache::Cache;
use crate::trace::AccessKind;

/// Decides which accesses of a trace a cache sees, and feeds them to it
pub trait MemTracer {
    fn interested_in(&self, kind: AccessKind) -> bool;

    fn trace(&mut self, addr: u64, bytes: usize, kind: AccessKind);

    fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool);

    fn cache(&self) -> &Rc<RefCell<Cache>>;
}

/// Feeds instruction fetches to an instruction cache, as reads
pub struct ICacheTracer {
    cache: Rc<RefCell<Cache>>,
}

impl ICacheTracer {
    pub fn new(cache: Rc<RefCell<Cache>>) -> Self {
        Self { cache }
    }
}

impl MemTracer for ICacheTracer {
    fn interested_in(&self, kind: AccessKind) -> bool {
        kind == AccessKind::Fetch
    }

    fn trace(&mut self, addr: u64, bytes: usize, kind: AccessKind) {
        if kind == AccessKind::Fetch {
            self.cache.borrow_mut().access(addr, bytes, false);
        }
    }

    fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) {
        self.cache.borrow_mut().clean_invalidate(addr, bytes, clean, inval);
    }

    fn cache(&self) -> &Rc<RefCell<Cache>> {
        &self.cache
    }
}

/// Feeds loads and stores to a data cache
pub struct DCacheTracer {
    cache: Rc<RefCell<Cache>>,
}

impl DCacheTracer {
    pub fn new(cache: Rc<RefCell<Cache>>) -> Self {
        Self { cache }
    }
}

impl MemTracer for DCacheTracer {
    fn interested_in(&self, kind: AccessKind) -> bool {
        matches!(kind, AccessKind::Load | AccessKind::Store)
    }

    fn trace(&mut self, addr: u64, bytes: usize, kind: AccessKind) {
        match kind {
            AccessKind::Load => self.cache.borrow_mut().access(addr, bytes, false),
            AccessKind::Store => self.cache.borrow_mut().access(addr, bytes, true),
            AccessKind::Fetch => {}
        }
    }

    fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) {
        self.cache.borrow_mut().clean_invalidate(addr, bytes, clean, inval);
    }

    fn cache(&self) -> &Rc<RefCell<Cache>> {
        &self.cache
    }
}
