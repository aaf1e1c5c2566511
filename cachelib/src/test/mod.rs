use std::cell::RefCell;
use std::rc::Rc;
use crate::chain::MissHandler;

mod address_tests;
mod chain_tests;
mod config_tests;
mod stats_tests;

/// A call received by a [`Recorder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    Access { addr: u64, bytes: usize, store: bool },
    CleanInvalidate { addr: u64, bytes: usize, clean: bool, inval: bool },
}

/// A next level which remembers everything forwarded to it
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub calls: Vec<Call>,
}

impl Recorder {
    pub fn shared() -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder::default()))
    }

    pub fn writes(&self) -> Vec<u64> {
        self.calls.iter().filter_map(|call| match call {
            Call::Access { addr, store: true, .. } => Some(*addr),
            _ => None,
        }).collect()
    }
}

impl MissHandler for Recorder {
    fn access(&mut self, addr: u64, bytes: usize, store: bool) {
        self.calls.push(Call::Access { addr, bytes, store });
    }

    fn clean_invalidate(&mut self, addr: u64, bytes: usize, clean: bool, inval: bool) {
        self.calls.push(Call::CleanInvalidate { addr, bytes, clean, inval });
    }
}
