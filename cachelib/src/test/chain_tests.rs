use crate::cache::Cache;
use crate::chain::{connect, ChainError, MainMemory, MissHandler, SharedHandler};
use crate::config::ReplacementPolicyConfig;
use std::cell::RefCell;
use std::rc::Rc;

fn shared(name: &str) -> Rc<RefCell<Cache>> {
    Cache::new(name, "4:2:16".parse().unwrap(), ReplacementPolicyConfig::Random, 1).into_shared()
}

#[test]
fn connect_builds_acyclic_chain() {
    let l1 = shared("L1");
    let l2 = shared("L2");
    let memory = Rc::new(RefCell::new(MainMemory::new()));
    connect(&l2, memory.clone()).unwrap();
    connect(&l1, l2.clone()).unwrap();
    l1.borrow_mut().access(0x100, 4, false);
    assert_eq!(l2.borrow().stats().read_misses, 1);
    assert_eq!(memory.borrow().stats().reads, 1);
    assert_eq!(memory.borrow().stats().bytes_read, 16);
}

#[test]
fn connect_refuses_cycles() {
    let a = shared("A");
    let b = shared("B");
    let c = shared("C");
    connect(&a, b.clone()).unwrap();
    connect(&b, c.clone()).unwrap();
    assert_eq!(connect(&c, a.clone()), Err(ChainError::Cycle("C".to_string())));
    assert_eq!(connect(&a, a.clone()), Err(ChainError::Cycle("A".to_string())));
    // The refused connection left C at the end of the chain
    assert!(c.borrow().next_level().is_none());
}

#[test]
fn connect_refuses_chain_which_already_loops() {
    let a = shared("A");
    let b = shared("B");
    a.borrow_mut().set_next_level(b.clone());
    b.borrow_mut().set_next_level(a.clone());
    let c = shared("C");
    assert_eq!(connect(&c, a.clone()), Err(ChainError::Cycle("C".to_string())));
    assert!(c.borrow().next_level().is_none());
    // Break the loop so the caches can be dropped
    b.borrow_mut().set_next_level(Rc::new(RefCell::new(MainMemory::new())));
}

#[test]
fn shared_next_level_sees_both_first_levels() {
    let icache = shared("I$");
    let dcache = shared("D$");
    let l2 = shared("L2$");
    let below: SharedHandler = l2.clone();
    connect(&icache, below.clone()).unwrap();
    connect(&dcache, below).unwrap();
    icache.borrow_mut().access(0x1000, 4, false);
    dcache.borrow_mut().access(0x2010, 8, true);
    dcache.borrow_mut().access(0x1000, 8, false);
    let l2 = l2.borrow();
    assert_eq!(l2.stats().read_accesses, 3);
    // The data cache's fill of 0x1000 found what the instruction cache brought in
    assert_eq!(l2.stats().read_misses, 2);
}

#[test]
fn main_memory_counts_reads_and_writes() {
    let mut memory = MainMemory::new();
    memory.access(0x0, 64, false);
    memory.access(0x40, 64, true);
    memory.access(0x80, 64, true);
    memory.clean_invalidate(0x0, 4096, true, true);
    let stats = memory.stats();
    assert_eq!((stats.reads, stats.writes), (1, 2));
    assert_eq!((stats.bytes_read, stats.bytes_written), (64, 128));
    assert_eq!(stats.accesses(), 3);
}
