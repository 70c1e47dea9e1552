use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use error_index::{Index, Registry, UNKNOWN_ERROR, UNKNOWN_MODULE};

#[test]
fn register_module_is_idempotent_and_case_insensitive() {
    let registry = Registry::new();
    let a = registry.register_module("Payments");
    let b = registry.register_module("payments");
    let c = registry.register_module("PAYMENTS");

    assert_eq!(a.id(), b.id());
    assert_eq!(b.id(), c.id());
    // unknown + payments; repeated registration consumed no identifier
    assert_eq!(registry.module_count(), 2);
    // first registrant's casing wins
    assert_eq!(c.name(), "Payments");
}

#[test]
fn module_identifiers_are_monotonic_and_unique() {
    let registry = Registry::new();
    assert_eq!(registry.register_module("alpha").id(), 1);
    assert_eq!(registry.register_module("beta").id(), 2);
    assert_eq!(registry.register_module("gamma").id(), 3);
    assert_eq!(registry.register_module("beta").id(), 2);
}

#[test]
fn unknown_module_occupies_identifier_zero() {
    let registry = Registry::new();
    let unknown = registry.unknown_module();
    assert_eq!(unknown.id(), 0);
    assert_eq!(unknown.name(), UNKNOWN_MODULE);
    // lookups of unregistered names degrade to it
    assert_eq!(registry.module("never registered").id(), 0);
    // the reserved name resolves to the same module
    assert_eq!(registry.register_module("Unknown").id(), 0);
}

#[test]
fn module_for_index_decodes_and_degrades() {
    let registry = Registry::new();
    let billing = registry.register_module("billing");
    let idx = billing.new_error("invoice not found");

    assert_eq!(registry.module_for_index(idx).name(), "billing");
    assert_eq!(registry.module_for_index(Index::compose(9999, 1)).id(), 0);
    assert_eq!(registry.module_for_index(Index::UNKNOWN).name(), UNKNOWN_MODULE);
}

#[test]
fn billing_example_scenario() {
    let registry = Registry::new();
    let billing = registry.register_module("billing");

    let i1 = billing.new_error("invoice not found");
    let i2 = billing.new_error("invoice not found");
    let i3 = billing.new_error("invoice expired");

    assert_eq!(i1, i2);
    assert_ne!(i1, i3);
    assert_eq!(billing.error_count(), 2);
    assert_eq!(registry.index_string(i1), "Module[billing]: invoice not found");
}

#[test]
fn dedup_is_case_insensitive_but_keeps_first_casing() {
    let registry = Registry::new();
    let m = registry.register_module("fs");

    let i1 = m.new_error("Permission Denied");
    let i2 = m.new_error("permission denied");

    assert_eq!(i1, i2);
    assert_eq!(m.error_count(), 1);
    assert_eq!(registry.index_string(i1), "Module[fs]: Permission Denied");
}

#[test]
fn identical_text_in_different_modules_stays_isolated() {
    let registry = Registry::new();
    let db = registry.register_module("db");
    let net = registry.register_module("net");

    let from_db = db.new_error("timeout");
    let from_net = net.new_error("timeout");

    assert_ne!(from_db, from_net);
    assert_eq!(from_db.module_id(), db.id());
    assert_eq!(from_net.module_id(), net.id());
    assert_eq!(registry.index_string(from_db), "Module[db]: timeout");
    assert_eq!(registry.index_string(from_net), "Module[net]: timeout");
}

#[test]
fn fabricated_index_resolves_to_sentinel() {
    let registry = Registry::new();
    registry.register_module("real");

    assert_eq!(registry.index_string(Index::compose(642, 3)), UNKNOWN_ERROR);
    assert_eq!(registry.index_string(Index::UNKNOWN), UNKNOWN_ERROR);
    assert_eq!(registry.index_error(Index::compose(642, 3)).to_string(), UNKNOWN_ERROR);
}

#[test]
fn registry_level_errors_anchor_to_the_unknown_module() {
    let registry = Registry::new();
    let idx = registry.new_error("boom");

    assert_eq!(idx.module_id(), 0);
    assert_eq!(registry.index_string(idx), "Module[unknown]: boom");
    assert_eq!(registry.unknown_module().error_count(), 1);

    let formatted = registry.new_errorf(format_args!("boom {}", 2));
    assert_eq!(registry.index_string(formatted), "Module[unknown]: boom 2");
}

#[test]
fn errorf_macro_formats_then_registers() {
    use error_index::errorf;

    let registry = Registry::new();
    let billing = registry.register_module("billing");

    let idx = errorf!(billing, "invoice {} not found", 42);
    assert_eq!(registry.index_string(idx), "Module[billing]: invoice 42 not found");
    assert_eq!(errorf!(billing, "invoice {} not found", 42), idx);
}

#[test]
fn error_handler_fires_once_per_admission() {
    let registry = Registry::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    registry.set_error_handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let m = registry.register_module("hooked");
    m.new_error("first");
    m.new_error("first");
    m.new_error("second");

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn error_handler_sees_the_admitted_error() {
    let registry = Registry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    registry.set_error_handler(move |err| {
        sink.lock().unwrap().push(err.to_string());
    });

    let net = registry.register_module("net");
    let inner = net.new_error("connection refused");
    net.wrap(inner, "fetch failed");

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, ["connection refused", "fetch failed: connection refused"]);
}

#[test]
fn replacing_the_handler_is_last_writer_wins() {
    let registry = Registry::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = first.clone();
    registry.set_error_handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = second.clone();
    registry.set_error_handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    registry.new_error("after replacement");
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn owns_index_checks_module_and_allocated_range() {
    let registry = Registry::new();
    let m = registry.register_module("owner");
    let other = registry.register_module("other");

    let idx = m.new_error("mine");
    assert!(m.owns_index(idx));
    assert!(!other.owns_index(idx));
    // sequence 0 is never allocated
    assert!(!m.owns_index(Index::compose(m.id(), 0)));
    // sequence beyond what has been allocated so far
    assert!(!m.owns_index(Index::compose(m.id(), idx.seq() + 1)));
}

#[test]
fn sequence_space_saturates_to_unknown() {
    let registry = Registry::new();
    let m = registry.register_module("flood");

    for i in 0..usize::from(u16::MAX) {
        assert_ne!(m.new_error(format!("error {i}")), Index::UNKNOWN);
    }
    assert_eq!(m.error_count(), usize::from(u16::MAX));

    // the 65536th distinct error degrades instead of wrapping
    assert_eq!(m.new_error("one too many"), Index::UNKNOWN);
    assert_eq!(m.error_count(), usize::from(u16::MAX));
    // existing handles still resolve
    let last = Index::compose(m.id(), u16::MAX);
    assert_eq!(registry.index_string(last), format!("Module[flood]: error {}", u16::MAX - 1));
}

#[test]
fn module_resolution_matches_registry_resolution() {
    let registry = Registry::new();
    let m = registry.register_module("cache");
    let idx = m.new_error("entry evicted");

    assert_eq!(m.index_string(idx), registry.index_string(idx));
    assert_eq!(m.index_error(idx), registry.index_error(idx));
    assert_eq!(m.index_string(Index::compose(321, 1)), UNKNOWN_ERROR);
}

#[test]
fn registry_error_count_spans_modules() {
    let registry = Registry::new();
    let a = registry.register_module("a");
    let b = registry.register_module("b");

    a.new_error("one");
    a.new_error("one");
    b.new_error("one");
    registry.new_error("two");

    assert_eq!(registry.error_count(), 3);
}
