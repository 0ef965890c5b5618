//! Interface implementation matching.
//!
//! Every concrete type is checked against every interface, once for the
//! value method set and once for the pointer method set. Results are keyed by
//! label in ordered collections, so duplicates from packages loaded more
//! than once collapse and the output order does not depend on discovery
//! order.

use std::collections::{BTreeMap, BTreeSet};

use crate::oracle::{Receiver, TypeOracle};

/// Interface label to implementer labels (`pkg.T`, `*pkg.T`).
pub type Implementations = BTreeMap<String, BTreeSet<String>>;

/// Match every candidate against every interface known to `oracle`.
pub fn match_implementations<O: TypeOracle + ?Sized>(oracle: &O) -> Implementations {
    let mut implementations = Implementations::new();
    let targets: Vec<_> = oracle
        .interfaces()
        .into_iter()
        .filter_map(|target| target.label().map(|label| (target, label)))
        .collect();

    for candidate in oracle.concrete_types() {
        let Some(label) = candidate.label() else {
            tracing::debug!(
                "skipping {} in {}: no package clause",
                candidate.name,
                candidate.package_dir
            );
            continue;
        };
        for (target, target_label) in &targets {
            for receiver in [Receiver::Value, Receiver::Pointer] {
                match oracle.satisfies(&candidate, receiver, target) {
                    Some(true) => {
                        implementations
                            .entry(target_label.clone())
                            .or_default()
                            .insert(receiver.implementer_label(&label));
                    }
                    Some(false) => {}
                    None => tracing::debug!(
                        "cannot decide whether {} satisfies {}",
                        receiver.implementer_label(&label),
                        target_label
                    ),
                }
            }
        }
    }

    implementations
}
