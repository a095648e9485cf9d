//! Data processors
//!
//! A data processor builds a whole bundle from a host and applies a bundle
//! back. [`ValueBackedDataProcessor`] composes the value processors that
//! cover every key of a [`DataKind`], which is how nearly every bundle is
//! served.

use crate::host::{Host, HostKind};
use crate::value::AnyValueProcessor;
use propdata_value::{DataKind, DataManipulator, ErasedValue, TransactionResult};
use std::fmt;
use std::sync::Arc;

/// Strategy building and applying one bundle kind on hosts of one kind
pub trait DataProcessor: Send + Sync + fmt::Debug {
    /// Bundle kind produced
    fn kind(&self) -> &DataKind;

    /// Most specific host kind this processor applies to
    fn host_kind(&self) -> &'static HostKind;

    /// Whether the bundle applies to this host instance
    fn supports(&self, host: &dyn Host) -> bool;

    /// Bundle read from the host, `None` if any of its values is absent
    fn create_from(&self, host: &dyn Host) -> Option<DataManipulator>;

    /// Apply every value of `manipulator` to the host
    ///
    /// NO_DATA if the host is unsupported or the bundle has a different kind.
    /// A FAILURE leaves the host as it was.
    fn put_onto(&self, host: &mut dyn Host, manipulator: &DataManipulator) -> TransactionResult;

    /// Remove the bundle from the host
    fn remove_from(&self, host: &mut dyn Host) -> TransactionResult;
}

/// Data processor composed from per-key value processors
pub struct ValueBackedDataProcessor {
    kind: DataKind,
    host_kind: &'static HostKind,
    processors: Vec<Arc<dyn AnyValueProcessor>>,
}

impl ValueBackedDataProcessor {
    /// Compose `processors` (one per key of `kind`, in key order)
    #[must_use]
    pub fn new(
        kind: DataKind,
        host_kind: &'static HostKind,
        processors: Vec<Arc<dyn AnyValueProcessor>>,
    ) -> Self {
        debug_assert_eq!(kind.keys().len(), processors.len());
        Self {
            kind,
            host_kind,
            processors,
        }
    }

    /// Restore the values written so far, most recent first
    fn roll_back(
        &self,
        host: &mut dyn Host,
        applied: Vec<(&Arc<dyn AnyValueProcessor>, Option<ErasedValue>)>,
    ) {
        for (processor, previous) in applied.into_iter().rev() {
            let restored = match previous {
                Some(previous) => processor.offer_erased(host, &previous),
                None => processor.remove_from(host),
            };
            if !restored.is_successful() {
                tracing::error!(
                    kind = %self.kind.id(),
                    key = %processor.key_id(),
                    "could not restore value after a refused bundle"
                );
            }
        }
        tracing::debug!(kind = %self.kind.id(), host = %host.kind(), "rolled back partial bundle");
    }
}

impl DataProcessor for ValueBackedDataProcessor {
    fn kind(&self) -> &DataKind {
        &self.kind
    }

    fn host_kind(&self) -> &'static HostKind {
        self.host_kind
    }

    fn supports(&self, host: &dyn Host) -> bool {
        self.processors.iter().all(|p| p.supports(host))
    }

    fn create_from(&self, host: &dyn Host) -> Option<DataManipulator> {
        if !self.supports(host) {
            return None;
        }
        let mut manipulator = DataManipulator::new(self.kind.clone());
        for processor in &self.processors {
            let value = processor.get_erased(host)?;
            if !manipulator.put(value).is_successful() {
                tracing::error!(
                    kind = %self.kind.id(),
                    key = %processor.key_id(),
                    "bundle refused a value read from the host"
                );
                return None;
            }
        }
        Some(manipulator)
    }

    fn put_onto(&self, host: &mut dyn Host, manipulator: &DataManipulator) -> TransactionResult {
        if manipulator.kind() != &self.kind || !self.supports(host) {
            return TransactionResult::fail_no_data();
        }
        let offers: Vec<_> = self
            .processors
            .iter()
            .filter_map(|p| manipulator.value_of(p.key_id()).map(|value| (p, value)))
            .collect();

        let invalid = offers
            .iter()
            .filter(|(processor, value)| !processor.accepts_erased(value))
            .fold(TransactionResult::builder(), |b, (_, value)| {
                b.reject(ErasedValue::clone(value))
            })
            .build();
        if !invalid.rejected().is_empty() {
            tracing::warn!(
                kind = %self.kind.id(),
                rejected = invalid.rejected().len(),
                "bundle rejected before writing"
            );
            return invalid;
        }

        let mut applied = Vec::with_capacity(offers.len());
        let mut result = TransactionResult::builder();
        for (processor, value) in offers {
            let outcome = processor.offer_erased(host, value);
            if !outcome.is_successful() {
                self.roll_back(host, applied);
                return outcome;
            }
            applied.push((processor, outcome.replaced().first().cloned()));
            result = result.absorb(outcome);
        }
        result.build()
    }

    fn remove_from(&self, host: &mut dyn Host) -> TransactionResult {
        if !self.supports(host) {
            return TransactionResult::fail_no_data();
        }
        self.processors
            .iter()
            .map(|p| p.remove_from(host))
            .reduce(TransactionResult::merge)
            .unwrap_or_else(TransactionResult::fail_no_data)
    }
}

impl fmt::Debug for ValueBackedDataProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueBackedDataProcessor")
            .field("kind", self.kind.id())
            .field("host_kind", &self.host_kind.name())
            .field("processors", &self.processors.len())
            .finish()
    }
}
