//! Transaction results
//!
//! Every mutating call reports what it did as a [`TransactionResult`]:
//! the values now in effect, the values that were rejected and the values
//! that were overwritten or removed. Results are immutable once built.

use crate::value::ErasedValue;

/// Overall outcome of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// At least one value applied, nothing rejected
    Success,

    /// At least one value rejected
    Failure,

    /// The target did not apply (no processor, or structural refusal)
    NoData,
}

impl ResultKind {
    /// Check for success
    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome record of a mutating call
///
/// # Invariants
/// - `kind == Success` implies `rejected` is empty
/// - Immutable after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    kind: ResultKind,
    successful: Vec<ErasedValue>,
    rejected: Vec<ErasedValue>,
    replaced: Vec<ErasedValue>,
}

impl TransactionResult {
    /// Start a builder
    #[inline]
    #[must_use]
    pub fn builder() -> TransactionResultBuilder {
        TransactionResultBuilder::default()
    }

    /// NO_DATA outcome with empty lists
    #[inline]
    #[must_use]
    pub fn fail_no_data() -> Self {
        Self {
            kind: ResultKind::NoData,
            successful: Vec::new(),
            rejected: Vec::new(),
            replaced: Vec::new(),
        }
    }

    /// SUCCESS with no values (nothing to change)
    #[inline]
    #[must_use]
    pub fn success_no_data() -> Self {
        Self {
            kind: ResultKind::Success,
            ..Self::fail_no_data()
        }
    }

    /// SUCCESS with one new value and nothing replaced
    #[must_use]
    pub fn success(value: ErasedValue) -> Self {
        Self {
            kind: ResultKind::Success,
            successful: vec![value],
            ..Self::fail_no_data()
        }
    }

    /// SUCCESS with one new value replacing `previous`
    #[must_use]
    pub fn success_replace(value: ErasedValue, previous: ErasedValue) -> Self {
        Self {
            kind: ResultKind::Success,
            successful: vec![value],
            rejected: Vec::new(),
            replaced: vec![previous],
        }
    }

    /// SUCCESS that only removed `previous`
    #[must_use]
    pub fn success_removed(previous: ErasedValue) -> Self {
        Self {
            kind: ResultKind::Success,
            replaced: vec![previous],
            ..Self::fail_no_data()
        }
    }

    /// FAILURE with one rejected value
    #[must_use]
    pub fn error(rejected: ErasedValue) -> Self {
        Self {
            kind: ResultKind::Failure,
            rejected: vec![rejected],
            ..Self::fail_no_data()
        }
    }

    /// Outcome kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    /// Check for success
    #[inline]
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.kind.is_success()
    }

    /// Values now in effect
    #[inline]
    #[must_use]
    pub fn successful(&self) -> &[ErasedValue] {
        &self.successful
    }

    /// Values that failed validation and were not applied
    #[inline]
    #[must_use]
    pub fn rejected(&self) -> &[ErasedValue] {
        &self.rejected
    }

    /// Prior values overwritten or removed
    #[inline]
    #[must_use]
    pub fn replaced(&self) -> &[ErasedValue] {
        &self.replaced
    }

    /// Combine two results (e.g. per-key outcomes of one bundle)
    ///
    /// Lists are concatenated. The kind is FAILURE if either side failed,
    /// SUCCESS if either side succeeded, otherwise NO_DATA.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let kind = match (self.kind, other.kind) {
            (ResultKind::Failure, _) | (_, ResultKind::Failure) => ResultKind::Failure,
            (ResultKind::Success, _) | (_, ResultKind::Success) => ResultKind::Success,
            _ => ResultKind::NoData,
        };
        Self::builder()
            .absorb(self)
            .absorb(other)
            .kind(kind)
            .build()
    }
}

/// Accumulates a [`TransactionResult`]
#[derive(Debug, Default)]
pub struct TransactionResultBuilder {
    kind: Option<ResultKind>,
    successful: Vec<ErasedValue>,
    rejected: Vec<ErasedValue>,
    replaced: Vec<ErasedValue>,
}

impl TransactionResultBuilder {
    /// Force the outcome kind
    ///
    /// A forced SUCCESS is still built as FAILURE when values were rejected.
    #[inline]
    #[must_use]
    pub fn kind(mut self, kind: ResultKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Record an applied value
    #[inline]
    #[must_use]
    pub fn success(mut self, value: ErasedValue) -> Self {
        self.successful.push(value);
        self
    }

    /// Record a rejected value
    #[inline]
    #[must_use]
    pub fn reject(mut self, value: ErasedValue) -> Self {
        self.rejected.push(value);
        self
    }

    /// Record a replaced value
    #[inline]
    #[must_use]
    pub fn replace(mut self, value: ErasedValue) -> Self {
        self.replaced.push(value);
        self
    }

    /// Append every list of an existing result
    #[must_use]
    pub fn absorb(mut self, result: TransactionResult) -> Self {
        self.successful.extend(result.successful);
        self.rejected.extend(result.rejected);
        self.replaced.extend(result.replaced);
        self
    }

    /// Freeze into a result
    #[must_use]
    pub fn build(self) -> TransactionResult {
        let kind = if !self.rejected.is_empty() {
            ResultKind::Failure
        } else if let Some(kind) = self.kind {
            kind
        } else if !self.successful.is_empty() || !self.replaced.is_empty() {
            ResultKind::Success
        } else {
            ResultKind::NoData
        };
        TransactionResult {
            kind,
            successful: self.successful,
            rejected: self.rejected,
            replaced: self.replaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn flag(value: bool) -> ErasedValue {
        ErasedValue::of(&Key::plain("test:flag", false), value)
    }

    #[test]
    fn fail_no_data_is_empty() {
        let result = TransactionResult::fail_no_data();
        assert_eq!(result.kind(), ResultKind::NoData);
        assert!(result.successful().is_empty());
        assert!(result.rejected().is_empty());
        assert!(result.replaced().is_empty());
        assert_eq!(result, TransactionResult::fail_no_data());
    }

    #[test]
    fn builder_derives_success() {
        let result = TransactionResult::builder()
            .success(flag(true))
            .replace(flag(false))
            .build();
        assert_eq!(result.kind(), ResultKind::Success);
    }

    #[test]
    fn builder_derives_no_data_when_empty() {
        let result = TransactionResult::builder().build();
        assert_eq!(result.kind(), ResultKind::NoData);
    }

    #[test]
    fn forced_success_with_rejection_is_failure() {
        let result = TransactionResult::builder()
            .kind(ResultKind::Success)
            .success(flag(true))
            .reject(flag(false))
            .build();
        assert_eq!(result.kind(), ResultKind::Failure);
    }

    #[test]
    fn forced_success_without_values() {
        let result = TransactionResult::builder().kind(ResultKind::Success).build();
        assert!(result.is_successful());
        assert_eq!(result, TransactionResult::success_no_data());
    }

    #[test]
    fn merge_prefers_failure() {
        let ok = TransactionResult::success(flag(true));
        let bad = TransactionResult::error(flag(false));
        let merged = ok.merge(bad);

        assert_eq!(merged.kind(), ResultKind::Failure);
        assert_eq!(merged.successful().len(), 1);
        assert_eq!(merged.rejected().len(), 1);
    }

    #[test]
    fn merge_success_with_no_data() {
        let merged = TransactionResult::success(flag(true)).merge(TransactionResult::fail_no_data());
        assert_eq!(merged.kind(), ResultKind::Success);

        let empty = TransactionResult::fail_no_data().merge(TransactionResult::fail_no_data());
        assert_eq!(empty.kind(), ResultKind::NoData);
    }

    #[test]
    fn removal_only_result() {
        let result = TransactionResult::success_removed(flag(true));
        assert!(result.is_successful());
        assert!(result.successful().is_empty());
        assert_eq!(result.replaced().len(), 1);
    }
}
