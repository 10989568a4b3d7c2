//! In-memory credential store
//!
//! Volatile implementation of [`SecurityStateStore`]. Every commit swaps the
//! whole record at once, so a refused commit leaves nothing behind. Supports
//! forcing the outcome of the next commit to exercise failure handling.

use tracing::{debug, warn};

use super::credential_record::CredentialRecord;
use crate::model::{Salt, SecretValue};
use crate::ports::{CommitOutcome, SecurityStateStore};

#[derive(Debug)]
pub struct MemoryStore {
    initialized: bool,
    record: CredentialRecord,
    forced_outcome: Option<CommitOutcome>,
    commits: usize,
}

impl MemoryStore {
    /// A device that was never set up
    pub fn uninitialized() -> Self {
        Self {
            initialized: false,
            record: CredentialRecord::new(CredentialRecord::random_device_salt()),
            forced_outcome: None,
            commits: 0,
        }
    }

    /// An initialized device protected by `pin` (empty means no PIN)
    pub fn with_pin(pin: &SecretValue, salt: &Salt) -> Self {
        Self {
            initialized: true,
            record: CredentialRecord::with_pin(CredentialRecord::random_device_salt(), pin, salt),
            forced_outcome: None,
            commits: 0,
        }
    }

    /// An initialized device without a PIN
    pub fn without_pin() -> Self {
        Self::with_pin(&SecretValue::empty(), &Salt::empty())
    }

    /// Preload a wipe code
    pub fn with_wipe_code(mut self, code: &SecretValue) -> Self {
        self.record = self.record.with_wipe_code(code);
        self
    }

    /// Make the next `change_wipe_code` return `outcome` without writing.
    ///
    /// Forcing [`CommitOutcome::Committed`] only skips the injection.
    pub fn fail_next_commit(&mut self, outcome: CommitOutcome) {
        self.forced_outcome = Some(outcome);
    }

    pub fn wipe_code_matches(&self, code: &SecretValue) -> bool {
        self.record.wipe_code_matches(code)
    }

    /// Consecutive failed PIN checks
    pub fn pin_failures(&self) -> u32 {
        self.record.pin_failures
    }

    /// Number of successful commits
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl SecurityStateStore for MemoryStore {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn has_pin(&self) -> bool {
        self.record.has_pin()
    }

    fn has_wipe_code(&self) -> bool {
        self.record.has_wipe_code()
    }

    fn check_pin(&mut self, pin: &SecretValue, salt: &Salt) -> bool {
        let matches = self.record.pin_matches(pin, salt);
        self.record.record_pin_attempt(matches);
        matches
    }

    fn change_wipe_code(
        &mut self,
        pin: &SecretValue,
        salt: &Salt,
        new_wipe_code: &SecretValue,
    ) -> CommitOutcome {
        match self.forced_outcome.take() {
            Some(CommitOutcome::Committed) | None => {}
            Some(forced) => {
                warn!(outcome = ?forced, "Injected commit failure");
                return forced;
            }
        }

        let authorized = self.record.authorizes(pin, salt);
        if self.record.has_pin() {
            self.record.record_pin_attempt(authorized);
        }
        if !authorized {
            return CommitOutcome::Unauthorized;
        }

        self.record = self.record.with_wipe_code(new_wipe_code);
        self.commits += 1;
        debug!(has_wipe_code = self.record.has_wipe_code(), "Wipe code committed");
        CommitOutcome::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::ports::contract_tests::store_contract;

    contract_tests_for!(
        memory_store_contract,
        make = || MemoryStore::with_pin(
            &SecretValue::from_str(store_contract::CONTRACT_PIN),
            &Salt::empty()
        ),
        tests = {
            test_fresh_store_state => store_contract::test_fresh_store_state,
            test_check_pin_success => store_contract::test_check_pin_success,
            test_check_pin_failure => store_contract::test_check_pin_failure,
            test_check_pin_is_salted => store_contract::test_check_pin_is_salted,
            test_set_wipe_code => store_contract::test_set_wipe_code,
            test_remove_wipe_code => store_contract::test_remove_wipe_code,
            test_unauthorized_change_leaves_state => store_contract::test_unauthorized_change_leaves_state,
        }
    );

    fn pin() -> SecretValue {
        SecretValue::from_str("1234")
    }

    #[test]
    fn test_forced_failure_leaves_state_after_successful_commits() {
        let mut store = MemoryStore::with_pin(&pin(), &Salt::empty());
        for code in ["11", "22", "33"] {
            let outcome =
                store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str(code));
            assert!(outcome.is_committed());
        }
        let before = store.protection_state();

        for forced in [CommitOutcome::Unauthorized, CommitOutcome::StorageFault] {
            store.fail_next_commit(forced);
            let outcome = store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::empty());
            assert_eq!(outcome, forced);
            assert_eq!(store.protection_state(), before);
            assert!(store.wipe_code_matches(&SecretValue::from_str("33")));
        }
        assert_eq!(store.commits(), 3);
    }

    #[test]
    fn test_injection_is_one_shot() {
        let mut store = MemoryStore::with_pin(&pin(), &Salt::empty());
        store.fail_next_commit(CommitOutcome::StorageFault);

        let first = store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5"));
        let second = store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5"));

        assert_eq!(first, CommitOutcome::StorageFault);
        assert_eq!(second, CommitOutcome::Committed);
    }

    #[test]
    fn test_without_pin_authorizes_empty_pin_only() {
        let mut store = MemoryStore::without_pin();
        assert!(!store.has_pin());
        assert!(!store.check_pin(&SecretValue::empty(), &Salt::empty()));

        let refused = store.change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("5"));
        assert_eq!(refused, CommitOutcome::Unauthorized);

        let accepted = store.change_wipe_code(
            &SecretValue::empty(),
            &Salt::empty(),
            &SecretValue::from_str("5"),
        );
        assert_eq!(accepted, CommitOutcome::Committed);
    }

    #[test]
    fn test_failed_checks_are_counted() {
        let mut store = MemoryStore::with_pin(&pin(), &Salt::empty());
        store.check_pin(&SecretValue::from_str("0000"), &Salt::empty());
        store.change_wipe_code(
            &SecretValue::from_str("0000"),
            &Salt::empty(),
            &SecretValue::empty(),
        );
        assert_eq!(store.pin_failures(), 2);

        assert!(store.check_pin(&pin(), &Salt::empty()));
        assert_eq!(store.pin_failures(), 0);
    }

    #[test]
    fn test_unauthorized_commit_counts_attempt_only() {
        let mut store = MemoryStore::with_pin(&pin(), &Salt::empty())
            .with_wipe_code(&SecretValue::from_str("5678"));

        let outcome = store.change_wipe_code(
            &SecretValue::from_str("0000"),
            &Salt::empty(),
            &SecretValue::empty(),
        );

        assert_eq!(outcome, CommitOutcome::Unauthorized);
        assert_eq!(store.pin_failures(), 1);
        assert!(store.wipe_code_matches(&SecretValue::from_str("5678")));

        assert!(store
            .change_wipe_code(&pin(), &Salt::empty(), &SecretValue::from_str("1111"))
            .is_committed());
        assert_eq!(store.pin_failures(), 0);
    }

    #[test]
    fn test_uninitialized() {
        let store = MemoryStore::uninitialized();
        assert!(!store.is_initialized());
        assert!(!store.has_pin());
        assert!(!store.has_wipe_code());
    }
}
