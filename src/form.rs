use std::collections::VecDeque;
use std::sync::Mutex;

use log::{debug, warn, Logger};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::BackendError;
use crate::store::LocalStore;
use crate::submission::{Field, Gender, Submission};
use crate::sync::RemoteSync;
use crate::timestamp;
use crate::validation::{self, keep_digits, ValidationErrors, PHONE_DIGITS, PINCODE_DIGITS};

/// Where the user is sent after a successful submit.
pub const SUCCESS_ROUTE: &str = "/success";

/// The hidden input carrying a rendered form's submit token.
pub const TOKEN_FIELD: &str = "token";

const REMEMBERED_TOKENS: usize = 1024;

/// The editable values of the form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: Gender,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub remarks: String,
}

impl FormState {
    /// Stores `value` in `field`. Phone and pincode keep only their
    /// leading digits.
    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::FullName => self.full_name = value.to_owned(),
            Field::Email => self.email = value.to_owned(),
            Field::Phone => self.phone = keep_digits(value, PHONE_DIGITS),
            Field::Dob => self.dob = value.to_owned(),
            Field::Gender => self.gender = Gender::parse(value),
            Field::Address => self.address = value.to_owned(),
            Field::City => self.city = value.to_owned(),
            Field::State => self.state = value.to_owned(),
            Field::Pincode => self.pincode = keep_digits(value, PINCODE_DIGITS),
            Field::Remarks => self.remarks = value.to_owned(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Dob => &self.dob,
            Field::Gender => self.gender.as_str(),
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Pincode => &self.pincode,
            Field::Remarks => &self.remarks,
        }
    }

    fn to_submission(&self, created_at: String) -> Submission {
        Submission {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            dob: self.dob.clone(),
            gender: self.gender,
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
            remarks: self.remarks.clone(),
            created_at,
        }
    }
}

/// Tokens of forms already submitted. A second submit carrying a claimed
/// token is ignored, so a double post of one rendered form saves once.
pub struct SubmitTokens {
    claimed: Mutex<VecDeque<String>>,
}

impl Default for SubmitTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitTokens {
    pub fn new() -> Self {
        Self {
            claimed: Mutex::new(VecDeque::new()),
        }
    }

    /// Claims `token`. Returns `false` if it was already claimed.
    pub fn claim(&self, token: &str) -> bool {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());

        if claimed.iter().any(|t| t == token) {
            return false;
        }

        if claimed.len() == REMEMBERED_TOKENS {
            claimed.pop_front();
        }

        claimed.push_back(token.to_owned());
        true
    }

    /// Makes `token` usable again after a submit that saved nothing.
    pub fn release(&self, token: &str) {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        claimed.retain(|t| t != token);
    }
}

/// Why a submit did nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ignored {
    Submitting,
    Invalid,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Ignored(Ignored),
    Saved {
        submission: Submission,
        next: &'static str,
    },
}

/// Form state plus its validation result, recomputed on every change.
#[derive(Clone, Debug)]
pub struct FormController {
    state: FormState,
    errors: ValidationErrors,
    submitting: bool,
    token: String,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::resume(Uuid::new_v4().to_string())
    }

    /// An empty form continuing the one rendered with `token`.
    pub fn resume(token: String) -> Self {
        let state = FormState::default();
        let errors = validation::validate(&state);

        Self {
            state,
            errors,
            submitting: false,
            token,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn update(&mut self, field: Field, value: &str) {
        self.state.set(field, value);
        self.errors = validation::validate(&self.state);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn can_submit(&self) -> bool {
        self.is_valid() && !self.submitting
    }

    /// Marks the form as submitting and returns the record stamped with
    /// `created_at`, unless a submit is already running, the form is
    /// invalid, or its token was already used.
    pub fn begin_submit(
        &mut self,
        tokens: &SubmitTokens,
        created_at: String,
    ) -> Result<Submission, Ignored> {
        if self.submitting {
            return Err(Ignored::Submitting);
        }

        if !self.is_valid() {
            return Err(Ignored::Invalid);
        }

        if !tokens.claim(&self.token) {
            return Err(Ignored::Submitting);
        }

        self.submitting = true;

        Ok(self.state.to_submission(created_at))
    }

    /// Submits the form: tries the remote endpoint, then always commits
    /// the record to `store`. Remote failures are logged and otherwise
    /// ignored.
    pub async fn submit(
        &mut self,
        logger: &Logger,
        sync: &dyn RemoteSync,
        store: &LocalStore,
        tokens: &SubmitTokens,
        now: OffsetDateTime,
    ) -> Result<SubmitOutcome, BackendError> {
        let created_at = timestamp::iso_millis(now)?;

        let submission = match self.begin_submit(tokens, created_at) {
            Ok(submission) => submission,
            Err(reason) => {
                debug!(logger, "Ignoring submit"; "reason" => ?reason);
                return Ok(SubmitOutcome::Ignored(reason));
            }
        };

        debug!(logger, "Syncing submission to remote endpoint...");
        if let Err(e) = sync.sync(&submission).await {
            warn!(logger, "Remote sync failed; saving locally only"; "error" => %e);
        }

        debug!(logger, "Committing submission locally...");
        let committed = {
            let submission = submission.clone();

            store
                .blocking(move |store| store.append(submission))
                .await
                .and_then(|committed| committed)
        };
        self.submitting = false;

        if committed.is_err() {
            tokens.release(&self.token);
        }
        committed?;

        Ok(SubmitOutcome::Saved {
            submission,
            next: SUCCESS_ROUTE,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::future::{BoxFuture, FutureExt};
    use time::macros::datetime;

    use super::*;
    use crate::store::MemorySlots;

    /// Counts calls and fails or succeeds as configured.
    struct FakeSync {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeSync {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl RemoteSync for FakeSync {
        fn sync<'a>(&'a self, _submission: &'a Submission) -> BoxFuture<'a, Result<(), BackendError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;

            async move {
                if fail {
                    Err(BackendError::RemoteStatus(503))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    fn filled() -> FormController {
        let mut form = FormController::new();

        form.update(Field::FullName, "अनीता शर्मा");
        form.update(Field::Email, "anita@example.in");
        form.update(Field::Phone, "98765-43210");
        form.update(Field::Dob, "1992-11-03");
        form.update(Field::Gender, "female");
        form.update(Field::Address, "45 नेहरू नगर");
        form.update(Field::City, "भोपाल");
        form.update(Field::State, "मध्य प्रदेश");
        form.update(Field::Pincode, "462003");

        form
    }

    fn store() -> LocalStore {
        LocalStore::new(log::discard(), Arc::new(MemorySlots::new()))
    }

    async fn submit(
        form: &mut FormController,
        sync: &FakeSync,
        store: &LocalStore,
        tokens: &SubmitTokens,
    ) -> SubmitOutcome {
        form.submit(&log::discard(), sync, store, tokens, OffsetDateTime::now_utc())
            .await
            .expect("submit")
    }

    #[test]
    fn new_form_is_not_submittable() {
        let form = FormController::new();

        assert!(!form.can_submit());
        assert_eq!(form.errors().len(), 9);
    }

    #[test]
    fn phone_and_pincode_are_normalized_as_typed() {
        let mut form = FormController::new();

        form.update(Field::Phone, "12a3456789xyz0");
        form.update(Field::Pincode, "1234567890");

        assert_eq!(form.state().phone, "1234567890");
        assert_eq!(form.state().pincode, "123456");
        assert_eq!(form.errors().get(Field::Phone), None);
        assert_eq!(form.errors().get(Field::Pincode), None);
    }

    #[test]
    fn errors_follow_every_change() {
        let mut form = filled();
        assert!(form.can_submit());

        form.update(Field::Email, "anita");
        assert_eq!(form.errors().get(Field::Email), Some("मान्य ईमेल दर्ज करें"));
        assert!(!form.can_submit());

        form.update(Field::Email, "anita@example.in");
        assert!(form.can_submit());
    }

    #[test]
    fn begin_submit_stamps_and_blocks_reentry() {
        let mut form = filled();
        let tokens = SubmitTokens::new();
        let created_at = timestamp::iso_millis(datetime!(2024-03-04 05:06:07.089 UTC))
            .expect("format timestamp");

        let submission = form
            .begin_submit(&tokens, created_at.clone())
            .expect("begin submit");

        assert_eq!(submission.created_at, "2024-03-04T05:06:07.089Z");
        assert_eq!(submission.phone, "9876543210");
        assert_eq!(submission.gender, Gender::Female);
        assert!(form.is_submitting());
        assert_eq!(form.begin_submit(&tokens, created_at), Err(Ignored::Submitting));
    }

    #[test]
    fn tokens_are_claimed_once_until_released() {
        let tokens = SubmitTokens::new();

        assert!(tokens.claim("a"));
        assert!(!tokens.claim("a"));
        assert!(tokens.claim("b"));

        tokens.release("a");
        assert!(tokens.claim("a"));
    }

    #[test]
    fn old_tokens_are_forgotten() {
        let tokens = SubmitTokens::new();

        for i in 0..=REMEMBERED_TOKENS {
            assert!(tokens.claim(&i.to_string()));
        }

        assert!(tokens.claim("0"));
        assert!(!tokens.claim(&REMEMBERED_TOKENS.to_string()));
    }

    #[tokio::test]
    async fn repeated_submit_of_one_form_saves_once() {
        let sync = FakeSync::new(false);
        let store = store();
        let tokens = SubmitTokens::new();

        let mut first = filled();
        let mut again = FormController::resume(first.token().to_owned());
        for field in Field::ALL.iter().copied() {
            again.update(field, first.state().value(field));
        }

        let outcome = submit(&mut first, &sync, &store, &tokens).await;
        assert!(matches!(outcome, SubmitOutcome::Saved { .. }));

        let outcome = submit(&mut again, &sync, &store, &tokens).await;
        assert_eq!(outcome, SubmitOutcome::Ignored(Ignored::Submitting));

        assert_eq!(store.read_all().len(), 1);
        assert_eq!(sync.calls.load(Ordering::SeqCst), 1);

        let outcome = submit(&mut filled(), &sync, &store, &tokens).await;
        assert!(matches!(outcome, SubmitOutcome::Saved { .. }));
        assert_eq!(store.read_all().len(), 2);
    }

    #[tokio::test]
    async fn invalid_form_saves_nothing() {
        let mut form = FormController::new();
        let sync = FakeSync::new(false);
        let store = store();

        let outcome = submit(&mut form, &sync, &store, &SubmitTokens::new()).await;

        assert_eq!(outcome, SubmitOutcome::Ignored(Ignored::Invalid));
        assert_eq!(sync.calls.load(Ordering::SeqCst), 0);
        assert!(store.read_all().is_empty());
    }

    #[tokio::test]
    async fn submit_saves_when_remote_succeeds() {
        let mut form = filled();
        let sync = FakeSync::new(false);
        let store = store();

        let outcome = submit(&mut form, &sync, &store, &SubmitTokens::new()).await;

        let saved = store.read_all();
        assert_eq!(saved.len(), 1);
        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                submission: saved[0].clone(),
                next: SUCCESS_ROUTE,
            }
        );
        assert_eq!(sync.calls.load(Ordering::SeqCst), 1);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn submit_saves_when_remote_fails() {
        let mut form = filled();
        let sync = FakeSync::new(true);
        let store = store();

        store
            .append(Submission {
                full_name: "पुराना".to_owned(),
                ..Default::default()
            })
            .expect("seed store");

        let outcome = submit(&mut form, &sync, &store, &SubmitTokens::new()).await;

        let saved = store.read_all();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].full_name, "अनीता शर्मा");
        assert_eq!(saved[1].full_name, "पुराना");
        assert!(matches!(outcome, SubmitOutcome::Saved { next: SUCCESS_ROUTE, .. }));
        assert!(form.can_submit());
    }
}
