// Profile view model.
// Runs fetches in the background and publishes their outcomes on the owner's context.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::fetch::FetchCoordinator;
use crate::github::{FollowEntry, UserProfile};

use super::observable::ObservableValue;

/// Lifecycle of the most recent fetch of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

impl FetchPhase {
    pub fn is_requesting(&self) -> bool {
        matches!(self, FetchPhase::Requesting)
    }
}

/// A finished fetch waiting to be published.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Profile(Result<UserProfile, FetchError>),
    Follows(Result<Vec<FollowEntry>, FetchError>),
}

/// Bridges [`FetchCoordinator`] results to observable stores.
///
/// Fetches run on spawned tokio tasks and report back through a mailbox.
/// Stores only change inside [`dispatch_pending`](Self::dispatch_pending) or
/// [`next_update`](Self::next_update), so listeners always run on the task that
/// owns the view model. Outcomes that arrive after the view model is dropped are
/// discarded.
pub struct ProfileViewModel {
    coordinator: Arc<FetchCoordinator>,
    pub error_store: ObservableValue<Option<FetchError>>,
    pub profile_store: ObservableValue<Option<UserProfile>>,
    pub follows_store: ObservableValue<Option<Vec<FollowEntry>>>,
    profile_phase: FetchPhase,
    follows_phase: FetchPhase,
    tx: mpsc::UnboundedSender<Update>,
    rx: mpsc::UnboundedReceiver<Update>,
}

impl ProfileViewModel {
    pub fn new(coordinator: Arc<FetchCoordinator>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            coordinator,
            error_store: ObservableValue::new(None),
            profile_store: ObservableValue::new(None),
            follows_store: ObservableValue::new(None),
            profile_phase: FetchPhase::Idle,
            follows_phase: FetchPhase::Idle,
            tx,
            rx,
        }
    }

    pub fn profile_phase(&self) -> FetchPhase {
        self.profile_phase
    }

    pub fn follows_phase(&self) -> FetchPhase {
        self.follows_phase
    }

    /// Start a profile lookup. Blank usernames are ignored and nothing is published.
    /// Must be called from within a tokio runtime.
    pub fn find_user_profile(&mut self, username: &str) -> bool {
        if username.trim().is_empty() {
            warn!("ignoring profile lookup for blank username");
            return false;
        }

        self.profile_phase = FetchPhase::Requesting;
        let coordinator = self.coordinator.clone();
        let tx = self.tx.clone();
        let username = username.to_string();
        tokio::spawn(async move {
            let outcome = coordinator.fetch_profile(&username).await;
            if tx.send(Update::Profile(outcome)).is_err() {
                debug!(username = %username, "view model dropped, discarding profile outcome");
            }
        });
        true
    }

    /// Start a follow-list fetch for `url`. Blank URLs are ignored.
    /// Must be called from within a tokio runtime.
    pub fn fetch_follows(&mut self, url: &str) -> bool {
        if url.trim().is_empty() {
            warn!("ignoring follows fetch for blank URL");
            return false;
        }

        self.follows_phase = FetchPhase::Requesting;
        let coordinator = self.coordinator.clone();
        let tx = self.tx.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            let outcome = coordinator.fetch_follows(&url).await;
            if tx.send(Update::Follows(outcome)).is_err() {
                debug!(url = %url, "view model dropped, discarding follows outcome");
            }
        });
        true
    }

    /// Publish every outcome that has already arrived. Returns how many were published.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut published = 0;
        while let Ok(update) = self.rx.try_recv() {
            self.publish(update);
            published += 1;
        }
        published
    }

    /// Wait for the next outcome and publish it.
    ///
    /// Waits indefinitely when nothing is in flight.
    pub async fn next_update(&mut self) {
        // The view model holds a sender, so the channel never closes here.
        if let Some(update) = self.rx.recv().await {
            self.publish(update);
        }
    }

    fn publish(&mut self, update: Update) {
        match update {
            Update::Profile(Ok(profile)) => {
                self.profile_phase = FetchPhase::Succeeded;
                self.profile_store.set_value(Some(profile));
            }
            Update::Profile(Err(error)) => {
                self.profile_phase = FetchPhase::Failed;
                self.error_store.set_value(Some(error));
            }
            Update::Follows(Ok(entries)) => {
                self.follows_phase = FetchPhase::Succeeded;
                self.follows_store.set_value(Some(entries));
            }
            Update::Follows(Err(error)) => {
                self.follows_phase = FetchPhase::Failed;
                self.error_store.set_value(Some(error));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ExpiringCache;
    use crate::fetch::FixedReachability;
    use crate::github::RawResponse;
    use crate::github::mock::MockTransport;
    use std::sync::Mutex;

    const OCTOCAT_URL: &str = "https://api.github.com/users/octocat";
    const OCTOCAT_BODY: &str = r#"{
        "login": "octocat",
        "avatar_url": null,
        "name": null,
        "followers": 1,
        "following": 0,
        "followers_url": "https://api.github.com/users/octocat/followers"
    }"#;

    fn view_model(online: bool) -> (Arc<MockTransport>, ProfileViewModel) {
        let transport = Arc::new(MockTransport::new());
        let coordinator = FetchCoordinator::new(
            transport.clone(),
            Arc::new(FixedReachability::new(online)),
            Arc::new(ExpiringCache::new()),
            Arc::new(ExpiringCache::new()),
        );
        (transport, ProfileViewModel::new(Arc::new(coordinator)))
    }

    #[tokio::test]
    async fn test_profile_published_after_replay() {
        let (transport, mut vm) = view_model(true);
        transport.respond(OCTOCAT_URL, RawResponse::http(200, OCTOCAT_BODY));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        vm.profile_store
            .bind(move |profile: &Option<UserProfile>| sink.lock().unwrap().push(profile.clone()));

        assert!(vm.find_user_profile("octocat"));
        assert!(vm.profile_phase().is_requesting());

        vm.next_update().await;
        assert_eq!(vm.profile_phase(), FetchPhase::Succeeded);
        assert!(!vm.profile_phase().is_requesting());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_none());
        assert_eq!(seen[1].as_ref().unwrap().username, "octocat");
        assert!(vm.error_store.value().is_none());
    }

    #[tokio::test]
    async fn test_offline_miss_publishes_not_found() {
        let (transport, mut vm) = view_model(false);

        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();
        vm.error_store
            .bind(move |error: &Option<FetchError>| sink.lock().unwrap().push(*error));

        vm.find_user_profile("ghost");
        vm.next_update().await;

        assert_eq!(*errors.lock().unwrap(), vec![None, Some(FetchError::NotFound)]);
        assert_eq!(vm.profile_phase(), FetchPhase::Failed);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_errors_each_published() {
        let (_transport, mut vm) = view_model(false);

        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        vm.error_store
            .bind(move |_: &Option<FetchError>| *sink.lock().unwrap() += 1);

        vm.find_user_profile("ghost");
        vm.next_update().await;
        vm.find_user_profile("ghost");
        vm.next_update().await;

        // Replay plus two identical errors.
        assert_eq!(*count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_follows_published() {
        let (transport, mut vm) = view_model(true);
        let url = "https://api.github.com/users/octocat/followers";
        transport.respond(
            url,
            RawResponse::http(200, r#"[{"login":"hubot","avatar_url":"https://a/1"}]"#),
        );

        vm.fetch_follows(url);
        vm.next_update().await;

        assert_eq!(vm.follows_phase(), FetchPhase::Succeeded);
        let follows = vm.follows_store.value().as_ref().unwrap();
        assert_eq!(follows[0].username, "hubot");
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let (transport, mut vm) = view_model(true);

        assert!(!vm.find_user_profile("   "));
        assert!(!vm.fetch_follows(""));
        assert_eq!(vm.profile_phase(), FetchPhase::Idle);
        assert_eq!(vm.follows_phase(), FetchPhase::Idle);

        tokio::task::yield_now().await;
        assert_eq!(vm.dispatch_pending(), 0);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_pending_publishes_arrived_outcomes() {
        let (transport, mut vm) = view_model(true);
        transport.respond(OCTOCAT_URL, RawResponse::http(404, "{}"));

        vm.find_user_profile("octocat");
        // Nothing is published until the owner drains the mailbox.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(vm.error_store.value().is_none());

        assert_eq!(vm.dispatch_pending(), 1);
        assert_eq!(*vm.error_store.value(), Some(FetchError::NotFound));
    }

    #[tokio::test]
    async fn test_dropped_view_model_discards_outcome() {
        let (transport, mut vm) = view_model(true);
        transport.respond(OCTOCAT_URL, RawResponse::http(200, OCTOCAT_BODY));

        vm.profile_store.bind(|_: &Option<UserProfile>| {});
        vm.find_user_profile("octocat");
        drop(vm);

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(transport.calls().len(), 1);
    }
}
