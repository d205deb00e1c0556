// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context: the single writer of session state.
//!
//! Readers subscribe to a `watch` channel. Each identity event or logout
//! starts a new generation; a profile fetch that finishes under an older
//! generation is dropped without touching state or navigation.

use crate::models::{Identity, Profile, Role};
use crate::services::identity::IdentityProvider;
use crate::services::profile_api::{ApiError, ProfileFetcher};
use crate::session::navigation::{landing, resolve, AppRoute, GuardDecision, Navigator};
use crate::session::state::Session;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// How an identity event or logout settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SignedOut,
    Registered(Role),
    /// Identity exists but has no profile yet.
    Unregistered,
    /// Token or profile fetch failed; session cleared.
    FetchFailed,
    /// A newer event arrived before this one resolved.
    Superseded,
}

enum Lookup {
    Found(Profile),
    NotRegistered,
    Failed(String),
}

pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileFetcher>,
    state: watch::Sender<Session>,
    navigator: Navigator,
    generation: AtomicU64,
}

impl SessionContext {
    /// Start anonymous, on the home view.
    pub fn new(provider: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileFetcher>) -> Self {
        let (state, _) = watch::channel(Session::anonymous());
        Self {
            provider,
            profiles,
            state,
            navigator: Navigator::new(AppRoute::Home),
            generation: AtomicU64::new(0),
        }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn current_route(&self) -> AppRoute {
        self.navigator.current()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// React to an identity provider state change.
    pub async fn handle_identity_change(&self, identity: Option<Identity>) -> Transition {
        let Some(identity) = identity else {
            self.begin(false);
            self.settle_now(Session::anonymous());
            tracing::info!("Signed out");
            return Transition::SignedOut;
        };

        let generation = self.begin(true);
        tracing::debug!(uid = %identity.uid, generation, "Resolving profile");

        let (next, transition) = match self.resolve_profile(&identity).await {
            Lookup::Found(profile) => {
                let role = profile.role;
                (
                    Session {
                        identity: Some(identity),
                        profile: Some(profile),
                        loading: false,
                    },
                    Transition::Registered(role),
                )
            }
            Lookup::NotRegistered => (
                Session {
                    identity: Some(identity),
                    profile: None,
                    loading: false,
                },
                Transition::Unregistered,
            ),
            Lookup::Failed(reason) => {
                tracing::warn!(uid = %identity.uid, reason = %reason, "Profile fetch failed");
                (Session::anonymous(), Transition::FetchFailed)
            }
        };

        if !self.settle(generation, next) {
            tracing::debug!(generation, "Discarding stale profile response");
            return Transition::Superseded;
        }

        tracing::info!(
            transition = ?transition,
            route = %self.current_route(),
            "Session settled"
        );
        transition
    }

    /// Sign out of the provider and clear the session.
    ///
    /// Local state is cleared even if the provider call fails.
    pub async fn logout(&self) -> Transition {
        self.begin(false);

        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!(error = %e, "Identity provider sign-out failed");
        }

        self.settle_now(Session::anonymous());
        tracing::info!("Logged out");
        Transition::SignedOut
    }

    /// Request a view. Applies the routing policy and navigates accordingly;
    /// while loading, stays put.
    pub fn visit(&self, route: AppRoute) -> GuardDecision {
        let session = self.state.borrow().clone();
        let decision = resolve(&route, &session);

        match &decision {
            GuardDecision::Render => self.navigator.navigate(route),
            GuardDecision::Redirect(target) => {
                tracing::debug!(requested = %route, target = %target, "Guard redirect");
                self.navigator.navigate(target.clone());
            }
            GuardDecision::Loading => {}
        }

        decision
    }

    /// Follow provider state changes until the provider is dropped.
    pub async fn follow(&self, mut changes: watch::Receiver<Option<Identity>>) {
        while changes.changed().await.is_ok() {
            let identity = changes.borrow_and_update().clone();
            self.handle_identity_change(identity).await;
        }
    }

    async fn resolve_profile(&self, identity: &Identity) -> Lookup {
        let token = match self.provider.id_token(identity).await {
            Ok(token) => token,
            Err(e) => return Lookup::Failed(format!("could not obtain ID token: {e}")),
        };

        match self.profiles.fetch_profile(&token, &identity.uid).await {
            Ok(profile) => Lookup::Found(profile),
            Err(ApiError::NotRegistered) => Lookup::NotRegistered,
            Err(e) => Lookup::Failed(e.to_string()),
        }
    }

    /// Start a new generation, optionally entering the loading state.
    fn begin(&self, loading: bool) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|session| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if loading {
                session.loading = true;
            }
        });
        generation
    }

    /// Commit `next` and navigate, unless a newer generation has started.
    fn settle(&self, generation: u64, next: Session) -> bool {
        self.state.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let route = landing(&next);
            *session = next;
            self.navigator.navigate(route);
            true
        })
    }

    fn settle_now(&self, next: Session) {
        self.state.send_modify(|session| {
            let route = landing(&next);
            *session = next;
            self.navigator.navigate(route);
        });
    }
}
