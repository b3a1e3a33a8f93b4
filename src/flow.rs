use std::fmt;

use crate::api::CeremonyServer;
use crate::ceremony::{CeremonyDirective, CeremonyOutcome, perform};
use crate::error::Result;
use crate::identity::Identity;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// The session was already signed in; nothing was started.
    AlreadySignedIn(String),
    Registered(Identity),
    Authenticated(Identity),
}

impl fmt::Display for SignInOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInOutcome::AlreadySignedIn(who) => write!(f, "already signed in as {who}"),
            SignInOutcome::Registered(who) => write!(f, "registered a new passkey for {who}"),
            SignInOutcome::Authenticated(who) => write!(f, "signed in as {who}"),
        }
    }
}

/// Sign in as `identity`, registering a passkey if the server has none.
///
/// An aborted ceremony is returned as an error and nothing is submitted.
/// Starting over fetches a fresh challenge.
pub async fn sign_in<S, P>(server: &S, platform: &P, identity: &Identity) -> Result<SignInOutcome>
where
    S: CeremonyServer + ?Sized,
    P: Platform + ?Sized,
{
    if let Some(current) = server.identity().await? {
        tracing::info!(identity = %current, "Session already signed in");
        return Ok(SignInOutcome::AlreadySignedIn(current));
    }

    let directive = CeremonyDirective::from_json(server.start(identity).await?)?;
    tracing::info!(identity = %identity, kind = %directive.kind(), "Ceremony started");

    let outcome = match perform(platform, directive).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.is_aborted() {
                tracing::warn!(error = %e, "Ceremony aborted, nothing submitted");
            }
            return Err(e.into());
        }
    };

    match outcome {
        CeremonyOutcome::Registered(credential) => {
            server.register(&credential).await?;
            tracing::info!(identity = %identity, id = %credential.id, "Registration accepted");
            Ok(SignInOutcome::Registered(identity.clone()))
        }
        CeremonyOutcome::Authenticated(credential) => {
            server.login(&credential).await?;
            tracing::info!(identity = %identity, id = %credential.id, "Login accepted");
            Ok(SignInOutcome::Authenticated(identity.clone()))
        }
    }
}
