use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::platform::Platform;

use super::options::{self, BinaryOptions};
use super::{AbortReason, CeremonyError, CeremonyKind, response, wire};

/// What the relying party asked us to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "lowercase")]
pub enum CeremonyDirective {
    Registration(wire::RegistrationOptions),
    Authentication(wire::AuthenticationOptions),
}

#[derive(Deserialize)]
struct TaggedDirective {
    kind: String,
    #[serde(default)]
    options: Value,
}

impl CeremonyDirective {
    /// Parse a `{ kind, options }` reply from `/ceremony/start`.
    ///
    /// A kind outside the known set is [`CeremonyError::UnreachableVariant`].
    pub fn from_json(value: Value) -> Result<Self, CeremonyError> {
        let tagged: TaggedDirective = serde_json::from_value(value)?;
        match tagged.kind.as_str() {
            "registration" => Ok(Self::Registration(serde_json::from_value(tagged.options)?)),
            "authentication" => Ok(Self::Authentication(serde_json::from_value(tagged.options)?)),
            _ => Err(CeremonyError::UnreachableVariant(tagged.kind)),
        }
    }

    pub fn kind(&self) -> CeremonyKind {
        match self {
            Self::Registration(_) => CeremonyKind::Registration,
            Self::Authentication(_) => CeremonyKind::Authentication,
        }
    }

    pub fn into_binary(self) -> Result<BinaryOptions, CeremonyError> {
        match self {
            Self::Registration(o) => options::registration_to_binary(o).map(BinaryOptions::Registration),
            Self::Authentication(o) => {
                options::authentication_to_binary(o).map(BinaryOptions::Authentication)
            }
        }
    }
}

/// Wire payload of a completed ceremony. The variant picks the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CeremonyOutcome {
    Registered(wire::RegistrationCredential),
    Authenticated(wire::AuthenticationCredential),
}

impl CeremonyOutcome {
    pub fn kind(&self) -> CeremonyKind {
        match self {
            Self::Registered(_) => CeremonyKind::Registration,
            Self::Authenticated(_) => CeremonyKind::Authentication,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyState {
    AwaitingDirective,
    CeremonyInFlight(CeremonyKind),
    /// Terminal, after success or failure.
    Completed,
}

/// One ceremony against one platform. Runs at most once.
pub struct Ceremony<'a, P: Platform + ?Sized> {
    platform: &'a P,
    state: CeremonyState,
}

impl<'a, P: Platform + ?Sized> Ceremony<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform, state: CeremonyState::AwaitingDirective }
    }

    pub fn state(&self) -> CeremonyState {
        self.state
    }

    pub async fn run(&mut self, directive: CeremonyDirective) -> Result<CeremonyOutcome, CeremonyError> {
        if self.state != CeremonyState::AwaitingDirective {
            return Err(CeremonyError::AlreadyRan);
        }
        let result = self.drive(directive).await;
        self.state = CeremonyState::Completed;
        result
    }

    async fn drive(&mut self, directive: CeremonyDirective) -> Result<CeremonyOutcome, CeremonyError> {
        let kind = directive.kind();
        let binary = directive.into_binary()?;
        self.state = CeremonyState::CeremonyInFlight(kind);

        let credential = match binary {
            BinaryOptions::Registration(o) => self.platform.create_credential(o).await,
            BinaryOptions::Authentication(o) => self.platform.get_credential(o).await,
        }
        .map_err(AbortReason::Platform)?
        .ok_or(AbortReason::Declined)?;

        response::to_wire(credential, kind)
    }
}

/// Run a single ceremony for `directive` on `platform`.
pub async fn perform<P: Platform + ?Sized>(
    platform: &P,
    directive: CeremonyDirective,
) -> Result<CeremonyOutcome, CeremonyError> {
    Ceremony::new(platform).run(directive).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ceremony::binary::{
        AssertionResponse, AttestationResponse, AuthenticationOptions, AuthenticatorResponse,
        Credential, PublicKeyCredential, RegistrationOptions,
    };
    use crate::platform::PlatformError;
    use async_trait::async_trait;
    use serde_json::{Map, json};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        created: Mutex<Vec<RegistrationOptions>>,
        got: Mutex<Vec<AuthenticationOptions>>,
        decline: bool,
    }

    fn pk(response: AuthenticatorResponse) -> Credential {
        Credential::PublicKey(PublicKeyCredential {
            id: "AQ".into(),
            raw_id: vec![1],
            type_: "public-key".into(),
            authenticator_attachment: None,
            client_extension_results: Map::new(),
            response,
        })
    }

    #[async_trait]
    impl Platform for Recorder {
        async fn create_credential(
            &self,
            options: RegistrationOptions,
        ) -> Result<Option<Credential>, PlatformError> {
            self.created.lock().unwrap().push(options);
            if self.decline {
                return Ok(None);
            }
            Ok(Some(pk(AuthenticatorResponse::Attestation(AttestationResponse {
                client_data_json: vec![10, 11],
                attestation_object: vec![12],
                transports: vec![],
            }))))
        }

        async fn get_credential(
            &self,
            options: AuthenticationOptions,
        ) -> Result<Option<Credential>, PlatformError> {
            self.got.lock().unwrap().push(options);
            if self.decline {
                return Err(PlatformError::Cancelled);
            }
            Ok(Some(pk(AuthenticatorResponse::Assertion(AssertionResponse {
                client_data_json: vec![10, 11],
                authenticator_data: vec![1],
                signature: vec![2],
                user_handle: None,
            }))))
        }
    }

    fn registration_json() -> Value {
        json!({
            "kind": "registration",
            "options": {
                "rp": { "id": "example.com", "name": "Example" },
                "user": { "id": "BAU", "name": "alice", "displayName": "alice" },
                "challenge": "AQID",
                "pubKeyCredParams": [{ "type": "public-key", "alg": -7 }]
            }
        })
    }

    fn authentication_json() -> Value {
        json!({ "kind": "authentication", "options": { "challenge": "AQID", "rpId": "example.com" } })
    }

    #[test]
    fn test_directive_parses_both_kinds() {
        let reg = CeremonyDirective::from_json(registration_json()).unwrap();
        assert_eq!(reg.kind(), CeremonyKind::Registration);
        let auth = CeremonyDirective::from_json(authentication_json()).unwrap();
        assert_eq!(auth.kind(), CeremonyKind::Authentication);
    }

    #[test]
    fn test_directive_unknown_kind() {
        let err = CeremonyDirective::from_json(json!({ "kind": "recovery", "options": {} })).unwrap_err();
        assert!(matches!(err, CeremonyError::UnreachableVariant(k) if k == "recovery"));
    }

    #[test]
    fn test_directive_serializes_adjacently_tagged() {
        let reg = CeremonyDirective::from_json(registration_json()).unwrap();
        let v = serde_json::to_value(&reg).unwrap();
        assert_eq!(v["kind"], "registration");
        assert_eq!(v["options"]["challenge"], "AQID");
    }

    #[test]
    fn test_directive_missing_kind_is_invalid() {
        let err = CeremonyDirective::from_json(json!({ "options": {} })).unwrap_err();
        assert!(matches!(err, CeremonyError::InvalidDirective(_)));
    }

    #[tokio::test]
    async fn test_registration_invokes_create() {
        let platform = Recorder::default();
        let directive = CeremonyDirective::from_json(registration_json()).unwrap();
        let mut ceremony = Ceremony::new(&platform);
        assert_eq!(ceremony.state(), CeremonyState::AwaitingDirective);

        let outcome = ceremony.run(directive).await.unwrap();
        assert_eq!(outcome.kind(), CeremonyKind::Registration);
        assert_eq!(ceremony.state(), CeremonyState::Completed);

        let created = platform.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].challenge, vec![1, 2, 3]);
        assert_eq!(created[0].user.id, vec![4, 5]);
        assert!(platform.got.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authentication_invokes_get() {
        let platform = Recorder::default();
        let directive = CeremonyDirective::from_json(authentication_json()).unwrap();
        let outcome = perform(&platform, directive).await.unwrap();
        let CeremonyOutcome::Authenticated(payload) = outcome else {
            panic!("expected authentication outcome");
        };
        assert_eq!(payload.response.user_handle, None);
        assert!(platform.created.lock().unwrap().is_empty());
        assert_eq!(platform.got.lock().unwrap()[0].challenge, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_null_result_aborts() {
        let platform = Recorder { decline: true, ..Default::default() };
        let directive = CeremonyDirective::from_json(registration_json()).unwrap();
        let err = perform(&platform, directive).await.unwrap_err();
        assert!(matches!(err, CeremonyError::CeremonyAborted(AbortReason::Declined)));
    }

    #[tokio::test]
    async fn test_platform_error_aborts() {
        let platform = Recorder { decline: true, ..Default::default() };
        let directive = CeremonyDirective::from_json(authentication_json()).unwrap();
        let err = perform(&platform, directive).await.unwrap_err();
        assert!(err.is_aborted());
        assert!(matches!(
            err,
            CeremonyError::CeremonyAborted(AbortReason::Platform(PlatformError::Cancelled))
        ));
    }

    #[tokio::test]
    async fn test_malformed_challenge_never_reaches_platform() {
        let platform = Recorder::default();
        let mut value = authentication_json();
        value["options"]["challenge"] = json!("not/valid");
        let directive = CeremonyDirective::from_json(value).unwrap();
        let mut ceremony = Ceremony::new(&platform);
        let err = ceremony.run(directive).await.unwrap_err();
        assert!(matches!(err, CeremonyError::MalformedEncoding { .. }));
        assert_eq!(ceremony.state(), CeremonyState::Completed);
        assert!(platform.got.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ceremony_runs_once() {
        let platform = Recorder::default();
        let mut ceremony = Ceremony::new(&platform);
        ceremony
            .run(CeremonyDirective::from_json(authentication_json()).unwrap())
            .await
            .unwrap();
        let err = ceremony
            .run(CeremonyDirective::from_json(authentication_json()).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CeremonyError::AlreadyRan));
        assert_eq!(platform.got.lock().unwrap().len(), 1);
    }
}
