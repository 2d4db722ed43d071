// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime, macros};
// self
use oauth2_issuer::{
	auth::{AuthorizationCode, ClientId, CodeId, IssuedToken, ScopeSet, Token, TokenSecret, UserId},
	config::GrantConfig,
	error::{Error, ErrorKind},
	grant::{AuthorizationCodeGrant, FixedClock, GrantOptions},
	model::{ModelError, ModelFuture, TokenModel},
	request::Request,
};

const NOW: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);

type Code = AuthorizationCode<ClientId, UserId>;

#[derive(Clone, Debug, PartialEq)]
enum Call {
	Fetch { code: CodeId, client: ClientId },
	Revoke { code: Code },
	ValidateScope { scope: Option<ScopeSet> },
	GenerateAccess,
	GenerateRefresh,
	Save { token: IssuedToken, client: ClientId, user: UserId },
}

/// Scriptable [`TokenModel`] double that records every call it receives.
#[derive(Default)]
struct RecordingModel {
	lookup: Option<Code>,
	revoke_result: bool,
	access_token: Option<&'static str>,
	refresh_token: Option<&'static str>,
	scope_result: Option<Option<ScopeSet>>,
	save_failure: Option<ModelError>,
	calls: Mutex<Vec<Call>>,
}
impl RecordingModel {
	fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	fn saves(&self) -> usize {
		self.calls().iter().filter(|call| matches!(call, Call::Save { .. })).count()
	}
}
impl TokenModel for RecordingModel {
	type Client = ClientId;
	type User = UserId;

	fn get_authorization_code<'a>(
		&'a self,
		code: &'a CodeId,
		client: &'a ClientId,
	) -> ModelFuture<'a, Option<Code>> {
		self.calls.lock().push(Call::Fetch { code: code.clone(), client: client.clone() });

		let record = self.lookup.clone();

		Box::pin(async move { Ok(record) })
	}

	fn revoke_authorization_code<'a>(&'a self, code: &'a Code) -> ModelFuture<'a, bool> {
		self.calls.lock().push(Call::Revoke { code: code.clone() });

		let revoked = self.revoke_result;

		Box::pin(async move { Ok(revoked) })
	}

	fn save_token<'a>(
		&'a self,
		token: IssuedToken,
		client: &'a ClientId,
		user: &'a UserId,
	) -> ModelFuture<'a, Token<ClientId, UserId>> {
		self.calls.lock().push(Call::Save {
			token: token.clone(),
			client: client.clone(),
			user: user.clone(),
		});

		let outcome = match self.save_failure.clone() {
			Some(err) => Err(err),
			None => Ok(token.into_token(client.clone(), user.clone())),
		};

		Box::pin(async move { outcome })
	}

	fn validate_scope<'a>(
		&'a self,
		_user: &'a UserId,
		_client: &'a ClientId,
		scope: Option<&'a ScopeSet>,
	) -> ModelFuture<'a, Option<ScopeSet>> {
		self.calls.lock().push(Call::ValidateScope { scope: scope.cloned() });

		let validated = match &self.scope_result {
			Some(result) => result.clone(),
			None => scope.cloned(),
		};

		Box::pin(async move { Ok(validated) })
	}

	fn generate_access_token(&self) -> ModelFuture<'_, Option<TokenSecret>> {
		self.calls.lock().push(Call::GenerateAccess);

		let token = self.access_token.map(TokenSecret::new);

		Box::pin(async move { Ok(token) })
	}

	fn generate_refresh_token(&self) -> ModelFuture<'_, Option<TokenSecret>> {
		self.calls.lock().push(Call::GenerateRefresh);

		let token = self.refresh_token.map(TokenSecret::new);

		Box::pin(async move { Ok(token) })
	}
}

fn client() -> ClientId {
	ClientId::new("client-c").expect("Client fixture should be valid.")
}

fn user() -> UserId {
	UserId::new("user-u").expect("User fixture should be valid.")
}

fn code_record(code: &str, expires_at: OffsetDateTime) -> Code {
	AuthorizationCode::new(
		CodeId::new(code).expect("Code fixture should be valid."),
		client(),
		user(),
		expires_at,
	)
}

fn grant(model: Arc<RecordingModel>) -> AuthorizationCodeGrant<RecordingModel> {
	let options = GrantOptions::new(GrantConfig::default())
		.model(model)
		.access_token_lifetime(120)
		.refresh_token_lifetime(86_400)
		.clock(Arc::new(FixedClock::new(NOW)));

	AuthorizationCodeGrant::new(options).expect("Grant should build with a complete configuration.")
}

fn code_request(code: impl Into<serde_json::Value>) -> Request {
	Request::builder("POST").body("code", code).build()
}

#[tokio::test]
async fn get_authorization_code_looks_up_once_and_returns_record() {
	let record = code_record("12345", NOW + Duration::minutes(5));
	let model = Arc::new(RecordingModel { lookup: Some(record.clone()), ..Default::default() });
	let grant = grant(model.clone());
	let fetched = grant
		.get_authorization_code(&code_request(12345), &client())
		.await
		.expect("A valid code should be returned.");

	assert_eq!(fetched, record);
	assert_eq!(
		model.calls(),
		vec![Call::Fetch {
			code: CodeId::new("12345").expect("Code fixture should be valid."),
			client: client(),
		}]
	);
}

#[tokio::test]
async fn get_authorization_code_rejects_absent_foreign_and_expired_codes() {
	let other_client = ClientId::new("client-other").expect("Client fixture should be valid.");
	let foreign = Code { client: other_client, ..code_record("12345", NOW + Duration::minutes(5)) };
	let cases = [
		None,
		Some(foreign),
		Some(code_record("12345", NOW)),
		Some(code_record("12345", NOW - Duration::seconds(1))),
	];

	for lookup in cases {
		let model = Arc::new(RecordingModel { lookup, ..Default::default() });
		let err = grant(model.clone())
			.get_authorization_code(&code_request("12345"), &client())
			.await
			.expect_err("The code must be rejected.");

		assert_eq!(err.kind(), ErrorKind::InvalidGrant);
		assert_eq!(model.calls().len(), 1, "Only the lookup may run.");
	}
}

#[tokio::test]
async fn get_authorization_code_rejects_malformed_requests_without_lookup() {
	let model = Arc::new(RecordingModel::default());
	let grant = grant(model.clone());

	for request in [Request::builder("POST").build(), code_request("bad\u{7f}code")] {
		let err = grant
			.get_authorization_code(&request, &client())
			.await
			.expect_err("Malformed requests must be rejected.");

		assert_eq!(err.kind(), ErrorKind::InvalidRequest);
	}

	assert!(model.calls().is_empty());
}

#[tokio::test]
async fn revoke_passes_record_and_returns_it_unchanged() {
	let record = code_record("12345", NOW + Duration::minutes(5));
	let model = Arc::new(RecordingModel { revoke_result: true, ..Default::default() });
	let revoked = grant(model.clone())
		.revoke_authorization_code(record.clone())
		.await
		.expect("Revocation should succeed.");

	assert_eq!(revoked, record);
	assert_eq!(model.calls(), vec![Call::Revoke { code: record }]);

	let model = Arc::new(RecordingModel { revoke_result: false, ..Default::default() });
	let err = grant(model)
		.revoke_authorization_code(code_record("12345", NOW + Duration::minutes(5)))
		.await
		.expect_err("A falsy revoke must fail.");

	assert!(matches!(err, Error::InvalidGrant { .. }));
}

#[tokio::test]
async fn save_token_assembles_values_from_each_capability() {
	let narrowed: ScopeSet = "foobiz".parse().expect("Scope fixture should parse.");
	let model = Arc::new(RecordingModel {
		access_token: Some("foo"),
		refresh_token: Some("bar"),
		scope_result: Some(Some(narrowed.clone())),
		..Default::default()
	});
	let requested: ScopeSet = "foobiz extra".parse().expect("Scope fixture should parse.");
	let code = CodeId::new("foobar").expect("Code fixture should be valid.");
	let token = grant(model.clone())
		.save_token(&user(), &client(), &code, Some(&requested))
		.await
		.expect("Saving should succeed.");
	let expected = IssuedToken {
		access_token: TokenSecret::new("foo"),
		access_token_expires_at: NOW + Duration::seconds(120),
		refresh_token: TokenSecret::new("bar"),
		refresh_token_expires_at: NOW + Duration::days(1),
		scope: Some(narrowed),
		authorization_code: code,
	};
	let saves = model
		.calls()
		.into_iter()
		.filter_map(|call| match call {
			Call::Save { token, client, user } => Some((token, client, user)),
			_ => None,
		})
		.collect::<Vec<_>>();

	assert_eq!(saves, vec![(expected.clone(), client(), user())]);
	assert_eq!(token, expected.into_token(client(), user()));
	assert!(model.calls().contains(&Call::ValidateScope { scope: Some(requested) }));
}

#[tokio::test]
async fn save_token_rejected_scope_stops_before_persisting() {
	let model = Arc::new(RecordingModel { scope_result: Some(None), ..Default::default() });
	let requested: ScopeSet = "admin".parse().expect("Scope fixture should parse.");
	let err = grant(model.clone())
		.save_token(
			&user(),
			&client(),
			&CodeId::new("12345").expect("Code fixture should be valid."),
			Some(&requested),
		)
		.await
		.expect_err("A rejected scope must fail.");

	assert_eq!(err.kind(), ErrorKind::InvalidScope);
	assert_eq!(model.saves(), 0);
}

#[tokio::test]
async fn handle_issues_distinct_tokens_for_a_valid_code() {
	let record = code_record("12345", NOW + Duration::minutes(10));
	let model = Arc::new(RecordingModel {
		lookup: Some(record.clone()),
		revoke_result: true,
		..Default::default()
	});
	let client = client();
	let token = grant(model.clone())
		.handle(Some(&code_request(12345)), Some(&client))
		.await
		.expect("The exchange should succeed.");

	assert_eq!(token.authorization_code, record.code);
	assert_eq!(token.client, client);
	assert_eq!(token.user, record.user);
	assert!(!token.access_token.is_empty());
	assert!(!token.refresh_token.is_empty());
	assert_ne!(token.access_token, token.refresh_token);
	assert_eq!(token.access_token_expires_at, NOW + Duration::seconds(120));

	let order = model
		.calls()
		.into_iter()
		.filter(|call| matches!(call, Call::Fetch { .. } | Call::Revoke { .. } | Call::Save { .. }))
		.map(|call| match call {
			Call::Fetch { .. } => "fetch",
			Call::Revoke { .. } => "revoke",
			_ => "save",
		})
		.collect::<Vec<_>>();

	assert_eq!(order, ["fetch", "revoke", "save"]);
}

#[tokio::test]
async fn handle_carries_record_scope_into_the_token() {
	let scope: ScopeSet = "read write".parse().expect("Scope fixture should parse.");
	let record = code_record("scoped", NOW + Duration::minutes(10)).with_scope(scope.clone());
	let model = Arc::new(RecordingModel {
		lookup: Some(record),
		revoke_result: true,
		..Default::default()
	});
	let token = grant(model)
		.handle(Some(&code_request("scoped")), Some(&client()))
		.await
		.expect("The exchange should succeed.");

	assert_eq!(token.scope, Some(scope));
}

#[tokio::test]
async fn handle_fails_with_invalid_grant_for_unknown_code() {
	let model = Arc::new(RecordingModel::default());
	let err = grant(model.clone())
		.handle(Some(&code_request(99999)), Some(&client()))
		.await
		.expect_err("Unknown codes must be rejected.");

	assert_eq!(err.kind(), ErrorKind::InvalidGrant);
	assert_eq!(model.saves(), 0);
}

#[tokio::test]
async fn handle_fails_with_invalid_grant_when_revoke_is_refused() {
	let model = Arc::new(RecordingModel {
		lookup: Some(code_record("12345", NOW + Duration::minutes(10))),
		revoke_result: false,
		..Default::default()
	});
	let err = grant(model.clone())
		.handle(Some(&code_request(12345)), Some(&client()))
		.await
		.expect_err("A refused revoke must fail the exchange.");

	assert_eq!(err.kind(), ErrorKind::InvalidGrant);
	assert!(matches!(model.calls().first(), Some(Call::Fetch { .. })));
	assert_eq!(model.saves(), 0);
	assert!(!model.calls().contains(&Call::GenerateAccess));
}

#[tokio::test]
async fn handle_requires_request_and_client() {
	let model = Arc::new(RecordingModel::default());
	let grant = grant(model.clone());
	let request = code_request(12345);
	let missing_request =
		grant.handle(None, Some(&client())).await.expect_err("A missing request must fail.");
	let missing_client =
		grant.handle(Some(&request), None).await.expect_err("A missing client must fail.");

	assert_eq!(missing_request.kind(), ErrorKind::InvalidArgument);
	assert!(missing_request.to_string().contains("request"));
	assert_eq!(missing_client.kind(), ErrorKind::InvalidArgument);
	assert!(missing_client.to_string().contains("client"));
	assert!(model.calls().is_empty());
}

#[tokio::test]
async fn handle_propagates_model_failures_unchanged() {
	let failure = ModelError::backend("disk full");
	let model = Arc::new(RecordingModel {
		lookup: Some(code_record("12345", NOW + Duration::minutes(10))),
		revoke_result: true,
		save_failure: Some(failure.clone()),
		..Default::default()
	});
	let err = grant(model)
		.handle(Some(&code_request(12345)), Some(&client()))
		.await
		.expect_err("Model failures must surface.");

	assert_eq!(err.kind(), ErrorKind::ServerError);
	assert!(matches!(err, Error::Model(inner) if inner == failure));
}

#[tokio::test]
async fn handle_checks_redirect_uri_before_revoking() {
	let record = code_record("12345", NOW + Duration::minutes(10))
		.with_redirect_uri("https://app.example.com/cb");
	let model = Arc::new(RecordingModel {
		lookup: Some(record),
		revoke_result: true,
		..Default::default()
	});
	let grant = grant(model.clone());
	let missing = grant
		.handle(Some(&code_request(12345)), Some(&client()))
		.await
		.expect_err("A missing redirect_uri must fail.");
	let mismatched = Request::builder("POST")
		.body("code", 12345)
		.body("redirect_uri", "https://evil.example.com/cb")
		.build();
	let mismatch = grant
		.handle(Some(&mismatched), Some(&client()))
		.await
		.expect_err("A different redirect_uri must fail.");

	let respelled = Request::builder("POST")
		.body("code", 12345)
		.body("redirect_uri", "HTTPS://APP.EXAMPLE.COM:443/cb")
		.build();
	let respelling = grant
		.handle(Some(&respelled), Some(&client()))
		.await
		.expect_err("An equivalent but differently spelled redirect_uri must fail.");

	assert_eq!(missing.kind(), ErrorKind::InvalidRequest);
	assert_eq!(mismatch.kind(), ErrorKind::InvalidRequest);
	assert_eq!(respelling.kind(), ErrorKind::InvalidRequest);
	assert!(!model.calls().iter().any(|call| matches!(call, Call::Revoke { .. })));

	let matching = Request::builder("POST")
		.body("code", 12345)
		.query("redirect_uri", "https://app.example.com/cb")
		.build();

	grant
		.handle(Some(&matching), Some(&client()))
		.await
		.expect("A matching redirect_uri from the query should be accepted.");

	assert_eq!(model.saves(), 1);
}

#[tokio::test]
async fn handle_rejects_repeated_code_parameters() {
	let model = Arc::new(RecordingModel {
		lookup: Some(code_record("a", NOW + Duration::minutes(10))),
		revoke_result: true,
		..Default::default()
	});
	let request = Request::from_form(b"grant_type=authorization_code&code=a&code=b");
	let err = grant(model.clone())
		.handle(Some(&request), Some(&client()))
		.await
		.expect_err("A repeated code parameter must be rejected.");

	assert_eq!(err.kind(), ErrorKind::InvalidRequest);
	assert!(model.calls().is_empty());
}

#[test]
fn construction_requires_refresh_lifetime() {
	let err = AuthorizationCodeGrant::new(
		GrantOptions::new(GrantConfig::default())
			.model(Arc::new(RecordingModel::default()))
			.access_token_lifetime(120),
	)
	.expect_err("A missing refresh token lifetime must be rejected.");

	assert_eq!(err.kind(), ErrorKind::InvalidArgument);

	let err = AuthorizationCodeGrant::<RecordingModel>::new(GrantOptions::new(
		GrantConfig::with_defaults(),
	))
	.expect_err("A missing model must be rejected.");

	assert!(err.to_string().contains("model"));
}
