//! Unit tests for the authentication service

use std::sync::Arc;

use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::{MockTokenRepository, MockUserRepository, UserRepository};
use crate::services::auth::{AuthService, AuthServiceConfig};
use crate::services::session::SessionService;
use crate::services::token::{CredentialSigner, TokenServiceConfig};

type TestAuthService = AuthService<MockUserRepository, MockTokenRepository>;

fn create_test_service() -> (TestAuthService, Arc<SessionService<MockTokenRepository>>) {
    let signer = CredentialSigner::new(TokenServiceConfig {
        access_secret: "auth-test-access".to_string(),
        refresh_secret: "auth-test-refresh".to_string(),
        ..TokenServiceConfig::default()
    })
    .unwrap();
    let sessions = Arc::new(SessionService::new(
        Arc::new(MockTokenRepository::new()),
        signer,
    ));
    let config = AuthServiceConfig {
        bcrypt_cost: 4,
        ..AuthServiceConfig::default()
    };
    let service = AuthService::new(Arc::new(MockUserRepository::new()), sessions.clone(), config);
    (service, sessions)
}

#[tokio::test]
async fn test_register_hashes_password() {
    let (service, _) = create_test_service();

    let user = service.register("alice", "secret1").await.unwrap();

    assert_eq!(user.username, "alice");
    assert_ne!(user.password_hash, "secret1");
    assert!(bcrypt::verify("secret1", &user.password_hash).unwrap());

    let stored = service.users().find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(stored.id, user.id);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let (service, _) = create_test_service();
    service.register("alice", "secret1").await.unwrap();

    let result = service.register("alice", "another1").await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::UserAlreadyExists))
    ));
}

#[tokio::test]
async fn test_register_validation() {
    let (service, _) = create_test_service();

    assert!(matches!(
        service.register("alice", "12345").await,
        Err(DomainError::ValidationErr(ValidationError::InvalidLength { .. }))
    ));
    assert!(matches!(
        service.register("", "secret1").await,
        Err(DomainError::ValidationErr(ValidationError::RequiredField { .. }))
    ));
    assert!(matches!(
        service.register("alice", "").await,
        Err(DomainError::ValidationErr(ValidationError::RequiredField { .. }))
    ));
}

#[tokio::test]
async fn test_registration_disabled() {
    let sessions = Arc::new(SessionService::new(
        Arc::new(MockTokenRepository::new()),
        CredentialSigner::new(TokenServiceConfig {
            access_secret: "a".to_string(),
            refresh_secret: "b".to_string(),
            ..TokenServiceConfig::default()
        })
        .unwrap(),
    ));
    let service = AuthService::new(
        Arc::new(MockUserRepository::new()),
        sessions,
        AuthServiceConfig {
            bcrypt_cost: 4,
            allow_registration: false,
        },
    );

    assert!(matches!(
        service.register("alice", "secret1").await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_login_issues_pair_scoped_to_client() {
    let (service, sessions) = create_test_service();
    let user = service.register("alice", "secret1").await.unwrap();

    let response = service.login("alice", "secret1", "::ffff:10.1.2.3", None).await.unwrap();

    assert_eq!(response.user.id, user.id);
    assert_eq!(response.user.username, "alice");
    assert_eq!(response.tokens.origin_ip, "10.1.2.3");
    assert_eq!(response.tokens.allowed_scopes, vec!["10.1.2.3".to_string()]);

    let claims = sessions
        .validate(&response.tokens.access_token, "10.1.2.3")
        .await
        .unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
}

#[tokio::test]
async fn test_login_with_explicit_scopes() {
    let (service, sessions) = create_test_service();
    service.register("alice", "secret1").await.unwrap();

    let response = service
        .login(
            "alice",
            "secret1",
            "10.1.2.3",
            Some(vec!["192.168.0.0/16".to_string(), "10.1.2.*".to_string()]),
        )
        .await
        .unwrap();

    assert!(sessions
        .validate(&response.tokens.access_token, "192.168.44.1")
        .await
        .is_ok());
    let outside = sessions
        .validate(&response.tokens.access_token, "172.16.0.1")
        .await;
    assert!(matches!(outside, Err(DomainError::Token(TokenError::IpMismatch))));
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (service, _) = create_test_service();
    service.register("alice", "secret1").await.unwrap();

    assert!(matches!(
        service.login("alice", "wrong-password", "10.0.0.1", None).await,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
    assert!(matches!(
        service.login("bob", "secret1", "10.0.0.1", None).await,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn test_login_missing_fields() {
    let (service, _) = create_test_service();

    assert!(matches!(
        service.login("", "secret1", "10.0.0.1", None).await,
        Err(DomainError::ValidationErr(ValidationError::RequiredField { .. }))
    ));
    assert!(matches!(
        service.login("alice", "", "10.0.0.1", None).await,
        Err(DomainError::ValidationErr(ValidationError::RequiredField { .. }))
    ));
}

#[tokio::test]
async fn test_login_rejects_malformed_scope() {
    let (service, _) = create_test_service();
    service.register("alice", "secret1").await.unwrap();

    let result = service
        .login("alice", "secret1", "10.0.0.1", Some(vec!["300.1.1.1".to_string()]))
        .await;
    assert!(matches!(
        result,
        Err(DomainError::ValidationErr(ValidationError::InvalidScopePattern { .. }))
    ));
}

#[tokio::test]
async fn test_second_login_revokes_first() {
    let (service, sessions) = create_test_service();
    service.register("alice", "secret1").await.unwrap();

    let first = service.login("alice", "secret1", "10.0.0.1", None).await.unwrap();
    let second = service.login("alice", "secret1", "10.0.0.1", None).await.unwrap();

    assert!(matches!(
        sessions.validate(&first.tokens.access_token, "10.0.0.1").await,
        Err(DomainError::Token(TokenError::Revoked))
    ));
    assert!(sessions
        .validate(&second.tokens.access_token, "10.0.0.1")
        .await
        .is_ok());
}
