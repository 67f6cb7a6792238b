//! Orchestration tests for `AuthService`.
//!
//! These live as an integration test (rather than an inline `#[cfg(test)]`
//! module) because they exercise the service through the in-memory stores from
//! `atlaserp-infra`, which itself depends on `atlaserp-auth`. An inline unit
//! test would pull the crate into its own dev-dependency cycle and produce two
//! distinct versions of `atlaserp-auth` in the graph; an integration test links
//! the ordinary (non-`cfg(test)`) library and avoids that.

use std::sync::Arc;

use chrono::Utc;

use atlaserp_infra::stores::{InMemoryCompanyStore, InMemoryTwoFactorService, InMemoryUserStore};

use atlaserp_auth::access;
use atlaserp_auth::{
    Action, Argon2PasswordHasher, AuthConfig, AuthError, AuthService, AuthSession, Company,
    CompanyAccessGrant, CompanyStore, LoginInput, LoginOutcome, Module, PermissionMatrix,
    RegisterInput, Role, TokenService, TwoFactorInput, UserStore,
};

type TestService = AuthService<
    Arc<InMemoryUserStore>,
    Arc<InMemoryCompanyStore>,
    Argon2PasswordHasher,
    Arc<InMemoryTwoFactorService>,
>;

struct Harness {
    service: TestService,
    users: Arc<InMemoryUserStore>,
    companies: Arc<InMemoryCompanyStore>,
    two_factor: Arc<InMemoryTwoFactorService>,
}

fn harness() -> Harness {
    let users = Arc::new(InMemoryUserStore::new());
    let companies = Arc::new(InMemoryCompanyStore::new());
    let two_factor = Arc::new(InMemoryTwoFactorService::new());
    let service = AuthService::new(
        users.clone(),
        companies.clone(),
        // Low-cost Argon2 params keep the suite fast.
        Argon2PasswordHasher::new(8, 1, 1).unwrap(),
        two_factor.clone(),
        AuthConfig::default(),
    );
    Harness {
        service,
        users,
        companies,
        two_factor,
    }
}

fn register_input(username: &str, email: &str, company_code: &str) -> RegisterInput {
    RegisterInput {
        username: username.to_string(),
        email: email.to_string(),
        password: "correct horse".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        phone: None,
        company_code: company_code.to_string(),
        company_name: None,
        ip_address: Some("203.0.113.9".to_string()),
        user_agent: Some("tests".to_string()),
    }
}

fn login_input(identifier: &str, password: &str) -> LoginInput {
    LoginInput {
        identifier: identifier.to_string(),
        password: password.to_string(),
        company_code: None,
        ip_address: Some("203.0.113.9".to_string()),
        user_agent: Some("tests".to_string()),
    }
}

async fn login_ok(service: &TestService, identifier: &str, password: &str) -> AuthSession {
    match service.login(login_input(identifier, password)).await.unwrap() {
        LoginOutcome::Authenticated(session) => *session,
        LoginOutcome::TwoFactorRequired { .. } => panic!("unexpected two-factor gate"),
    }
}

#[tokio::test]
async fn register_with_unknown_code_creates_company_and_admin_grant() {
    let h = harness();

    let session = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    let company = h.companies.find_by_code("ACME").await.unwrap().unwrap();
    assert!(company.is_active);

    let current = session.current_company.unwrap();
    assert_eq!(current.company_id, company.id);
    assert_eq!(current.role, Role::SuperAdmin);
    assert_eq!(current.grant.permissions, PermissionMatrix::full());

    // Every matrix action is enabled for the founding user.
    for module in Module::ALL {
        for action in Action::ALL {
            assert!(access::has_permission(Some(&current.grant), module, action));
        }
    }
}

#[tokio::test]
async fn register_into_existing_company_joins_as_operator() {
    let h = harness();
    h.service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    let session = h
        .service
        .register(register_input("ravi", "ravi@example.com", "ACME"))
        .await
        .unwrap();

    let current = session.current_company.unwrap();
    assert_eq!(current.role, Role::Operator);
    assert_eq!(current.grant.permissions, PermissionMatrix::empty());
}

#[tokio::test]
async fn register_duplicate_identity_is_rejected() {
    let h = harness();
    h.service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    let err = h
        .service
        .register(register_input("asha", "other@example.com", "ACME"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateIdentity("username"));

    let err = h
        .service
        .register(register_input("other", "ASHA@example.com", "ACME"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateIdentity("email"));
}

#[tokio::test]
async fn register_rejects_short_passwords() {
    let h = harness();
    let mut input = register_input("asha", "asha@example.com", "ACME");
    input.password = "short".to_string();

    let err = h.service.register(input).await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn login_succeeds_with_any_identifier_kind() {
    let h = harness();
    let registered = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    let session = login_ok(&h.service, "ASHA@EXAMPLE.COM", "correct horse").await;
    assert_eq!(session.user.id, registered.user.id);

    let claims = h.service.verify_access_token(&session.access_token).unwrap();
    assert_eq!(claims.sub, registered.user.id);
    assert!(claims.company_id.is_some());
}

#[tokio::test]
async fn login_with_unknown_identifier_is_invalid_credentials() {
    let h = harness();
    let err = h
        .service
        .login(login_input("nobody", "whatever-pass"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn five_failures_lock_and_the_sixth_attempt_is_rejected_even_if_correct() {
    let h = harness();
    h.service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    for _ in 0..5 {
        let err = h
            .service
            .login(login_input("asha", "wrong password"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    // Correct password, but the lock wins before comparison.
    let err = h
        .service
        .login(login_input("asha", "correct horse"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked { .. }));
}

#[tokio::test]
async fn successful_login_clears_failure_counters() {
    let h = harness();
    let registered = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    for _ in 0..2 {
        let _ = h.service.login(login_input("asha", "wrong password")).await;
    }
    login_ok(&h.service, "asha", "correct horse").await;

    let user = h
        .users
        .find_by_id(registered.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.security.failed_login_attempts, 0);
    assert_eq!(user.security.lockout_until, None);
    assert!(user.security.last_login.is_some());
}

#[tokio::test]
async fn enrolled_user_gets_two_factor_gate_and_temp_token_is_not_an_access_token() {
    let h = harness();
    let registered = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();
    h.two_factor.enroll(registered.user.id, "424242");

    let outcome = h
        .service
        .login(login_input("asha", "correct horse"))
        .await
        .unwrap();
    let LoginOutcome::TwoFactorRequired { temp_token } = outcome else {
        panic!("expected two-factor gate");
    };

    // Purpose-restricted: the challenge token must not authorize requests.
    assert!(h.service.verify_access_token(&temp_token).is_err());

    let session = h
        .service
        .complete_two_factor(TwoFactorInput {
            temp_token,
            code: "424242".to_string(),
            company_code: None,
            ip_address: None,
            user_agent: None,
        })
        .await
        .unwrap();
    assert_eq!(session.user.id, registered.user.id);
    assert!(session.current_company.is_some());
}

#[tokio::test]
async fn wrong_second_factor_code_is_invalid_credentials() {
    let h = harness();
    let registered = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();
    h.two_factor.enroll(registered.user.id, "424242");

    let LoginOutcome::TwoFactorRequired { temp_token } = h
        .service
        .login(login_input("asha", "correct horse"))
        .await
        .unwrap()
    else {
        panic!("expected two-factor gate");
    };

    let err = h
        .service
        .complete_two_factor(TwoFactorInput {
            temp_token,
            code: "000000".to_string(),
            company_code: None,
            ip_address: None,
            user_agent: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn refresh_issues_a_new_access_token_bound_to_the_same_company() {
    let h = harness();
    let session = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    let refreshed = h.service.refresh(&session.refresh_token).await.unwrap();

    let claims = h
        .service
        .verify_access_token(&refreshed.access_token)
        .unwrap();
    assert_eq!(claims.sub, session.user.id);
    assert_eq!(
        refreshed.current_company.unwrap().company_id,
        session.current_company.unwrap().company_id
    );
}

#[tokio::test]
async fn refresh_with_expired_token_is_rejected_without_issuing() {
    let h = harness();
    let session = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    // Same secrets, issued far enough in the past to be expired.
    let tokens = TokenService::new(&AuthConfig::default());
    let stale = tokens
        .issue_refresh_token(session.user.id, 0, Utc::now() - chrono::Duration::days(8))
        .unwrap();

    let err = h.service.refresh(&stale).await.unwrap_err();
    assert_eq!(err, AuthError::TokenExpired);
}

#[tokio::test]
async fn refresh_after_revocation_is_rejected() {
    let h = harness();
    let session = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    h.service
        .revoke_refresh_tokens(session.user.id)
        .await
        .unwrap();

    let err = h.service.refresh(&session.refresh_token).await.unwrap_err();
    assert_eq!(err, AuthError::TokenRevoked);
}

#[tokio::test]
async fn requested_company_code_selects_that_grant_and_unknown_code_is_denied() {
    let h = harness();
    let session = h
        .service
        .register(register_input("asha", "asha@example.com", "ACME"))
        .await
        .unwrap();

    // Give the user a second company out of band.
    let beta = Company::new("BETA", "Beta Works", Utc::now());
    h.companies.insert(beta.clone()).await.unwrap();
    let mut user = h
        .users
        .find_by_id(session.user.id)
        .await
        .unwrap()
        .unwrap();
    user.assign_grant(CompanyAccessGrant::new(
        beta.id,
        Role::Accountant,
        PermissionMatrix::empty(),
        Utc::now(),
    ));
    h.users.update(&user).await.unwrap();

    let mut input = login_input("asha", "correct horse");
    input.company_code = Some("beta".to_string());
    let LoginOutcome::Authenticated(session) = h.service.login(input).await.unwrap() else {
        panic!("expected authenticated outcome");
    };
    assert_eq!(session.current_company.as_ref().unwrap().company_code, "BETA");
    assert_eq!(session.current_company.as_ref().unwrap().role, Role::Accountant);

    let mut input = login_input("asha", "correct horse");
    input.company_code = Some("GHOST".to_string());
    let err = h.service.login(input).await.unwrap_err();
    assert_eq!(err, AuthError::CompanyAccessDenied);
}

#[tokio::test]
async fn super_admin_with_unknown_code_gets_a_session_without_company_context() {
    let h = harness();
    let session = h
        .service
        .register(register_input("root", "root@example.com", "ACME"))
        .await
        .unwrap();

    let mut user = h
        .users
        .find_by_id(session.user.id)
        .await
        .unwrap()
        .unwrap();
    user.is_super_admin = true;
    h.users.update(&user).await.unwrap();

    let mut input = login_input("root", "correct horse");
    input.company_code = Some("GHOST".to_string());
    let LoginOutcome::Authenticated(session) = h.service.login(input).await.unwrap() else {
        panic!("expected authenticated outcome");
    };

    // Strict match for super-admins: nothing selected, listing still visible.
    assert!(session.current_company.is_none());
    assert_eq!(session.companies.len(), 1);

    let claims = h.service.verify_access_token(&session.access_token).unwrap();
    assert_eq!(claims.company_id, None);
}
