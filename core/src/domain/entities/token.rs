//! Token entities for IP-scoped JWT sessions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token lifetime (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 15 * 60;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// JWT issuer
pub const JWT_ISSUER: &str = "tokengate";

/// JWT audience
pub const JWT_AUDIENCE: &str = "tokengate-api";

/// Token type reported to clients
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Signing domain of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived token presented on every request
    Access,
    /// Long-lived token exchanged for a new pair
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Identity and scope carried by both tokens of a family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFields {
    /// Owner of the token
    pub user_id: Uuid,
    /// Username at issuance
    pub username: String,
    /// Normalized address the family was issued to
    pub origin_ip: String,
    /// Scope patterns the family may be used from
    pub allowed_scopes: Vec<String>,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Username at issuance
    pub username: String,

    /// Address the token was issued to
    pub ip: String,

    /// Scope patterns the token may be used from
    pub allowed_ips: Vec<String>,

    /// Signing domain
    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,
}

impl Claims {
    /// Creates new claims of the given kind expiring `ttl_seconds` from now
    pub fn new(kind: TokenKind, fields: &ClaimFields, ttl_seconds: i64) -> Self {
        Self::with_issuer(kind, fields, ttl_seconds, JWT_ISSUER, JWT_AUDIENCE)
    }

    /// Creates new claims with an explicit issuer and audience
    pub fn with_issuer(
        kind: TokenKind,
        fields: &ClaimFields,
        ttl_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::seconds(ttl_seconds);

        Self {
            sub: fields.user_id.to_string(),
            username: fields.username.clone(),
            ip: fields.origin_ip.clone(),
            allowed_ips: fields.allowed_scopes.clone(),
            kind,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }

    /// Identity and scope carried by the claims
    ///
    /// Returns `None` when the subject is not a valid user ID.
    pub fn fields(&self) -> Option<ClaimFields> {
        Some(ClaimFields {
            user_id: self.user_id().ok()?,
            username: self.username.clone(),
            origin_ip: self.ip.clone(),
            allowed_scopes: self.allowed_ips.clone(),
        })
    }
}

/// A linked access/refresh pair as recorded by the token store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFamily {
    /// Unique identifier for the family
    pub id: Uuid,

    /// Owner of the family
    pub user_id: Uuid,

    /// Signed access token
    pub access_token: String,

    /// Signed refresh token
    pub refresh_token: String,

    /// Normalized address the family was issued to
    pub origin_ip: String,

    /// Scope patterns the family may be used from (never empty)
    pub allowed_scopes: Vec<String>,

    /// When the access token stops being live
    pub access_expires_at: DateTime<Utc>,

    /// When the refresh token expires and the family may be swept
    pub refresh_expires_at: DateTime<Utc>,

    /// Whether the family has been revoked
    pub revoked: bool,

    /// Timestamp when the family was issued
    pub created_at: DateTime<Utc>,
}

impl TokenFamily {
    /// Creates a new, live token family
    pub fn new(
        user_id: Uuid,
        access_token: String,
        refresh_token: String,
        origin_ip: String,
        allowed_scopes: Vec<String>,
        access_expires_at: DateTime<Utc>,
        refresh_expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            access_token,
            refresh_token,
            origin_ip,
            allowed_scopes,
            access_expires_at,
            refresh_expires_at,
            revoked: false,
            created_at: Utc::now(),
        }
    }

    /// Checks whether the access token is still live at `now`
    pub fn is_access_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.access_expires_at
    }

    /// Checks whether the access token is live right now
    pub fn is_access_live(&self) -> bool {
        self.is_access_live_at(Utc::now())
    }

    /// Checks whether the refresh token has expired at `now`
    pub fn is_refresh_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.refresh_expires_at <= now
    }

    /// Revokes the family
    pub fn revoke(&mut self) {
        self.revoked = true;
    }

    /// Summary safe to show to the owner (no token values)
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            origin_ip: self.origin_ip.clone(),
            allowed_scopes: self.allowed_scopes.clone(),
            access_expires_at: self.access_expires_at,
            created_at: self.created_at,
        }
    }
}

/// Active session as listed to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub origin_ip: String,
    pub allowed_scopes: Vec<String>,
    pub access_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Always `Bearer`
    pub token_type: String,

    /// Normalized address the pair was issued to
    pub origin_ip: String,

    /// Scope patterns the pair may be used from
    pub allowed_scopes: Vec<String>,
}

impl TokenPair {
    /// Creates a token pair for a freshly stored family
    pub fn from_family(family: &TokenFamily, expires_in: i64) -> Self {
        Self {
            access_token: family.access_token.clone(),
            refresh_token: family.refresh_token.clone(),
            expires_in,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            origin_ip: family.origin_ip.clone(),
            allowed_scopes: family.allowed_scopes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ClaimFields {
        ClaimFields {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            origin_ip: "10.0.0.5".to_string(),
            allowed_scopes: vec!["10.0.0.*".to_string()],
        }
    }

    fn family() -> TokenFamily {
        let now = Utc::now();
        TokenFamily::new(
            Uuid::new_v4(),
            "access".to_string(),
            "refresh".to_string(),
            "10.0.0.5".to_string(),
            vec!["10.0.0.5".to_string()],
            now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECONDS),
            now + Duration::seconds(REFRESH_TOKEN_EXPIRY_SECONDS),
        )
    }

    #[test]
    fn test_access_claims() {
        let fields = fields();
        let claims = Claims::new(TokenKind::Access, &fields, ACCESS_TOKEN_EXPIRY_SECONDS);

        assert_eq!(claims.sub, fields.user_id.to_string());
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iss, JWT_ISSUER);
        assert_eq!(claims.aud, JWT_AUDIENCE);
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY_SECONDS);
        assert!(!claims.is_expired());
        assert_eq!(claims.fields(), Some(fields));
    }

    #[test]
    fn test_claims_have_unique_ids() {
        let fields = fields();
        let a = Claims::new(TokenKind::Refresh, &fields, 60);
        let b = Claims::new(TokenKind::Refresh, &fields, 60);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_claims_expiration() {
        let mut claims = Claims::new(TokenKind::Access, &fields(), 60);
        claims.exp = Utc::now().timestamp() - 1;
        assert!(claims.is_expired());
    }

    #[test]
    fn test_claims_kind_serialized_as_type() {
        let claims = Claims::new(TokenKind::Refresh, &fields(), 60);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "refresh");
        assert_eq!(json["allowed_ips"][0], "10.0.0.*");
    }

    #[test]
    fn test_claims_with_bad_subject_have_no_fields() {
        let mut claims = Claims::new(TokenKind::Access, &fields(), 60);
        claims.sub = "not-a-uuid".to_string();
        assert!(claims.fields().is_none());
    }

    #[test]
    fn test_family_liveness() {
        let mut family = family();
        assert!(family.is_access_live());

        let after_access_expiry = family.access_expires_at + Duration::seconds(1);
        assert!(!family.is_access_live_at(after_access_expiry));
        assert!(!family.is_refresh_expired_at(after_access_expiry));

        family.revoke();
        assert!(!family.is_access_live());
    }

    #[test]
    fn test_family_summary_hides_tokens() {
        let family = family();
        let summary = family.summary();
        let json = serde_json::to_string(&summary).unwrap();

        assert_eq!(summary.id, family.id);
        assert!(!json.contains("access"));
        assert!(json.contains("originIp"));
    }

    #[test]
    fn test_token_pair_from_family() {
        let family = family();
        let pair = TokenPair::from_family(&family, ACCESS_TOKEN_EXPIRY_SECONDS);

        assert_eq!(pair.access_token, "access");
        assert_eq!(pair.refresh_token, "refresh");
        assert_eq!(pair.expires_in, 900);
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.allowed_scopes, vec!["10.0.0.5".to_string()]);
    }
}
