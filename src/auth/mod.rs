use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims issued by the upstream authentication service. This service only
/// verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub location_id: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Invalid JWT token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Validate signature and expiry, returning the claims.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: "KW/2348030000000".into(),
            role: "Group Admin".into(),
            location_id: "DCL-234-KW-ILR-ILE-0002".into(),
            exp,
            iat: 0,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn verifies_signed_token() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let claims = verify_jwt(&token("s3cret", exp), "s3cret").unwrap();
        assert_eq!(claims.role, "Group Admin");
    }

    #[test]
    fn rejects_bad_signature_expiry_and_missing_secret() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        assert!(matches!(verify_jwt(&token("other", exp), "s3cret"), Err(JwtError::Invalid(_))));
        let expired = chrono::Utc::now().timestamp() - 3600;
        assert!(verify_jwt(&token("s3cret", expired), "s3cret").is_err());
        assert!(matches!(verify_jwt("x", ""), Err(JwtError::MissingSecret)));
    }
}
