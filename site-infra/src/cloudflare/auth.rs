use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::InfraError;

pub trait CloudflareApiAuth {
    fn headers(&self) -> HeaderMap;
}

pub struct CloudflareTokenAuth {
    authorization: HeaderValue,
}

impl CloudflareTokenAuth {
    pub fn new(api_token: &str) -> Result<Self, InfraError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", api_token))
            .map_err(|_| {
                InfraError::InvalidConfig("API token contains invalid header characters".to_string())
            })?;
        authorization.set_sensitive(true);

        Ok(Self { authorization })
    }
}

impl CloudflareApiAuth for CloudflareTokenAuth {
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_auth_sets_bearer_header() {
        let auth = CloudflareTokenAuth::new("secret-token").unwrap();

        let headers = auth.headers();

        assert_eq!(
            headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer secret-token"
        );
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_token_auth_rejects_newlines() {
        assert!(CloudflareTokenAuth::new("bad\ntoken").is_err());
    }
}
