use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl UserCredentials {
    pub fn parse(input: &str) -> Result<Self> {
        let Some((email, password)) = input.split_once(':') else {
            anyhow::bail!("Invalid credentials format. Expected email:password");
        };
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token: String,
    pub is_admin: bool,
    pub credentials: UserCredentials,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    admin: bool,
}

/// Logs in and resolves the caller's id through `/api/me`.
pub async fn login(
    client: &Client,
    base_url: &str,
    credentials: &UserCredentials,
) -> Result<AuthenticatedUser> {
    let response = client
        .post(format!("{}/api/login", base_url))
        .json(&LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        })
        .send()
        .await
        .context("Failed to send login request")?;

    if !response.status().is_success() {
        anyhow::bail!("Login failed: {}", response.status());
    }

    let login_response: LoginResponse = response
        .json()
        .await
        .context("Failed to parse login response")?;

    let me: MeResponse = client
        .get(format!("{}/api/me", base_url))
        .bearer_auth(&login_response.token)
        .send()
        .await
        .context("Failed to fetch profile")?
        .error_for_status()
        .context("Profile request rejected")?
        .json()
        .await
        .context("Failed to parse profile")?;

    Ok(AuthenticatedUser {
        user_id: me.id,
        token: login_response.token,
        is_admin: me.admin,
        credentials: credentials.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_split_on_the_first_colon() {
        let creds = UserCredentials::parse("jo@garage.local:pa:ss").unwrap();
        assert_eq!(creds.email, "jo@garage.local");
        assert_eq!(creds.password, "pa:ss");

        assert!(UserCredentials::parse("no-colon").is_err());
    }
}
