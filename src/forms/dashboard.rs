use super::{Navigation, LOGIN_PATH};
use crate::{
    client::AuthClient,
    session::{KeyValueStore, SessionManager, StoreError},
};
use serde_json::Value;
use tracing::{debug, error};

/// Outcome of opening the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardLoad {
    User(Value),
    Redirect(Navigation),
}

pub struct Dashboard<'s, P, S> {
    client: AuthClient,
    session: &'s SessionManager<P, S>,
}

impl<'s, P: KeyValueStore, S: KeyValueStore> Dashboard<'s, P, S> {
    #[must_use]
    pub fn new(client: AuthClient, session: &'s SessionManager<P, S>) -> Self {
        Self { client, session }
    }

    /// Fetch the current user, or send the caller back to the login page.
    pub async fn load(&self) -> DashboardLoad {
        let Some(token) = self.session.access_token() else {
            debug!("no access token, redirecting to login");
            return DashboardLoad::Redirect(Navigation::now(LOGIN_PATH));
        };

        match self.client.fetch_user(&token).await {
            Ok(response) if response.is_success() => DashboardLoad::User(response.body),
            Ok(response) => {
                debug!("user fetch rejected: {}", response.status);
                DashboardLoad::Redirect(Navigation::now(LOGIN_PATH))
            }
            Err(err) => {
                error!("Error fetching user data: {}", err);
                DashboardLoad::Redirect(Navigation::now(LOGIN_PATH))
            }
        }
    }

    /// # Errors
    /// Returns an error if the tokens cannot be removed from storage.
    pub fn logout(&self) -> Result<Navigation, StoreError> {
        self.session.logout()?;

        Ok(Navigation::now(LOGIN_PATH))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{MemoryStore, SessionTokens};
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn logged_in(remember: bool) -> SessionManager<MemoryStore, MemoryStore> {
        let session = SessionManager::new(MemoryStore::new(), MemoryStore::new());
        session
            .store(
                &SessionTokens {
                    access: SecretString::from("A".to_string()),
                    refresh: SecretString::from("R".to_string()),
                },
                remember,
            )
            .unwrap();
        session
    }

    #[tokio::test]
    async fn load_without_token_redirects_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = SessionManager::new(MemoryStore::new(), MemoryStore::new());
        let dashboard = Dashboard::new(AuthClient::new(&server.uri()).unwrap(), &session);

        assert_eq!(
            dashboard.load().await,
            DashboardLoad::Redirect(Navigation::now(LOGIN_PATH))
        );
    }

    #[tokio::test]
    async fn load_fetches_user_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "a@b.co"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = logged_in(false);
        let dashboard = Dashboard::new(AuthClient::new(&server.uri()).unwrap(), &session);

        assert_eq!(
            dashboard.load().await,
            DashboardLoad::User(json!({"email": "a@b.co"}))
        );
    }

    #[tokio::test]
    async fn rejected_token_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})),
            )
            .mount(&server)
            .await;

        let session = logged_in(true);
        let dashboard = Dashboard::new(AuthClient::new(&server.uri()).unwrap(), &session);

        assert_eq!(
            dashboard.load().await,
            DashboardLoad::Redirect(Navigation::now(LOGIN_PATH))
        );
    }

    #[test]
    fn logout_clears_tokens() {
        let session = logged_in(true);
        let dashboard = Dashboard::new(AuthClient::new("http://localhost:8080").unwrap(), &session);

        assert_eq!(dashboard.logout().unwrap(), Navigation::now(LOGIN_PATH));
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
    }
}
