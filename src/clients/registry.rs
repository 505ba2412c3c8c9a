use std::collections::HashMap;
use std::sync::Arc;

use super::client::IndirectClient;
use crate::error::CallbackError;

/// Request parameter carrying the client name when none is configured
pub const DEFAULT_CLIENT_NAME_PARAMETER: &str = "client_name";

/// Read-only lookup of the configured indirect clients
///
/// Names are matched case-insensitively.
#[derive(Clone)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<dyn IndirectClient>>,
    client_name_parameter: String,
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("clients", &self.names())
            .field("client_name_parameter", &self.client_name_parameter)
            .finish()
    }
}

impl ClientRegistry {
    #[must_use]
    pub fn builder() -> ClientRegistryBuilder {
        ClientRegistryBuilder::default()
    }

    /// Find a client by name
    ///
    /// # Errors
    ///
    /// Returns `CallbackError::UnknownClient` if no client has this name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn IndirectClient>, CallbackError> {
        self.clients
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| CallbackError::UnknownClient(name.to_string()))
    }

    /// Name of the request parameter that selects a client
    #[must_use]
    pub fn client_name_parameter(&self) -> &str {
        &self.client_name_parameter
    }

    /// Registered client names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.values().map(|c| c.name()).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Collects clients during configuration
pub struct ClientRegistryBuilder {
    clients: Vec<Arc<dyn IndirectClient>>,
    client_name_parameter: String,
}

impl Default for ClientRegistryBuilder {
    fn default() -> Self {
        Self {
            clients: Vec::new(),
            client_name_parameter: DEFAULT_CLIENT_NAME_PARAMETER.to_string(),
        }
    }
}

impl ClientRegistryBuilder {
    #[must_use]
    pub fn register<C: IndirectClient + 'static>(self, client: C) -> Self {
        self.register_arc(Arc::new(client))
    }

    #[must_use]
    pub fn register_arc(mut self, client: Arc<dyn IndirectClient>) -> Self {
        self.clients.push(client);
        self
    }

    #[must_use]
    pub fn client_name_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.client_name_parameter = parameter.into();
        self
    }

    /// Finish registration
    ///
    /// # Errors
    ///
    /// Returns `CallbackError::Configuration` if a client name is blank or
    /// registered twice, or the client-name parameter is blank
    pub fn build(self) -> Result<ClientRegistry, CallbackError> {
        if self.client_name_parameter.trim().is_empty() {
            return Err(CallbackError::Configuration(
                "client name parameter must not be blank".to_string(),
            ));
        }

        let mut clients = HashMap::with_capacity(self.clients.len());
        for client in self.clients {
            let name = client.name().trim();
            if name.is_empty() {
                return Err(CallbackError::Configuration(
                    "client name must not be blank".to_string(),
                ));
            }
            let key = name.to_lowercase();
            if clients.contains_key(&key) {
                return Err(CallbackError::Configuration(format!(
                    "client '{name}' registered more than once"
                )));
            }
            clients.insert(key, client);
        }

        Ok(ClientRegistry {
            clients,
            client_name_parameter: self.client_name_parameter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock::MockClient;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = ClientRegistry::builder()
            .register(MockClient::new("GitHub"))
            .build()
            .unwrap();

        assert_eq!(registry.resolve("github").unwrap().name(), "GitHub");
        assert_eq!(registry.resolve("GITHUB").unwrap().name(), "GitHub");
    }

    #[test]
    fn test_unknown_client() {
        let registry = ClientRegistry::builder()
            .register(MockClient::new("github"))
            .build()
            .unwrap();

        assert!(matches!(
            registry.resolve("gitlab"),
            Err(CallbackError::UnknownClient(name)) if name == "gitlab"
        ));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = ClientRegistry::builder()
            .register(MockClient::new("google"))
            .register(MockClient::new("Google"))
            .build();
        assert!(matches!(result, Err(CallbackError::Configuration(_))));
    }

    #[test]
    fn test_names_and_parameter() {
        let registry = ClientRegistry::builder()
            .register(MockClient::new("google"))
            .register(MockClient::new("github"))
            .client_name_parameter("idp")
            .build()
            .unwrap();

        assert_eq!(registry.names(), vec!["github", "google"]);
        assert_eq!(registry.client_name_parameter(), "idp");
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}
