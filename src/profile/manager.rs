//! Session-scoped profile bookkeeping
//!
//! With multi-profile enabled a session keeps one profile per client, keyed
//! by client name; otherwise it keeps exactly one (the last written).

use crate::clients::IndirectClient;
use crate::error::{ClientError, StorageError};
use crate::models::{Credentials, ProfileSet, SessionId, UserProfile};
use crate::session::store::{get_typed, set_typed, SessionStore, PROFILES_KEY};

/// Reads and writes the profile set of a session
pub struct ProfileManager<'a> {
    store: &'a dyn SessionStore,
}

impl<'a> ProfileManager<'a> {
    #[must_use]
    pub fn new(store: &'a dyn SessionStore) -> Self {
        Self { store }
    }

    /// Load the stored profile set, empty if none was stored
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or holds an unreadable set
    pub async fn load(&self, session: &SessionId) -> Result<ProfileSet, StorageError> {
        Ok(get_typed(self.store, session, PROFILES_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Replace the stored profile set
    ///
    /// Concurrent writers race last-write-wins.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails
    pub async fn save(&self, session: &SessionId, profiles: &ProfileSet) -> Result<(), StorageError> {
        set_typed(self.store, session, PROFILES_KEY, profiles).await
    }

    /// Forget every profile of the session
    ///
    /// # Errors
    ///
    /// Returns an error if the store delete fails
    pub async fn remove_all(&self, session: &SessionId) -> Result<(), StorageError> {
        self.store.delete(session, PROFILES_KEY).await
    }

    /// Merge a new profile into the session's set and persist the result
    ///
    /// The existing set is only read when it can survive the merge.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or saving fails
    pub async fn store_profile(
        &self,
        session: &SessionId,
        profile: UserProfile,
        multi_profile: bool,
    ) -> Result<ProfileSet, StorageError> {
        let existing = if multi_profile {
            self.load(session).await?
        } else {
            ProfileSet::new()
        };
        let client_name = profile.client_name.clone();
        let merged = Self::merge(existing, profile, &client_name, multi_profile);
        self.save(session, &merged).await?;
        Ok(merged)
    }

    /// Combine an existing set with a new profile
    ///
    /// Without multi-profile the result is always `{profile}`. With it, any
    /// entry sharing `client_name` is replaced in place, otherwise the profile
    /// is appended.
    #[must_use]
    pub fn merge(
        existing: ProfileSet,
        mut profile: UserProfile,
        client_name: &str,
        multi_profile: bool,
    ) -> ProfileSet {
        profile.client_name = client_name.to_string();
        if !multi_profile {
            return ProfileSet::singleton(profile);
        }
        let mut merged = existing;
        merged.upsert(profile);
        merged
    }

    /// Build a profile from verified credentials through the client,
    /// tagged with the client's name
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are not valid or the client
    /// cannot map them
    pub async fn build(
        client: &dyn IndirectClient,
        credentials: &Credentials,
    ) -> Result<UserProfile, ClientError> {
        if !credentials.is_valid() {
            return Err(ClientError::Profile(format!(
                "credentials for {} are {:?}",
                credentials.subject, credentials.status
            )));
        }
        let mut profile = client.build_profile(credentials).await?;
        if profile.id.trim().is_empty() {
            return Err(ClientError::Profile("profile has no identifier".to_string()));
        }
        profile.client_name = client.name().to_string();
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;
    use crate::testing::mock::MockClient;

    fn profile(id: &str, client: &str) -> UserProfile {
        UserProfile::new(id, client)
    }

    #[test]
    fn test_merge_without_multi_profile_is_singleton() {
        let mut existing = ProfileSet::new();
        existing.upsert(profile("1", "github"));
        existing.upsert(profile("2", "google"));

        let merged = ProfileManager::merge(existing, profile("3", "cas"), "cas", false);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("cas").map(|p| p.id.as_str()), Some("3"));
    }

    #[test]
    fn test_merge_with_multi_profile_replaces_or_appends() {
        let existing = ProfileSet::singleton(profile("1", "github"));

        let appended = ProfileManager::merge(existing, profile("2", "google"), "google", true);
        assert_eq!(appended.len(), 2);

        let replaced = ProfileManager::merge(appended, profile("9", "github"), "github", true);
        assert_eq!(replaced.len(), 2);
        assert_eq!(replaced.get("github").map(|p| p.id.as_str()), Some("9"));
    }

    #[test]
    fn test_merge_tags_with_client_name() {
        let merged = ProfileManager::merge(ProfileSet::new(), profile("1", "other"), "github", true);
        assert!(merged.get("github").is_some());
        assert!(merged.get("other").is_none());
    }

    #[tokio::test]
    async fn test_load_empty_and_store() {
        let store = InMemorySessionStore::new();
        let session = SessionId::from("s");
        let manager = ProfileManager::new(&store);

        assert!(manager.load(&session).await.unwrap().is_empty());

        manager
            .store_profile(&session, profile("1", "github"), true)
            .await
            .unwrap();
        manager
            .store_profile(&session, profile("2", "google"), true)
            .await
            .unwrap();
        assert_eq!(manager.load(&session).await.unwrap().len(), 2);

        manager
            .store_profile(&session, profile("3", "cas"), false)
            .await
            .unwrap();
        let loaded = manager.load(&session).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get("cas").is_some());

        manager.remove_all(&session).await.unwrap();
        assert!(manager.load(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_tags_profile_with_client() {
        let client = MockClient::new("github");
        let credentials = Credentials::valid("octocat").with_attribute("email", "cat@example.com");

        let built = ProfileManager::build(&client, &credentials).await.unwrap();

        assert_eq!(built.id, "octocat");
        assert_eq!(built.client_name, "github");
        assert_eq!(built.attribute("email"), Some(&serde_json::json!("cat@example.com")));
    }

    #[tokio::test]
    async fn test_build_rejects_blank_subject() {
        let client = MockClient::new("github");
        let result = ProfileManager::build(&client, &Credentials::valid("  ")).await;
        assert!(matches!(result, Err(ClientError::Profile(_))));
    }

    #[tokio::test]
    async fn test_build_rejects_unverified_credentials() {
        let client = MockClient::new("github");
        for credentials in [Credentials::expired("octocat"), Credentials::invalid("octocat")] {
            let result = ProfileManager::build(&client, &credentials).await;
            assert!(matches!(result, Err(ClientError::Profile(_))));
        }
    }
}
