use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::cache::{CachedView, QueryCache, QueryKey};
use super::domain::{ApprovedEntity, MemberType, UnifiedMember};
use super::store::{RegistrationStore, RemoteError};

/// Optional filters applied to the unified member view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemberQuery {
    #[serde(default, rename = "memberType", alias = "member_type")]
    pub member_type: Option<MemberType>,
    /// Exact, case-sensitive match like location grouping.
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Case-insensitive substring match on the member name.
    #[serde(default)]
    pub search: Option<String>,
}

impl MemberQuery {
    pub fn is_empty(&self) -> bool {
        self.member_type.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.search.as_deref().map_or(true, |term| term.trim().is_empty())
    }

    pub fn matches(&self, member: &UnifiedMember) -> bool {
        if self.member_type.is_some_and(|wanted| wanted != member.member_type) {
            return false;
        }
        if self
            .city
            .as_deref()
            .is_some_and(|city| city != member.data.location.city)
        {
            return false;
        }
        if self
            .state
            .as_deref()
            .is_some_and(|state| state != member.data.location.state)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => member
                .data
                .name
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        }
    }
}

/// Unions the verified entities of every directory into one kind-tagged list.
pub struct DirectoryAggregator<S> {
    store: Arc<S>,
    cache: Arc<QueryCache>,
}

impl<S> DirectoryAggregator<S>
where
    S: RegistrationStore + 'static,
{
    pub fn new(store: Arc<S>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    /// Verified entities of one directory, empty when the store is unreachable.
    pub async fn list_approved(&self, member_type: MemberType) -> Vec<ApprovedEntity> {
        let key = QueryKey::ApprovedList(member_type);
        if let Some(CachedView::Entities(entities)) = self.cache.fresh(&key) {
            return entities;
        }

        let generation = self.cache.generation(&key);
        match self.fetch_verified(member_type).await {
            Ok(entities) => {
                self.cache
                    .store(key, generation, CachedView::Entities(entities.clone()));
                entities
            }
            Err(err) => {
                warn!(directory = member_type.label(), error = %err, "directory unavailable, serving empty list");
                Vec::new()
            }
        }
    }

    /// Professionals, then vendors, then NGOs, each in store order. Unverified
    /// records never surface. A failed collection contributes nothing and the
    /// degraded union is not cached.
    pub async fn list_approved_members(&self) -> Vec<UnifiedMember> {
        let key = QueryKey::ApprovedMembers;
        if let Some(CachedView::Members(members)) = self.cache.fresh(&key) {
            return members;
        }

        let generation = self.cache.generation(&key);
        let (professionals, vendors, ngos) = tokio::join!(
            self.fetch_verified(MemberType::Professional),
            self.fetch_verified(MemberType::Vendor),
            self.fetch_verified(MemberType::Ngo),
        );

        let mut degraded = false;
        let mut members = Vec::new();
        for (member_type, result) in [
            (MemberType::Professional, professionals),
            (MemberType::Vendor, vendors),
            (MemberType::Ngo, ngos),
        ] {
            match result {
                Ok(entities) => members.extend(entities.into_iter().map(|data| UnifiedMember {
                    member_type,
                    data,
                })),
                Err(err) => {
                    degraded = true;
                    warn!(directory = member_type.label(), error = %err, "skipping unavailable directory");
                }
            }
        }

        if !degraded {
            self.cache
                .store(key, generation, CachedView::Members(members.clone()));
        }
        members
    }

    pub async fn search_members(&self, query: &MemberQuery) -> Vec<UnifiedMember> {
        let members = self.list_approved_members().await;
        if query.is_empty() {
            return members;
        }
        members
            .into_iter()
            .filter(|member| query.matches(member))
            .collect()
    }

    async fn fetch_verified(
        &self,
        member_type: MemberType,
    ) -> Result<Vec<ApprovedEntity>, RemoteError> {
        let entities = self.store.approved_entities(member_type).await?;
        Ok(entities
            .into_iter()
            .filter(|entity| entity.verified && entity.member_type() == member_type)
            .collect())
    }
}
