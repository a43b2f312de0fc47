// UserService - users and the friendship graph between them

use chrono::Utc;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::FriendshipPolicy;
use crate::core::UserId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{EntityStore, FriendshipStore, Storage};
use crate::models::User;
use crate::services::validation::{validate_user, Intent};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn EntityStore<User>>,
    friendships: Arc<dyn FriendshipStore>,
    policy: FriendshipPolicy,
}

fn user_not_found(id: UserId) -> AppError {
    AppError::NotFound(format!("User {} not found", id))
}

impl UserService {
    pub fn new(storage: &Storage, policy: FriendshipPolicy) -> Self {
        Self {
            users: storage.users.clone(),
            friendships: storage.friendships.clone(),
            policy,
        }
    }

    pub async fn create_user(&self, user: User) -> AppResult<User> {
        let user = validate_user(user, Intent::Create, Utc::now().date_naive())?;
        let id = self.users.put(&user).await?;
        info!("Created user {} (login {})", id, user.login);
        self.get_user(id).await
    }

    pub async fn update_user(&self, user: User) -> AppResult<User> {
        let user = validate_user(user, Intent::Update, Utc::now().date_naive())?;
        let id = user
            .id
            .ok_or_else(|| AppError::InvalidArgument("user id is required for update".into()))?;

        if !self.users.update(&user).await? {
            warn!("Update rejected, user {} does not exist", id);
            return Err(user_not_found(id));
        }
        info!("Updated user {}", id);
        self.get_user(id).await
    }

    /// Delete the user; the store drops their friend edges and likes with them
    pub async fn delete_user(&self, id: UserId) -> AppResult<()> {
        if !self.users.delete(id).await? {
            warn!("Delete rejected, user {} does not exist", id);
            return Err(user_not_found(id));
        }
        info!("Deleted user {} with all friendships and likes", id);
        Ok(())
    }

    pub async fn get_user(&self, id: UserId) -> AppResult<User> {
        debug!("Fetching user {}", id);
        let user = self.users.get(id).await?.ok_or_else(|| user_not_found(id))?;
        self.with_friends(user).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = self.users.list().await?;
        try_join_all(users.into_iter().map(|user| self.with_friends(user))).await
    }

    async fn with_friends(&self, mut user: User) -> AppResult<User> {
        if let Some(id) = user.id {
            user.friends = self.friendships.edges(id).await?;
        }
        Ok(user)
    }

    async fn require_user(&self, id: UserId) -> AppResult<()> {
        if self.users.exists(id).await? {
            Ok(())
        } else {
            Err(user_not_found(id))
        }
    }

    /// Both users must exist and be different people
    async fn require_pair(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        if user_id == friend_id {
            warn!("User {} tried to befriend themselves", user_id);
            return Err(AppError::SelfRelation(user_id));
        }
        self.require_user(user_id).await?;
        self.require_user(friend_id).await
    }

    /// Send a friend request `user -> friend`. Under the auto-confirm policy the
    /// friendship is confirmed as soon as both directions exist.
    pub async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<User> {
        self.require_pair(user_id, friend_id).await?;

        if !self.friendships.add_edge(user_id, friend_id).await? {
            warn!("User {} has already added user {}", user_id, friend_id);
            return Err(AppError::AlreadyRelated { user_id, friend_id });
        }
        info!("User {} added user {} as a friend", user_id, friend_id);

        if self.policy == FriendshipPolicy::AutoConfirm
            && self.friendships.confirm(user_id, friend_id).await?
        {
            info!("Friendship {} <-> {} confirmed automatically", user_id, friend_id);
        }

        self.get_user(user_id).await
    }

    pub async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        self.require_pair(user_id, friend_id).await?;

        if !self.friendships.remove_edge(user_id, friend_id).await? {
            warn!("User {} has no friend edge to user {}", user_id, friend_id);
            return Err(AppError::NotRelated { user_id, friend_id });
        }
        info!("User {} removed user {} from friends", user_id, friend_id);
        Ok(())
    }

    /// Confirm a friendship; both users must have added each other first
    pub async fn confirm_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<User> {
        self.require_pair(user_id, friend_id).await?;

        if !self.friendships.confirm(user_id, friend_id).await? {
            warn!(
                "Cannot confirm friendship {} <-> {}, one of the requests is missing",
                user_id, friend_id
            );
            return Err(AppError::NotRelated { user_id, friend_id });
        }
        info!("Friendship {} <-> {} confirmed", user_id, friend_id);
        self.get_user(user_id).await
    }

    /// Outgoing friend edges with their confirmed flag
    pub async fn friend_statuses(&self, user_id: UserId) -> AppResult<BTreeMap<UserId, bool>> {
        self.require_user(user_id).await?;
        self.friendships.edges(user_id).await
    }

    pub async fn list_friends(&self, user_id: UserId) -> AppResult<Vec<User>> {
        let friend_ids: Vec<UserId> = self.friend_statuses(user_id).await?.into_keys().collect();
        self.resolve(friend_ids).await
    }

    /// Users both `user_id` and `other_id` have added, ascending by id
    pub async fn list_mutual_friends(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<User>> {
        self.require_user(user_id).await?;
        self.require_user(other_id).await?;
        let ids = self.friendships.mutual(user_id, other_id).await?;
        self.resolve(ids).await
    }

    async fn resolve(&self, ids: Vec<UserId>) -> AppResult<Vec<User>> {
        let users = try_join_all(ids.into_iter().map(|id| self.users.get(id))).await?;
        try_join_all(users.into_iter().flatten().map(|user| self.with_friends(user))).await
    }
}
