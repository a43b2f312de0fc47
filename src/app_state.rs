use crate::{
    config::Config,
    infrastructure::{open_storage, Storage},
    services::{FilmService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub films: FilmService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage = open_storage(&config.database, &config.cache).await?;
        Ok(Self::from_storage(&storage, config))
    }

    /// Wire the services over an already opened storage backend
    pub fn from_storage(storage: &Storage, config: Config) -> Self {
        Self {
            users: UserService::new(storage, config.catalog.friendship_policy),
            films: FilmService::new(storage),
            config,
        }
    }
}
