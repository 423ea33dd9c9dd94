use mongodm::{
    mongo::{options::ClientOptions, Client, Collection, Database},
    CollectionConfig, Model,
};

use crate::utils::{config::Config, result::Result};

pub trait MongodmContext
where
    Self: Clone,
{
    fn collection<M: Model>(&self) -> Collection<M>;
}

#[derive(Clone)]
pub struct Context {
    client: Client,
    database_name: String,
}

impl Context {
    pub async fn new(config: &Config) -> Result<Self> {
        Self::connect(&config.db_uri, &config.db_database).await
    }

    pub async fn connect(uri: &str, database_name: &str) -> Result<Self> {
        let option = ClientOptions::parse(uri).await?;
        let client = Client::with_options(option)?;
        Ok(Context {
            client,
            database_name: String::from(database_name),
        })
    }

    #[inline]
    pub fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }

    /// Creates the indexes declared by the model's collection config.
    pub async fn sync_indexes<M: Model>(&self) -> Result<()> {
        mongodm::sync_indexes::<M::CollConf>(&self.database()).await?;
        log::info!(
            target: "zetta",
            "indexes synced: {}",
            <M::CollConf as CollectionConfig>::collection_name()
        );
        Ok(())
    }
}

impl MongodmContext for Context {
    #[inline]
    fn collection<M>(&self) -> Collection<M>
    where
        M: Model,
    {
        self.database()
            .collection::<M>(<M::CollConf as CollectionConfig>::collection_name())
    }
}
