use std::{env::var, future::Future, sync::Arc};

use crate::context::Context;
use crate::utils::result::Result;

/// Runs `f` against a scratch database named by `MONGO_TEST_DATABASE`, dropping it afterwards.
/// Skips silently when `MONGO_TEST_URI` is not set.
pub async fn with_mongo<Fut>(f: impl FnOnce(Arc<Context>) -> Fut) -> Result<()>
where
    Fut: Future<Output = Result<()>>,
{
    let (uri, database) = match (var("MONGO_TEST_URI"), var("MONGO_TEST_DATABASE")) {
        (Ok(uri), Ok(database)) => (uri, database),
        _ => {
            log::warn!(target: "zetta", "MONGO_TEST_URI not set, skipping");
            return Ok(());
        }
    };
    let ctx = Arc::new(Context::connect(&uri, &database).await?);
    let result = f(Arc::clone(&ctx)).await;
    ctx.database().drop(None).await?;
    result
}
