use super::ApiClient;
use crate::errors::FrontendResult;
use jokebox_common::{
    joke::{Joke, JokeWithComments},
    newtypes::JokeId,
    pagination::FeedQuery,
    CreatedResponse,
};
use serde::{de::IgnoredAny, Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct CreateJokeParams {
    pub body: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct DeleteJokeParams {
    pub joke_id: JokeId,
}

impl ApiClient {
    /// The backend returns `null` instead of an empty list past the last page.
    pub async fn list_jokes(&self, query: &FeedQuery) -> FrontendResult<Option<Vec<Joke>>> {
        self.get("jokes", Some(query)).await
    }

    pub async fn get_joke(&self, id: JokeId) -> FrontendResult<JokeWithComments> {
        self.get(&format!("jokes/{id}"), None::<()>).await
    }

    pub async fn create_joke(&self, body: String) -> FrontendResult<JokeId> {
        let params = CreateJokeParams { body };
        let res: CreatedResponse<JokeId> = self.post("jokes", Some(&params)).await?;
        Ok(res.id)
    }

    pub async fn delete_joke(&self, joke_id: JokeId) -> FrontendResult<()> {
        let params = DeleteJokeParams { joke_id };
        let _: IgnoredAny = self.delete("jokes/delete", Some(&params)).await?;
        Ok(())
    }
}
