use super::ApiClient;
use crate::errors::FrontendResult;
use jokebox_common::{
    joke::Joke,
    newtypes::JokeId,
    pagination::{PageCursor, Sort},
};
use log::{debug, warn};

/// The infinitely scrolling list of jokes on the home page.
#[derive(Clone, Debug, PartialEq)]
pub struct JokeFeed {
    cursor: PageCursor,
    page_size: u32,
    jokes: Vec<Joke>,
}

impl JokeFeed {
    pub fn new(sort: Sort, page_size: u32) -> Self {
        Self {
            cursor: PageCursor::new(sort),
            page_size,
            jokes: vec![],
        }
    }

    pub fn jokes(&self) -> &[Joke] {
        &self.jokes
    }

    pub fn joke_mut(&mut self, id: JokeId) -> Option<&mut Joke> {
        self.jokes.iter_mut().find(|j| j.id == id)
    }

    /// After the joke was deleted on the backend.
    pub fn remove(&mut self, id: JokeId) {
        self.jokes.retain(|j| j.id != id);
    }

    pub fn sort(&self) -> Sort {
        self.cursor.sort()
    }

    pub fn has_more(&self) -> bool {
        !self.cursor.is_exhausted()
    }

    /// Drops all loaded pages if the sort order changed.
    pub fn set_sort(&mut self, sort: Sort) {
        if self.cursor.resort(sort) {
            debug!("Feed sort changed to {sort:?}");
            self.jokes.clear();
        }
    }

    /// Fetches the next page and returns how many jokes it contained. On error nothing changes,
    /// so calling this again retries the same page.
    pub async fn load_more(&mut self, client: &ApiClient) -> FrontendResult<usize> {
        let Some(query) = self.cursor.query(self.page_size) else {
            return Ok(0);
        };
        let page = match client.list_jokes(&query).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to load page {} of jokes: {e}", query.page);
                return Err(e);
            }
        };
        let len = page.as_ref().map(Vec::len);
        self.cursor.record_page(len);
        self.jokes.extend(page.unwrap_or_default());
        Ok(len.unwrap_or(0))
    }
}
