use anyhow::Result;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

use crate::db::PersistedSearchTerm;
use crate::hn_client::StoryFetcher;
use crate::models::{SearchPage, StoriesState, Story};
use crate::query::{extract_search_term, SearchEndpoint};
use crate::recency::last_searches;
use crate::reducer::{stories_reducer, StoriesAction};

struct FetchOutcome {
    request_id: u64,
    url: String,
    result: Result<SearchPage>,
}

/// Owns the search history and the story list, and turns user actions into
/// requests and reducer transitions.
///
/// Fetches run on worker threads. Every request gets an increasing id and only
/// the answer to the most recent one is applied; answers to superseded
/// requests are dropped when they arrive.
pub struct StoriesController {
    fetcher: Arc<dyn StoryFetcher>,
    endpoint: SearchEndpoint,
    search_term: PersistedSearchTerm,
    urls: Vec<String>,
    stories: StoriesState,
    next_request_id: u64,
    in_flight: Option<u64>,
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
}

impl StoriesController {
    pub fn new(
        fetcher: Arc<dyn StoryFetcher>,
        endpoint: SearchEndpoint,
        search_term: PersistedSearchTerm,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let urls = vec![endpoint.url(search_term.get(), 0)];

        Self {
            fetcher,
            endpoint,
            search_term,
            urls,
            stories: StoriesState::default(),
            next_request_id: 0,
            in_flight: None,
            sender,
            receiver,
        }
    }

    /// Issues the initial request. Call once, when the UI is up.
    pub fn start(&mut self) {
        self.search_term.mount();
        self.fetch_last_url();
    }

    pub fn state(&self) -> &StoriesState {
        &self.stories
    }

    pub fn search_term(&self) -> &str {
        self.search_term.get()
    }

    pub fn last_searches(&self) -> Vec<String> {
        last_searches(&self.urls)
    }

    pub fn sum_comments(&self) -> u64 {
        self.stories.sum_comments()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term.set(term);
    }

    /// Searches for the current term. Returns `false` when the term is empty.
    pub fn submit_search(&mut self) -> bool {
        let term = self.search_term.get().to_string();
        if term.is_empty() {
            return false;
        }
        self.search(&term, 0);
        true
    }

    pub fn search_recent(&mut self, term: &str) {
        self.search_term.set(term);
        self.search(term, 0);
    }

    /// Requests the page after the one last merged, for the last searched term.
    pub fn load_more(&mut self) {
        if self.stories.is_loading {
            return;
        }
        let term = match self.urls.last() {
            Some(url) => extract_search_term(url),
            None => self.search_term.get().to_string(),
        };
        let page = self.stories.page + 1;
        self.search(&term, page);
    }

    pub fn remove_story(&mut self, story: &Story) {
        self.dispatch(StoriesAction::RemoveStory(story.clone()));
    }

    /// Applies every finished fetch without blocking. Returns whether the
    /// story state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.receiver.try_recv() {
            changed |= self.apply(outcome);
        }
        changed
    }

    fn search(&mut self, term: &str, page: usize) {
        self.urls.push(self.endpoint.url(term, page));
        self.fetch_last_url();
    }

    fn fetch_last_url(&mut self) {
        let Some(url) = self.urls.last().cloned() else {
            return;
        };

        self.dispatch(StoriesAction::FetchInit);

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        if let Some(superseded) = self.in_flight.replace(request_id) {
            debug!(superseded, request_id, "request superseded");
        }

        info!(request_id, %url, "fetching stories");

        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = fetcher.fetch(&url);
            let _ = sender.send(FetchOutcome {
                request_id,
                url,
                result,
            });
        });
    }

    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if self.in_flight != Some(outcome.request_id) {
            debug!(
                request_id = outcome.request_id,
                url = %outcome.url,
                "discarding stale response"
            );
            return false;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(page) => {
                info!(
                    request_id = outcome.request_id,
                    hits = page.hits.len(),
                    page = page.page,
                    "stories fetched"
                );
                self.dispatch(StoriesAction::FetchSuccess {
                    list: page.hits,
                    page: page.page,
                });
            }
            Err(e) => {
                warn!(request_id = outcome.request_id, url = %outcome.url, error = %e, "fetch failed");
                self.dispatch(StoriesAction::FetchFailure);
            }
        }
        true
    }

    fn dispatch(&mut self, action: StoriesAction) {
        self.stories = stories_reducer(&self.stories, action);
    }

    /// Blocks until one fetch finishes and applies it.
    #[cfg(test)]
    fn wait(&mut self) -> bool {
        let outcome = self
            .receiver
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("fetch did not finish");
        self.apply(outcome)
    }
}
