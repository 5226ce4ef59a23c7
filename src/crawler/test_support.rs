//! In-memory fetcher used by the crawler unit tests

use crate::comment::{RawComment, RawCommentPage, RawUser};
use crate::crawler::fetcher::{PageFetcher, PageRequest};
use crate::CrawlerError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

type PageKey = (u64, Option<u64>);
type FetchHook = Box<dyn Fn(&PageRequest) + Send + Sync>;

#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<PageKey, RawCommentPage>,
    flaky: Mutex<HashMap<PageKey, u32>>,
    author: Option<String>,
    calls: Mutex<Vec<PageRequest>>,
    hook: Option<FetchHook>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            author: Some("poster".to_string()),
            ..Default::default()
        }
    }

    /// Registers a page for `target` at `cursor`
    pub fn page(mut self, target: u64, cursor: Option<u64>, comments: Vec<RawComment>, next: u64) -> Self {
        self.pages.insert(
            (target, cursor),
            RawCommentPage {
                comments,
                next_cursor: next,
            },
        );
        self
    }

    /// Registers `total` flat top-level comments split into pages of `per_page`
    pub fn flat_pages(mut self, target: u64, total: u64, per_page: u64) -> Self {
        let mut cursor = None;
        let mut id = 1;
        while id <= total {
            let end = (id + per_page - 1).min(total);
            let comments = (id..=end).map(|i| comment(i, 0)).collect();
            let next = if end < total { 10_000 + end } else { 0 };
            self = self.page(target, cursor, comments, next);
            cursor = Some(next);
            id = end + 1;
        }
        self
    }

    /// Makes the page fail `times` times before it is served
    pub fn flaky(self, target: u64, cursor: Option<u64>, times: u32) -> Self {
        self.flaky.lock().unwrap().insert((target, cursor), times);
        self
    }

    pub fn without_author(mut self) -> Self {
        self.author = None;
        self
    }

    /// Runs `hook` on every page request before it is answered
    pub fn on_fetch(mut self, hook: impl Fn(&PageRequest) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<PageRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawCommentPage, CrawlerError> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(hook) = &self.hook {
            hook(request);
        }

        let key = (request.target_id, request.cursor);
        let url = format!("fake://{}/{:?}", request.target_id, request.cursor);

        if let Some(remaining) = self.flaky.lock().unwrap().get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CrawlerError::PageFetch {
                    url,
                    message: "HTTP 503".to_string(),
                });
            }
        }

        self.pages.get(&key).cloned().ok_or(CrawlerError::PageFetch {
            url,
            message: "HTTP 404".to_string(),
        })
    }

    async fn lookup_author_name(&self, author_id: &str) -> Result<String, CrawlerError> {
        self.author.clone().ok_or_else(|| CrawlerError::AuthorLookup {
            author_id: author_id.to_string(),
            message: "HTTP 403".to_string(),
        })
    }
}

/// A top-level comment with `replies` nested replies
pub fn comment(id: u64, replies: u64) -> RawComment {
    RawComment {
        id,
        idstr: Some(id.to_string()),
        total_number: replies,
        text_raw: format!("comment {}", id),
        user: RawUser {
            id: 1000 + id,
            screen_name: format!("user{}", id),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A reply to the top-level comment `root`
pub fn reply(id: u64, root: u64) -> RawComment {
    RawComment {
        rootidstr: Some(root.to_string()),
        ..comment(id, 0)
    }
}
