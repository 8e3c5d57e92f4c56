//! Task board adapter for a Trello board.
//!
//! Authentication travels as `key`/`token` query parameters, so request URLs
//! are never logged; errors carry the path label only.

use std::collections::HashSet;

use serde::Deserialize;

use leadsync_core::{
    config::TrelloSettings, ListId, NewTask, SourceError, Task, TaskBoard, TaskId, TaskPatch,
};

use crate::http::{agent, call_err, decode_err};

pub const TRELLO_API: &str = "https://api.trello.com/1";

/// Cards requested per page (Trello's maximum for board card listings).
pub const PAGE_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub(crate) struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "idList")]
    pub id_list: String,
}

impl From<Card> for Task {
    fn from(card: Card) -> Self {
        Task {
            id: TaskId(card.id),
            title: card.name,
            list: ListId(card.id_list),
            description: card.desc,
        }
    }
}

/// Walk the board with `before` cursors until a short page comes back.
///
/// Card ids are creation-ordered, so the smallest id on a page is the cursor
/// for the next one. A page that does not advance the cursor ends the walk.
pub(crate) fn collect_cards<F>(limit: usize, mut fetch_page: F) -> Result<Vec<Task>, SourceError>
where
    F: FnMut(Option<&str>) -> Result<Vec<Card>, SourceError>,
{
    let mut tasks: Vec<Task> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut before: Option<String> = None;
    loop {
        let page = fetch_page(before.as_deref())?;
        let full = page.len() >= limit;
        let oldest = page.iter().map(|c| c.id.clone()).min();
        for card in page {
            if seen.insert(card.id.clone()) {
                tasks.push(card.into());
            }
        }
        match oldest {
            Some(next) if full && before.as_deref() != Some(next.as_str()) => before = Some(next),
            _ => break,
        }
    }
    Ok(tasks)
}

pub struct TrelloTaskBoard {
    agent: ureq::Agent,
    base_url: String,
    board_id: String,
    api_key: String,
    token: String,
}

impl TrelloTaskBoard {
    pub fn new(settings: &TrelloSettings) -> Self {
        Self::with_base_url(settings, TRELLO_API)
    }

    pub fn with_base_url(settings: &TrelloSettings, base_url: &str) -> Self {
        Self {
            agent: agent(),
            base_url: base_url.trim_end_matches('/').to_string(),
            board_id: settings.board_id.clone(),
            api_key: settings.api_key.clone(),
            token: settings.token.clone(),
        }
    }

    fn authed(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}{}", self.base_url, path))
            .query("key", &self.api_key)
            .query("token", &self.token)
    }

    fn fetch_page(&self, before: Option<&str>) -> Result<Vec<Card>, SourceError> {
        let path = format!("/boards/{}/cards", self.board_id);
        let mut request = self
            .authed("GET", &path)
            .query("fields", "name,desc,idList")
            .query("limit", &PAGE_LIMIT.to_string());
        if let Some(before) = before {
            request = request.query("before", before);
        }
        request
            .call()
            .map_err(|e| call_err(&path, e))?
            .into_json::<Vec<Card>>()
            .map_err(|e| decode_err(&path, e))
    }
}

impl TaskBoard for TrelloTaskBoard {
    fn fetch_tasks(&self) -> Result<Vec<Task>, SourceError> {
        let tasks = collect_cards(PAGE_LIMIT, |before| self.fetch_page(before)).map_err(|err| {
            tracing::error!("error fetching board cards: {err}");
            err
        })?;
        tracing::debug!("fetched {} cards", tasks.len());
        Ok(tasks)
    }

    fn create_task(&self, task: &NewTask) -> Result<Task, SourceError> {
        let path = "/cards";
        let card = self
            .authed("POST", path)
            .query("name", &task.title)
            .query("desc", &task.description)
            .query("idList", &task.list.0)
            .call()
            .map_err(|e| call_err(path, e))?
            .into_json::<Card>()
            .map_err(|e| decode_err(path, e))?;
        tracing::info!("created card {}: {}", card.id, task.title);
        Ok(card.into())
    }

    fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, SourceError> {
        let path = format!("/cards/{id}");
        let mut request = self.authed("PUT", &path);
        if let Some(title) = &patch.title {
            request = request.query("name", title);
        }
        if let Some(description) = &patch.description {
            request = request.query("desc", description);
        }
        if let Some(list) = &patch.list {
            request = request.query("idList", &list.0);
        }
        let card = request
            .call()
            .map_err(|e| call_err(&path, e))?
            .into_json::<Card>()
            .map_err(|e| decode_err(&path, e))?;
        tracing::info!("updated card {id}");
        Ok(card.into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn cards(ids: &[&str]) -> Vec<Card> {
        ids.iter()
            .map(|id| Card {
                id: id.to_string(),
                name: format!("card {id}"),
                desc: String::new(),
                id_list: "todo".to_string(),
            })
            .collect()
    }

    #[test]
    fn card_json_maps_to_task() {
        let card: Card = serde_json::from_str(
            r#"{"id":"5f1a","name":"Jane - NEW","desc":"body","idList":"list-todo","pos":16384}"#,
        )
        .expect("card");
        let task = Task::from(card);
        assert_eq!(task.id, TaskId::from("5f1a"));
        assert_eq!(task.title, "Jane - NEW");
        assert_eq!(task.list, ListId::from("list-todo"));
        assert_eq!(task.description, "body");
    }

    #[test]
    fn card_without_description_decodes_as_empty() {
        let card: Card =
            serde_json::from_str(r#"{"id":"5f1b","name":"x","idList":"l"}"#).expect("card");
        assert_eq!(Task::from(card).description, "");
    }

    #[test]
    fn short_first_page_needs_one_request() {
        let mut requests = 0;
        let tasks = collect_cards(3, |before| {
            requests += 1;
            assert_eq!(before, None);
            Ok(cards(&["a2", "a1"]))
        })
        .expect("collect");
        assert_eq!(requests, 1);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn full_pages_walk_backwards_by_oldest_id() {
        let mut pages = VecDeque::from([
            cards(&["c9", "c8", "c7"]),
            cards(&["c6", "c5", "c4"]),
            cards(&["c3"]),
        ]);
        let mut cursors = Vec::new();

        let tasks = collect_cards(3, |before| {
            cursors.push(before.map(str::to_owned));
            Ok(pages.pop_front().unwrap_or_default())
        })
        .expect("collect");

        assert_eq!(tasks.len(), 7);
        assert_eq!(
            cursors,
            vec![None, Some("c7".to_string()), Some("c4".to_string())]
        );
    }

    #[test]
    fn cursor_that_does_not_advance_stops_the_walk() {
        let mut requests = 0;
        let tasks = collect_cards(2, |_| {
            requests += 1;
            Ok(cards(&["b2", "b1"]))
        })
        .expect("collect");
        assert_eq!(requests, 2);
        assert_eq!(tasks.len(), 2, "repeated cards are not duplicated");
    }

    #[test]
    fn overlapping_pages_keep_first_copy_in_order() {
        let first: Vec<String> = (0..1000).rev().map(|n| format!("id{n:05}")).collect();
        let mut pages = VecDeque::from([first.clone(), first]);

        let tasks = collect_cards(1000, |_| {
            let ids = pages.pop_front().unwrap_or_default();
            Ok(cards(&ids.iter().map(String::as_str).collect::<Vec<_>>()))
        })
        .expect("collect");

        assert_eq!(tasks.len(), 1000, "the repeated page adds nothing");
        assert_eq!(tasks[0].id, TaskId::from("id00999"));
        assert_eq!(tasks[999].id, TaskId::from("id00000"));
    }

    #[test]
    fn fetch_error_propagates() {
        let result = collect_cards(2, |_| {
            Err(SourceError::Status {
                endpoint: "/boards/b/cards".to_string(),
                status: 401,
                body: "invalid token".to_string(),
            })
        });
        assert!(matches!(result, Err(SourceError::Status { status: 401, .. })));
    }
}
