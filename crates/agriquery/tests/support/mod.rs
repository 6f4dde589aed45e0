#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use agriquery::config::StoreSettings;
use agriquery::llm::{CompletionRequest, LanguageModel};
use agriquery::store::Store;
use anyhow::{Result, anyhow};

pub const CREATE_HEXES_SQL: &str = r#"
CREATE TABLE agricultural_hexes (
    h3_index VARCHAR,
    yield_target DOUBLE,
    P_in_soil DOUBLE,
    K_in_soil DOUBLE,
    N_in_soil DOUBLE,
    N_to_apply DOUBLE,
    P_to_apply DOUBLE,
    K_to_apply DOUBLE,
    geometry VARCHAR
);
INSERT INTO agricultural_hexes VALUES
    ('8a2a1072b59ffff', 245.0, 45.0, 170.0, 8.0, 290.0, 40.0, 60.0, 'POLYGON((0 0, 1 0, 1 1, 0 0))'),
    ('8a2a1072b5affff', 230.5, 58.5, 200.0, 12.0, 250.0, 30.0, 20.0, 'POLYGON((1 0, 2 0, 2 1, 1 0))'),
    ('8a2a1072b5b7fff', 210.25, 60.0, 260.0, 9.5, 200.0, 25.0, 0.0, 'POLYGON((2 0, 3 0, 3 1, 2 0))'),
    ('8a2a1072b5c7fff', 255.0, 72.0, 190.0, 15.0, 300.0, 10.0, 35.0, 'POLYGON((3 0, 4 0, 4 1, 3 0))'),
    ('8a2a1072b5d7fff', 198.0, 95.0, 255.0, 6.0, 180.0, 0.0, 10.0, 'POLYGON((4 0, 5 0, 5 1, 4 0))');
"#;

pub const LOW_PHOSPHORUS_HEXES: [&str; 2] = ["8a2a1072b59ffff", "8a2a1072b5affff"];

/// In-memory store holding the five fixture hexes.
pub fn seeded_store() -> Store {
    let mut store = Store::new(StoreSettings::in_memory());
    store
        .connect()
        .expect("in-memory store should open")
        .execute_batch(CREATE_HEXES_SQL)
        .expect("fixture rows should load");
    store
}

/// Language model that replays canned answers and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    responses: RefCell<VecDeque<Result<String>>>,
    requests: RefCell<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn replying(responses: &[&str]) -> Self {
        let model = Self::default();
        for response in responses {
            model.push_reply(response);
        }
        model
    }

    pub fn push_reply(&self, response: &str) {
        self.responses
            .borrow_mut()
            .push_back(Ok(response.to_string()));
    }

    pub fn push_failure(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(anyhow!(message.to_string())));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("at least one request should have been sent")
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
    }
}
