use super::StorageStrategy;
use crate::models::UploadResult;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// In-memory storage that records every call and can replay scripted results.
#[derive(Clone)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    stored_names: Arc<Mutex<Vec<String>>>,
    responses: Arc<Mutex<VecDeque<UploadResult>>>,
    base_url: String,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            stored_names: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            base_url: "https://mock-storage.example.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Queue a result returned by the next `store` call instead of the default success.
    pub fn with_response(self, response: UploadResult) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn get_store_count(&self) -> usize {
        self.stored_names.lock().unwrap().len()
    }

    pub fn get_stored_names(&self) -> Vec<String> {
        self.stored_names.lock().unwrap().clone()
    }

    pub fn get_files(&self) -> HashMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageStrategy for MockStorage {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn store(&self, name: &str, content: Bytes) -> Result<UploadResult> {
        self.stored_names.lock().unwrap().push(name.to_string());

        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return Ok(response);
        }

        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), content.to_vec());
        Ok(UploadResult::succeeded(format!("{}/{}", self.base_url, name)))
    }
}
