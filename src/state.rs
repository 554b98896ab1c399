use crate::storage::KeyValueStore;
use crate::tracker::Tracker;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedStore = Box<dyn KeyValueStore + Send>;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<Tracker<SharedStore>>>,
}

impl AppState {
    pub fn new(tracker: Tracker<SharedStore>) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}
