use formdesk_workspace::WorkspaceService;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub service: WorkspaceService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            service: WorkspaceService::new(pool),
        }
    }
}
