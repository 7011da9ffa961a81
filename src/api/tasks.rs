use super::{id_segment, ApiClient, ApiRequest, RequestError};
use crate::models::{Id, Task, TaskPayload};

impl ApiClient {
    /// GET /api/task
    pub async fn list_tasks(&self) -> Result<Vec<Task>, RequestError> {
        self.fetch_json(ApiRequest::get("/task")).await
    }

    /// GET /api/task/{id}
    pub async fn get_task(&self, id: &Id) -> Result<Task, RequestError> {
        self.fetch_json(ApiRequest::get(format!("/task/{}", id_segment(id)?)))
            .await
    }

    /// POST /api/task
    pub async fn create_task(&self, payload: &TaskPayload) -> Result<(), RequestError> {
        self.execute(ApiRequest::post("/task").json(payload)?)
            .await
            .map(|_| ())
    }

    /// PUT /api/task/{id}
    pub async fn update_task(&self, id: &Id, payload: &TaskPayload) -> Result<(), RequestError> {
        self.execute(ApiRequest::put(format!("/task/{}", id_segment(id)?)).json(payload)?)
            .await
            .map(|_| ())
    }

    /// DELETE /api/task/{id}
    pub async fn delete_task(&self, id: &Id) -> Result<(), RequestError> {
        self.execute(ApiRequest::delete(format!("/task/{}", id_segment(id)?)))
            .await
            .map(|_| ())
    }
}
