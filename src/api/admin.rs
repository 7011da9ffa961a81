//! Account administration endpoints. The service rejects these for
//! non-admin credentials regardless of what the client shows.

use super::{id_segment, ApiClient, ApiRequest, RequestError};
use crate::models::{Id, User};

impl ApiClient {
    /// GET /api/admin/user
    pub async fn list_users(&self) -> Result<Vec<User>, RequestError> {
        self.fetch_json(ApiRequest::get("/admin/user")).await
    }

    /// PUT /api/admin/user/{id}/block?active={bool}
    ///
    /// Returns the service's confirmation text.
    pub async fn set_user_active(&self, id: &Id, active: bool) -> Result<String, RequestError> {
        let path = format!("/admin/user/{}/block", id_segment(id)?);
        self.execute(ApiRequest::put(path).query("active", active))
            .await
    }

    /// DELETE /api/admin/user/{id}
    ///
    /// Also removes the user's tasks server-side. Returns the confirmation
    /// text.
    pub async fn delete_user(&self, id: &Id) -> Result<String, RequestError> {
        self.execute(ApiRequest::delete(format!("/admin/user/{}", id_segment(id)?)))
            .await
    }
}
