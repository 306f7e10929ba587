use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::GatewayError;
use crate::config::PortalConfig;
use crate::files::{FileLocator, LocalFile};
use crate::session::Session;
use crate::workflows::applications::{ApplicationGateway, ApplicationId, ApplicationRecord, Role};
use crate::workflows::content::{ContentGateway, Notice, Slide};
use crate::workflows::profile::{DocumentSlot, ProfileGateway, ProfileUpdate, UserProfile};

/// REST client for the portal.
///
/// Application and profile calls carry the session's bearer token; landing content and file
/// downloads are public and work without one.
#[derive(Debug, Clone)]
pub struct HttpPortal {
    client: Client,
    base_url: Url,
    session: Option<Session>,
    files: FileLocator,
}

impl HttpPortal {
    pub fn new(
        base_url: Url,
        session: Option<Session>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::BaseUrl);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            files: FileLocator::new(base_url.clone()),
            base_url,
            session,
        })
    }

    pub fn from_config(
        config: &PortalConfig,
        session: Option<Session>,
    ) -> Result<Self, GatewayError> {
        Self::new(config.base_url.clone(), session, config.timeout())
    }

    pub fn files(&self) -> &FileLocator {
        &self.files
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Raw bytes of a stored artifact.
    pub async fn fetch_file(&self, filename: &str) -> Result<Vec<u8>, GatewayError> {
        let url = self.endpoint(&["api", "files", filename])?;
        let response = send(self.optionally_authorized(self.client.get(url))).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| GatewayError::BaseUrl)?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let session = self.session.as_ref().ok_or(GatewayError::MissingSession)?;
        Ok(request.bearer_auth(session.bearer_token()))
    }

    /// Public endpoints accept anonymous requests; the token rides along when there is one.
    fn optionally_authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(session) => request.bearer_auth(session.bearer_token()),
            None => request,
        }
    }

    fn application_endpoint(&self, id: &ApplicationId, action: &str) -> Result<Url, GatewayError> {
        self.endpoint(&["api", "applications", id.0.as_str(), action])
    }

    /// PUT with an empty or small JSON body; the response body is ignored.
    async fn put_json(&self, url: Url, body: serde_json::Value) -> Result<(), GatewayError> {
        let request = self.authorized(self.client.put(url))?.json(&body);
        send(request).await.map(drop)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, GatewayError> {
    let response = request.send().await?;
    debug!(url = %response.url(), status = response.status().as_u16(), "portal responded");
    ensure_success(response).await
}

/// Maps non-2xx responses to [`GatewayError::Server`], preferring the portal's `message` field.
async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or(body);
    Err(GatewayError::Server {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn file_part(file: &LocalFile) -> Result<Part, GatewayError> {
    Ok(Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(file.content_type.as_ref())?)
}

/// Profile mutations answer with `{ "user": { ... } }`.
#[derive(Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

const fn listing_segment(role: Role) -> &'static str {
    match role {
        Role::Applicant => "user",
        Role::Operator => "operator",
    }
}

#[async_trait]
impl ApplicationGateway for HttpPortal {
    async fn list_applications(&self, role: Role) -> Result<Vec<ApplicationRecord>, GatewayError> {
        let url = self.endpoint(&["api", "applications", listing_segment(role)])?;
        let response = send(self.authorized(self.client.get(url))?).await?;
        decode(response).await
    }

    async fn confirm(&self, id: &ApplicationId) -> Result<(), GatewayError> {
        let url = self.application_endpoint(id, "confirm")?;
        self.put_json(url, json!({})).await
    }

    async fn submit_correction(
        &self,
        id: &ApplicationId,
        comment: &str,
    ) -> Result<(), GatewayError> {
        let url = self.application_endpoint(id, "correction")?;
        self.put_json(url, json!({ "comment": comment })).await
    }

    async fn operator_confirm(&self, id: &ApplicationId) -> Result<(), GatewayError> {
        let url = self.application_endpoint(id, "operator-confirm")?;
        self.put_json(url, json!({})).await
    }

    async fn reject(&self, id: &ApplicationId, reason: &str) -> Result<(), GatewayError> {
        let url = self.application_endpoint(id, "reject")?;
        self.put_json(url, json!({ "reason": reason })).await
    }

    async fn upload_form(&self, id: &ApplicationId, form: &LocalFile) -> Result<(), GatewayError> {
        let url = self.application_endpoint(id, "upload-pdf")?;
        let body = Form::new().part("formPdf", file_part(form)?);
        let request = self.authorized(self.client.put(url))?.multipart(body);
        send(request).await.map(drop)
    }
}

#[async_trait]
impl ProfileGateway for HttpPortal {
    async fn fetch_profile(&self) -> Result<UserProfile, GatewayError> {
        let session = self.session.as_ref().ok_or(GatewayError::MissingSession)?;
        let url = self.endpoint(&["api", "users", session.user_id().0.as_str(), "profile"])?;
        let response = send(self.authorized(self.client.get(url))?).await?;
        decode(response).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["api", "users", "profile"])?;

        let mut body = Form::new();
        for (name, value) in update.details.form_fields() {
            body = body.text(name, value);
        }
        for (slot, file) in &update.files {
            body = body.part(slot.field_name(), file_part(file)?);
        }

        let request = self.authorized(self.client.put(url))?.multipart(body);
        let envelope: UserEnvelope = decode(send(request).await?).await?;
        Ok(envelope.user)
    }

    async fn delete_document(&self, slot: DocumentSlot) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["api", "users", "profile", "document", slot.field_name()])?;
        let response = send(self.authorized(self.client.delete(url))?).await?;
        let envelope: UserEnvelope = decode(response).await?;
        Ok(envelope.user)
    }
}

#[async_trait]
impl ContentGateway for HttpPortal {
    async fn slides(&self) -> Result<Vec<Slide>, GatewayError> {
        let url = self.endpoint(&["api", "heroslides"])?;
        decode(send(self.optionally_authorized(self.client.get(url))).await?).await
    }

    async fn notices(&self) -> Result<Vec<Notice>, GatewayError> {
        let url = self.endpoint(&["api", "notices"])?;
        decode(send(self.optionally_authorized(self.client.get(url))).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserId;

    fn portal(base: &str, session: Option<Session>) -> HttpPortal {
        HttpPortal::new(
            Url::parse(base).expect("test url"),
            session,
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    #[test]
    fn endpoints_keep_base_path_and_escape_segments() {
        let portal = portal("http://gateway.local/portal/", None);
        let url = portal
            .endpoint(&["api", "files", "scan 01.pdf"])
            .expect("endpoint");
        assert_eq!(url.as_str(), "http://gateway.local/portal/api/files/scan%2001.pdf");
    }

    #[test]
    fn opaque_base_url_is_refused() {
        let err = HttpPortal::new(
            Url::parse("mailto:desk@portal.gov").expect("parses"),
            None,
            Duration::from_secs(1),
        )
        .expect_err("cannot carry paths");
        assert!(matches!(err, GatewayError::BaseUrl));
    }

    #[tokio::test]
    async fn authenticated_calls_need_a_session() {
        let anonymous = portal("http://127.0.0.1:9", None);
        let err = anonymous
            .list_applications(Role::Operator)
            .await
            .expect_err("no session");
        assert!(matches!(err, GatewayError::MissingSession));

        let signed_in = portal(
            "http://127.0.0.1:9",
            Some(Session::new(UserId("u1".to_string()), "t")),
        );
        assert!(signed_in.session().is_some());
    }
}
