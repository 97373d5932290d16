use crate::routes::{chat, health, persona};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "parley-server",
    description = "Persona role-play coaching API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(persona::PersonaApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root
}
