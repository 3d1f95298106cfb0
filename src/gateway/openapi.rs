use super::handlers::{health, login, logout, profile, register, ErrorResponse, MessageResponse};
use utoipa::{
    openapi::{
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
        Contact, InfoBuilder, License,
    },
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        register::register,
        login::login,
        logout::logout,
        profile::get_profile,
        profile::update_profile,
    ),
    components(schemas(ErrorResponse, MessageResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and logout"),
        (name = "user", description = "Profile of the authenticated user"),
        (name = "health", description = "Service and database health"),
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// `OpenAPI` document for the gateway, with info taken from Cargo metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();
    info.contact = cargo_contact();
    info.license = cargo_license();
    doc.info = info;

    doc
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_author<'a>(author: &'a str) -> (Option<&'a str>, Option<&'a str>) {
    let non_empty = |value: &'a str| {
        let value = value.trim();
        (!value.is_empty()).then_some(value)
    };
    match author.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert_eq!(
            contact.as_ref().and_then(|c| c.name.as_deref()),
            Some("Team Gatehouse")
        );
        assert_eq!(
            contact.as_ref().and_then(|c| c.email.as_deref()),
            Some("team@gatehouse.dev")
        );
        assert_eq!(
            spec.info.license.map(|license| license.name),
            Some("BSD-3-Clause".to_string())
        );
    }

    #[test]
    fn openapi_documents_session_routes() {
        let spec = openapi();
        for path in [
            "/health",
            "/api/v1/register",
            "/api/v1/login",
            "/api/v1/logout",
            "/api/v1/user/profile",
            "/api/v1/user/update",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
        let has_bearer = spec
            .components
            .is_some_and(|components| components.security_schemes.contains_key("bearer"));
        assert!(has_bearer);
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Jane Doe <jane@example.com>"),
            (Some("Jane Doe"), Some("jane@example.com"))
        );
        assert_eq!(parse_author("Jane Doe"), (Some("Jane Doe"), None));
        assert_eq!(parse_author("<ops@example.com>"), (None, Some("ops@example.com")));
    }
}
