//! OpenAPI document assembled from the handler annotations.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::dto::{HealthResponse, LoginRequest, LoginResponse, MessageResponse};
use crate::api::handlers::{auth, blog, contact, gallery, subscriber, system};
use crate::domain::{
    BlogDraft, BlogPatch, BlogPost, ContactDraft, ContactPatch, ContactStatus, ContactSubmission,
    EmailSubscriber, GalleryDraft, GalleryImage, GalleryPatch, ResourceId, SubscriberDraft,
    SubscriberPatch,
};
use crate::error::ErrorResponse;

/// OpenAPI description of the content server.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Click Express CMS",
        description = "Content API behind the Click Express logistics website."
    ),
    paths(
        auth::login,
        auth::logout,
        auth::verify,
        blog::list_blogs,
        blog::list_public_blogs,
        blog::get_blog,
        blog::create_blog,
        blog::update_blog,
        blog::delete_blog,
        gallery::list_images,
        gallery::get_image,
        gallery::create_image,
        gallery::update_image,
        gallery::delete_image,
        contact::list_contacts,
        contact::get_contact,
        contact::create_contact,
        contact::update_contact,
        contact::delete_contact,
        subscriber::list_subscribers,
        subscriber::export_subscribers,
        subscriber::get_subscriber,
        subscriber::create_subscriber,
        subscriber::update_subscriber,
        subscriber::delete_subscriber,
        system::health_handler,
    ),
    components(schemas(
        ResourceId,
        BlogPost,
        BlogDraft,
        BlogPatch,
        GalleryImage,
        GalleryDraft,
        GalleryPatch,
        ContactSubmission,
        ContactDraft,
        ContactPatch,
        ContactStatus,
        EmailSubscriber,
        SubscriberDraft,
        SubscriberPatch,
        LoginRequest,
        LoginResponse,
        MessageResponse,
        HealthResponse,
        ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Admin sign-in"),
        (name = "Blogs", description = "Blog posts"),
        (name = "Gallery", description = "Slider images"),
        (name = "Contacts", description = "Contact form submissions"),
        (name = "Subscribers", description = "Newsletter subscribers"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
